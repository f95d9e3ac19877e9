pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),

    #[error(transparent)]
    Pricing(#[from] cloudcost_pricing::Error),

    #[error("no cost mapper registered for resource type '{0}'")]
    NoMapper(String),
}
