pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),

    #[error("estimation blocked by policy '{policy}': {violation}")]
    Blocked { policy: String, violation: String },
}
