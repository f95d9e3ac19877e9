pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),

    #[error(transparent)]
    Expand(#[from] cloudcost_expand::Error),

    #[error(transparent)]
    Providers(#[from] cloudcost_providers::Error),

    #[error(transparent)]
    Graph(#[from] cloudcost_graph::Error),

    #[error(transparent)]
    Pricing(#[from] cloudcost_pricing::Error),

    #[error(transparent)]
    Costing(#[from] cloudcost_costing::Error),

    #[error(transparent)]
    Policy(#[from] cloudcost_policy::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
}
