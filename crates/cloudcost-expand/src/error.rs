//! Error type for the expansion crate, layered over the shared core
//! error the way every downstream crate wraps it.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),

    #[error("cannot expand '{address}' in strict mode: cardinality is unknown ({reason})")]
    UnknownCardinalityBlocked { address: String, reason: String },

    #[error("for_each value for '{0}' is not a map or a set of strings")]
    InvalidForEachValue(String),

    #[error("count value for '{0}' is negative or not an integer")]
    InvalidCountValue(String),
}

impl Error {
    pub fn duplicate_address(address: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::DuplicateAddress(address.into()))
    }
}

impl From<Error> for cloudcost_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(e) => e,
            other => cloudcost_core::Error::UnknownValue(other.to_string()),
        }
    }
}
