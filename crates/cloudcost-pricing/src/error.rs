pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub fn no_snapshot(request: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::NoSnapshot(request.into()))
    }

    pub fn invalid(id: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::SnapshotInvalid {
            id: id.into(),
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    pub fn expired(id: impl Into<String>, effective_at: impl Into<String>, max_age_secs: u64) -> Self {
        Error::Core(cloudcost_core::Error::SnapshotExpired {
            id: id.into(),
            effective_at: effective_at.into(),
            max_age_secs,
        })
    }

    pub fn immutability_violation(id: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::ImmutabilityViolation(id.into()))
    }

    pub fn rate_not_found(key: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::RateNotFound(key.into()))
    }
}
