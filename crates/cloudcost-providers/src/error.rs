pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),
}

impl Error {
    pub fn not_found(provider_type: impl Into<String>, alias: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::ProviderNotFound {
            provider_type: provider_type.into(),
            alias: alias.into(),
        })
    }

    pub fn finalizer_closed(provider_type: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::FinalizerClosed(provider_type.into()))
    }

    pub fn unbound_instance(address: impl Into<String>) -> Self {
        Error::Core(cloudcost_core::Error::UnboundInstance(address.into()))
    }
}
