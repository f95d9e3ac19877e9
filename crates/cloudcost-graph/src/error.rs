pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cloudcost_core::Error),
}

impl Error {
    pub fn cycle(path: Vec<String>) -> Self {
        Error::Core(cloudcost_core::Error::CycleDetected(path))
    }
}
