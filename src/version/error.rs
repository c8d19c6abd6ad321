use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Registry returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Image name can not be empty")]
    InvalidName,

    #[error("Could not find a valid version for '{0}'")]
    NoMatchingVersion(String),

    #[error("Registry lookup failed: {0}")]
    RegistryLookupFailed(#[from] RegistryError),
}
