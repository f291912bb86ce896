/// Error types for session and storage operations
use crate::catalog::ProviderKind;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Identity provider error: {0}")]
    Capability(String),

    #[error("No factory registered for provider: {0}")]
    UnknownProvider(ProviderKind),

    /// Shared by every caller that awaited the failed initialization
    #[error(transparent)]
    Initialization(Arc<Error>),
}

impl Error {
    /// The underlying error, looking through shared initialization failures
    pub fn root(&self) -> &Error {
        match self {
            Error::Initialization(inner) => inner.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_unwraps_shared_failures() {
        let shared = Error::Initialization(Arc::new(Error::Initialization(Arc::new(
            Error::Storage("disk gone".to_string()),
        ))));

        assert!(matches!(shared.root(), Error::Storage(m) if m == "disk gone"));
        assert_eq!(shared.to_string(), "Storage error: disk gone");
    }

    #[test]
    fn test_root_of_plain_error_is_itself() {
        let error = Error::Capability("popup closed".to_string());
        assert!(matches!(error.root(), Error::Capability(_)));
    }
}
