//! Sync error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while refreshing weddings from the API.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The endpoint URL could not be built from the configured base URL.
    #[error("invalid API url: {0}")]
    Url(String),

    /// The response body did not have the expected shape.
    #[error("could not decode weddings: {0}")]
    Decoding(#[from] serde_json::Error),

    /// Connection failure, timeout or non-2xx status.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("could not store weddings: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Transport failures may succeed on a later attempt. Client errors
    /// (bad token, missing endpoint) and everything else will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network(e) => !e.status().is_some_and(|s| s.is_client_error()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding_is_not_retryable() {
        let err: SyncError = serde_json::from_str::<Vec<u8>>("{").unwrap_err().into();
        assert!(matches!(err, SyncError::Decoding(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_url_and_store_are_not_retryable() {
        assert!(!SyncError::Url("nope".into()).is_retryable());
        assert!(!SyncError::Store(StoreError::Closed).is_retryable());
    }
}
