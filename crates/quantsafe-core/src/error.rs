//! Errors surfaced to HTTP and CLI callers

use quantsafe_crypto::{ChallengeError, DecodeError, ProviderError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid base64 encoding in field '{field}'")]
    Decode {
        field: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Challenge(#[from] ChallengeError),

    #[error("Response encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Crypto worker failed: {0}")]
    Worker(String),
}

impl ServiceError {
    /// Errors caused by what the caller sent, as opposed to our own failures
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            ServiceError::Decode { .. }
                | ServiceError::Provider(_)
                | ServiceError::BadRequest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
