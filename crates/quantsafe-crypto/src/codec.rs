//! Transport encoding for key, ciphertext and signature material
//!
//! Standard padded base64. Decoding is strict: bad characters, missing
//! padding and non-canonical trailing bits are all rejected, so any text
//! that decodes re-encodes to exactly the same string.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(String),
}

/// Encode raw bytes as transport text
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode transport text back into raw bytes
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(text.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}
