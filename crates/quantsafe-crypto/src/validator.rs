//! Advisory public-key plausibility checks
//!
//! A length heuristic only. A key of the right size with corrupted content
//! passes here and fails later in the provider. The validator never errors:
//! every input produces a [`KeyVerdict`].

use std::fmt;

use crate::codec;
use crate::profile::AlgorithmProfile;

/// Why a key was judged implausible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    Decode,
    Length,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rejection::Missing => "No public key provided",
            Rejection::Decode => "Invalid base64 encoding",
            Rejection::Length => "Public key length outside expected range",
        })
    }
}

/// Outcome of a plausibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVerdict {
    pub valid: bool,
    pub reason: Option<Rejection>,
    /// Decoded length, absent when nothing could be decoded
    pub actual_length: Option<usize>,
    pub expected_range: String,
}

impl KeyVerdict {
    fn rejected(profile: &AlgorithmProfile, reason: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            actual_length: None,
            expected_range: profile.expected_range(),
        }
    }
}

/// Check decoded key bytes against a profile's size window
pub fn validate(profile: &AlgorithmProfile, candidate: &[u8]) -> KeyVerdict {
    let length = candidate.len();
    let valid = profile.accepted_lengths().contains(&length);

    if valid {
        tracing::debug!(algorithm = profile.name, length, "Public key length accepted");
    } else {
        tracing::warn!(
            algorithm = profile.name,
            length,
            expected = %profile.expected_range(),
            "Public key length rejected"
        );
    }

    KeyVerdict {
        valid,
        reason: (!valid).then_some(Rejection::Length),
        actual_length: Some(length),
        expected_range: profile.expected_range(),
    }
}

/// Decode transport text and check it; missing or undecodable input
/// becomes a soft rejection
pub fn validate_encoded(profile: &AlgorithmProfile, encoded: Option<&str>) -> KeyVerdict {
    let text = match encoded {
        Some(text) if !text.is_empty() => text,
        _ => return KeyVerdict::rejected(profile, Rejection::Missing),
    };

    match codec::decode(text) {
        Ok(bytes) => validate(profile, &bytes),
        Err(e) => {
            tracing::warn!(algorithm = profile.name, error = %e, "Public key failed to decode");
            KeyVerdict::rejected(profile, Rejection::Decode)
        }
    }
}
