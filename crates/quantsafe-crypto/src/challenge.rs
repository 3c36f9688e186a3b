//! Authentication challenges
//!
//! A challenge binds a user id to a fresh UUID, a timestamp and 32 random
//! bytes. Clients sign the canonical text form, not the struct, so the
//! serialization below is part of the wire contract: keys sorted, every
//! value a JSON string, `", "` / `": "` separators, non-ASCII and DEL
//! escaped as lowercase `\uXXXX`.

use std::collections::BTreeMap;
use std::io;
use std::string::FromUtf8Error;

use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use serde_json::ser::Formatter;
use thiserror::Error;
use uuid::Uuid;

use crate::codec;

/// Nonce length in bytes
pub const NONCE_SIZE: usize = 32;

#[derive(Error, Debug)]
pub enum ChallengeError {
    #[error("Challenge serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Challenge text is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub user_id: String,
    pub challenge_id: Uuid,
    /// Unix seconds at construction
    pub timestamp: i64,
    pub nonce: [u8; NONCE_SIZE],
}

impl Challenge {
    /// Build a fresh challenge for `user_id`
    pub fn build(user_id: impl Into<String>) -> Self {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        Self {
            user_id: user_id.into(),
            challenge_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().timestamp(),
            nonce,
        }
    }

    /// Reassemble a challenge from known field values
    pub fn from_parts(
        user_id: impl Into<String>,
        challenge_id: Uuid,
        timestamp: i64,
        nonce: [u8; NONCE_SIZE],
    ) -> Self {
        Self {
            user_id: user_id.into(),
            challenge_id,
            timestamp,
            nonce,
        }
    }

    /// The exact text a client is expected to sign
    pub fn canonical(&self) -> Result<String, ChallengeError> {
        let fields = BTreeMap::from([
            ("challenge_id", self.challenge_id.to_string()),
            ("nonce", codec::encode(&self.nonce)),
            ("timestamp", self.timestamp.to_string()),
            ("user_id", self.user_id.clone()),
        ]);

        let mut out = Vec::with_capacity(160 + self.user_id.len());
        let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
        fields.serialize(&mut ser)?;

        Ok(String::from_utf8(out)?)
    }
}

/// JSON layout with spaced separators and ASCII-only output
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            // DEL is ASCII but still written as \u007f
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(fragment[start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
