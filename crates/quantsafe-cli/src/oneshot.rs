//! One-shot command mode
//!
//! Lets another process call a single operation without running the
//! server. Each invocation prints exactly one JSON object on stdout, the
//! same shape the HTTP API returns.

use clap::Subcommand;
use quantsafe_core::wire::{Envelope, ValidationReport};
use quantsafe_core::{PqcService, Result};
use serde::Serialize;
use serde_json::Value;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Generate a KEM keypair
    GenerateKyberKeypair,

    /// Generate a signature keypair
    GenerateDilithiumKeypair,

    /// Encapsulate a fresh shared secret to a public key
    KyberEncapsulate {
        /// Base64 KEM public key
        public_key: String,
    },

    /// Recover a shared secret from a ciphertext
    KyberDecapsulate {
        /// Base64 KEM private key
        private_key: String,
        /// Base64 ciphertext
        ciphertext: String,
    },

    /// Sign a UTF-8 message
    DilithiumSign {
        /// Base64 signature private key
        private_key: String,
        /// Message text
        message: String,
    },

    /// Verify a signature over a UTF-8 message
    DilithiumVerify {
        /// Base64 signature public key
        public_key: String,
        /// Message text
        message: String,
        /// Base64 signature
        signature: String,
    },

    /// Check that a KEM public key has a plausible length
    ValidateKyberKey {
        /// Base64 KEM public key
        public_key: String,
    },

    /// Check that a signature public key has a plausible length
    ValidateDilithiumKey {
        /// Base64 signature public key
        public_key: String,
    },

    /// Build an authentication challenge for a user
    CreateChallenge {
        /// User identifier embedded in the challenge
        user_id: String,
    },
}

/// Run `op` and return the JSON object to print
pub fn execute(service: &PqcService, op: &Operation) -> Result<Value> {
    match op {
        Operation::GenerateKyberKeypair => envelope(service.generate_kem_keypair()?),
        Operation::GenerateDilithiumKeypair => envelope(service.generate_signature_keypair()?),
        Operation::KyberEncapsulate { public_key } => envelope(service.encapsulate(public_key)?),
        Operation::KyberDecapsulate {
            private_key,
            ciphertext,
        } => envelope(service.decapsulate(private_key, ciphertext)?),
        Operation::DilithiumSign {
            private_key,
            message,
        } => envelope(service.sign(private_key, message)?),
        Operation::DilithiumVerify {
            public_key,
            message,
            signature,
        } => envelope(service.verify(public_key, message, signature)?),
        Operation::ValidateKyberKey { public_key } => {
            report(ValidationReport::from(service.validate_kem_key(Some(public_key))))
        }
        Operation::ValidateDilithiumKey { public_key } => {
            report(ValidationReport::from(service.validate_signature_key(Some(public_key))))
        }
        Operation::CreateChallenge { user_id } => envelope(service.create_challenge(user_id)?),
    }
}

/// JSON object for a failed operation
pub fn failure(error: &quantsafe_core::ServiceError) -> Value {
    serde_json::to_value(Envelope::<()>::failure(error))
        .unwrap_or_else(|_| serde_json::json!({ "success": false }))
}

fn envelope<T: Serialize>(data: T) -> Result<Value> {
    report(Envelope::ok(data))
}

fn report<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
