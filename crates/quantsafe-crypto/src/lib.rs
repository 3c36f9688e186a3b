//! QuantSafe Crypto - Post-quantum primitives and their envelope
//!
//! This crate provides:
//! - Base64 transport codec for keys, ciphertexts and signatures
//! - Algorithm profiles (Kyber / Dilithium) with public-key size windows
//! - Advisory key-length validation
//! - Canonical authentication challenges
//! - The primitive gateway over the `pqcrypto` provider

pub mod challenge;
pub mod codec;
pub mod gateway;
pub mod profile;
pub mod validator;

pub use challenge::{Challenge, ChallengeError};
pub use codec::DecodeError;
pub use gateway::{Encapsulation, KeyPair, PqcryptoGateway, PrimitiveGateway, ProviderError};
pub use profile::{Algorithm, AlgorithmProfile, KemAlgorithm, SignatureAlgorithm, UnsupportedAlgorithm};
pub use validator::{KeyVerdict, Rejection};
