//! Supported algorithms and their public-key size profiles
//!
//! Algorithm identifiers are a closed set. Free-text names from
//! configuration are parsed here and anything unknown is rejected before
//! a cryptographic call can be attempted.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub String);

/// Expected public-key size for one algorithm variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmProfile {
    pub name: &'static str,
    pub public_key_length: usize,
    /// Allowed deviation in bytes on either side of `public_key_length`
    pub tolerance: usize,
}

impl AlgorithmProfile {
    pub const fn new(name: &'static str, public_key_length: usize, tolerance: usize) -> Self {
        Self {
            name,
            public_key_length,
            tolerance,
        }
    }

    pub fn min_length(&self) -> usize {
        self.public_key_length.saturating_sub(self.tolerance)
    }

    pub fn max_length(&self) -> usize {
        self.public_key_length.saturating_add(self.tolerance)
    }

    pub fn accepted_lengths(&self) -> RangeInclusive<usize> {
        self.min_length()..=self.max_length()
    }

    /// Range as shown to clients, e.g. `795-805`
    pub fn expected_range(&self) -> String {
        format!("{}-{}", self.min_length(), self.max_length())
    }
}

/// Key encapsulation mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KemAlgorithm {
    Kyber512,
    Kyber768,
    Kyber1024,
}

/// Digital signature schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Dilithium2,
    Dilithium3,
    Dilithium5,
}

/// Either family, for operations shared by both (keypair generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Kem(KemAlgorithm),
    Signature(SignatureAlgorithm),
}

impl KemAlgorithm {
    pub const ALL: [KemAlgorithm; 3] = [Self::Kyber512, Self::Kyber768, Self::Kyber1024];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Kyber512 => "Kyber512",
            Self::Kyber768 => "Kyber768",
            Self::Kyber1024 => "Kyber1024",
        }
    }

    pub const fn profile(self) -> AlgorithmProfile {
        match self {
            // The only KEM window the deployed clients were ever checked against
            Self::Kyber512 => AlgorithmProfile::new("Kyber512", 800, 5),
            Self::Kyber768 => AlgorithmProfile::new("Kyber768", 1184, 0),
            Self::Kyber1024 => AlgorithmProfile::new("Kyber1024", 1568, 0),
        }
    }
}

impl SignatureAlgorithm {
    pub const ALL: [SignatureAlgorithm; 3] =
        [Self::Dilithium2, Self::Dilithium3, Self::Dilithium5];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Dilithium2 => "Dilithium2",
            Self::Dilithium3 => "Dilithium3",
            Self::Dilithium5 => "Dilithium5",
        }
    }

    pub const fn profile(self) -> AlgorithmProfile {
        match self {
            Self::Dilithium2 => AlgorithmProfile::new("Dilithium2", 1312, 8),
            Self::Dilithium3 => AlgorithmProfile::new("Dilithium3", 1952, 0),
            Self::Dilithium5 => AlgorithmProfile::new("Dilithium5", 2592, 0),
        }
    }
}

impl Algorithm {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Kem(kem) => kem.name(),
            Self::Signature(sig) => sig.name(),
        }
    }

    pub const fn profile(self) -> AlgorithmProfile {
        match self {
            Self::Kem(kem) => kem.profile(),
            Self::Signature(sig) => sig.profile(),
        }
    }
}

impl Default for KemAlgorithm {
    fn default() -> Self {
        Self::Kyber512
    }
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::Dilithium2
    }
}

impl From<KemAlgorithm> for Algorithm {
    fn from(kem: KemAlgorithm) -> Self {
        Self::Kem(kem)
    }
}

impl From<SignatureAlgorithm> for Algorithm {
    fn from(sig: SignatureAlgorithm) -> Self {
        Self::Signature(sig)
    }
}

impl FromStr for KemAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedAlgorithm(s.to_string()))
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnsupportedAlgorithm(s.to_string()))
    }
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<KemAlgorithm>()
            .map(Self::Kem)
            .or_else(|_| s.parse::<SignatureAlgorithm>().map(Self::Signature))
    }
}

impl fmt::Display for KemAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
