//! Primitive gateway - the only place that touches the PQC provider
//!
//! Kyber (ML-KEM) and Dilithium (ML-DSA) come from the `pqcrypto` crates.
//! Nothing here does lattice math; this module maps our algorithm enums
//! onto the provider's per-variant modules and its byte-level types.

use pqcrypto_traits::kem::{
    Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _,
};
use pqcrypto_traits::sign::{
    DetachedSignature as _, PublicKey as _, SecretKey as _,
};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::profile::{Algorithm, KemAlgorithm, SignatureAlgorithm};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{algorithm} rejected public key of {length} bytes")]
    MalformedPublicKey { algorithm: &'static str, length: usize },

    #[error("{algorithm} rejected private key of {length} bytes")]
    MalformedPrivateKey { algorithm: &'static str, length: usize },

    #[error("{algorithm} rejected ciphertext of {length} bytes")]
    MalformedCiphertext { algorithm: &'static str, length: usize },
}

/// A public/private key pair from a single generation call
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub private_key: Zeroizing<Vec<u8>>,
}

/// Output of a KEM encapsulation
pub struct Encapsulation {
    pub ciphertext: Vec<u8>,
    pub shared_secret: Zeroizing<Vec<u8>>,
}

/// Capability set of the external cryptographic provider
pub trait PrimitiveGateway: Send + Sync {
    fn generate_keypair(&self, algorithm: Algorithm) -> Result<KeyPair, ProviderError>;

    fn encapsulate(
        &self,
        algorithm: KemAlgorithm,
        public_key: &[u8],
    ) -> Result<Encapsulation, ProviderError>;

    fn decapsulate(
        &self,
        algorithm: KemAlgorithm,
        private_key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError>;

    fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        private_key: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// `Ok(false)` for any signature that does not verify, including ones
    /// the provider cannot even parse. Errors are reserved for bad keys.
    fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ProviderError>;
}

/// Gateway backed by PQClean through the `pqcrypto` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct PqcryptoGateway;

macro_rules! with_kem {
    ($alg:expr, $m:ident => $body:expr) => {
        match $alg {
            KemAlgorithm::Kyber512 => {
                use pqcrypto_kyber::kyber512 as $m;
                $body
            }
            KemAlgorithm::Kyber768 => {
                use pqcrypto_kyber::kyber768 as $m;
                $body
            }
            KemAlgorithm::Kyber1024 => {
                use pqcrypto_kyber::kyber1024 as $m;
                $body
            }
        }
    };
}

macro_rules! with_sig {
    ($alg:expr, $m:ident => $body:expr) => {
        match $alg {
            SignatureAlgorithm::Dilithium2 => {
                use pqcrypto_dilithium::dilithium2 as $m;
                $body
            }
            SignatureAlgorithm::Dilithium3 => {
                use pqcrypto_dilithium::dilithium3 as $m;
                $body
            }
            SignatureAlgorithm::Dilithium5 => {
                use pqcrypto_dilithium::dilithium5 as $m;
                $body
            }
        }
    };
}

impl PrimitiveGateway for PqcryptoGateway {
    fn generate_keypair(&self, algorithm: Algorithm) -> Result<KeyPair, ProviderError> {
        let (public_key, private_key) = match algorithm {
            Algorithm::Kem(kem) => with_kem!(kem, m => {
                let (pk, sk) = m::keypair();
                (pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec()))
            }),
            Algorithm::Signature(sig) => with_sig!(sig, m => {
                let (pk, sk) = m::keypair();
                (pk.as_bytes().to_vec(), Zeroizing::new(sk.as_bytes().to_vec()))
            }),
        };

        tracing::debug!(
            algorithm = algorithm.name(),
            public_len = public_key.len(),
            "Generated keypair"
        );

        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    fn encapsulate(
        &self,
        algorithm: KemAlgorithm,
        public_key: &[u8],
    ) -> Result<Encapsulation, ProviderError> {
        with_kem!(algorithm, m => {
            let pk = m::PublicKey::from_bytes(public_key).map_err(|_| {
                ProviderError::MalformedPublicKey {
                    algorithm: algorithm.name(),
                    length: public_key.len(),
                }
            })?;
            let (ss, ct) = m::encapsulate(&pk);
            Ok(Encapsulation {
                ciphertext: ct.as_bytes().to_vec(),
                shared_secret: Zeroizing::new(ss.as_bytes().to_vec()),
            })
        })
    }

    fn decapsulate(
        &self,
        algorithm: KemAlgorithm,
        private_key: &[u8],
        ciphertext: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        with_kem!(algorithm, m => {
            let sk = m::SecretKey::from_bytes(private_key).map_err(|_| {
                ProviderError::MalformedPrivateKey {
                    algorithm: algorithm.name(),
                    length: private_key.len(),
                }
            })?;
            let ct = m::Ciphertext::from_bytes(ciphertext).map_err(|_| {
                ProviderError::MalformedCiphertext {
                    algorithm: algorithm.name(),
                    length: ciphertext.len(),
                }
            })?;
            let ss = m::decapsulate(&ct, &sk);
            Ok(Zeroizing::new(ss.as_bytes().to_vec()))
        })
    }

    fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        private_key: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        with_sig!(algorithm, m => {
            let sk = m::SecretKey::from_bytes(private_key).map_err(|_| {
                ProviderError::MalformedPrivateKey {
                    algorithm: algorithm.name(),
                    length: private_key.len(),
                }
            })?;
            Ok(m::detached_sign(message, &sk).as_bytes().to_vec())
        })
    }

    fn verify(
        &self,
        algorithm: SignatureAlgorithm,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, ProviderError> {
        with_sig!(algorithm, m => {
            let pk = m::PublicKey::from_bytes(public_key).map_err(|_| {
                ProviderError::MalformedPublicKey {
                    algorithm: algorithm.name(),
                    length: public_key.len(),
                }
            })?;
            let sig = match m::DetachedSignature::from_bytes(signature) {
                Ok(sig) => sig,
                Err(_) => {
                    tracing::debug!(
                        algorithm = algorithm.name(),
                        length = signature.len(),
                        "Unparseable signature"
                    );
                    return Ok(false);
                }
            };
            Ok(m::verify_detached_signature(&sig, message, &pk).is_ok())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kem_roundtrip_all_variants() {
        let gateway = PqcryptoGateway;
        for kem in KemAlgorithm::ALL {
            let pair = gateway.generate_keypair(kem.into()).unwrap();
            assert_eq!(pair.public_key.len(), kem.profile().public_key_length);

            let enc = gateway.encapsulate(kem, &pair.public_key).unwrap();
            let ss = gateway
                .decapsulate(kem, &pair.private_key, &enc.ciphertext)
                .unwrap();
            assert_eq!(ss.as_slice(), enc.shared_secret.as_slice());
        }
    }

    #[test]
    fn test_sign_verify_all_variants() {
        let gateway = PqcryptoGateway;
        for sig in SignatureAlgorithm::ALL {
            let pair = gateway.generate_keypair(sig.into()).unwrap();
            assert_eq!(pair.public_key.len(), sig.profile().public_key_length);

            let signature = gateway.sign(sig, &pair.private_key, b"hello").unwrap();
            assert!(gateway.verify(sig, &pair.public_key, b"hello", &signature).unwrap());
            assert!(!gateway.verify(sig, &pair.public_key, b"hellp", &signature).unwrap());
        }
    }

    #[test]
    fn test_flipped_signature_byte_is_false_not_error() {
        let gateway = PqcryptoGateway;
        let alg = SignatureAlgorithm::Dilithium2;
        let pair = gateway.generate_keypair(alg.into()).unwrap();
        let mut signature = gateway.sign(alg, &pair.private_key, b"hello").unwrap();
        signature[0] ^= 0x01;

        assert_eq!(gateway.verify(alg, &pair.public_key, b"hello", &signature), Ok(false));
    }

    #[test]
    fn test_wrong_keypair_does_not_verify() {
        let gateway = PqcryptoGateway;
        let alg = SignatureAlgorithm::Dilithium2;
        let signer = gateway.generate_keypair(alg.into()).unwrap();
        let other = gateway.generate_keypair(alg.into()).unwrap();
        let signature = gateway.sign(alg, &signer.private_key, b"hello").unwrap();

        assert_eq!(gateway.verify(alg, &other.public_key, b"hello", &signature), Ok(false));
    }

    #[test]
    fn test_malformed_inputs_are_errors() {
        let gateway = PqcryptoGateway;

        assert_eq!(
            gateway.encapsulate(KemAlgorithm::Kyber512, &[0u8; 10]).err(),
            Some(ProviderError::MalformedPublicKey {
                algorithm: "Kyber512",
                length: 10
            })
        );

        let pair = gateway.generate_keypair(KemAlgorithm::Kyber512.into()).unwrap();
        assert!(matches!(
            gateway.decapsulate(KemAlgorithm::Kyber512, &pair.private_key, &[1, 2, 3]),
            Err(ProviderError::MalformedCiphertext { length: 3, .. })
        ));
        assert!(matches!(
            gateway.sign(SignatureAlgorithm::Dilithium2, &[0u8; 4], b"msg"),
            Err(ProviderError::MalformedPrivateKey { length: 4, .. })
        ));
        assert!(matches!(
            gateway.verify(SignatureAlgorithm::Dilithium2, &[0u8; 4], b"msg", &[0u8; 16]),
            Err(ProviderError::MalformedPublicKey { .. })
        ));
    }

    #[test]
    fn test_kem_key_rejected_by_other_variant() {
        let gateway = PqcryptoGateway;
        let pair = gateway.generate_keypair(KemAlgorithm::Kyber512.into()).unwrap();
        assert!(gateway.encapsulate(KemAlgorithm::Kyber768, &pair.public_key).is_err());
    }
}
