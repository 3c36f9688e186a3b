//! Text-in, text-out PQC operations shared by every frontend
//!
//! Built once at startup with its gateway and algorithm choices, then
//! shared read-only. Each call decodes its inputs, runs one provider
//! operation and re-encodes the result. Nothing is retried or stored.

use std::sync::Arc;

use quantsafe_crypto::{
    codec, validator, Challenge, KemAlgorithm, KeyVerdict, PqcryptoGateway, PrimitiveGateway,
    SignatureAlgorithm,
};
use zeroize::Zeroizing;

use crate::error::{Result, ServiceError};
use crate::wire::{ChallengeData, ConfiguredAlgorithms, EncapsulationData, HealthReport, KeyPairData};

pub struct PqcService {
    gateway: Arc<dyn PrimitiveGateway>,
    kem: KemAlgorithm,
    signature: SignatureAlgorithm,
}

impl Default for PqcService {
    fn default() -> Self {
        Self::new(
            Arc::new(PqcryptoGateway),
            KemAlgorithm::default(),
            SignatureAlgorithm::default(),
        )
    }
}

impl PqcService {
    pub fn new(
        gateway: Arc<dyn PrimitiveGateway>,
        kem: KemAlgorithm,
        signature: SignatureAlgorithm,
    ) -> Self {
        tracing::info!(kem = %kem, signature = %signature, "PQC service configured");
        Self {
            gateway,
            kem,
            signature,
        }
    }

    pub fn kem_algorithm(&self) -> KemAlgorithm {
        self.kem
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            algorithms: ConfiguredAlgorithms {
                kyber: self.kem.name(),
                dilithium: self.signature.name(),
            },
        }
    }

    pub fn generate_kem_keypair(&self) -> Result<KeyPairData> {
        let pair = self
            .gateway
            .generate_keypair(self.kem.into())
            .inspect_err(|e| tracing::error!(error = %e, "Kyber keypair generation failed"))?;

        Ok(KeyPairData {
            public_key: codec::encode(&pair.public_key),
            private_key: codec::encode(&pair.private_key),
        })
    }

    pub fn generate_signature_keypair(&self) -> Result<KeyPairData> {
        let pair = self
            .gateway
            .generate_keypair(self.signature.into())
            .inspect_err(|e| tracing::error!(error = %e, "Dilithium keypair generation failed"))?;

        Ok(KeyPairData {
            public_key: codec::encode(&pair.public_key),
            private_key: codec::encode(&pair.private_key),
        })
    }

    pub fn encapsulate(&self, public_key: &str) -> Result<EncapsulationData> {
        let public_key = decode_field("publicKey", public_key)?;
        let enc = self
            .gateway
            .encapsulate(self.kem, &public_key)
            .inspect_err(|e| tracing::error!(error = %e, "Kyber encapsulation failed"))?;

        Ok(EncapsulationData {
            ciphertext: codec::encode(&enc.ciphertext),
            shared_secret: codec::encode(&enc.shared_secret),
        })
    }

    pub fn decapsulate(&self, private_key: &str, ciphertext: &str) -> Result<String> {
        let private_key = Zeroizing::new(decode_field("privateKey", private_key)?);
        let ciphertext = decode_field("ciphertext", ciphertext)?;
        let shared_secret = self
            .gateway
            .decapsulate(self.kem, &private_key, &ciphertext)
            .inspect_err(|e| tracing::error!(error = %e, "Kyber decapsulation failed"))?;

        Ok(codec::encode(&shared_secret))
    }

    /// Sign the UTF-8 bytes of `message`
    pub fn sign(&self, private_key: &str, message: &str) -> Result<String> {
        let private_key = Zeroizing::new(decode_field("privateKey", private_key)?);
        let signature = self
            .gateway
            .sign(self.signature, &private_key, message.as_bytes())
            .inspect_err(|e| tracing::error!(error = %e, "Dilithium signing failed"))?;

        Ok(codec::encode(&signature))
    }

    /// A signature that does not match is `Ok(false)`, not an error
    pub fn verify(&self, public_key: &str, message: &str, signature: &str) -> Result<bool> {
        let public_key = decode_field("publicKey", public_key)?;
        let signature = decode_field("signature", signature)?;
        let valid = self
            .gateway
            .verify(self.signature, &public_key, message.as_bytes(), &signature)
            .inspect_err(|e| tracing::error!(error = %e, "Dilithium verification failed"))?;

        tracing::debug!(valid, "Dilithium signature checked");
        Ok(valid)
    }

    pub fn validate_kem_key(&self, public_key: Option<&str>) -> KeyVerdict {
        validator::validate_encoded(&self.kem.profile(), public_key)
    }

    pub fn validate_signature_key(&self, public_key: Option<&str>) -> KeyVerdict {
        validator::validate_encoded(&self.signature.profile(), public_key)
    }

    pub fn create_challenge(&self, user_id: &str) -> Result<ChallengeData> {
        let challenge = Challenge::build(user_id);
        tracing::info!(challenge_id = %challenge.challenge_id, "Created authentication challenge");

        Ok(ChallengeData {
            challenge: challenge.canonical()?,
            challenge_id: challenge.challenge_id.to_string(),
        })
    }
}

fn decode_field(field: &'static str, text: &str) -> Result<Vec<u8>> {
    codec::decode(text).map_err(|source| {
        tracing::warn!(field, error = %source, "Rejected undecodable input");
        ServiceError::Decode { field, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantsafe_crypto::{Rejection, ProviderError};

    #[test]
    fn test_kem_flow() {
        let service = PqcService::default();
        let pair = service.generate_kem_keypair().unwrap();
        let enc = service.encapsulate(&pair.public_key).unwrap();
        let secret = service.decapsulate(&pair.private_key, &enc.ciphertext).unwrap();
        assert_eq!(secret, enc.shared_secret);
    }

    #[test]
    fn test_signature_flow() {
        let service = PqcService::default();
        let pair = service.generate_signature_keypair().unwrap();
        let signature = service.sign(&pair.private_key, "hello").unwrap();
        assert!(service.verify(&pair.public_key, "hello", &signature).unwrap());

        let mut raw = codec::decode(&signature).unwrap();
        raw[10] ^= 0xFF;
        let tampered = codec::encode(&raw);
        assert!(!service.verify(&pair.public_key, "hello", &tampered).unwrap());
    }

    #[test]
    fn test_decode_errors_name_the_field() {
        let service = PqcService::default();
        let err = service.decapsulate("AAAA", "@@@").unwrap_err();
        assert!(matches!(err, ServiceError::Decode { field: "ciphertext", .. }));
        assert!(err.is_caller_fault());
    }

    #[test]
    fn test_provider_errors_propagate() {
        let service = PqcService::default();
        let err = service.encapsulate(&codec::encode(&[0u8; 32])).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Provider(ProviderError::MalformedPublicKey { length: 32, .. })
        ));
    }

    #[test]
    fn test_generated_keys_validate() {
        let service = PqcService::default();
        let kem = service.generate_kem_keypair().unwrap();
        let sig = service.generate_signature_keypair().unwrap();

        assert!(service.validate_kem_key(Some(&kem.public_key)).valid);
        assert!(service.validate_signature_key(Some(&sig.public_key)).valid);
        // Keys from the other family fall outside each window
        assert!(!service.validate_kem_key(Some(&sig.public_key)).valid);
        assert!(!service.validate_signature_key(Some(&kem.public_key)).valid);
    }

    #[test]
    fn test_validation_never_errors() {
        let service = PqcService::default();
        assert_eq!(service.validate_kem_key(None).reason, Some(Rejection::Missing));
        assert_eq!(
            service.validate_kem_key(Some("*not*base64*")).reason,
            Some(Rejection::Decode)
        );
    }

    #[test]
    fn test_challenge_for_user() {
        let service = PqcService::default();
        let data = service.create_challenge("alice").unwrap();
        assert!(data.challenge.contains(&data.challenge_id));
        assert!(data.challenge.ends_with("\"user_id\": \"alice\"}"));

        let anonymous = service.create_challenge("").unwrap();
        assert!(anonymous.challenge.ends_with("\"user_id\": \"\"}"));
        assert_ne!(anonymous.challenge_id, data.challenge_id);
    }

    #[test]
    fn test_health_reports_algorithms() {
        let service = PqcService::new(
            Arc::new(PqcryptoGateway),
            KemAlgorithm::Kyber768,
            SignatureAlgorithm::Dilithium3,
        );
        let health = service.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.algorithms.kyber, "Kyber768");
        assert_eq!(health.algorithms.dilithium, "Dilithium3");
    }
}
