//! Signature verification capability.
//!
//! The introspection engine treats verification as a black box behind the
//! [`TokenVerifier`] trait: it either yields verified claims or fails. The
//! production implementation verifies EdDSA (Ed25519) signatures with a key
//! configured at startup.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only EdDSA (Ed25519) is accepted
//! - Expiration is enforced by the verification library's own clock check
//! - All failures collapse to a single generic error

use crate::auth::claims::Claims;
use crate::config::ConfigError;
use crate::errors::AtlasError;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

/// Maximum accepted token size in bytes.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

/// Black-box signature verification capability.
///
/// Implementations verify the token cryptographically and structurally and
/// return the decoded claim set. Any failure, including an expired token,
/// surfaces as [`AtlasError::InvalidSignature`]; finer-grained claim checks
/// belong to the validator, not the verifier.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer token and extract its claims.
    async fn verify(&self, token: &str) -> Result<Claims, AtlasError>;
}

/// EdDSA (Ed25519) token verifier backed by a configured public key.
pub struct Ed25519Verifier {
    decoding_key: DecodingKey,
}

impl Ed25519Verifier {
    /// Build a verifier from a base64url (no padding) raw Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVerificationKey` if the key does not
    /// decode to 32 bytes.
    pub fn from_base64_key(key_b64: &str) -> Result<Self, ConfigError> {
        let key_bytes = URL_SAFE_NO_PAD.decode(key_b64).map_err(|e| {
            ConfigError::InvalidVerificationKey(format!("key is not valid base64url: {}", e))
        })?;

        if key_bytes.len() != 32 {
            return Err(ConfigError::InvalidVerificationKey(format!(
                "expected 32 byte Ed25519 key, got {} bytes",
                key_bytes.len()
            )));
        }

        Ok(Self {
            decoding_key: DecodingKey::from_ed_der(&key_bytes),
        })
    }
}

#[async_trait]
impl TokenVerifier for Ed25519Verifier {
    async fn verify(&self, token: &str) -> Result<Claims, AtlasError> {
        if token.len() > MAX_TOKEN_SIZE_BYTES {
            tracing::debug!(target: "atlas.auth.verifier", size = token.len(), "Token exceeds size limit");
            return Err(AtlasError::InvalidSignature);
        }

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = true;
        // Audience and issuer are re-checked by the validator
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!(target: "atlas.auth.verifier", error = %e, "Token verification failed");
            AtlasError::InvalidSignature
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use atlas_test_utils::tokens::{TestKeypair, TestTokenBuilder};

    fn verifier_for(keypair: &TestKeypair) -> Ed25519Verifier {
        Ed25519Verifier::from_base64_key(&keypair.public_key_b64())
            .expect("test keypair should produce a valid key")
    }

    #[tokio::test]
    async fn test_verify_valid_token() {
        let keypair = TestKeypair::new(1);
        let token = keypair.sign(
            &TestTokenBuilder::new()
                .subject("u1")
                .issuer("auth.example")
                .audience("gis.example")
                .role("consumer")
                .instance_id("rs:u1/hashX/serverA/groupB/nameC")
                .build(),
        );

        let claims = verifier_for(&keypair).verify(&token).await.unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.iss, "auth.example");
        assert_eq!(claims.aud, "gis.example");
        assert_eq!(claims.role, "consumer");
        assert_eq!(claims.iid, "rs:u1/hashX/serverA/groupB/nameC");
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_key() {
        let signing_keypair = TestKeypair::new(1);
        let other_keypair = TestKeypair::new(2);
        let token = signing_keypair.sign(&TestTokenBuilder::new().build());

        let result = verifier_for(&other_keypair).verify(&token).await;
        assert!(matches!(result, Err(AtlasError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_token() {
        let keypair = TestKeypair::new(1);
        let token = keypair.sign(&TestTokenBuilder::new().expires_in(-3600).build());

        // Expiry enforced by the verifier's own clock check collapses to the
        // generic verification failure
        let result = verifier_for(&keypair).verify(&token).await;
        assert!(matches!(result, Err(AtlasError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage() {
        let keypair = TestKeypair::new(1);

        for token in ["", "not-a-token", "a.b", "a.b.c.d"] {
            let result = verifier_for(&keypair).verify(token).await;
            assert!(
                matches!(result, Err(AtlasError::InvalidSignature)),
                "expected InvalidSignature for {:?}",
                token
            );
        }
    }

    #[tokio::test]
    async fn test_verify_rejects_oversized_token() {
        let keypair = TestKeypair::new(1);
        let token = "a".repeat(MAX_TOKEN_SIZE_BYTES + 1);

        let result = verifier_for(&keypair).verify(&token).await;
        assert!(matches!(result, Err(AtlasError::InvalidSignature)));
    }

    #[tokio::test]
    async fn test_verify_rejects_missing_claim_fields() {
        let keypair = TestKeypair::new(1);
        // No role or iid fields at all
        let token = keypair.sign(&serde_json::json!({
            "sub": "u1",
            "iss": "auth.example",
            "aud": "gis.example",
            "exp": chrono::Utc::now().timestamp() + 3600,
        }));

        let result = verifier_for(&keypair).verify(&token).await;
        assert!(matches!(result, Err(AtlasError::InvalidSignature)));
    }

    #[test]
    fn test_from_base64_key_rejects_bad_encoding() {
        let result = Ed25519Verifier::from_base64_key("!!!not-base64!!!");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVerificationKey(_))
        ));
    }

    #[test]
    fn test_from_base64_key_rejects_wrong_length() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 16]);
        let result = Ed25519Verifier::from_base64_key(&short);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVerificationKey(_))
        ));
    }
}
