//! Token validation.
//!
//! Wraps the signature verification capability and re-checks the claims the
//! service itself is opinionated about: audience, issuer and expiry. The
//! check order (signature, audience, issuer, expiry) is an observable
//! contract of the introspection pipeline.

use crate::auth::claims::Claims;
use crate::auth::verifier::TokenVerifier;
use crate::errors::AtlasError;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// Validates bearer tokens against the configured audience and issuer.
pub struct TokenValidator {
    verifier: Arc<dyn TokenVerifier>,
    audience: String,
    issuer: String,
}

impl TokenValidator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, audience: String, issuer: String) -> Self {
        Self {
            verifier,
            audience,
            issuer,
        }
    }

    /// Verify a token and re-check its claims.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if the verification capability rejects the token
    ///   for any reason (malformed, bad signature, expired per its clock)
    /// - `AudienceMismatch` if `aud` differs from the configured audience
    ///   (case-insensitive)
    /// - `IssuerMismatch` if `iss` differs from the configured issuer
    ///   (case-insensitive)
    /// - `TokenExpired` if `exp` is in the past; with the default verifier
    ///   this is a backstop that never fires, since the library already
    ///   enforces expiry before the claims reach this point
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Claims, AtlasError> {
        let claims = self.verifier.verify(token).await?;

        if !self.audience.eq_ignore_ascii_case(&claims.aud) {
            tracing::debug!(target: "atlas.auth.validator", "Incorrect audience value in token");
            return Err(AtlasError::AudienceMismatch);
        }

        if !self.issuer.eq_ignore_ascii_case(&claims.iss) {
            tracing::debug!(target: "atlas.auth.validator", "Incorrect issuer value in token");
            return Err(AtlasError::IssuerMismatch);
        }

        if claims.exp <= Utc::now().timestamp() {
            tracing::debug!(target: "atlas.auth.validator", "Token expired");
            return Err(AtlasError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Verifier stub that returns a fixed claim set without any signature
    /// work, so claim re-checks can be exercised in isolation.
    struct StaticVerifier {
        claims: Claims,
    }

    #[async_trait]
    impl TokenVerifier for StaticVerifier {
        async fn verify(&self, _token: &str) -> Result<Claims, AtlasError> {
            Ok(self.claims.clone())
        }
    }

    /// Verifier stub that always rejects.
    struct RejectingVerifier;

    #[async_trait]
    impl TokenVerifier for RejectingVerifier {
        async fn verify(&self, _token: &str) -> Result<Claims, AtlasError> {
            Err(AtlasError::InvalidSignature)
        }
    }

    fn claims(aud: &str, iss: &str, exp: i64) -> Claims {
        Claims {
            sub: "u1".to_string(),
            iss: iss.to_string(),
            aud: aud.to_string(),
            exp,
            role: "consumer".to_string(),
            iid: "rs:u1/hashX/serverA/groupB/nameC".to_string(),
        }
    }

    fn validator_with(claims: Claims) -> TokenValidator {
        TokenValidator::new(
            Arc::new(StaticVerifier { claims }),
            "gis.example".to_string(),
            "auth.example".to_string(),
        )
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn test_validate_accepts_matching_claims() {
        let validator = validator_with(claims("gis.example", "auth.example", future_exp()));

        let result = validator.validate("token").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_audience_comparison_is_case_insensitive() {
        let validator = validator_with(claims("GIS.Example", "auth.example", future_exp()));

        let result = validator.validate("token").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_audience_mismatch() {
        let validator = validator_with(claims("other.example", "auth.example", future_exp()));

        let result = validator.validate("token").await;
        assert!(matches!(result, Err(AtlasError::AudienceMismatch)));
    }

    #[tokio::test]
    async fn test_audience_mismatch_independent_of_issuer_validity() {
        // Audience is checked first; a bad issuer never masks it
        let validator = validator_with(claims("other.example", "bogus.example", future_exp()));

        let result = validator.validate("token").await;
        assert!(matches!(result, Err(AtlasError::AudienceMismatch)));
    }

    #[tokio::test]
    async fn test_issuer_mismatch() {
        let validator = validator_with(claims("gis.example", "rogue.example", future_exp()));

        let result = validator.validate("token").await;
        assert!(matches!(result, Err(AtlasError::IssuerMismatch)));
    }

    #[tokio::test]
    async fn test_issuer_comparison_is_case_insensitive() {
        let validator = validator_with(claims("gis.example", "AUTH.EXAMPLE", future_exp()));

        let result = validator.validate("token").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_expiry_backstop_fires_for_lenient_verifier() {
        // StaticVerifier performs no expiry check of its own, so the
        // validator's independent re-check is what rejects this token
        let validator = validator_with(claims(
            "gis.example",
            "auth.example",
            Utc::now().timestamp() - 10,
        ));

        let result = validator.validate("token").await;
        assert!(matches!(result, Err(AtlasError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_verifier_failure_propagates() {
        let validator = TokenValidator::new(
            Arc::new(RejectingVerifier),
            "gis.example".to_string(),
            "auth.example".to_string(),
        );

        let result = validator.validate("token").await;
        assert!(matches!(result, Err(AtlasError::InvalidSignature)));
    }
}
