//! Deterministic keypairs and signed test tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use ring::signature::{Ed25519KeyPair, KeyPair};
use serde_json::json;

/// Deterministic Ed25519 keypair for signing test tokens.
pub struct TestKeypair {
    public_key_bytes: Vec<u8>,
    private_key_pkcs8: Vec<u8>,
}

impl TestKeypair {
    /// Derive a keypair from a one-byte seed. The same seed always yields
    /// the same keys.
    pub fn new(seed: u8) -> Self {
        let mut seed_bytes = [0u8; 32];
        seed_bytes[0] = seed;
        for (i, byte) in seed_bytes.iter_mut().enumerate().skip(1) {
            *byte = seed.wrapping_mul(i as u8).wrapping_add(i as u8);
        }

        let key_pair = Ed25519KeyPair::from_seed_unchecked(&seed_bytes)
            .expect("Failed to create test keypair");

        Self {
            public_key_bytes: key_pair.public_key().as_ref().to_vec(),
            private_key_pkcs8: build_pkcs8_from_seed(&seed_bytes),
        }
    }

    /// The raw public key, base64url without padding, the format the
    /// server accepts as `ATLAS_TOKEN_PUBLIC_KEY`.
    pub fn public_key_b64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.public_key_bytes)
    }

    /// Sign a claims payload into an EdDSA JWT.
    pub fn sign(&self, claims: &serde_json::Value) -> String {
        let encoding_key = EncodingKey::from_ed_der(&self.private_key_pkcs8);
        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());

        jsonwebtoken::encode(&header, claims, &encoding_key).expect("Failed to sign token")
    }
}

/// Build a PKCS#8 v1 document from an Ed25519 seed.
fn build_pkcs8_from_seed(seed: &[u8; 32]) -> Vec<u8> {
    let mut pkcs8 = Vec::new();

    // Outer SEQUENCE tag
    pkcs8.push(0x30);
    pkcs8.push(0x2e); // Length: 46 bytes

    // Version: INTEGER 0
    pkcs8.extend_from_slice(&[0x02, 0x01, 0x00]);

    // Algorithm Identifier: SEQUENCE
    pkcs8.push(0x30);
    pkcs8.push(0x05); // Length: 5 bytes
                      // OID for Ed25519: 1.3.101.112
    pkcs8.extend_from_slice(&[0x06, 0x03, 0x2b, 0x65, 0x70]);

    // Private Key: OCTET STRING
    pkcs8.push(0x04);
    pkcs8.push(0x22); // Length: 34 bytes
                      // Inner OCTET STRING with seed
    pkcs8.push(0x04);
    pkcs8.push(0x20); // Length: 32 bytes
    pkcs8.extend_from_slice(seed);

    pkcs8
}

/// Builder for test token claims.
///
/// # Example
/// ```rust,ignore
/// let claims = TestTokenBuilder::new()
///     .subject("u1")
///     .issuer("auth.example")
///     .audience("gis.example")
///     .role("consumer")
///     .instance_id("rs:u1/hashX/serverA/groupB/nameC")
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    iss: String,
    aud: String,
    exp: i64,
    role: String,
    iid: String,
}

impl TestTokenBuilder {
    /// Create a builder with defaults that pass validation against the
    /// usual test configuration (audience "gis.example", issuer
    /// "auth.example").
    pub fn new() -> Self {
        Self {
            sub: "u1".to_string(),
            iss: "auth.example".to_string(),
            aud: "gis.example".to_string(),
            exp: (Utc::now() + Duration::seconds(3600)).timestamp(),
            role: "consumer".to_string(),
            iid: "rs:u1/hashX/serverA/groupB/nameC".to_string(),
        }
    }

    /// Set the subject (token owner).
    pub fn subject(mut self, sub: &str) -> Self {
        self.sub = sub.to_string();
        self
    }

    /// Set the issuer.
    pub fn issuer(mut self, iss: &str) -> Self {
        self.iss = iss.to_string();
        self
    }

    /// Set the audience.
    pub fn audience(mut self, aud: &str) -> Self {
        self.aud = aud.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired).
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Set the role claim.
    pub fn role(mut self, role: &str) -> Self {
        self.role = role.to_string();
        self
    }

    /// Set the instance identifier claim.
    pub fn instance_id(mut self, iid: &str) -> Self {
        self.iid = iid.to_string();
        self
    }

    /// Mark the token self-issued (subject equals issuer).
    pub fn self_issued(mut self) -> Self {
        self.sub = self.iss.clone();
        self
    }

    /// Build the claims as a JSON value.
    pub fn build(self) -> serde_json::Value {
        json!({
            "sub": self.sub,
            "iss": self.iss,
            "aud": self.aud,
            "exp": self.exp,
            "role": self.role,
            "iid": self.iid,
        })
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
