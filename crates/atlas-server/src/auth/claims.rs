//! Verified token claims.
//!
//! Contains the claim set extracted from validated bearer tokens. The `sub`
//! field is redacted in Debug output to prevent exposure in logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim set carried by a validated bearer token.
///
/// Produced once per request by the token validator and discarded when the
/// request completes. The `sub` field contains caller identifiers which
/// should not be exposed in logs; a custom Debug implementation redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (id of the token owner) - redacted in Debug output.
    pub sub: String,

    /// Issuer of the token.
    pub iss: String,

    /// Audience the token was minted for.
    pub aud: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Role name granted to this token (e.g. "consumer").
    pub role: String,

    /// Instance identifier, colon-delimited; the second segment is the
    /// caller's resource-scope id.
    pub iid: String,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("role", &self.role)
            .field("iid", &self.iid)
            .finish()
    }
}

impl Claims {
    /// Whether the token was issued by its own subject (service token).
    ///
    /// Self-issued tokens bypass per-resource classification entirely.
    pub fn is_self_issued(&self) -> bool {
        self.sub == self.iss
    }

    /// The caller's resource-scope id: the second colon-delimited segment
    /// of `iid`. `None` when the instance identifier has no such segment.
    pub fn instance_scope_id(&self) -> Option<&str> {
        self.iid.split(':').nth(1).filter(|s| !s.is_empty())
    }
}

/// Roles the authorization engine knows how to dispatch on.
///
/// A closed set: adding a role means adding a variant here plus a strategy
/// in `authz::strategy`, never branching on role names elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Data consumer; the only role granted data-plane access today.
    Consumer,
}

impl Role {
    /// Resolve a claim role name to a known role.
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "consumer" => Some(Role::Consumer),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            sub: "u1".to_string(),
            iss: "auth.example".to_string(),
            aud: "gis.example".to_string(),
            exp: 1234567890,
            role: "consumer".to_string(),
            iid: "rs:u1/hashX/serverA/groupB/nameC".to_string(),
        }
    }

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = Claims {
            sub: "secret-user-id".to_string(),
            ..sample_claims()
        };

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("secret-user-id"),
            "Debug output should not contain actual sub value"
        );
        assert!(
            debug_str.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
    }

    #[test]
    fn test_is_self_issued() {
        let mut claims = sample_claims();
        assert!(!claims.is_self_issued());

        claims.sub = claims.iss.clone();
        assert!(claims.is_self_issued());
    }

    #[test]
    fn test_self_issued_is_case_sensitive() {
        let mut claims = sample_claims();
        claims.sub = "AUTH.EXAMPLE".to_string();
        assert!(!claims.is_self_issued());
    }

    #[test]
    fn test_instance_scope_id() {
        let claims = sample_claims();
        assert_eq!(
            claims.instance_scope_id(),
            Some("u1/hashX/serverA/groupB/nameC")
        );
    }

    #[test]
    fn test_instance_scope_id_missing_segment() {
        let mut claims = sample_claims();
        claims.iid = "no-colon-here".to_string();
        assert_eq!(claims.instance_scope_id(), None);

        claims.iid = "trailing:".to_string();
        assert_eq!(claims.instance_scope_id(), None);
    }

    #[test]
    fn test_instance_scope_id_ignores_extra_segments() {
        let mut claims = sample_claims();
        claims.iid = "rs:scope-id:extra".to_string();
        assert_eq!(claims.instance_scope_id(), Some("scope-id"));
    }

    #[test]
    fn test_role_from_name() {
        assert_eq!(Role::from_name("consumer"), Some(Role::Consumer));
        assert_eq!(Role::from_name("provider"), None);
        assert_eq!(Role::from_name("Consumer"), None);
        assert_eq!(Role::from_name(""), None);
    }

    #[test]
    fn test_claims_serialization_round_trip() {
        let claims = sample_claims();

        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.sub, claims.sub);
        assert_eq!(deserialized.iss, claims.iss);
        assert_eq!(deserialized.aud, claims.aud);
        assert_eq!(deserialized.exp, claims.exp);
        assert_eq!(deserialized.role, claims.role);
        assert_eq!(deserialized.iid, claims.iid);
    }
}
