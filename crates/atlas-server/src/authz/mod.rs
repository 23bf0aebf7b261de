//! Authorization engine.
//!
//! Decides allow/deny for a validated claim set against a classified
//! resource and a requested (method, endpoint) pair. Role handling is a
//! strategy dispatch: each role variant carries its own ACL matrix, and the
//! engine never branches on role names.

pub mod strategy;

use crate::auth::claims::{Claims, Role};
use crate::errors::AtlasError;
use crate::resolver::AccessPolicy;
use chrono::{Local, TimeZone};
use serde::Serialize;
use std::collections::HashSet;
use strategy::strategy_for;

/// HTTP methods the authorization matrices are declared over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// Resolve an HTTP method name (uppercase, as on the wire).
    pub fn from_name(name: &str) -> Option<Method> {
        match name {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            "PATCH" => Some(Method::Patch),
            _ => None,
        }
    }
}

/// API endpoints subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiEndpoint {
    /// Entity query by `id` query parameter.
    EntitiesQuery,
    /// Entity fetch by full resource path.
    EntitiesPath,
}

impl ApiEndpoint {
    /// Canonical identifier for this endpoint, as used in the
    /// open-endpoint allow-list.
    pub fn path(self) -> &'static str {
        match self {
            ApiEndpoint::EntitiesQuery => "/spatial/v1/entities",
            ApiEndpoint::EntitiesPath => "/spatial/v1/entities/{id}",
        }
    }

    /// Classify a request path into a known endpoint.
    pub fn from_path(path: &str) -> Option<ApiEndpoint> {
        if path == "/spatial/v1/entities" {
            Some(ApiEndpoint::EntitiesQuery)
        } else if path.starts_with("/spatial/v1/entities/") {
            Some(ApiEndpoint::EntitiesPath)
        } else {
            None
        }
    }
}

/// The (method, endpoint) pair an authorization decision is requested for.
///
/// Immutable; constructed per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub method: Method,
    pub endpoint: ApiEndpoint,
}

impl AuthorizationRequest {
    pub fn new(method: Method, endpoint: ApiEndpoint) -> Self {
        Self { method, endpoint }
    }

    /// Build a request from wire-level strings. Unknown methods or
    /// endpoints have no entry in any matrix and are denied outright.
    pub fn parse(method: &str, endpoint: &str) -> Result<Self, AtlasError> {
        let method = Method::from_name(method).ok_or(AtlasError::AccessDenied)?;
        let endpoint = ApiEndpoint::from_path(endpoint).ok_or(AtlasError::AccessDenied)?;
        Ok(Self { method, endpoint })
    }
}

/// The record released to the caller on successful authorization.
///
/// Carries only what downstream request handling needs; never raw claims
/// or policy internals. `expiry` is absent on the open-access fast path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedContext {
    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "instanceId")]
    pub instance_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

/// Role-keyed allow/deny decisions over (method, endpoint) pairs.
pub struct AuthorizationEngine {
    open_endpoints: HashSet<String>,
}

impl AuthorizationEngine {
    pub fn new<I>(open_endpoints: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            open_endpoints: open_endpoints.into_iter().collect(),
        }
    }

    /// Decide whether the claims permit the requested operation.
    ///
    /// Open resources on allow-listed endpoints are granted without a
    /// strategy consultation and without an expiry in the returned context.
    /// Everything else goes through the role's ACL matrix.
    ///
    /// # Errors
    ///
    /// - `IdentityMismatch` if the instance identifier carries no scope
    ///   segment, since the context cannot be constructed without it
    /// - `RoleNotPermitted` for roles outside the known set, regardless of
    ///   policy or endpoint
    /// - `AccessDenied` when the role's matrix does not permit the pair
    pub fn authorize(
        &self,
        claims: &Claims,
        policy: AccessPolicy,
        request: &AuthorizationRequest,
    ) -> Result<AuthorizedContext, AtlasError> {
        let instance_id = claims
            .instance_scope_id()
            .ok_or(AtlasError::IdentityMismatch)?
            .to_string();

        let role = Role::from_name(&claims.role).ok_or_else(|| {
            tracing::debug!(target: "atlas.authz", role = %claims.role, "Role not permitted");
            AtlasError::RoleNotPermitted(claims.role.clone())
        })?;

        if policy.is_open() && self.open_endpoints.contains(request.endpoint.path()) {
            tracing::debug!(target: "atlas.authz", "Open resource on allow-listed endpoint, access allowed");
            return Ok(AuthorizedContext {
                user_id: claims.sub.clone(),
                instance_id,
                expiry: None,
            });
        }

        let strategy = strategy_for(role);
        if strategy.is_authorized(request, claims) {
            tracing::debug!(target: "atlas.authz", ?role, "Access allowed");
            Ok(AuthorizedContext {
                user_id: claims.sub.clone(),
                instance_id,
                expiry: Some(human_expiry(claims.exp)),
            })
        } else {
            tracing::debug!(target: "atlas.authz", ?role, ?request, "Access denied by strategy");
            Err(AtlasError::AccessDenied)
        }
    }
}

/// Render an epoch-seconds expiry as a local-zone timestamp.
fn human_expiry(exp: i64) -> String {
    Local
        .timestamp_opt(exp, 0)
        .earliest()
        .map(|dt| dt.naive_local().format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| exp.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn consumer_claims() -> Claims {
        Claims {
            sub: "u1".to_string(),
            iss: "auth.example".to_string(),
            aud: "gis.example".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
            role: "consumer".to_string(),
            iid: "rs:u1/hashX/serverA/groupB/nameC".to_string(),
        }
    }

    fn engine() -> AuthorizationEngine {
        AuthorizationEngine::new(["/spatial/v1/entities".to_string()])
    }

    fn entities_get() -> AuthorizationRequest {
        AuthorizationRequest::new(Method::Get, ApiEndpoint::EntitiesQuery)
    }

    #[test]
    fn test_method_from_name() {
        assert_eq!(Method::from_name("GET"), Some(Method::Get));
        assert_eq!(Method::from_name("DELETE"), Some(Method::Delete));
        assert_eq!(Method::from_name("get"), None);
        assert_eq!(Method::from_name("FETCH"), None);
    }

    #[test]
    fn test_endpoint_from_path() {
        assert_eq!(
            ApiEndpoint::from_path("/spatial/v1/entities"),
            Some(ApiEndpoint::EntitiesQuery)
        );
        assert_eq!(
            ApiEndpoint::from_path("/spatial/v1/entities/dom/hash/srv/grp/name"),
            Some(ApiEndpoint::EntitiesPath)
        );
        assert_eq!(ApiEndpoint::from_path("/admin/spatial"), None);
    }

    #[test]
    fn test_request_parse_rejects_unknown() {
        assert!(matches!(
            AuthorizationRequest::parse("FETCH", "/spatial/v1/entities"),
            Err(AtlasError::AccessDenied)
        ));
        assert!(matches!(
            AuthorizationRequest::parse("GET", "/nowhere"),
            Err(AtlasError::AccessDenied)
        ));
    }

    #[test]
    fn test_secure_get_entities_allowed_with_expiry() {
        let ctx = engine()
            .authorize(&consumer_claims(), AccessPolicy::Secure, &entities_get())
            .unwrap();

        assert_eq!(ctx.user_id, "u1");
        assert_eq!(ctx.instance_id, "u1/hashX/serverA/groupB/nameC");
        let expiry = ctx.expiry.expect("secure path carries an expiry");
        // Local-zone ISO timestamp, e.g. 2026-08-05T12:34:56
        assert_eq!(expiry.len(), 19);
        assert_eq!(expiry.get(4..5), Some("-"));
        assert_eq!(expiry.get(10..11), Some("T"));
    }

    #[test]
    fn test_open_allow_listed_endpoint_skips_strategy_and_expiry() {
        let mut claims = consumer_claims();
        // Instance scope deliberately unrelated to any resource
        claims.iid = "rs:somewhere/else".to_string();

        let ctx = engine()
            .authorize(&claims, AccessPolicy::Open, &entities_get())
            .unwrap();

        assert_eq!(ctx.user_id, "u1");
        assert_eq!(ctx.instance_id, "somewhere/else");
        assert_eq!(ctx.expiry, None);
    }

    #[test]
    fn test_open_resource_on_unlisted_endpoint_uses_strategy() {
        let request = AuthorizationRequest::new(Method::Get, ApiEndpoint::EntitiesPath);

        // EntitiesPath is not in the allow-list, but the consumer matrix
        // permits the pair
        let ctx = engine()
            .authorize(&consumer_claims(), AccessPolicy::Open, &request)
            .unwrap();
        assert!(ctx.expiry.is_some());
    }

    #[test]
    fn test_unpermitted_pair_is_denied() {
        let request = AuthorizationRequest::new(Method::Post, ApiEndpoint::EntitiesQuery);

        let result = engine().authorize(&consumer_claims(), AccessPolicy::Secure, &request);
        assert!(matches!(result, Err(AtlasError::AccessDenied)));
    }

    #[test]
    fn test_unknown_role_always_rejected() {
        let mut claims = consumer_claims();
        claims.role = "provider".to_string();

        // Even an open resource on an allow-listed endpoint is refused
        let result = engine().authorize(&claims, AccessPolicy::Open, &entities_get());
        assert!(matches!(result, Err(AtlasError::RoleNotPermitted(r)) if r == "provider"));

        let result = engine().authorize(&claims, AccessPolicy::Secure, &entities_get());
        assert!(matches!(result, Err(AtlasError::RoleNotPermitted(_))));
    }

    #[test]
    fn test_malformed_instance_id_cannot_build_context() {
        let mut claims = consumer_claims();
        claims.iid = "no-scope-segment".to_string();

        let result = engine().authorize(&claims, AccessPolicy::Open, &entities_get());
        assert!(matches!(result, Err(AtlasError::IdentityMismatch)));
    }

    #[test]
    fn test_context_serialization_field_names() {
        let ctx = AuthorizedContext {
            user_id: "u1".to_string(),
            instance_id: "scope".to_string(),
            expiry: None,
        };

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["instanceId"], "scope");
        assert!(json.get("expiry").is_none());
    }

    #[test]
    fn test_human_expiry_is_iso_like() {
        let rendered = human_expiry(1754380800);
        assert_eq!(rendered.len(), 19);
        assert!(rendered.contains('T'));
    }
}
