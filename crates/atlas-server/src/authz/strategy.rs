//! Per-role authorization strategies.
//!
//! Each role implements the same capability: a pure decision over the
//! requested (method, endpoint) pair given the claims. The matrices are
//! declarative; changing what a role may do means editing its table, and
//! adding a role means adding a variant and a strategy here.

use crate::auth::claims::{Claims, Role};
use crate::authz::{ApiEndpoint, AuthorizationRequest, Method};

/// Decision capability implemented by every role.
pub trait AuthorizationStrategy: Send + Sync {
    /// Whether the role permits the requested (method, endpoint) pair.
    fn is_authorized(&self, request: &AuthorizationRequest, claims: &Claims) -> bool;
}

/// ACL matrix for the consumer role: read-only access to the entity
/// endpoints.
pub struct ConsumerStrategy;

impl ConsumerStrategy {
    const ALLOWED: &'static [(Method, ApiEndpoint)] = &[
        (Method::Get, ApiEndpoint::EntitiesQuery),
        (Method::Get, ApiEndpoint::EntitiesPath),
    ];
}

impl AuthorizationStrategy for ConsumerStrategy {
    fn is_authorized(&self, request: &AuthorizationRequest, _claims: &Claims) -> bool {
        Self::ALLOWED.contains(&(request.method, request.endpoint))
    }
}

/// Strategy dispatch: one arm per role variant.
pub fn strategy_for(role: Role) -> &'static dyn AuthorizationStrategy {
    match role {
        Role::Consumer => &ConsumerStrategy,
    }
}
