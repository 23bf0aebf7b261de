//! The token introspection pipeline.
//!
//! One sequential, fail-fast chain per request: signature verification,
//! audience, issuer, resource openness, caller identity, then the role
//! strategy. The step order is an observable contract; the first failure
//! halts the pipeline and is surfaced unchanged. No failure is fatal to
//! the process: caches and shared state remain valid afterwards.

use crate::auth::claims::Claims;
use crate::auth::validator::TokenValidator;
use crate::authz::{AuthorizationEngine, AuthorizationRequest, AuthorizedContext};
use crate::errors::AtlasError;
use crate::observability::metrics::record_introspection;
use crate::resolver::AccessResolver;
use tracing::instrument;

/// Entry point the routing layer calls for every protected request.
pub struct IntrospectionService {
    validator: TokenValidator,
    resolver: AccessResolver,
    engine: AuthorizationEngine,
}

impl IntrospectionService {
    pub fn new(
        validator: TokenValidator,
        resolver: AccessResolver,
        engine: AuthorizationEngine,
    ) -> Self {
        Self {
            validator,
            resolver,
            engine,
        }
    }

    /// Decide whether `token` permits `method` on `api_endpoint` for
    /// `resource_id`, yielding the minimal authorized context on success.
    ///
    /// The caller is responsible for extracting the four values from the
    /// request and for translating a failure into a user-visible response;
    /// this method knows nothing about HTTP.
    #[instrument(skip(self, token), fields(resource_id = %resource_id, endpoint = %api_endpoint))]
    pub async fn introspect(
        &self,
        resource_id: &str,
        token: &str,
        method: &str,
        api_endpoint: &str,
    ) -> Result<AuthorizedContext, AtlasError> {
        let result = self.run(resource_id, token, method, api_endpoint).await;

        match &result {
            Ok(_) => record_introspection("ok"),
            Err(e) => record_introspection(e.code()),
        }

        result
    }

    async fn run(
        &self,
        resource_id: &str,
        token: &str,
        method: &str,
        api_endpoint: &str,
    ) -> Result<AuthorizedContext, AtlasError> {
        let claims = self.validator.validate(token).await?;

        let policy = self.resolver.classify(resource_id, &claims).await?;

        // Open resources skip the caller identity check entirely
        if !policy.is_open() {
            check_identity(&claims, resource_id)?;
        }

        let request = AuthorizationRequest::parse(method, api_endpoint)?;
        self.engine.authorize(&claims, policy, &request)
    }

    /// The resolver backing this service (exposed for expiry-driven tests).
    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }
}

/// Compare the caller's resource-scope id against the requested resource.
fn check_identity(claims: &Claims, resource_id: &str) -> Result<(), AtlasError> {
    let scope = claims
        .instance_scope_id()
        .ok_or(AtlasError::IdentityMismatch)?;

    if resource_id.eq_ignore_ascii_case(scope) {
        Ok(())
    } else {
        tracing::debug!(target: "atlas.auth.introspect", "Incorrect id value in token");
        Err(AtlasError::IdentityMismatch)
    }
}
