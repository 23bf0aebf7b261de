//! Authentication gate for protected routes.
//!
//! The routing layer's half of the introspection contract: extract the
//! bearer token, resource identifier, method and endpoint from the request,
//! run the introspection pipeline, and hand the authorized context to the
//! handler. Failures map to HTTP responses through `AtlasError`.

use crate::authz::ApiEndpoint;
use crate::errors::AtlasError;
use crate::routes::AppState;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters accepted by the entities query endpoint.
#[derive(Debug, Deserialize)]
pub struct EntityQueryParams {
    /// Full 5-segment resource identifier.
    pub id: String,
}

/// Authorized context extractor for protected handlers.
///
/// Runs the full introspection pipeline; a handler taking this argument
/// only executes for requests the engine allowed.
pub struct AuthContext(pub crate::authz::AuthorizedContext);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = AtlasError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?.to_string();
        let method = parts.method.as_str().to_string();
        let path = parts.uri.path().to_string();

        let resource_id = match ApiEndpoint::from_path(&path) {
            Some(ApiEndpoint::EntitiesQuery) => {
                let Query(params) = Query::<EntityQueryParams>::from_request_parts(parts, state)
                    .await
                    .map_err(|_| {
                        AtlasError::BadRequest(
                            "Missing required query parameter: id".to_string(),
                        )
                    })?;
                params.id
            }
            Some(ApiEndpoint::EntitiesPath) => {
                let Path(segments): Path<(String, String, String, String, String)> =
                    Path::from_request_parts(parts, state).await.map_err(|_| {
                        AtlasError::BadRequest("Malformed entity path".to_string())
                    })?;
                format!(
                    "{}/{}/{}/{}/{}",
                    segments.0, segments.1, segments.2, segments.3, segments.4
                )
            }
            None => {
                // Routing should never attach this extractor elsewhere
                return Err(AtlasError::Internal);
            }
        };

        let context = state
            .introspection
            .introspect(&resource_id, &token, &method, &path)
            .await?;

        Ok(AuthContext(context))
    }
}

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AtlasError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AtlasError::MissingToken)?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AtlasError::BadRequest("Invalid Authorization header format".to_string())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AtlasError::MissingToken)
        ));
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_token(&headers),
            Err(AtlasError::BadRequest(_))
        ));
    }
}
