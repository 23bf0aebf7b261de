//! Atlas server error types.
//!
//! The introspection engine surfaces every failure as one of the enumerable
//! variants below; each carries a stable machine code so callers can act on
//! the reason without parsing prose. HTTP status mapping lives in the
//! `IntoResponse` impl and belongs to the routing boundary; the engine
//! itself never sees status codes. Upstream details are logged server-side
//! and replaced by generic messages in client responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Atlas server error type.
///
/// The first ten variants are the introspection taxonomy; `MissingToken`,
/// `BadRequest` and `Internal` only occur at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("Token signature verification failed")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Incorrect audience value in token")]
    AudienceMismatch,

    #[error("Incorrect issuer value in token")]
    IssuerMismatch,

    #[error("Malformed resource identifier: {0}")]
    MalformedResourceId(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Catalogue unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Role not permitted: {0}")]
    RoleNotPermitted(String),

    #[error("Incorrect id value in token")]
    IdentityMismatch,

    #[error("No access provided to endpoint")]
    AccessDenied,

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl AtlasError {
    /// Stable machine code for this error, the contract the routing layer
    /// and clients key on.
    pub fn code(&self) -> &'static str {
        match self {
            AtlasError::InvalidSignature => "INVALID_SIGNATURE",
            AtlasError::TokenExpired => "TOKEN_EXPIRED",
            AtlasError::AudienceMismatch => "AUDIENCE_MISMATCH",
            AtlasError::IssuerMismatch => "ISSUER_MISMATCH",
            AtlasError::MalformedResourceId(_) => "MALFORMED_RESOURCE_ID",
            AtlasError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            AtlasError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AtlasError::RoleNotPermitted(_) => "ROLE_NOT_PERMITTED",
            AtlasError::IdentityMismatch => "IDENTITY_MISMATCH",
            AtlasError::AccessDenied => "ACCESS_DENIED",
            AtlasError::MissingToken => "MISSING_TOKEN",
            AtlasError::BadRequest(_) => "BAD_REQUEST",
            AtlasError::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code for this error (also used for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            AtlasError::InvalidSignature
            | AtlasError::TokenExpired
            | AtlasError::AudienceMismatch
            | AtlasError::IssuerMismatch
            | AtlasError::RoleNotPermitted(_)
            | AtlasError::IdentityMismatch
            | AtlasError::AccessDenied
            | AtlasError::MissingToken => 401,
            AtlasError::MalformedResourceId(_) | AtlasError::BadRequest(_) => 400,
            AtlasError::ResourceNotFound(_) => 404,
            AtlasError::UpstreamUnavailable(_) => 503,
            AtlasError::Internal => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AtlasError {
    fn into_response(self) -> Response {
        let message = match &self {
            AtlasError::InvalidSignature | AtlasError::TokenExpired => {
                "The access token is invalid or expired".to_string()
            }
            AtlasError::AudienceMismatch => "Incorrect audience value in token".to_string(),
            AtlasError::IssuerMismatch => "Incorrect issuer value in token".to_string(),
            AtlasError::MalformedResourceId(_) => "Malformed resource identifier".to_string(),
            AtlasError::ResourceNotFound(id) => format!("Not found: {}", id),
            AtlasError::UpstreamUnavailable(reason) => {
                // Log actual reason server-side, return generic message to client
                tracing::warn!(target: "atlas.availability", reason = %reason, "Catalogue unavailable");
                "Catalogue service temporarily unavailable".to_string()
            }
            AtlasError::RoleNotPermitted(_) => "Only consumer access is allowed".to_string(),
            AtlasError::IdentityMismatch => "Incorrect id value in token".to_string(),
            AtlasError::AccessDenied => {
                "No access provided to the requested endpoint".to_string()
            }
            AtlasError::MissingToken => "Missing Authorization header".to_string(),
            AtlasError::BadRequest(reason) => reason.clone(),
            AtlasError::Internal => "An internal error occurred".to_string(),
        };

        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"atlas-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}
