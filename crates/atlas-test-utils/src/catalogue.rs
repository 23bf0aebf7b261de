//! Wiremock fixtures for the catalogue service.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Search path the server queries on the catalogue.
pub const SEARCH_PATH: &str = "/catalogue/v1/search";

/// Success marker the catalogue sets in its `type` field.
pub const SUCCESS_TYPE: &str = "urn:atlas:cat:Success";

/// Response body for a group policy lookup.
pub fn group_policy_body(policy: &str) -> Value {
    json!({
        "type": SUCCESS_TYPE,
        "totalHits": 1,
        "results": [{"accessPolicy": policy}],
    })
}

/// Response body for an existence lookup.
pub fn existence_body(total_hits: u64) -> Value {
    json!({
        "type": SUCCESS_TYPE,
        "totalHits": total_hits,
        "results": [],
    })
}

/// Matcher set for a group policy lookup of `group_id`.
pub fn group_policy_request(group_id: &str) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("property", "[id]"))
        .and(query_param("value", format!("[[{}]]", group_id)))
        .and(query_param("filter", "[accessPolicy]"))
}

/// Matcher set for an existence lookup of `resource_id`.
pub fn existence_request(resource_id: &str) -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("property", "[id]"))
        .and(query_param("value", format!("[[{}]]", resource_id)))
        .and(query_param("filter", "[id]"))
}

/// A mock catalogue service with convenience mounts for the common cases.
pub struct MockCatalogue {
    server: MockServer,
}

impl MockCatalogue {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to hand to the catalogue client under test.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// The underlying mock server, for custom mounts and expectations.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Declare a group with the given access policy tag.
    pub async fn mount_group_policy(&self, group_id: &str, policy: &str) {
        group_policy_request(group_id)
            .respond_with(ResponseTemplate::new(200).set_body_json(group_policy_body(policy)))
            .mount(&self.server)
            .await;
    }

    /// Declare a group the catalogue does not know (empty results).
    pub async fn mount_group_unknown(&self, group_id: &str) {
        group_policy_request(group_id)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": SUCCESS_TYPE,
                "totalHits": 0,
                "results": [],
            })))
            .mount(&self.server)
            .await;
    }

    /// Declare that a resource exists.
    pub async fn mount_resource_exists(&self, resource_id: &str) {
        existence_request(resource_id)
            .respond_with(ResponseTemplate::new(200).set_body_json(existence_body(1)))
            .mount(&self.server)
            .await;
    }

    /// Declare a resource the catalogue has no hits for.
    pub async fn mount_resource_missing(&self, resource_id: &str) {
        existence_request(resource_id)
            .respond_with(ResponseTemplate::new(200).set_body_json(existence_body(0)))
            .mount(&self.server)
            .await;
    }

    /// Answer every search with the given HTTP status and no body.
    pub async fn mount_status_for_all(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer every search with a non-success response type.
    pub async fn mount_invalid_type_for_all(&self) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "urn:atlas:cat:InvalidSyntax",
                "totalHits": 0,
                "results": [],
            })))
            .mount(&self.server)
            .await;
    }
}
