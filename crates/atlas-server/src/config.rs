//! Atlas server configuration.
//!
//! Configuration is loaded from environment variables. Key material is
//! redacted in Debug output.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default catalogue service port.
pub const DEFAULT_CATALOGUE_PORT: u16 = 443;

/// Default maximum entry count per policy cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1000;

/// Default access-based expiry window in minutes.
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 30;

/// Default open-endpoint allow-list (comma-separated).
pub const DEFAULT_OPEN_ENDPOINTS: &str = "/spatial/v1/entities";

/// Atlas server configuration.
///
/// Loaded from environment variables with sensible defaults. The token
/// verification key is redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Expected `aud` claim value for incoming tokens.
    pub audience: String,

    /// Expected `iss` claim value for incoming tokens.
    pub issuer: String,

    /// Ed25519 verification key, base64url (no padding).
    pub token_public_key: String,

    /// Catalogue service host.
    pub catalogue_host: String,

    /// Catalogue service port (default: 443).
    pub catalogue_port: u16,

    /// Maximum entries per policy cache (default: 1000).
    pub cache_max_entries: u64,

    /// Access-based cache expiry window in minutes (default: 30).
    pub cache_ttl_minutes: u64,

    /// API endpoints exempt from role/identity checks when the resource
    /// is classified open.
    pub open_endpoints: Vec<String>,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,
}

/// Custom Debug implementation that redacts key material.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("token_public_key", &"[REDACTED]")
            .field("catalogue_host", &self.catalogue_host)
            .field("catalogue_port", &self.catalogue_port)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .field("open_endpoints", &self.open_endpoints)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid catalogue port configuration: {0}")]
    InvalidCataloguePort(String),

    #[error("Invalid cache configuration: {0}")]
    InvalidCache(String),

    #[error("Invalid token verification key: {0}")]
    InvalidVerificationKey(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let audience = vars
            .get("ATLAS_AUDIENCE")
            .ok_or_else(|| ConfigError::MissingEnvVar("ATLAS_AUDIENCE".to_string()))?
            .clone();

        let issuer = vars
            .get("ATLAS_ISSUER")
            .ok_or_else(|| ConfigError::MissingEnvVar("ATLAS_ISSUER".to_string()))?
            .clone();

        let token_public_key = vars
            .get("ATLAS_TOKEN_PUBLIC_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("ATLAS_TOKEN_PUBLIC_KEY".to_string()))?
            .clone();

        let catalogue_host = vars
            .get("CATALOGUE_HOST")
            .ok_or_else(|| ConfigError::MissingEnvVar("CATALOGUE_HOST".to_string()))?
            .clone();

        let catalogue_port = if let Some(value_str) = vars.get("CATALOGUE_PORT") {
            value_str.parse::<u16>().map_err(|e| {
                ConfigError::InvalidCataloguePort(format!(
                    "CATALOGUE_PORT must be a valid port number, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_CATALOGUE_PORT
        };

        let cache_max_entries = if let Some(value_str) = vars.get("CACHE_MAX_ENTRIES") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidCache(format!(
                    "CACHE_MAX_ENTRIES must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidCache(
                    "CACHE_MAX_ENTRIES must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_CACHE_MAX_ENTRIES
        };

        let cache_ttl_minutes = if let Some(value_str) = vars.get("CACHE_TTL_MINUTES") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidCache(format!(
                    "CACHE_TTL_MINUTES must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidCache(
                    "CACHE_TTL_MINUTES must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_CACHE_TTL_MINUTES
        };

        let open_endpoints = vars
            .get("ATLAS_OPEN_ENDPOINTS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_OPEN_ENDPOINTS)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Ok(Config {
            audience,
            issuer,
            token_public_key,
            catalogue_host,
            catalogue_port,
            cache_max_entries,
            cache_ttl_minutes,
            open_endpoints,
            bind_address,
        })
    }
}
