//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the versioning server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Reject invalid settings at load time instead of falling back to defaults.
    pub strict: bool,

    /// How the version token is read from requests.
    pub negotiation: NegotiationOptions,

    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Raw negotiation options, as written by the user.
///
/// Every field is optional. Missing or unusable values are replaced by the
/// defaults in [`crate::config::negotiation`] when compiled.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NegotiationOptions {
    /// Name of the header carrying the version (case-insensitive).
    pub header: Option<String>,

    /// Regular expression whose first capture group yields the version token.
    pub grab: Option<String>,

    /// Status code returned when a route exists but no version satisfies the request.
    pub error: Option<u16>,
}

impl NegotiationOptions {
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn grab(mut self, grab: impl Into<String>) -> Self {
        self.grab = Some(grab.into());
        self
    }

    pub fn error(mut self, error: u16) -> Self {
        self.error = Some(error);
        self
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
