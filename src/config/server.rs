//! Configuration for the HTTP API server.

use serde::Deserialize;

fn default_listen_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_enabled() -> bool {
    true
}

/// Settings for the registration/metrics HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Whether to serve the HTTP API at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Socket address the API listens on.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { enabled: default_enabled(), listen_address: default_listen_address() }
    }
}
