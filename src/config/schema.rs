//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::logger::DetailLevel;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReqlogConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Exchange logger settings.
    pub logging: LoggingConfig,

    /// Level-control surface.
    pub control: ControlConfig,

    /// Upstream to forward to. Without one the server echoes requests.
    pub upstream: UpstreamConfig,

    /// Process logging.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Exchange logger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Initial detail level name. Kept as text so validation can report it.
    pub level: String,

    /// "stdout", "stderr", or a file path to append to.
    pub output: String,

    /// Header names masked below `debug`.
    pub redacted_headers: Vec<String>,
}

impl LoggingConfig {
    /// The configured level; unknown names fall back to `none`.
    pub fn detail_level(&self) -> DetailLevel {
        DetailLevel::from_name(&self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DetailLevel::Minimal.as_str().to_string(),
            output: "stdout".to_string(),
            redacted_headers: vec!["Authorization".to_string(), "Cookie".to_string()],
        }
    }
}

/// Level-control surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Mount the control routes.
    pub enabled: bool,

    /// Base path the routes are nested under.
    pub base_path: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_path: "/logging".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL, e.g. "http://127.0.0.1:3000".
    pub url: Option<String>,
}

/// Process logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// tracing `EnvFilter` directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: crate::observability::logging::DEFAULT_FILTER.to_string(),
        }
    }
}
