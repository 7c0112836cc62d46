//! Shared configuration for the relay daemon and the operator CLI.
//!
//! [`Config`] is layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path` or `RELAY_CONFIG_PATH`), then
//! `RELAY_*` environment variables, then command-line flags.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_CONTROLLER_HOST, DEFAULT_CONTROLLER_PORT,
    DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_READ_IDLE_MS,
    default_connect_timeout_ms, default_controller_endpoint, default_listen_endpoint,
    default_log_filter, default_log_filter_string, default_log_format, default_max_request_bytes,
    default_read_idle_ms,
};
pub use endpoint::{EndpointParseError, TcpEndpoint};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration for the relay binaries.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "RELAY")]
pub struct Config {
    /// Endpoint the daemon binds for controller notifications.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen_endpoint: TcpEndpoint,
    /// Endpoint outbound commands are delivered to.
    #[serde(default = "default_controller_endpoint")]
    #[ortho_config(default = default_controller_endpoint())]
    pub controller_endpoint: TcpEndpoint,
    /// Largest inbound message read from one connection.
    #[serde(default = "default_max_request_bytes")]
    #[ortho_config(default = DEFAULT_MAX_REQUEST_BYTES)]
    pub max_request_bytes: usize,
    /// Milliseconds of silence after which a partial message is complete.
    #[serde(default = "default_read_idle_ms")]
    #[ortho_config(default = DEFAULT_READ_IDLE_MS)]
    pub read_idle_ms: u64,
    /// Milliseconds allowed for establishing an outbound connection.
    #[serde(default = "default_connect_timeout_ms")]
    #[ortho_config(default = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log lines.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_endpoint: default_listen_endpoint(),
            controller_endpoint: default_controller_endpoint(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            read_idle_ms: DEFAULT_READ_IDLE_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the daemon binds.
    #[must_use]
    pub const fn listen_endpoint(&self) -> &TcpEndpoint {
        &self.listen_endpoint
    }

    /// Endpoint outbound commands are delivered to.
    #[must_use]
    pub const fn controller_endpoint(&self) -> &TcpEndpoint {
        &self.controller_endpoint
    }

    /// Inbound message size limit in bytes.
    #[must_use]
    pub const fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Idle gap that ends a read.
    #[must_use]
    pub const fn read_idle(&self) -> Duration {
        Duration::from_millis(self.read_idle_ms)
    }

    /// Connect timeout for outbound sends.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for log lines.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
