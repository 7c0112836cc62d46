use crate::endpoint::TcpEndpoint;
use crate::logging::LogFormat;

/// Port the relay daemon listens on for controller notifications.
pub const DEFAULT_LISTEN_PORT: u16 = 6232;

/// Address of the controller's command port.
pub const DEFAULT_CONTROLLER_HOST: &str = "192.168.2.100";

/// Port of the controller's command port.
pub const DEFAULT_CONTROLLER_PORT: u16 = 5267;

/// Largest inbound message accepted on one connection.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024;

/// Quiet period after which a partial message is taken as complete.
pub const DEFAULT_READ_IDLE_MS: u64 = 100;

/// Upper bound for establishing an outbound connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Endpoint the daemon binds by default: every interface.
#[must_use]
pub fn default_listen_endpoint() -> TcpEndpoint {
    TcpEndpoint::new("0.0.0.0", DEFAULT_LISTEN_PORT)
}

/// Endpoint commands are sent to by default.
#[must_use]
pub fn default_controller_endpoint() -> TcpEndpoint {
    TcpEndpoint::new(DEFAULT_CONTROLLER_HOST, DEFAULT_CONTROLLER_PORT)
}

/// Default inbound message size limit.
#[must_use]
pub const fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}

/// Default idle gap ending a read.
#[must_use]
pub const fn default_read_idle_ms() -> u64 {
    DEFAULT_READ_IDLE_MS
}

/// Default connect timeout.
#[must_use]
pub const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
