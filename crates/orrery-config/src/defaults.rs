use crate::framing::Framing;
use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Default TCP port; matches the port simulation clients already dial.
pub const DEFAULT_TCP_PORT: u16 = 18181;

/// Default bind host. Snapshots are only served on loopback unless configured.
pub const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Largest request message accepted by default (1 MiB).
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default connection framing.
#[must_use]
pub fn default_framing() -> Framing {
    Framing::Websocket
}

/// Default request size limit.
#[must_use]
pub fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

/// Computes the default listening endpoint.
#[must_use]
pub fn default_listen_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_TCP_HOST, DEFAULT_TCP_PORT)
}
