//! Layered configuration for the Orrery snapshot daemon.
//!
//! Values merge from built-in defaults, an optional TOML file
//! (`--config-path` or `ORRERY_CONFIG_PATH`), `ORRERY_*` environment variables
//! and command-line flags, in increasing order of precedence. Loading is
//! delegated to [`ortho_config`]; this crate only declares the shape of the
//! configuration and the defaults it falls back to.

mod defaults;
mod framing;
mod logging;
mod socket;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    default_framing, default_listen_endpoint, default_log_filter, default_log_filter_string,
    default_log_format, default_max_message_bytes,
};
pub use framing::{Framing, FramingParseError};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketOccupancy, SocketParseError, SocketPreparationError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ORRERY")]
pub struct Config {
    /// Endpoint the snapshot server binds.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: SocketEndpoint,
    /// Framing applied to every accepted connection.
    #[serde(default = "default_framing")]
    #[ortho_config(default = default_framing())]
    pub framing: Framing,
    /// `tracing` filter directive.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Optional JSON snapshot served when no simulation publishes live state.
    #[serde(default)]
    pub snapshot_path: Option<Utf8PathBuf>,
    /// Largest request message accepted on a connection.
    #[serde(default = "default_max_message_bytes")]
    #[ortho_config(default = default_max_message_bytes())]
    pub max_message_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            framing: default_framing(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            snapshot_path: None,
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl Config {
    /// Endpoint the server binds.
    #[must_use]
    pub fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// Connection framing.
    #[must_use]
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Snapshot file to serve, if configured.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&camino::Utf8Path> {
        self.snapshot_path.as_deref()
    }

    /// Request size limit in bytes.
    #[must_use]
    pub fn max_message_bytes(&self) -> usize {
        self.max_message_bytes
    }
}
