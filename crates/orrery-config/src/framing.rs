//! Message framing applied to accepted connections.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How discrete request messages are delimited on a connection.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Framing {
    /// RFC 6455 WebSocket; one request per text frame.
    #[default]
    #[strum(to_string = "websocket", serialize = "ws")]
    Websocket,
    /// Newline-delimited JSON; one request per line.
    Jsonl,
}

/// Errors encountered while parsing a [`Framing`] from text.
pub type FramingParseError = strum::ParseError;
