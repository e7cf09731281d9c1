//! Message-oriented view over a connection.

use super::TransportError;

/// One inbound unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A complete text message.
    Text(String),
    /// A message larger than the configured limit.
    Oversized {
        /// Bytes observed before giving up.
        size: usize,
        /// Whether the stream can continue after the oversized message.
        recoverable: bool,
    },
    /// A message whose bytes are not valid UTF-8.
    NotUtf8 {
        /// Offset of the first invalid byte.
        valid_up_to: usize,
    },
}

/// Discrete text messages exchanged over a connection.
pub trait MessageStream {
    /// Reads the next message; `None` once the peer has gone away.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the underlying stream fails.
    fn next_message(&mut self) -> Result<Option<Inbound>, TransportError>;

    /// Sends one reply message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the reply cannot be written.
    fn send(&mut self, reply: String) -> Result<(), TransportError>;
}
