//! WebSocket framing: one request per text frame, one reply per text frame.

use std::io::{Read, Write};

use tracing::debug;
use tungstenite::{Message, WebSocket};

use super::messages::{Inbound, MessageStream};
use super::{LISTENER_TARGET, TransportError};

/// Server side of an upgraded WebSocket connection.
pub struct WebSocketStream<S> {
    socket: WebSocket<S>,
    limit: usize,
}

impl<S: Read + Write> WebSocketStream<S> {
    /// Performs the server handshake on `stream`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Handshake`] when the client does not complete
    /// a valid upgrade request.
    pub fn accept(stream: S, limit: usize) -> Result<Self, TransportError> {
        let socket =
            tungstenite::accept(stream).map_err(|error| TransportError::Handshake(error.to_string()))?;
        Ok(Self { socket, limit })
    }
}

impl<S: Read + Write> MessageStream for WebSocketStream<S> {
    fn next_message(&mut self) -> Result<Option<Inbound>, TransportError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    let size = text.as_str().len();
                    if size > self.limit {
                        return Ok(Some(Inbound::Oversized {
                            size,
                            recoverable: true,
                        }));
                    }
                    return Ok(Some(Inbound::Text(text.as_str().to_owned())));
                }
                Ok(Message::Binary(payload)) => {
                    debug!(
                        target: LISTENER_TARGET,
                        bytes = payload.len(),
                        "ignoring binary websocket frame"
                    );
                }
                // Control frames are answered by tungstenite; a close frame is
                // acknowledged on the next read, which then reports the closure.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_) | Message::Close(_)) => {}
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    return Ok(None);
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn send(&mut self, reply: String) -> Result<(), TransportError> {
        self.socket.send(Message::text(reply))?;
        Ok(())
    }
}
