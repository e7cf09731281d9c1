//! Socket transport for daemon endpoints.
//!
//! The listener binds the configured endpoint and accepts connections in a
//! background thread, handing each one to a [`ConnectionHandler`] on its own
//! thread. Handlers turn the raw stream into a [`MessageStream`] using either
//! the WebSocket or the newline-delimited framing.

mod errors;
mod handler;
mod jsonl;
mod listener;
mod messages;
mod websocket;

pub use self::errors::{ListenerError, TransportError};
pub use self::handler::{ConnectionHandler, ConnectionStream};
pub use self::jsonl::JsonlStream;
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::messages::{Inbound, MessageStream};
pub use self::websocket::WebSocketStream;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
