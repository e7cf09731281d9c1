//! Request dispatch for connected clients.
//!
//! Every inbound message is one request and yields exactly one reply:
//!
//! ```json
//! {"method":"get_stars","id":3}
//! {"jsonrpc":"2.0","result":[...],"id":3}
//! ```
//!
//! Requests are decoded into an envelope, resolved against the built-in
//! methods (`ping`, `get_game_info`, `list_methods`) and then the handler
//! registry, and the result or failure is written back as an envelope.
//! Failures never escape to the transport: undecodable requests answer
//! `-32602`, unknown methods `-32601`, missing simulation state `-32001`, and
//! handler errors or panics `-32603`.

mod builtins;
mod dispatcher;
mod handler;

pub use self::builtins::BUILT_IN_METHODS;
pub use self::dispatcher::Dispatcher;
pub use self::handler::DispatchConnectionHandler;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
