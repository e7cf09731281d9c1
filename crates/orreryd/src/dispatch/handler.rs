//! Connection handler that feeds framed messages to the dispatcher.

use std::sync::Arc;

use orrery_config::Framing;
use orrery_protocol::{ErrorCode, RequestId, Response};
use tracing::{debug, info, warn};

use crate::transport::{
    ConnectionHandler, ConnectionStream, Inbound, JsonlStream, MessageStream, WebSocketStream,
};

use super::DISPATCH_TARGET;
use super::dispatcher::Dispatcher;

/// Serves a connection until the client disconnects, answering every request
/// message with exactly one reply in request order.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    dispatcher: Arc<Dispatcher>,
    framing: Framing,
    max_message_bytes: usize,
}

impl DispatchConnectionHandler {
    /// Creates a handler using `framing` and rejecting messages over
    /// `max_message_bytes`.
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, framing: Framing, max_message_bytes: usize) -> Self {
        Self {
            dispatcher,
            framing,
            max_message_bytes,
        }
    }

    fn serve(&self, messages: &mut impl MessageStream, peer: &str) {
        loop {
            let reply = match messages.next_message() {
                Ok(Some(Inbound::Text(text))) => self.dispatcher.dispatch(&text),
                Ok(Some(Inbound::Oversized { size, recoverable })) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        %peer,
                        size,
                        limit = self.max_message_bytes,
                        "request exceeds maximum size"
                    );
                    let reply = self.oversized_reply(size);
                    if !recoverable {
                        send_reply(messages, reply, peer);
                        return;
                    }
                    reply
                }
                Ok(Some(Inbound::NotUtf8 { valid_up_to })) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        %peer,
                        valid_up_to,
                        "request is not valid UTF-8"
                    );
                    not_utf8_reply(valid_up_to)
                }
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, %peer, "client disconnected");
                    return;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "connection failed");
                    return;
                }
            };
            if !send_reply(messages, reply, peer) {
                return;
            }
        }
    }

    fn oversized_reply(&self, size: usize) -> String {
        Response::failure(
            RequestId::default(),
            ErrorCode::InvalidParams,
            format!(
                "request of {size} bytes exceeds maximum size of {} bytes",
                self.max_message_bytes
            ),
        )
        .encode()
    }
}

fn not_utf8_reply(valid_up_to: usize) -> String {
    Response::failure(
        RequestId::default(),
        ErrorCode::InvalidParams,
        format!("request is not valid UTF-8 (invalid byte at offset {valid_up_to})"),
    )
    .encode()
}

fn send_reply(messages: &mut impl MessageStream, reply: String, peer: &str) -> bool {
    match messages.send(reply) {
        Ok(()) => true,
        Err(error) => {
            warn!(target: DISPATCH_TARGET, %peer, %error, "failed to send reply");
            false
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        info!(
            target: DISPATCH_TARGET,
            %peer,
            framing = %self.framing,
            "client connected"
        );
        match self.framing {
            Framing::Websocket => match WebSocketStream::accept(stream, self.max_message_bytes) {
                Ok(mut messages) => self.serve(&mut messages, &peer),
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "websocket upgrade failed");
                }
            },
            Framing::Jsonl => {
                let mut messages = JsonlStream::new(stream, self.max_message_bytes);
                self.serve(&mut messages, &peer);
            }
        }
        info!(target: DISPATCH_TARGET, %peer, "client session ended");
    }
}
