//! Request routing from raw text to response text.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use orrery_protocol::{
    Document, ErrorCode, MethodError, Params, Request, RequestId, Response,
};
use tracing::{debug, error, warn};

use crate::registry::HandlerRegistry;
use crate::upstream::SnapshotSource;

use super::DISPATCH_TARGET;
use super::builtins::BuiltIn;

/// Turns one request message into one response message.
///
/// The dispatcher holds no per-request state and is shared across connection
/// threads by `Arc`.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    upstream: Arc<dyn SnapshotSource>,
}

enum RouteError {
    NotFound,
    Method(MethodError),
}

impl Dispatcher {
    /// Creates a dispatcher over a frozen registry and the upstream source
    /// used by built-in methods.
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>, upstream: Arc<dyn SnapshotSource>) -> Self {
        Self { registry, upstream }
    }

    /// The registry requests are routed through.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Answers one request message with its encoded envelope.
    ///
    /// Never fails: every problem becomes an error envelope.
    #[must_use]
    pub fn dispatch(&self, message: &str) -> String {
        self.respond(message).encode()
    }

    /// Answers one request message.
    #[must_use]
    pub fn respond(&self, message: &str) -> Response {
        let request = match Request::decode(message) {
            Ok(request) => request,
            Err(failure) => {
                debug!(
                    target: DISPATCH_TARGET,
                    id = %failure.id,
                    error = %failure.error,
                    "rejected undecodable request"
                );
                return failure.into_response();
            }
        };
        let Request { method, id, params } = request;
        let params = Params::new(params);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.route(&method, &params)));
        match outcome {
            Ok(Ok(result)) => Response::success(id, result),
            Ok(Err(RouteError::NotFound)) => {
                debug!(target: DISPATCH_TARGET, %method, "method not found");
                Response::failure(
                    id,
                    ErrorCode::MethodNotFound,
                    format!("Method not found: {method}"),
                )
            }
            Ok(Err(RouteError::Method(failure))) => method_failure(id, &method, &failure),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(
                    target: DISPATCH_TARGET,
                    %method,
                    panic = %reason,
                    "handler panicked"
                );
                Response::failure(
                    id,
                    ErrorCode::InternalError,
                    format!("Internal error: {reason}"),
                )
            }
        }
    }

    fn route(&self, method: &str, params: &Params) -> Result<Document, RouteError> {
        if let Some(builtin) = BuiltIn::from_method(method) {
            return builtin
                .answer(&self.registry, self.upstream.as_ref())
                .map_err(RouteError::Method);
        }
        let handler = self.registry.lookup(method).ok_or(RouteError::NotFound)?;
        debug!(
            target: DISPATCH_TARGET,
            %method,
            handler = handler.name(),
            "dispatching request"
        );
        handler.handle(method, params).map_err(RouteError::Method)
    }
}

fn method_failure(id: RequestId, method: &str, failure: &MethodError) -> Response {
    let code = failure.code();
    if code == ErrorCode::InternalError {
        warn!(target: DISPATCH_TARGET, %method, error = %failure, "handler failed");
    } else {
        debug!(target: DISPATCH_TARGET, %method, error = %failure, "request rejected");
    }
    Response::failure(id, code, failure.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("handler panicked"))
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
