//! Wire protocol shared by the Orrery daemon and its method handlers.
//!
//! The crate has three parts:
//!
//! - **Document building** via [`DocumentBuilder`], a streaming JSON writer
//!   that never materializes a value tree
//! - **Envelopes** via [`Request`] and [`Response`], the JSON-RPC style
//!   request and reply shapes with their fixed [`ErrorCode`] set
//! - **Handler contract** via [`MethodHandler`] and [`Params`], the narrow
//!   interface domain handlers implement
//!
//! # Example
//!
//! ```
//! use orrery_protocol::{Document, Request, Response};
//!
//! let request = Request::decode(r#"{"method":"ping","id":1}"#)?;
//! let reply = Response::success(request.id, Document::scalar("pong")?);
//! assert_eq!(reply.encode(), r#"{"jsonrpc":"2.0","result":"pong","id":1}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod document;
mod envelope;
mod handler;
mod params;

pub use document::{Document, DocumentBuilder, DocumentError, Scalar, escape_into};
pub use envelope::{
    DecodeError, DecodeFailure, ErrorCode, JSONRPC_VERSION, Request, RequestId, Response,
};
pub use handler::{MethodDescriptor, MethodError, MethodHandler};
pub use params::Params;
