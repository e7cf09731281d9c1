//! Request decoding and response encoding.
//!
//! Inbound text is parsed with `serde_json` into a generic value before any
//! field is inspected. Outbound envelopes are written with the
//! [`DocumentBuilder`](crate::DocumentBuilder) so handler results can be
//! spliced in without re-parsing.

use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::document::{Document, DocumentBuilder, escape_into};

/// Protocol version written into every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Closed set of error codes carried by failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The method is neither built in nor registered (`-32601`).
    MethodNotFound,
    /// The request or its parameters could not be interpreted (`-32602`).
    InvalidParams,
    /// The handler failed or panicked (`-32603`).
    InternalError,
    /// No simulation state is available to answer from (`-32001`).
    UpstreamUnavailable,
}

impl ErrorCode {
    /// Numeric wire value.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::UpstreamUnavailable => -32001,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.code())
    }
}

/// Request identifier, echoed verbatim in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestId {
    /// Numeric id. `serde_json` runs with `arbitrary_precision`, so the
    /// number keeps the exact digits the client sent.
    Number(Number),
    /// String id.
    String(String),
    /// Explicit `null` id.
    Null,
}

impl Default for RequestId {
    fn default() -> Self {
        Self::Number(Number::from(1))
    }
}

impl RequestId {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self::Number(number)),
            Value::String(text) => Some(Self::String(text)),
            Value::Null => Some(Self::Null),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn write_json(&self, out: &mut String) {
        match self {
            Self::Number(number) => out.push_str(&number.to_string()),
            Self::String(text) => {
                out.push('"');
                escape_into(out, text);
                out.push('"');
            }
            Self::Null => out.push_str("null"),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_json(&mut out);
        formatter.write_str(&out)
    }
}

/// Reasons a request cannot be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not valid JSON.
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The JSON root is not an object.
    #[error("request must be a JSON object")]
    NotAnObject,
    /// `method` is absent.
    #[error("request is missing 'method'")]
    MissingMethod,
    /// `method` is not a non-empty string.
    #[error("request 'method' must be a non-empty string")]
    InvalidMethod,
    /// `id` is neither a number, a string nor null.
    #[error("request 'id' must be a number, string or null")]
    InvalidId,
}

/// A decode error paired with whichever id could still be recovered.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DecodeFailure {
    /// Id to echo in the error envelope.
    pub id: RequestId,
    /// What went wrong.
    #[source]
    pub error: DecodeError,
}

impl DecodeFailure {
    /// Converts the failure into its `-32602` envelope.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::failure(self.id, ErrorCode::InvalidParams, self.error.to_string())
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Method name; never empty.
    pub method: String,
    /// Identifier echoed in the response.
    pub id: RequestId,
    /// Opaque parameter payload; `{}` when absent.
    pub params: Value,
}

impl Request {
    /// Parses request text.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeFailure`] when the text is not a JSON object with a
    /// non-empty string `method` and a scalar `id`. The failure carries the id
    /// whenever it was readable.
    pub fn decode(text: &str) -> Result<Self, DecodeFailure> {
        let root: Value = serde_json::from_str(text).map_err(|error| DecodeFailure {
            id: RequestId::default(),
            error: DecodeError::Malformed(error),
        })?;
        let Value::Object(mut fields) = root else {
            return Err(DecodeFailure {
                id: RequestId::default(),
                error: DecodeError::NotAnObject,
            });
        };

        let id = match fields.remove("id") {
            None => RequestId::default(),
            Some(raw) => RequestId::from_value(raw).ok_or(DecodeFailure {
                id: RequestId::default(),
                error: DecodeError::InvalidId,
            })?,
        };

        let method = match fields.remove("method") {
            None => {
                return Err(DecodeFailure {
                    id,
                    error: DecodeError::MissingMethod,
                });
            }
            Some(Value::String(name)) if !name.is_empty() => name,
            Some(_) => {
                return Err(DecodeFailure {
                    id,
                    error: DecodeError::InvalidMethod,
                });
            }
        };

        let params = fields
            .remove("params")
            .unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self { method, id, params })
    }
}

/// Outbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The method produced a result.
    Success {
        /// Echoed request id.
        id: RequestId,
        /// Result value.
        result: Document,
    },
    /// The request failed.
    Failure {
        /// Echoed request id.
        id: RequestId,
        /// Error code.
        code: ErrorCode,
        /// Human-readable message.
        message: String,
    },
}

impl Response {
    /// Builds a success envelope.
    #[must_use]
    pub const fn success(id: RequestId, result: Document) -> Self {
        Self::Success { id, result }
    }

    /// Builds a failure envelope.
    #[must_use]
    pub fn failure(id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Failure {
            id,
            code,
            message: message.into(),
        }
    }

    /// Echoed request id.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        match self {
            Self::Success { id, .. } | Self::Failure { id, .. } => id,
        }
    }

    /// Writes the envelope as JSON text.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut builder = DocumentBuilder::with_capacity(self.size_hint());
        builder.start_object().prop("jsonrpc", JSONRPC_VERSION);
        match self {
            Self::Success { result, .. } => {
                builder.key("result").document(result);
            }
            Self::Failure { code, message, .. } => {
                builder
                    .key("error")
                    .start_object()
                    .prop("code", code.code())
                    .prop("message", message.as_str())
                    .end_object();
            }
        }
        let mut id = String::new();
        self.id().write_json(&mut id);
        builder.key("id").raw(&id).end_object();

        // Envelope fields are strings and integers only.
        match builder.finish() {
            Ok(document) => document.into_string(),
            Err(error) => fallback_internal_error(&error.to_string()),
        }
    }

    fn size_hint(&self) -> usize {
        let body = match self {
            Self::Success { result, .. } => result.as_str().len(),
            Self::Failure { message, .. } => message.len() + 32,
        };
        body + 48
    }
}

fn fallback_internal_error(message: &str) -> String {
    let mut out = String::from(r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":""#);
    escape_into(&mut out, message);
    out.push_str(r#""},"id":null}"#);
    out
}
