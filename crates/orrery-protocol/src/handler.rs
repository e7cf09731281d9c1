//! Contract implemented by every method handler.

use thiserror::Error;

use crate::document::{Document, DocumentError};
use crate::envelope::ErrorCode;
use crate::params::Params;

/// A method a handler answers, as listed by `list_methods`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Wire method name.
    pub name: &'static str,
    /// One-line description for discovery.
    pub description: &'static str,
}

impl MethodDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// Failures a handler reports back to the dispatcher.
#[derive(Debug, Error)]
pub enum MethodError {
    /// Parameters were missing or malformed.
    #[error("{0}")]
    InvalidParams(String),
    /// No simulation state is loaded.
    #[error("Game not loaded (main menu?)")]
    UpstreamUnavailable,
    /// The handler could not complete the request.
    #[error("{0}")]
    Internal(String),
    /// The result document could not be finished.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl MethodError {
    /// Creates an [`InvalidParams`](Self::InvalidParams) error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Creates an [`Internal`](Self::Internal) error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Wire code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::UpstreamUnavailable => ErrorCode::UpstreamUnavailable,
            Self::Internal(_) | Self::Document(_) => ErrorCode::InternalError,
        }
    }
}

/// A named group of methods answered from read-only state.
///
/// Implementations are shared across connection threads and must not hold
/// per-request state. Each call should read upstream state once and report
/// [`MethodError::UpstreamUnavailable`] before touching parameters when no
/// state is loaded.
pub trait MethodHandler: Send + Sync {
    /// Identity used to group methods in `list_methods`.
    fn name(&self) -> &'static str;

    /// Methods this handler answers.
    fn methods(&self) -> Vec<MethodDescriptor>;

    /// Answers one of the methods returned by [`methods`](Self::methods).
    ///
    /// # Errors
    ///
    /// Returns [`MethodError`] describing why no result could be produced.
    fn handle(&self, method: &str, params: &Params) -> Result<Document, MethodError>;
}
