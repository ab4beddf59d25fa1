//! Core error types for Braid.

use thiserror::Error;

/// Result type alias using `BraidError`.
pub type BraidResult<T> = std::result::Result<T, BraidError>;

/// Core error type for Braid operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BraidError {
    /// The shared cancellation token was signaled and a poll point observed it.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// A structural requirement of the operator tree was violated.
    ///
    /// Raised eagerly while the query is being constructed; never retried.
    #[error("PreconditionViolation: {0}")]
    PreconditionViolation(String),

    /// Query execution error.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Configuration could not be loaded or failed validation.
    #[error("ConfigError: {0}")]
    ConfigError(String),

    /// Internal error (bug in Braid).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl BraidError {
    /// Create a cancellation error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `ConfigError`.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Whether this error reports a cooperative cancellation.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Ensure a condition holds, returning an `ExecutionError` if not.
///
/// A variant may be named explicitly:
/// `ensure!(a == b, PreconditionViolation: "expected {a}, got {b}")`.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::BraidError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::BraidError::$variant(format!($($msg)*)));
        }
    };
}
