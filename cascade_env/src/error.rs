//! Error types for the cascade environment layer.

use thiserror::Error;

/// Errors surfaced by the estimator and its building blocks.
///
/// Every precondition is checked before any simulation work starts, so a
/// caller either gets a complete result or one of these and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// A caller-supplied argument is out of its domain
    /// (n, iterations, threads, p, seed ids, buffer sizes).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The worker pool could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl CascadeError {
    /// Creates an invalid-argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a thread pool error.
    pub fn thread_pool(err: impl std::fmt::Display) -> Self {
        Self::ThreadPool(err.to_string())
    }

    /// Returns true for precondition failures.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, CascadeError>;
