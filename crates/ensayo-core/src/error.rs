//! Framework error types for ensayo-core.
//!
//! A `FrameworkError` is a defect in registration or scheduling itself.
//! It is never recorded as a spec status; it propagates out of the run.

use crate::types::{SpecStatus, SuiteId};

/// Result type alias for framework operations.
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// Defects in the builder or scheduler.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// Malformed registration (e.g. an empty suite or spec name).
    #[error("registration error: {0}")]
    Registration(String),

    /// A tree was handed to the scheduler after it already ran.
    #[error("suite tree already executed: spec '{spec}' is {status}")]
    AlreadyExecuted {
        /// First spec found outside `pending`.
        spec: String,
        /// Its status.
        status: SpecStatus,
    },

    /// Illegal spec status change.
    #[error("invalid status transition for spec '{spec}': {from} -> {to}")]
    StatusTransition {
        /// Spec name.
        spec: String,
        /// Current status.
        from: SpecStatus,
        /// Requested status.
        to: SpecStatus,
    },

    /// Suite id does not belong to the tree.
    #[error("unknown suite: {0:?}")]
    UnknownSuite(SuiteId),

    /// Run configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameworkError {
    /// Creates a registration error.
    #[must_use]
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if the error comes from the scheduler's own bookkeeping
    /// rather than from user input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::StatusTransition { .. } | Self::UnknownSuite(_))
    }
}

/// Failure to resolve a test unit or mock target by name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Nothing is registered under the name.
    #[error("not found: {0}")]
    NotFound(String),

    /// The loader found the name but could not instantiate it.
    #[error("failed to load '{name}': {reason}")]
    Failed {
        /// Qualified name.
        name: String,
        /// Loader message.
        reason: String,
    },
}

impl LoadError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Creates an instantiation failure.
    #[must_use]
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
