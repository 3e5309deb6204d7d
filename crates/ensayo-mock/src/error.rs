//! Error types for mock surfaces.

use ensayo_core::LoadError;

/// Result type alias for mock operations.
pub type Result<T> = std::result::Result<T, MockError>;

/// Errors raised by a [`MockSurface`](crate::MockSurface) or
/// [`MockFactory`](crate::MockFactory).
///
/// Inside a spec body these convert into a runtime error with `?`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockError {
    /// Method is outside the surface's contract and has no stub.
    #[error("{target} has no method '{method}'")]
    UnknownMethod {
        /// Target display name.
        target: String,
        /// Requested method.
        method: String,
    },

    /// Delegation requested but the surface wraps no implementation.
    #[error("cannot call through '{method}': {target} has no original implementation")]
    NoOriginal {
        /// Target display name.
        target: String,
        /// Requested method.
        method: String,
    },

    /// A stub rule configured to raise.
    #[error("{0}")]
    Raised(String),

    /// The wrapped implementation returned an error.
    #[error("original '{method}' failed: {message}")]
    Original {
        /// Method that was delegated.
        method: String,
        /// Error reported by the implementation.
        message: String,
    },

    /// Target could not be resolved by name.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl MockError {
    /// Creates an unknown-method error.
    #[must_use]
    pub fn unknown_method(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            target: target.into(),
            method: method.into(),
        }
    }

    /// Creates a missing-original error.
    #[must_use]
    pub fn no_original(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NoOriginal {
            target: target.into(),
            method: method.into(),
        }
    }

    /// Returns true if the error was produced by stub configuration rather
    /// than by a misuse of the surface.
    #[must_use]
    pub const fn is_scripted(&self) -> bool {
        matches!(self, Self::Raised(_) | Self::Original { .. })
    }
}
