//! Matcher error types.
//!
//! A `MatcherError` is misuse of a matcher (unknown name, wrong arguments,
//! values of the wrong type), not a failing expectation. It converts into a
//! runtime [`SpecError`](ensayo_core::SpecError) through `?`.

/// Result type alias for matcher evaluation.
pub type Result<T> = std::result::Result<T, MatcherError>;

/// Matcher misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// No matcher is registered under the name.
    #[error("unknown matcher '{0}'")]
    Unknown(String),

    /// Wrong number of expected values.
    #[error("matcher '{matcher}' takes {expected} argument(s), got {got}")]
    Arity {
        /// Matcher name.
        matcher: String,
        /// Accepted argument count, e.g. `"1"` or `"1 to 2"`.
        expected: String,
        /// Supplied count.
        got: usize,
    },

    /// A value has a type the matcher cannot handle.
    #[error("matcher '{matcher}': {reason}")]
    InvalidArgument {
        /// Matcher name.
        matcher: String,
        /// What was wrong.
        reason: String,
    },

    /// The actual or expected value could not be turned into JSON.
    #[error("cannot serialize value: {0}")]
    Serialize(String),
}

impl MatcherError {
    /// Creates an invalid-argument error.
    #[must_use]
    pub fn invalid(matcher: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            matcher: matcher.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MatcherError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
