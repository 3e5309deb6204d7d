//! Failure taxonomy raised from hooks and spec bodies.
//!
//! Assertion failures and runtime errors are distinct types so the
//! scheduler can map them to `failed` and `errored` without inspecting
//! messages. Any `std::error::Error` converts into a runtime error, so
//! bodies can use `?` on foreign results.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a hook or spec body returns.
pub type SpecOutcome = std::result::Result<(), SpecError>;

/// Source position of an assertion or raise site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Source file.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Location {
    /// Captures the caller's position. Callers must be `#[track_caller]`
    /// for this to point at user code.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(std::panic::Location::caller())
    }
}

impl From<&std::panic::Location<'_>> for Location {
    fn from(loc: &std::panic::Location<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
            column: loc.column(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A matcher returned a failing outcome.
///
/// Deliberately not a `std::error::Error`: that keeps it out of the
/// blanket runtime conversion on [`SpecError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    /// Human-readable failure message.
    pub message: String,
    /// Where the assertion was made.
    pub location: Option<Location>,
}

impl AssertionFailure {
    /// Creates an assertion failure without a location.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A condition raised inside a hook or spec body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// An expectation did not hold.
    Assertion(AssertionFailure),
    /// Anything else.
    Runtime {
        /// Error message.
        message: String,
        /// Raise site, when known.
        location: Option<Location>,
    },
}

impl SpecError {
    /// Creates an assertion failure at the caller's position.
    #[must_use]
    #[track_caller]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(AssertionFailure::new(message).at(Location::caller()))
    }

    /// Creates a runtime error at the caller's position.
    #[must_use]
    #[track_caller]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            location: Some(Location::caller()),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Assertion(failure) => &failure.message,
            Self::Runtime { message, .. } => message,
        }
    }

    /// Returns true for assertion failures.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion(failure) => write!(f, "assertion failed: {failure}"),
            Self::Runtime { message, .. } => write!(f, "runtime error: {message}"),
        }
    }
}

impl From<AssertionFailure> for SpecError {
    fn from(failure: AssertionFailure) -> Self {
        Self::Assertion(failure)
    }
}

impl<E> From<E> for SpecError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Runtime {
            message: err.to_string(),
            location: None,
        }
    }
}

/// Kind of recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// An expectation did not hold.
    Assertion,
    /// Any other raised condition, including `beforeAll` cascades.
    Runtime,
    /// The spec step exceeded its configured timeout.
    Timeout,
}

/// Failure detail recorded on a spec or suite result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Failure kind.
    pub kind: FailureKind,
    /// Message.
    pub message: String,
    /// Source position, when known.
    pub location: Option<Location>,
}

impl Failure {
    /// Creates a timeout failure.
    #[must_use]
    pub fn timeout(limit: Duration, elapsed: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!(
                "exceeded timeout of {} (took {})",
                humantime::format_duration(limit),
                humantime::format_duration(truncate_to_millis(elapsed))
            ),
            location: None,
        }
    }

    /// Creates the per-spec record for a `beforeAll` failure in `suite`.
    #[must_use]
    pub fn cascade(suite: &str, cause: &Self) -> Self {
        Self {
            kind: FailureKind::Runtime,
            message: format!("beforeAll hook failed in suite '{suite}': {}", cause.message),
            location: cause.location.clone(),
        }
    }

    /// Prefixes the message with the hook phase that raised it.
    #[must_use]
    pub fn in_hook(mut self, phase: crate::types::Phase) -> Self {
        self.message = format!("{phase} hook: {}", self.message);
        self
    }
}

impl From<SpecError> for Failure {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::Assertion(failure) => Self {
                kind: FailureKind::Assertion,
                message: failure.message,
                location: failure.location,
            },
            SpecError::Runtime { message, location } => Self {
                kind: FailureKind::Runtime,
                message,
                location,
            },
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{} ({loc})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}
