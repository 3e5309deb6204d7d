//! Core types for suite execution.
//!
//! Arena ids for tree nodes, UUIDs for run identity, and the explicit
//! spec status state machine.

use serde::{Deserialize, Serialize};

/// Unique identifier for a scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Creates a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a run ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a suite inside its [`SuiteTree`](crate::suite::SuiteTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SuiteId(pub(crate) usize);

impl SuiteId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a spec inside its [`SuiteTree`](crate::suite::SuiteTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecId(pub(crate) usize);

impl SpecId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Spec lifecycle state.
///
/// Transitions follow a strict state machine:
/// ```text
/// Pending → Running → Passed | Failed | Errored
///    ↓
/// Skipped | Errored
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecStatus {
    /// Registered, not yet visited by the scheduler.
    Pending,
    /// Hooks or body currently executing.
    Running,
    /// Completed without failure.
    Passed,
    /// An assertion failed.
    Failed,
    /// Any other raised condition, a timeout, or a `beforeAll` cascade.
    Errored,
    /// Filtered out; never executed.
    Skipped,
}

impl SpecStatus {
    /// Returns true once the status can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Passed | Self::Failed | Self::Errored | Self::Skipped
        )
    }

    /// Returns true if `next` is a legal successor of this status.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Running | Self::Skipped | Self::Errored),
            Self::Running => matches!(next, Self::Passed | Self::Failed | Self::Errored),
            Self::Passed | Self::Failed | Self::Errored | Self::Skipped => false,
        }
    }
}

impl std::fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Lifecycle hook phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Once per suite, before any member executes.
    BeforeAll,
    /// Before every spec below the suite, outer-to-inner.
    BeforeEach,
    /// After every spec below the suite, inner-to-outer.
    AfterEach,
    /// Once per suite, after all members complete.
    AfterAll,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Self; 4] = [
        Self::BeforeAll,
        Self::BeforeEach,
        Self::AfterEach,
        Self::AfterAll,
    ];

    /// Returns the phase name as written in suites.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforeAll => "beforeAll",
            Self::BeforeEach => "beforeEach",
            Self::AfterEach => "afterEach",
            Self::AfterAll => "afterAll",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a spec was not executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The spec or an ancestor suite carries the skip flag.
    Skipped,
    /// Focus mode is active and the spec is not on a focused path.
    NotFocused,
    /// An effective label matched the exclude set.
    Excluded,
    /// The include set is non-empty and no effective label matched it.
    NotIncluded,
}
