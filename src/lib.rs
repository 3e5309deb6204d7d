//! Ensayo: Suite Execution and Mocking Framework
//!
//! Nested suites with lifecycle hooks, focus/skip/label filtering,
//! fluent expectations over a pluggable matcher registry, and
//! mocks/stubs/spies with call logs.
//!
//! # Quick Start
//!
//! ```rust
//! use ensayo::prelude::*;
//!
//! let mut b = SuiteTreeBuilder::new("calculator.spec");
//! b.describe("Calculator", |b| {
//!     b.it("adds", || expect(1 + 1).to_be(2));
//! });
//! let result = ensayo::run(b, RunConfig::new())?;
//! assert!(result.passed());
//! # Ok::<(), ensayo::core::FrameworkError>(())
//! ```

pub use ensayo_core as core;
pub use ensayo_expect as assertions;
pub use ensayo_mock as mock;

use ensayo_core::{ExecutionScheduler, RunConfig, SuiteResult, SuiteTreeBuilder};

/// Finishes `builder` and runs the tree once with `config`.
///
/// # Errors
/// Returns a [`FrameworkError`](ensayo_core::FrameworkError) for malformed
/// registrations or an invalid configuration. Spec failures are reported
/// in the result, not as errors.
pub fn run(builder: SuiteTreeBuilder, config: RunConfig) -> ensayo_core::Result<SuiteResult> {
    let mut tree = builder.finish()?;
    ExecutionScheduler::new(config).run(&mut tree)
}

/// Prelude module for common imports.
pub mod prelude {
    pub use ensayo_core::{
        ExecutionScheduler, Failure, FailureKind, LoadedUnit, Phase, RunConfig, RunReport, Runner,
        SpecConfig, SpecError, SpecOutcome, SpecStatus, SuiteConfig, SuiteResult, SuiteTreeBuilder,
        UnitMember, XUnitAdapter,
    };
    pub use ensayo_expect::{ExpectationChain, MatcherRegistry, expect, expect_fn, register_matcher};
    pub use ensayo_mock::{
        ArgMatcher, CallLog, Component, Contract, MockError, MockFactory, MockSurface, TargetRef,
    };
}
