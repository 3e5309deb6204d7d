//! Popperian Falsification Tests for Ensayo
//!
//! # Reference
//! Popper, K. (1959). *The Logic of Scientific Discovery*. Routledge.
//!
//! > "A theory which is not refutable by any conceivable event is non-scientific."
//!
//! | Category | Range | Claims |
//! |----------|-------|--------|
//! | A | F201-F210 | Scheduling through the facade |
//! | B | F211-F220 | Expectations and matchers inside specs |
//! | C | F221-F232, F242-F243 | Mock surfaces |
//! | D | F233-F241 | Multi-unit runs |

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::needless_borrows_for_generic_args)]
#![allow(clippy::no_effect_underscore_binding)]
#![allow(clippy::default_trait_access)]

mod matchers;
mod mocks;
mod runner;
mod scheduling;

use ensayo::prelude::*;

pub use ensayo_test::Events;

/// Runs a single-unit tree with default configuration.
pub fn run(builder: SuiteTreeBuilder) -> SuiteResult {
    ensayo::run(builder, RunConfig::new()).expect("run failed")
}

/// Status of the spec named `name`.
pub fn status(result: &SuiteResult, name: &str) -> SpecStatus {
    result
        .find_spec(name)
        .unwrap_or_else(|| panic!("no spec named {name}"))
        .status
}
