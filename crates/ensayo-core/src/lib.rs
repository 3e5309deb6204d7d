// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # ensayo-core
//!
//! Suite execution engine for the ensayo testing framework.
//!
//! - [`SuiteTreeBuilder`] registers nested suites, specs and lifecycle hooks
//! - [`ExecutionScheduler`] walks a [`SuiteTree`], applies focus, skip and
//!   label filters, runs hooks in order and isolates failures
//! - [`ResultAggregator`] rolls spec outcomes up into [`SuiteResult`] trees
//! - [`XUnitAdapter`] maps flat xUnit-style units onto the same tree
//! - [`Runner`] loads and runs many units through a [`UnitLoader`]
//!
//! ## Example
//!
//! ```rust
//! use ensayo_core::{ExecutionScheduler, RunConfig, SpecError, SuiteTreeBuilder};
//!
//! let mut b = SuiteTreeBuilder::new("math.spec");
//! b.describe("addition", |b| {
//!     b.it("adds", || if 1 + 1 == 2 { Ok(()) } else { Err(SpecError::assertion("bad math")) });
//! });
//! let mut tree = b.finish()?;
//! let result = ExecutionScheduler::new(RunConfig::new()).run(&mut tree)?;
//! assert_eq!(result.summary.passed, 1);
//! # Ok::<(), ensayo_core::FrameworkError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod failure;
pub mod result;
pub mod runner;
pub mod scheduler;
pub mod suite;
#[cfg(test)]
pub mod tests;
pub mod types;
pub mod xunit;

pub use builder::{SpecConfig, SuiteConfig, SuiteTreeBuilder};
pub use config::RunConfig;
pub use error::{FrameworkError, LoadError, Result};
pub use failure::{AssertionFailure, Failure, FailureKind, Location, SpecError, SpecOutcome};
pub use result::{ResultAggregator, ResultNode, SpecResult, SuiteResult, Summary};
pub use runner::{LoadedUnit, Registration, RunReport, Runner, UnitLoader, UnitReport};
pub use scheduler::{Disposition, ExecutionScheduler, Plan};
pub use suite::{Body, Hook, Member, SpecNode, SuiteNode, SuiteTree};
pub use types::{Phase, RunId, SkipReason, SpecId, SpecStatus, SuiteId};
pub use xunit::{UnitMember, XUnitAdapter};
