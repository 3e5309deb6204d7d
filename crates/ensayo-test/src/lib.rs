// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # ensayo-test
//!
//! Test support for the ensayo framework.
//!
//! - **Event recording**: [`Events`] collects hook and body events so
//!   ordering claims can be checked after a run
//! - **Falsification tests**: Popperian tests across the workspace crates,
//!   under `tests/`
//!
//! ## Example
//!
//! ```rust
//! use ensayo_core::{ExecutionScheduler, RunConfig, SuiteTreeBuilder};
//! use ensayo_test::Events;
//!
//! let events = Events::default();
//! let mut b = SuiteTreeBuilder::new("order.spec");
//! b.describe("S", |b| {
//!     b.before_each(events.ok("before"));
//!     b.it("a", events.ok("a"));
//! });
//! let mut tree = b.finish()?;
//! ExecutionScheduler::new(RunConfig::new()).run(&mut tree)?;
//! assert_eq!(events.take(), ["before", "a"]);
//! # Ok::<(), ensayo_core::FrameworkError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod events;

pub use events::Events;
