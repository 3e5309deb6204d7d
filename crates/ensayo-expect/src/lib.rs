// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # ensayo-expect
//!
//! Expectation chains for ensayo specs.
//!
//! - [`expect`] captures an actual value as JSON and returns an [`ExpectationChain`]
//! - [`ExpectationChain::not`] toggles negation for the next matcher
//! - matchers are looked up by name in a [`MatcherRegistry`]; custom matchers
//!   are added with [`register_matcher`] and override built-ins of the same name
//!
//! Failing expectations become assertion failures (`failed` specs); matcher
//! misuse becomes a runtime error (`errored` specs).
//!
//! ## Example
//!
//! ```rust
//! use ensayo_expect::{MatchContext, Verdict, expect, register_matcher};
//!
//! register_matcher("to_be_even", |ctx: &MatchContext<'_>| -> ensayo_expect::Result<Verdict> {
//!     let n = ctx.actual.as_i64().ok_or_else(|| ctx.invalid("expected an integer"))?;
//!     Ok(Verdict::new(n % 2 == 0, format!("expected {n} to be even"), format!("expected {n} to be odd")))
//! });
//!
//! expect(4).to("to_be_even", &[])?;
//! expect(7).not().to("to_be_even", &[])?;
//! # Ok::<(), ensayo_core::SpecError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod equality;
pub mod error;
pub mod matchers;
pub mod registry;

pub use chain::{ExpectationChain, expect, expect_fn};
pub use equality::{deep_equals, type_name};
pub use error::{MatcherError, Result};
pub use matchers::BUILTIN_MATCHERS;
pub use registry::{
    MatchContext, Matcher, MatcherRegistry, Verdict, global_matcher, global_matcher_names,
    register_matcher,
};
