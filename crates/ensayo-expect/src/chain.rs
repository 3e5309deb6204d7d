//! Expectation chains.
//!
//! `expect(actual)` captures a value; `.not()` toggles negation; `.to(..)`
//! or one of the typed helpers looks up a matcher by name and turns its
//! verdict into a [`SpecOutcome`].
//!
//! ```rust
//! use ensayo_expect::expect;
//!
//! expect(1 + 1).to_be(2)?;
//! expect(vec!["a", "b"]).not().to_contain("c")?;
//! # Ok::<(), ensayo_core::SpecError>(())
//! ```

use std::fmt::Display;
use std::sync::Arc;

use ensayo_core::{AssertionFailure, Location, SpecError, SpecOutcome};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::MatcherError;
use crate::registry::{MatchContext, Matcher, MatcherRegistry, global_matcher};

#[derive(Debug, Clone, Copy)]
enum Source<'r> {
    Global,
    Local(&'r MatcherRegistry),
}

/// A captured actual value awaiting a matcher.
#[derive(Debug, Clone)]
pub struct ExpectationChain<'r> {
    actual: Result<Value, MatcherError>,
    negated: bool,
    source: Source<'r>,
}

/// Starts an expectation chain on the process-wide registry.
pub fn expect<T: Serialize>(actual: T) -> ExpectationChain<'static> {
    ExpectationChain {
        actual: serde_json::to_value(actual).map_err(MatcherError::from),
        negated: false,
        source: Source::Global,
    }
}

/// Runs `f` and captures whether it returned an error, for `to_throw`.
///
/// The captured value is `{"raised": bool, "message": string | null}`.
pub fn expect_fn<F, T, E>(f: F) -> ExpectationChain<'static>
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    expect(capture(f))
}

pub(crate) fn capture<F, T, E>(f: F) -> Value
where
    F: FnOnce() -> Result<T, E>,
    E: Display,
{
    match f() {
        Ok(_) => json!({ "raised": false, "message": null }),
        Err(err) => json!({ "raised": true, "message": err.to_string() }),
    }
}

impl<'r> ExpectationChain<'r> {
    pub(crate) fn with_registry<T: Serialize>(actual: T, registry: &'r MatcherRegistry) -> Self {
        Self {
            actual: serde_json::to_value(actual).map_err(MatcherError::from),
            negated: false,
            source: Source::Local(registry),
        }
    }

    /// Toggles negation. Applying it twice restores the positive form.
    #[must_use]
    pub const fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Returns true if the chain is negated.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns the captured value, if it serialized.
    #[must_use]
    pub fn actual(&self) -> Option<&Value> {
        self.actual.as_ref().ok()
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn Matcher>> {
        match self.source {
            Source::Global => global_matcher(name),
            Source::Local(registry) => registry.get(name),
        }
    }

    /// Evaluates matcher `name` and returns whether the chain passed,
    /// with negation applied.
    ///
    /// # Errors
    /// Returns a [`MatcherError`] for an unknown matcher, bad arguments, or
    /// an actual value that failed to serialize.
    pub fn evaluate(&self, name: &str, expected: &[Value]) -> Result<bool, MatcherError> {
        self.verdict(name, expected).map(|(passed, _)| passed)
    }

    fn verdict(&self, name: &str, expected: &[Value]) -> Result<(bool, String), MatcherError> {
        let actual = self.actual.as_ref().map_err(|e| e.clone())?;
        // Cloned out of the registry so matchers may call `expect` themselves.
        let matcher = self
            .lookup(name)
            .ok_or_else(|| MatcherError::Unknown(name.to_string()))?;
        let ctx = MatchContext {
            name,
            actual,
            expected,
            negated: self.negated,
        };
        let verdict = matcher.evaluate(&ctx)?;
        let passed = verdict.matched != self.negated;
        Ok((passed, verdict.message_for(self.negated).to_string()))
    }

    /// Applies matcher `name` with the given expected values.
    ///
    /// A failing verdict is an assertion failure at the caller's position;
    /// matcher misuse is a runtime error.
    #[track_caller]
    pub fn to(&self, name: &str, expected: &[Value]) -> SpecOutcome {
        match self.verdict(name, expected) {
            Ok((true, _)) => Ok(()),
            Ok((false, message)) => {
                tracing::trace!(matcher = %name, negated = self.negated, "expectation failed");
                Err(SpecError::Assertion(
                    AssertionFailure::new(message).at(Location::caller()),
                ))
            }
            Err(err) => Err(SpecError::Runtime {
                message: err.to_string(),
                location: Some(Location::caller()),
            }),
        }
    }

    #[track_caller]
    fn to_with<T: Serialize>(&self, name: &str, expected: T) -> SpecOutcome {
        match serde_json::to_value(expected) {
            Ok(value) => self.to(name, &[value]),
            Err(err) => Err(SpecError::Runtime {
                message: MatcherError::from(err).to_string(),
                location: Some(Location::caller()),
            }),
        }
    }

    #[track_caller]
    fn to_with_pair<A: Serialize, B: Serialize>(&self, name: &str, a: A, b: B) -> SpecOutcome {
        match (serde_json::to_value(a), serde_json::to_value(b)) {
            (Ok(a), Ok(b)) => self.to(name, &[a, b]),
            (Err(err), _) | (_, Err(err)) => Err(SpecError::Runtime {
                message: MatcherError::from(err).to_string(),
                location: Some(Location::caller()),
            }),
        }
    }

    /// Strict equality.
    #[track_caller]
    pub fn to_be<T: Serialize>(&self, expected: T) -> SpecOutcome {
        self.to_with("to_be", expected)
    }

    /// Deep structural equality.
    #[track_caller]
    pub fn to_equal<T: Serialize>(&self, expected: T) -> SpecOutcome {
        self.to_with("to_equal", expected)
    }

    /// Value is `true`.
    #[track_caller]
    pub fn to_be_true(&self) -> SpecOutcome {
        self.to("to_be_true", &[])
    }

    /// Value is `false`.
    #[track_caller]
    pub fn to_be_false(&self) -> SpecOutcome {
        self.to("to_be_false", &[])
    }

    /// Value is `null` (`None`, `()`).
    #[track_caller]
    pub fn to_be_null(&self) -> SpecOutcome {
        self.to("to_be_null", &[])
    }

    /// String, array or object is empty.
    #[track_caller]
    pub fn to_be_empty(&self) -> SpecOutcome {
        self.to("to_be_empty", &[])
    }

    /// String (in chars), array or object has `len` entries.
    #[track_caller]
    pub fn to_have_length(&self, len: usize) -> SpecOutcome {
        self.to_with("to_have_length", len)
    }

    /// Array holds an equal element, or string holds the substring.
    #[track_caller]
    pub fn to_contain<T: Serialize>(&self, item: T) -> SpecOutcome {
        self.to_with("to_contain", item)
    }

    /// Object has the key.
    #[track_caller]
    pub fn to_have_key(&self, key: &str) -> SpecOutcome {
        self.to_with("to_have_key", key)
    }

    /// Number is greater than `bound`.
    #[track_caller]
    pub fn to_be_greater_than<T: Serialize>(&self, bound: T) -> SpecOutcome {
        self.to_with("to_be_greater_than", bound)
    }

    /// Number is greater than or equal to `bound`.
    #[track_caller]
    pub fn to_be_greater_than_or_equal<T: Serialize>(&self, bound: T) -> SpecOutcome {
        self.to_with("to_be_greater_than_or_equal", bound)
    }

    /// Number is less than `bound`.
    #[track_caller]
    pub fn to_be_less_than<T: Serialize>(&self, bound: T) -> SpecOutcome {
        self.to_with("to_be_less_than", bound)
    }

    /// Number is less than or equal to `bound`.
    #[track_caller]
    pub fn to_be_less_than_or_equal<T: Serialize>(&self, bound: T) -> SpecOutcome {
        self.to_with("to_be_less_than_or_equal", bound)
    }

    /// Number lies in `low..=high`.
    #[track_caller]
    pub fn to_be_between<A: Serialize, B: Serialize>(&self, low: A, high: B) -> SpecOutcome {
        self.to_with_pair("to_be_between", low, high)
    }

    /// Number is within half a unit of the `digits`-th decimal of `expected`.
    #[track_caller]
    pub fn to_be_close_to(&self, expected: f64, digits: u32) -> SpecOutcome {
        self.to_with_pair("to_be_close_to", expected, digits)
    }

    /// String matches the regular expression.
    #[track_caller]
    pub fn to_match(&self, pattern: &str) -> SpecOutcome {
        self.to_with("to_match", pattern)
    }

    /// String starts with `prefix`.
    #[track_caller]
    pub fn to_start_with(&self, prefix: &str) -> SpecOutcome {
        self.to_with("to_start_with", prefix)
    }

    /// String ends with `suffix`.
    #[track_caller]
    pub fn to_end_with(&self, suffix: &str) -> SpecOutcome {
        self.to_with("to_end_with", suffix)
    }

    /// JSON type name is `type_name` (`null`, `boolean`, `number`, `string`,
    /// `array`, `object`).
    #[track_caller]
    pub fn to_be_type_of(&self, type_name: &str) -> SpecOutcome {
        self.to_with("to_be_type_of", type_name)
    }

    /// The captured function returned an error.
    #[track_caller]
    pub fn to_throw(&self) -> SpecOutcome {
        self.to("to_throw", &[])
    }

    /// The captured function returned an error whose message contains
    /// `fragment`.
    #[track_caller]
    pub fn to_throw_with(&self, fragment: &str) -> SpecOutcome {
        self.to_with("to_throw", fragment)
    }
}
