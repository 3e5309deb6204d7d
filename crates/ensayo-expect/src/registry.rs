//! Matcher registry.
//!
//! Matchers are looked up by name at assertion time. A process-wide
//! registry holds the built-ins plus anything added through
//! [`register_matcher`]; isolated [`MatcherRegistry`] instances can be built
//! for tests that must not see global registrations.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use crate::chain::ExpectationChain;
use crate::error::{MatcherError, Result};

/// Inputs to one matcher evaluation.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// Matcher name, for error messages.
    pub name: &'a str,
    /// Value under test.
    pub actual: &'a Value,
    /// Expected values passed to the matcher.
    pub expected: &'a [Value],
    /// True when the chain was negated. Informational; the chain applies
    /// negation itself.
    pub negated: bool,
}

impl<'a> MatchContext<'a> {
    /// Checks the expected-value count is within `min..=max`.
    ///
    /// # Errors
    /// Returns [`MatcherError::Arity`] otherwise.
    pub fn arity(&self, min: usize, max: usize) -> Result<()> {
        let got = self.expected.len();
        if (min..=max).contains(&got) {
            return Ok(());
        }
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        Err(MatcherError::Arity {
            matcher: self.name.to_string(),
            expected,
            got,
        })
    }

    /// Returns the expected value at `index`, checking presence.
    ///
    /// # Errors
    /// Returns [`MatcherError::Arity`] if missing.
    pub fn arg(&self, index: usize) -> Result<&'a Value> {
        self.expected.get(index).ok_or_else(|| MatcherError::Arity {
            matcher: self.name.to_string(),
            expected: format!("at least {}", index + 1),
            got: self.expected.len(),
        })
    }

    /// Builds an invalid-argument error for this matcher.
    #[must_use]
    pub fn invalid(&self, reason: impl Into<String>) -> MatcherError {
        MatcherError::invalid(self.name, reason)
    }
}

/// Outcome of a matcher, before negation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the positive form held.
    pub matched: bool,
    /// Failure message for the positive form.
    pub message: String,
    /// Failure message for the negated form.
    pub negated_message: String,
}

impl Verdict {
    /// Creates a verdict.
    #[must_use]
    pub fn new(matched: bool, message: impl Into<String>, negated_message: impl Into<String>) -> Self {
        Self {
            matched,
            message: message.into(),
            negated_message: negated_message.into(),
        }
    }

    /// Message to report when the chain with the given polarity fails.
    #[must_use]
    pub fn message_for(&self, negated: bool) -> &str {
        if negated {
            &self.negated_message
        } else {
            &self.message
        }
    }
}

/// A named predicate over an actual value and expected values.
pub trait Matcher: Send + Sync {
    /// Evaluates the positive form of the matcher.
    ///
    /// # Errors
    /// Returns a [`MatcherError`] on misuse (wrong arity or value types).
    fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Verdict>;
}

impl<F> Matcher for F
where
    F: Fn(&MatchContext<'_>) -> Result<Verdict> + Send + Sync,
{
    fn evaluate(&self, ctx: &MatchContext<'_>) -> Result<Verdict> {
        self(ctx)
    }
}

/// Name-to-matcher map.
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: HashMap<String, Arc<dyn Matcher>>,
}

impl MatcherRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in matchers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::matchers::register_builtins(&mut registry);
        registry
    }

    /// Registers a matcher. The last registration under a name wins; the
    /// replaced matcher is returned.
    pub fn register<M>(&mut self, name: impl Into<String>, matcher: M) -> Option<Arc<dyn Matcher>>
    where
        M: Matcher + 'static,
    {
        let name = name.into();
        let previous = self.matchers.insert(name.clone(), Arc::new(matcher));
        if previous.is_some() {
            tracing::debug!(matcher = %name, "matcher overridden");
        }
        previous
    }

    /// Looks up a matcher.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Matcher>> {
        self.matchers.get(name).cloned()
    }

    /// Returns true if a matcher is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.matchers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Starts an expectation chain bound to this registry.
    pub fn expect<T: Serialize>(&self, actual: T) -> ExpectationChain<'_> {
        ExpectationChain::with_registry(actual, self)
    }
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.names())
            .finish()
    }
}

static GLOBAL: LazyLock<RwLock<MatcherRegistry>> =
    LazyLock::new(|| RwLock::new(MatcherRegistry::with_builtins()));

/// Registers a matcher in the process-wide registry used by
/// [`expect`](crate::expect). Returns the replaced matcher, if any.
pub fn register_matcher<M>(name: impl Into<String>, matcher: M) -> Option<Arc<dyn Matcher>>
where
    M: Matcher + 'static,
{
    GLOBAL.write().register(name, matcher)
}

/// Looks up a matcher in the process-wide registry.
#[must_use]
pub fn global_matcher(name: &str) -> Option<Arc<dyn Matcher>> {
    GLOBAL.read().get(name)
}

/// Names in the process-wide registry, sorted.
#[must_use]
pub fn global_matcher_names() -> Vec<String> {
    GLOBAL.read().names().into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn always(matched: bool) -> impl Fn(&MatchContext<'_>) -> Result<Verdict> + Send + Sync {
        move |_: &MatchContext<'_>| Ok(Verdict::new(matched, "positive", "negative"))
    }

    #[test]
    fn test_register_last_wins() {
        let mut registry = MatcherRegistry::new();
        assert!(registry.register("to_pass", always(false)).is_none());
        assert!(registry.register("to_pass", always(true)).is_some());
        assert_eq!(registry.len(), 1);

        let ctx = MatchContext {
            name: "to_pass",
            actual: &json!(null),
            expected: &[],
            negated: false,
        };
        assert!(registry.get("to_pass").unwrap().evaluate(&ctx).unwrap().matched);
    }

    #[test]
    fn test_builtins_present() {
        let registry = MatcherRegistry::with_builtins();
        for name in ["to_be", "to_equal", "to_contain", "to_match", "to_throw"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(!MatcherRegistry::new().contains("to_be"));
    }

    #[test]
    fn test_isolated_registry_does_not_leak() {
        let mut local = MatcherRegistry::with_builtins();
        local.register("to_be_local_only", always(true));
        assert!(global_matcher("to_be_local_only").is_none());
    }

    #[test]
    fn test_global_registration() {
        register_matcher("to_be_registry_test", always(true));
        assert!(global_matcher("to_be_registry_test").is_some());
        assert!(global_matcher_names().iter().any(|n| n == "to_be_registry_test"));
    }

    #[test]
    fn test_arity_check() {
        let ctx = MatchContext {
            name: "to_be_between",
            actual: &json!(1),
            expected: &[json!(0)],
            negated: false,
        };
        let err = ctx.arity(2, 2).unwrap_err();
        assert_eq!(err.to_string(), "matcher 'to_be_between' takes 2 argument(s), got 1");
        assert!(ctx.arity(1, 2).is_ok());
        assert!(ctx.arg(1).is_err());
        assert_eq!(ctx.arg(0).unwrap(), &json!(0));
    }

    #[test]
    fn test_verdict_message_for() {
        let v = Verdict::new(true, "pos", "neg");
        assert_eq!(v.message_for(false), "pos");
        assert_eq!(v.message_for(true), "neg");
    }
}
