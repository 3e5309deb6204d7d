//! Stub rules: an argument matcher plus an action.

use std::fmt;
use std::sync::Arc;

use ensayo_expect::deep_equals;
use serde_json::Value;

type Predicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;

/// Constraint on the arguments of a call.
#[derive(Clone, Default)]
pub enum ArgMatcher {
    /// Accepts any arguments.
    #[default]
    Any,
    /// Accepts exactly these arguments, compared with deep equality.
    Exact(Vec<Value>),
    /// Accepts arguments for which the predicate holds.
    Predicate(Predicate),
}

impl ArgMatcher {
    /// Exact-arguments matcher.
    #[must_use]
    pub fn exact(args: impl IntoIterator<Item = Value>) -> Self {
        Self::Exact(args.into_iter().collect())
    }

    /// Predicate matcher.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Returns true if `args` satisfy the constraint.
    #[must_use]
    pub fn matches(&self, args: &[Value]) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => {
                expected.len() == args.len() && expected.iter().zip(args).all(|(e, a)| deep_equals(e, a))
            }
            Self::Predicate(f) => f(args),
        }
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Exact(args) => f.debug_tuple("Exact").field(args).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq)]
pub enum StubAction {
    /// Return a fixed value.
    Return(Value),
    /// Return the values in turn, wrapping around after the last.
    Sequence(Vec<Value>),
    /// Raise an error with this message.
    Raise(String),
    /// Delegate to the original implementation.
    CallThrough,
}

impl Default for StubAction {
    fn default() -> Self {
        Self::Return(Value::Null)
    }
}

/// Action chosen for one call, resolved from a [`StubAction`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fired {
    Return(Value),
    Raise(String),
    CallThrough,
}

/// One configured behavior for a method.
#[derive(Debug, Clone, Default)]
pub struct StubRule {
    matcher: ArgMatcher,
    action: StubAction,
    max_calls: Option<usize>,
    hits: usize,
}

impl StubRule {
    /// Creates a rule accepting any arguments and returning `null`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Argument constraint.
    #[must_use]
    pub const fn matcher(&self) -> &ArgMatcher {
        &self.matcher
    }

    /// Configured action.
    #[must_use]
    pub const fn action(&self) -> &StubAction {
        &self.action
    }

    /// Call limit, if any.
    #[must_use]
    pub const fn max_calls(&self) -> Option<usize> {
        self.max_calls
    }

    /// Calls this rule has answered.
    #[must_use]
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Returns true once the call limit is reached.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.max_calls.is_some_and(|max| self.hits >= max)
    }

    /// Returns true if the rule would answer a call with `args`.
    #[must_use]
    pub fn accepts(&self, args: &[Value]) -> bool {
        !self.is_exhausted() && self.matcher.matches(args)
    }

    pub(crate) fn set_matcher(&mut self, matcher: ArgMatcher) {
        self.matcher = matcher;
    }

    pub(crate) fn set_action(&mut self, action: StubAction) {
        self.action = action;
    }

    pub(crate) fn set_max_calls(&mut self, max: usize) {
        self.max_calls = Some(max);
    }

    /// Consumes one hit and resolves the action for this call.
    pub(crate) fn fire(&mut self) -> Fired {
        let hit = self.hits;
        self.hits += 1;
        match &self.action {
            StubAction::Return(v) => Fired::Return(v.clone()),
            StubAction::Sequence(values) if values.is_empty() => Fired::Return(Value::Null),
            StubAction::Sequence(values) => Fired::Return(values[hit % values.len()].clone()),
            StubAction::Raise(message) => Fired::Raise(message.clone()),
            StubAction::CallThrough => Fired::CallThrough,
        }
    }
}
