//! The mock surface: a cloneable handle shared between the spec that
//! configures it and the code under test that calls it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call_log::{CallLog, CallOutcome, CallRecord};
use crate::contract::{Component, Contract, TargetIdentity};
use crate::error::{MockError, Result};
use crate::rule::{ArgMatcher, Fired, StubAction, StubRule};

/// Unique identifier for a mock surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MockId(uuid::Uuid);

impl MockId {
    /// Creates a new random mock ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for MockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a surface was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Replaces a target; unstubbed calls return `null`.
    Mock,
    /// Free-standing; every method comes from stub configuration.
    Stub,
    /// Wraps a live target; unstubbed calls delegate to it.
    Spy,
    /// Contract shape only.
    Empty,
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mock => "mock",
            Self::Stub => "stub",
            Self::Spy => "spy",
            Self::Empty => "empty mock",
        };
        write!(f, "{s}")
    }
}

#[derive(Default)]
struct SurfaceState {
    rules: HashMap<String, Vec<StubRule>>,
    logs: BTreeMap<String, CallLog>,
    next_sequence: u64,
}

struct SurfaceInner {
    id: MockId,
    kind: SurfaceKind,
    target: TargetIdentity,
    /// Declared methods; `None` accepts any name.
    methods: Option<BTreeSet<String>>,
    original: Option<Arc<dyn Component>>,
    spied: Option<String>,
    state: Mutex<SurfaceState>,
}

/// Configurable substitute for a component.
///
/// Clones share state, so a surface can be handed to the code under test
/// and verified afterwards through another clone.
///
/// # Example
///
/// ```rust
/// use ensayo_mock::MockFactory;
/// use serde_json::json;
///
/// let db = MockFactory::new().create_stub();
/// db.stub("get").returns(json!("v1"));
/// db.stub("get").with_args([json!("missing")]).raises("no such key");
///
/// assert_eq!(db.invoke("get", &[json!("k")])?, json!("v1"));
/// assert!(db.invoke("get", &[json!("missing")]).is_err());
/// assert!(db.times(2, "get"));
/// # Ok::<(), ensayo_mock::MockError>(())
/// ```
#[derive(Clone)]
pub struct MockSurface {
    inner: Arc<SurfaceInner>,
}

impl MockSurface {
    pub(crate) fn new(
        kind: SurfaceKind,
        target: TargetIdentity,
        methods: Option<BTreeSet<String>>,
        original: Option<Arc<dyn Component>>,
        spied: Option<String>,
    ) -> Self {
        let surface = Self {
            inner: Arc::new(SurfaceInner {
                id: MockId::new(),
                kind,
                target,
                methods,
                original,
                spied,
                state: Mutex::new(SurfaceState::default()),
            }),
        };
        tracing::debug!(mock = %surface.id(), kind = %kind, target = %surface.target(), "mock surface created");
        surface
    }

    /// Surface id.
    #[must_use]
    pub fn id(&self) -> MockId {
        self.inner.id
    }

    /// How the surface was created.
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        self.inner.kind
    }

    /// What the surface stands in for.
    #[must_use]
    pub fn target(&self) -> &TargetIdentity {
        &self.inner.target
    }

    /// Method named when a spy was created.
    #[must_use]
    pub fn spied_method(&self) -> Option<&str> {
        self.inner.spied.as_deref()
    }

    /// Returns true if a live implementation backs the surface.
    #[must_use]
    pub fn has_original(&self) -> bool {
        self.inner.original.is_some()
    }

    /// Contract-declared methods plus any stubbed method, sorted.
    #[must_use]
    pub fn methods(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        let mut names: BTreeSet<String> = self.inner.methods.clone().unwrap_or_default();
        names.extend(state.rules.keys().cloned());
        names.into_iter().collect()
    }

    /// Returns true if calling `method` is allowed.
    #[must_use]
    pub fn responds_to(&self, method: &str) -> bool {
        self.inner.methods.as_ref().is_none_or(|m| m.contains(method))
            || self.inner.state.lock().rules.contains_key(method)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────

    /// Begins a rule for `method`. The rule accepts any arguments and
    /// returns `null` until configured further; newer rules take
    /// precedence over older ones.
    pub fn stub(&self, method: impl Into<String>) -> RuleBuilder<'_> {
        let method = method.into();
        let index = {
            let mut state = self.inner.state.lock();
            let rules = state.rules.entry(method.clone()).or_default();
            rules.push(StubRule::new());
            rules.len() - 1
        };
        tracing::trace!(mock = %self.id(), method = %method, "stub rule added");
        RuleBuilder {
            surface: self,
            method,
            index,
        }
    }

    /// Removes every rule, keeping call logs.
    pub fn clear_stubs(&self) {
        self.inner.state.lock().rules.clear();
    }

    /// Rules for `method`, oldest first.
    #[must_use]
    pub fn rules(&self, method: &str) -> Vec<StubRule> {
        self.inner.state.lock().rules.get(method).cloned().unwrap_or_default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Invocation
    // ─────────────────────────────────────────────────────────────────────

    /// Invokes `method` with `args`.
    ///
    /// The call is logged on entry, before any rule is consulted, so logs
    /// keep invocation order even when the original re-enters the surface.
    /// The newest rule that accepts the arguments (and is not exhausted)
    /// decides the result. Without one, spies delegate to the original and
    /// everything else returns `null`.
    ///
    /// Argument predicates run without the surface lock held and may read
    /// the surface they guard.
    ///
    /// # Errors
    /// - [`MockError::UnknownMethod`] for a name outside the contract that
    ///   was never stubbed (nothing is logged)
    /// - [`MockError::Raised`] from a raising rule
    /// - [`MockError::NoOriginal`] / [`MockError::Original`] from delegation
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value> {
        let (candidates, sequence) = {
            let mut state = self.inner.state.lock();
            let stubbed = state.rules.contains_key(method);
            if !stubbed && self.inner.methods.as_ref().is_some_and(|m| !m.contains(method)) {
                return Err(MockError::unknown_method(self.target().name(), method));
            }
            let candidates: Vec<(usize, ArgMatcher)> = state
                .rules
                .get(method)
                .map(|rules| {
                    rules
                        .iter()
                        .enumerate()
                        .rev()
                        .filter(|(_, r)| !r.is_exhausted())
                        .map(|(i, r)| (i, r.matcher().clone()))
                        .collect()
                })
                .unwrap_or_default();
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.logs.entry(method.to_string()).or_default().push(CallRecord {
                args: args.to_vec(),
                outcome: CallOutcome::Pending,
                sequence,
                timestamp_ms: now_ms(),
            });
            (candidates, sequence)
        };

        let fired = self.fire_first_accepting(method, args, candidates);

        // The lock is not held here: an original may call back into the surface.
        let result = match fired {
            Some(Fired::Return(value)) => Ok(value),
            Some(Fired::Raise(message)) => Err(MockError::Raised(message)),
            Some(Fired::CallThrough) => self.call_original(method, args),
            None if self.inner.kind == SurfaceKind::Spy => self.call_original(method, args),
            None => Ok(Value::Null),
        };

        let outcome = match &result {
            Ok(value) => CallOutcome::Returned(value.clone()),
            Err(err) => CallOutcome::Raised(err.to_string()),
        };
        tracing::trace!(mock = %self.id(), method, sequence, raised = outcome.is_raised(), "mock invoked");
        let kept = self
            .inner
            .state
            .lock()
            .logs
            .get_mut(method)
            .is_some_and(|log| log.complete(sequence, outcome));
        if !kept {
            tracing::trace!(mock = %self.id(), method, sequence, "call log reset during call");
        }
        result
    }

    /// Fires the newest candidate whose matcher accepts `args`.
    ///
    /// Matchers are evaluated unlocked; the chosen rule is re-checked under
    /// the lock, since a re-entrant call may have exhausted or cleared it.
    fn fire_first_accepting(
        &self,
        method: &str,
        args: &[Value],
        candidates: Vec<(usize, ArgMatcher)>,
    ) -> Option<Fired> {
        for (index, matcher) in candidates {
            if !matcher.matches(args) {
                continue;
            }
            let mut state = self.inner.state.lock();
            let rule = state
                .rules
                .get_mut(method)
                .and_then(|rules| rules.get_mut(index))
                .filter(|r| !r.is_exhausted());
            if let Some(rule) = rule {
                return Some(rule.fire());
            }
        }
        None
    }

    fn call_original(&self, method: &str, args: &[Value]) -> Result<Value> {
        let original = self
            .inner
            .original
            .as_ref()
            .ok_or_else(|| MockError::no_original(self.target().name(), method))?;
        original.invoke(method, args).map_err(|message| MockError::Original {
            method: method.to_string(),
            message,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────

    /// Snapshot of the call log for `method`.
    #[must_use]
    pub fn call_log(&self, method: &str) -> CallLog {
        self.inner.state.lock().logs.get(method).cloned().unwrap_or_default()
    }

    /// Snapshot of every call log, keyed by method.
    #[must_use]
    pub fn call_logs(&self) -> BTreeMap<String, CallLog> {
        self.inner.state.lock().logs.clone()
    }

    /// Number of calls to `method`.
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.inner.state.lock().logs.get(method).map_or(0, CallLog::len)
    }

    /// Returns true if `method` was called exactly `n` times.
    #[must_use]
    pub fn times(&self, n: usize, method: &str) -> bool {
        self.call_count(method) == n
    }

    /// Returns true if exactly `n` calls to `method` had arguments
    /// satisfying `matcher`.
    #[must_use]
    pub fn times_matching(&self, n: usize, method: &str, matcher: &ArgMatcher) -> bool {
        self.call_log(method).count_matching(matcher) == n
    }

    /// Returns true if `method` was called at least once.
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Returns true if some call to `method` had exactly `args`.
    #[must_use]
    pub fn was_called_with(&self, method: &str, args: &[Value]) -> bool {
        let matcher = ArgMatcher::exact(args.iter().cloned());
        self.call_log(method).count_matching(&matcher) > 0
    }

    /// Returns true if `method` was never called.
    #[must_use]
    pub fn never(&self, method: &str) -> bool {
        !self.was_called(method)
    }

    /// Total calls across all methods.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.inner.state.lock().logs.values().map(CallLog::len).sum()
    }

    /// Clears every call log. Rules and their hit counts are kept.
    pub fn reset_calls(&self) {
        self.inner.state.lock().logs.clear();
    }

    fn with_rule(&self, method: &str, index: usize, f: impl FnOnce(&mut StubRule)) {
        let mut state = self.inner.state.lock();
        if let Some(rule) = state.rules.get_mut(method).and_then(|rules| rules.get_mut(index)) {
            f(rule);
        }
    }
}

impl Component for MockSurface {
    fn contract(&self) -> Contract {
        Contract::new(self.target().name(), self.methods())
    }

    fn invoke(&self, method: &str, args: &[Value]) -> std::result::Result<Value, String> {
        Self::invoke(self, method, args).map_err(|e| e.to_string())
    }
}

impl fmt::Debug for MockSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSurface")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("target", &self.inner.target)
            .finish_non_exhaustive()
    }
}

/// Configures the rule begun by [`MockSurface::stub`].
///
/// Setters apply immediately, so the builder can be dropped at any point.
#[derive(Debug)]
pub struct RuleBuilder<'s> {
    surface: &'s MockSurface,
    method: String,
    index: usize,
}

impl RuleBuilder<'_> {
    /// Only answer calls with exactly these arguments.
    pub fn with_args(self, args: impl IntoIterator<Item = Value>) -> Self {
        let matcher = ArgMatcher::exact(args);
        self.surface.with_rule(&self.method, self.index, |r| r.set_matcher(matcher));
        self
    }

    /// Only answer calls whose arguments satisfy `predicate`.
    pub fn matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        let matcher = ArgMatcher::predicate(predicate);
        self.surface.with_rule(&self.method, self.index, |r| r.set_matcher(matcher));
        self
    }

    /// Stop answering after `n` calls, letting older rules take over.
    pub fn max_calls(self, n: usize) -> Self {
        self.surface.with_rule(&self.method, self.index, |r| r.set_max_calls(n));
        self
    }

    /// Return `value`.
    pub fn returns(self, value: impl Into<Value>) -> Self {
        self.action(StubAction::Return(value.into()))
    }

    /// Return each value in turn, wrapping around.
    pub fn returns_each<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.action(StubAction::Sequence(values.into_iter().map(Into::into).collect()))
    }

    /// Raise an error with `message`.
    pub fn raises(self, message: impl Into<String>) -> Self {
        self.action(StubAction::Raise(message.into()))
    }

    /// Delegate to the original implementation.
    pub fn call_through(self) -> Self {
        self.action(StubAction::CallThrough)
    }

    fn action(self, action: StubAction) -> Self {
        self.surface.with_rule(&self.method, self.index, |r| r.set_action(action));
        self
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
