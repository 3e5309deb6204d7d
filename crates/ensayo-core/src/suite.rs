//! Suite tree data model.
//!
//! Suites and specs live in one arena owned by [`SuiteTree`]. A suite owns
//! its members and hooks through the arena; the parent link is an id only,
//! so there is no ownership cycle.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::error::{FrameworkError, Result};
use crate::failure::{Failure, SpecOutcome};
use crate::types::{Phase, SkipReason, SpecId, SpecStatus, SuiteId};

/// Executable body of a spec or hook.
pub type Body = Box<dyn Fn() -> SpecOutcome>;

/// A suite member in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    /// Nested suite.
    Suite(SuiteId),
    /// Spec.
    Spec(SpecId),
}

/// Lifecycle callable bound to a suite and a phase.
pub struct Hook {
    phase: Phase,
    owner: SuiteId,
    body: Body,
}

impl Hook {
    /// Returns the hook phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the owning suite.
    #[must_use]
    pub const fn owner(&self) -> SuiteId {
        self.owner
    }

    /// Runs the hook body.
    pub fn call(&self) -> SpecOutcome {
        (self.body)()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("phase", &self.phase)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Hooks of one suite, one ordered list per phase.
#[derive(Default)]
struct HookSet {
    before_all: Vec<Hook>,
    before_each: Vec<Hook>,
    after_each: Vec<Hook>,
    after_all: Vec<Hook>,
}

impl HookSet {
    fn get(&self, phase: Phase) -> &[Hook] {
        match phase {
            Phase::BeforeAll => &self.before_all,
            Phase::BeforeEach => &self.before_each,
            Phase::AfterEach => &self.after_each,
            Phase::AfterAll => &self.after_all,
        }
    }

    fn get_mut(&mut self, phase: Phase) -> &mut Vec<Hook> {
        match phase {
            Phase::BeforeAll => &mut self.before_all,
            Phase::BeforeEach => &mut self.before_each,
            Phase::AfterEach => &mut self.after_each,
            Phase::AfterAll => &mut self.after_all,
        }
    }
}

/// A named group of specs, nested suites and hooks.
pub struct SuiteNode {
    name: String,
    parent: Option<SuiteId>,
    members: Vec<Member>,
    hooks: HookSet,
    labels: BTreeSet<String>,
    focused: bool,
    skipped: bool,
    timeout: Option<Duration>,
}

impl SuiteNode {
    /// Returns the suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent suite, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<SuiteId> {
        self.parent
    }

    /// Returns all members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns nested suites in declaration order.
    pub fn children(&self) -> impl Iterator<Item = SuiteId> + '_ {
        self.members.iter().filter_map(|m| match m {
            Member::Suite(id) => Some(*id),
            Member::Spec(_) => None,
        })
    }

    /// Returns specs in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = SpecId> + '_ {
        self.members.iter().filter_map(|m| match m {
            Member::Spec(id) => Some(*id),
            Member::Suite(_) => None,
        })
    }

    /// Returns the hooks registered for `phase`, in declaration order.
    #[must_use]
    pub fn hooks(&self, phase: Phase) -> &[Hook] {
        self.hooks.get(phase)
    }

    /// Returns the suite's own labels.
    #[must_use]
    pub const fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Returns the own focus flag.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Returns the own skip flag.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns the own timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for SuiteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("members", &self.members)
            .field("labels", &self.labels)
            .field("focused", &self.focused)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

/// A single executable test case.
pub struct SpecNode {
    name: String,
    suite: SuiteId,
    body: Body,
    labels: BTreeSet<String>,
    focused: bool,
    skipped: bool,
    timeout: Option<Duration>,
    status: SpecStatus,
    failure: Option<Failure>,
    skip_reason: Option<SkipReason>,
    duration: Duration,
}

impl SpecNode {
    /// Returns the spec name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the owning suite.
    #[must_use]
    pub const fn suite(&self) -> SuiteId {
        self.suite
    }

    /// Returns the spec's own labels.
    #[must_use]
    pub const fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Returns the own focus flag.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Returns the own skip flag.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns the own timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> SpecStatus {
        self.status
    }

    /// Returns the recorded failure.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    /// Returns why the spec was skipped.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        self.skip_reason
    }

    /// Returns elapsed time of hooks plus body.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Runs the spec body.
    pub(crate) fn call(&self) -> SpecOutcome {
        (self.body)()
    }

    fn transition(&mut self, next: SpecStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(FrameworkError::StatusTransition {
                spec: self.name.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// `Pending → Running`.
    pub(crate) fn begin(&mut self) -> Result<()> {
        self.transition(SpecStatus::Running)
    }

    /// `Pending → Skipped`.
    pub(crate) fn skip(&mut self, reason: SkipReason) -> Result<()> {
        self.transition(SpecStatus::Skipped)?;
        self.skip_reason = Some(reason);
        Ok(())
    }

    /// Records a terminal outcome.
    pub(crate) fn complete(
        &mut self,
        status: SpecStatus,
        failure: Option<Failure>,
        duration: Duration,
    ) -> Result<()> {
        self.transition(status)?;
        self.failure = failure;
        self.duration = duration;
        Ok(())
    }
}

impl fmt::Debug for SpecNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecNode")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("labels", &self.labels)
            .field("focused", &self.focused)
            .field("skipped", &self.skipped)
            .field("status", &self.status)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

/// Arena holding one suite tree.
#[derive(Debug)]
pub struct SuiteTree {
    suites: Vec<SuiteNode>,
    specs: Vec<SpecNode>,
    any_focus: bool,
}

/// Declaration-time flags shared by suites and specs.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeFlags {
    pub labels: BTreeSet<String>,
    pub focused: bool,
    pub skipped: bool,
    pub timeout: Option<Duration>,
}

impl SuiteTree {
    /// Creates a tree holding only the root suite.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            suites: vec![SuiteNode {
                name: root_name.into(),
                parent: None,
                members: Vec::new(),
                hooks: HookSet::default(),
                labels: BTreeSet::new(),
                focused: false,
                skipped: false,
                timeout: None,
            }],
            specs: Vec::new(),
            any_focus: false,
        }
    }

    /// Returns the root suite id.
    #[must_use]
    pub const fn root(&self) -> SuiteId {
        SuiteId(0)
    }

    /// Returns a suite.
    ///
    /// # Errors
    /// Returns an error if the id does not belong to this tree.
    pub fn try_suite(&self, id: SuiteId) -> Result<&SuiteNode> {
        self.suites.get(id.0).ok_or(FrameworkError::UnknownSuite(id))
    }

    /// Returns a suite; ids are only minted by this tree.
    ///
    /// # Panics
    /// Panics if `id` came from another tree. Use [`Self::try_suite`] for
    /// ids of unknown origin.
    #[must_use]
    pub fn suite(&self, id: SuiteId) -> &SuiteNode {
        &self.suites[id.0]
    }

    /// Returns a spec; ids are only minted by this tree.
    ///
    /// # Panics
    /// Panics if `id` came from another tree.
    #[must_use]
    pub fn spec(&self, id: SpecId) -> &SpecNode {
        &self.specs[id.0]
    }

    pub(crate) fn spec_mut(&mut self, id: SpecId) -> &mut SpecNode {
        &mut self.specs[id.0]
    }

    /// Returns true if any suite or spec carries the focus flag.
    #[must_use]
    pub const fn has_focus(&self) -> bool {
        self.any_focus
    }

    /// Number of suites, root included.
    #[must_use]
    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Number of specs.
    #[must_use]
    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }

    /// All spec ids in registration order.
    pub fn spec_ids(&self) -> impl Iterator<Item = SpecId> {
        (0..self.specs.len()).map(SpecId)
    }

    /// Iterates `id` and its ancestors, nearest first.
    pub fn ancestry(&self, id: SuiteId) -> impl Iterator<Item = SuiteId> + '_ {
        std::iter::successors(Some(id), |s| self.suite(*s).parent)
    }

    /// Suite chain from the root down to `id`, root first.
    #[must_use]
    pub fn path_to(&self, id: SuiteId) -> Vec<SuiteId> {
        let mut path: Vec<_> = self.ancestry(id).collect();
        path.reverse();
        path
    }

    /// Effective skip: own flag OR any ancestor's.
    #[must_use]
    pub fn spec_effectively_skipped(&self, id: SpecId) -> bool {
        let spec = self.spec(id);
        spec.skipped || self.ancestry(spec.suite).any(|s| self.suite(s).skipped)
    }

    /// Effective focus: own flag OR any ancestor's.
    #[must_use]
    pub fn spec_effectively_focused(&self, id: SpecId) -> bool {
        let spec = self.spec(id);
        spec.focused || self.ancestry(spec.suite).any(|s| self.suite(s).focused)
    }

    /// Effective labels: own labels united with every ancestor's.
    #[must_use]
    pub fn spec_effective_labels(&self, id: SpecId) -> BTreeSet<&str> {
        let spec = self.spec(id);
        spec.labels
            .iter()
            .chain(self.ancestry(spec.suite).flat_map(|s| self.suite(s).labels.iter()))
            .map(String::as_str)
            .collect()
    }

    /// Effective timeout: the spec's own, else the nearest suite's.
    #[must_use]
    pub fn spec_effective_timeout(&self, id: SpecId) -> Option<Duration> {
        let spec = self.spec(id);
        spec.timeout
            .or_else(|| self.ancestry(spec.suite).find_map(|s| self.suite(s).timeout))
    }

    /// Every spec below `id`, depth-first in declaration order.
    #[must_use]
    pub fn specs_under(&self, id: SuiteId) -> Vec<SpecId> {
        let mut out = Vec::new();
        self.collect_specs(id, &mut out);
        out
    }

    fn collect_specs(&self, id: SuiteId, out: &mut Vec<SpecId>) {
        for member in &self.suite(id).members {
            match member {
                Member::Spec(spec) => out.push(*spec),
                Member::Suite(child) => self.collect_specs(*child, out),
            }
        }
    }

    pub(crate) fn add_suite(
        &mut self,
        parent: SuiteId,
        name: String,
        flags: NodeFlags,
    ) -> SuiteId {
        let id = SuiteId(self.suites.len());
        self.any_focus |= flags.focused;
        self.suites.push(SuiteNode {
            name,
            parent: Some(parent),
            members: Vec::new(),
            hooks: HookSet::default(),
            labels: flags.labels,
            focused: flags.focused,
            skipped: flags.skipped,
            timeout: flags.timeout,
        });
        self.suites[parent.0].members.push(Member::Suite(id));
        id
    }

    pub(crate) fn add_spec(
        &mut self,
        suite: SuiteId,
        name: String,
        flags: NodeFlags,
        body: Body,
    ) -> SpecId {
        let id = SpecId(self.specs.len());
        self.any_focus |= flags.focused;
        self.specs.push(SpecNode {
            name,
            suite,
            body,
            labels: flags.labels,
            focused: flags.focused,
            skipped: flags.skipped,
            timeout: flags.timeout,
            status: SpecStatus::Pending,
            failure: None,
            skip_reason: None,
            duration: Duration::ZERO,
        });
        self.suites[suite.0].members.push(Member::Spec(id));
        id
    }

    pub(crate) fn add_hook(&mut self, owner: SuiteId, phase: Phase, body: Body) {
        self.suites[owner.0]
            .hooks
            .get_mut(phase)
            .push(Hook { phase, owner, body });
    }
}
