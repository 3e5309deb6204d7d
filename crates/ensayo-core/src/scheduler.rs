//! Execution scheduler.
//!
//! Runs a [`SuiteTree`] depth-first in declaration order. Filtering is
//! decided up front by [`ExecutionScheduler::plan`]; traversal then only
//! consults the plan.
//!
//! # Hook order for one spec
//!
//! ```text
//! root.beforeEach → … → owner.beforeEach → body → owner.afterEach → … → root.afterEach
//! ```
//!
//! `afterEach` runs for every level whose `beforeEach` set started, even
//! when a hook or the body raised.

use std::collections::{BTreeSet, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::error::{FrameworkError, Result};
use crate::failure::{Failure, FailureKind, SpecError, SpecOutcome};
use crate::result::{ResultAggregator, SuiteResult};
use crate::suite::{Member, SuiteTree};
use crate::types::{Phase, SkipReason, SpecId, SpecStatus, SuiteId};

/// Planned fate of a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Execute hooks and body.
    Run,
    /// Mark skipped without running anything.
    Skip(SkipReason),
}

/// Filtering decisions for one tree.
#[derive(Debug, Clone)]
pub struct Plan {
    specs: Vec<Disposition>,
    runnable_suites: Vec<bool>,
    focus_mode: bool,
}

impl Plan {
    /// Returns the disposition of a spec.
    #[must_use]
    pub fn disposition(&self, id: SpecId) -> Disposition {
        self.specs[id.index()]
    }

    /// Returns true if any spec below the suite will run.
    #[must_use]
    pub fn is_runnable(&self, id: SuiteId) -> bool {
        self.runnable_suites[id.index()]
    }

    /// Returns true if focus filtering is active.
    #[must_use]
    pub const fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    /// Number of specs that will run.
    #[must_use]
    pub fn runnable_count(&self) -> usize {
        self.specs
            .iter()
            .filter(|d| matches!(d, Disposition::Run))
            .count()
    }
}

/// Walks a suite tree, applies filters, runs hooks and specs.
#[derive(Debug, Clone, Default)]
pub struct ExecutionScheduler {
    config: RunConfig,
}

impl ExecutionScheduler {
    /// Creates a scheduler for the given run configuration.
    #[must_use]
    pub const fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Decides which specs run.
    ///
    /// Precedence: effective skip, then focus, then exclude labels, then
    /// include labels.
    #[must_use]
    pub fn plan(&self, tree: &SuiteTree) -> Plan {
        let focus_mode = tree.has_focus() && !self.config.ignore_focus;
        let include = self.config.include_set();
        let exclude = self.config.exclude_set();

        let specs: Vec<_> = tree
            .spec_ids()
            .map(|id| Self::dispose(tree, id, focus_mode, &include, &exclude))
            .collect();

        let mut runnable_suites = vec![false; tree.suite_count()];
        for id in tree.spec_ids() {
            if specs[id.index()] == Disposition::Run {
                for suite in tree.ancestry(tree.spec(id).suite()) {
                    runnable_suites[suite.index()] = true;
                }
            }
        }

        Plan {
            specs,
            runnable_suites,
            focus_mode,
        }
    }

    fn dispose(
        tree: &SuiteTree,
        id: SpecId,
        focus_mode: bool,
        include: &BTreeSet<&str>,
        exclude: &BTreeSet<&str>,
    ) -> Disposition {
        if tree.spec_effectively_skipped(id) {
            return Disposition::Skip(SkipReason::Skipped);
        }
        if focus_mode && !tree.spec_effectively_focused(id) {
            return Disposition::Skip(SkipReason::NotFocused);
        }
        let labels = tree.spec_effective_labels(id);
        if !labels.is_disjoint(exclude) {
            return Disposition::Skip(SkipReason::Excluded);
        }
        if !include.is_empty() && labels.is_disjoint(include) {
            return Disposition::Skip(SkipReason::NotIncluded);
        }
        Disposition::Run
    }

    /// Executes the tree and returns its result tree.
    ///
    /// Specs are mutated in place; a tree can only be executed once.
    ///
    /// # Errors
    /// Returns a [`FrameworkError`] for an invalid configuration, a tree
    /// that already ran, or a broken status transition. Hook and body
    /// failures are never errors here; they are recorded on the specs.
    pub fn run(&self, tree: &mut SuiteTree) -> Result<SuiteResult> {
        self.config.validate()?;
        if let Some(id) = tree
            .spec_ids()
            .find(|id| tree.spec(*id).status() != SpecStatus::Pending)
        {
            let spec = tree.spec(id);
            return Err(FrameworkError::AlreadyExecuted {
                spec: spec.name().to_string(),
                status: spec.status(),
            });
        }

        let plan = self.plan(tree);
        let root = tree.root();
        tracing::info!(
            root = %tree.suite(root).name(),
            specs = tree.spec_count(),
            runnable = plan.runnable_count(),
            focus = plan.focus_mode(),
            "starting run"
        );

        let mut execution = Execution {
            tree,
            plan: &plan,
            default_timeout: self.config.default_timeout,
            hook_failures: HashMap::new(),
        };
        execution.run_suite(root, None)?;

        let Execution {
            tree,
            hook_failures,
            ..
        } = execution;
        let result = ResultAggregator::aggregate(tree, &hook_failures);
        tracing::info!(
            root = %result.name,
            passed = result.summary.passed,
            failed = result.summary.failed,
            errored = result.summary.errored,
            skipped = result.summary.skipped,
            "run complete"
        );
        Ok(result)
    }
}

/// State of one in-progress run.
struct Execution<'a> {
    tree: &'a mut SuiteTree,
    plan: &'a Plan,
    default_timeout: Option<Duration>,
    hook_failures: HashMap<SuiteId, Vec<Failure>>,
}

impl Execution<'_> {
    fn run_suite(&mut self, id: SuiteId, inherited: Option<&Failure>) -> Result<()> {
        if !self.plan.is_runnable(id) {
            for spec in self.tree.specs_under(id) {
                self.mark_planned(spec)?;
            }
            return Ok(());
        }

        let name = self.tree.suite(id).name().to_string();
        let mut cascade = inherited.cloned();

        // beforeAll only runs when no ancestor's beforeAll failed.
        let ran_before_all = inherited.is_none();
        if ran_before_all {
            let mut cause = None;
            for hook in self.tree.suite(id).hooks(Phase::BeforeAll) {
                if let Err(err) = invoke(|| hook.call()) {
                    cause = Some(Failure::from(err).in_hook(Phase::BeforeAll));
                    break;
                }
            }
            if let Some(cause) = cause {
                tracing::warn!(suite = %name, error = %cause, "beforeAll failed; cascading to specs");
                cascade = Some(Failure::cascade(&name, &cause));
                self.record_hook_failure(id, cause);
            }
        }

        let members = self.tree.suite(id).members().to_vec();
        for member in members {
            match member {
                Member::Spec(spec) => self.run_spec(spec, cascade.as_ref())?,
                Member::Suite(child) => self.run_suite(child, cascade.as_ref())?,
            }
        }

        if ran_before_all {
            let mut failures = Vec::new();
            for hook in self.tree.suite(id).hooks(Phase::AfterAll) {
                if let Err(err) = invoke(|| hook.call()) {
                    failures.push(Failure::from(err).in_hook(Phase::AfterAll));
                }
            }
            for failure in failures {
                tracing::warn!(suite = %name, error = %failure, "afterAll failed");
                self.record_hook_failure(id, failure);
            }
        }
        Ok(())
    }

    fn run_spec(&mut self, id: SpecId, cascade: Option<&Failure>) -> Result<()> {
        if self.plan.disposition(id) != Disposition::Run {
            return self.mark_planned(id);
        }
        if let Some(cascade) = cascade {
            tracing::debug!(spec = %self.tree.spec(id).name(), "errored by beforeAll cascade");
            return self.tree.spec_mut(id).complete(
                SpecStatus::Errored,
                Some(cascade.clone()),
                Duration::ZERO,
            );
        }

        self.tree.spec_mut(id).begin()?;
        let path = self.tree.path_to(self.tree.spec(id).suite());
        let start = Instant::now();
        let mut failure: Option<Failure> = None;

        let mut started = 0;
        'before: for suite in &path {
            started += 1;
            for hook in self.tree.suite(*suite).hooks(Phase::BeforeEach) {
                if let Err(err) = invoke(|| hook.call()) {
                    failure = Some(Failure::from(err).in_hook(Phase::BeforeEach));
                    break 'before;
                }
            }
        }

        if failure.is_none() {
            if let Err(err) = invoke(|| self.tree.spec(id).call()) {
                failure = Some(Failure::from(err));
            }
        }

        for suite in path[..started].iter().rev() {
            for hook in self.tree.suite(*suite).hooks(Phase::AfterEach) {
                if let Err(err) = invoke(|| hook.call()) {
                    let err = Failure::from(err).in_hook(Phase::AfterEach);
                    if failure.is_none() {
                        failure = Some(err);
                    } else {
                        tracing::warn!(spec = %self.tree.spec(id).name(), error = %err, "afterEach failed after earlier failure");
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        let limit = self
            .tree
            .spec_effective_timeout(id)
            .or(self.default_timeout);
        if let Some(limit) = limit {
            if elapsed > limit {
                failure = Some(Failure::timeout(limit, elapsed));
            }
        }

        let status = match &failure {
            None => SpecStatus::Passed,
            Some(f) if f.kind == FailureKind::Assertion => SpecStatus::Failed,
            Some(_) => SpecStatus::Errored,
        };
        tracing::debug!(
            spec = %self.tree.spec(id).name(),
            status = %status,
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "spec finished"
        );
        self.tree.spec_mut(id).complete(status, failure, elapsed)
    }

    fn mark_planned(&mut self, id: SpecId) -> Result<()> {
        let reason = match self.plan.disposition(id) {
            Disposition::Skip(reason) => reason,
            // Only reachable for a runnable spec inside a non-runnable suite,
            // which the plan never produces.
            Disposition::Run => SkipReason::Skipped,
        };
        tracing::trace!(spec = %self.tree.spec(id).name(), reason = ?reason, "spec skipped");
        self.tree.spec_mut(id).skip(reason)
    }

    fn record_hook_failure(&mut self, suite: SuiteId, failure: Failure) {
        self.hook_failures.entry(suite).or_default().push(failure);
    }
}

/// Calls a hook or body, turning panics into runtime errors.
fn invoke<F>(f: F) -> SpecOutcome
where
    F: FnOnce() -> SpecOutcome,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };
            Err(SpecError::Runtime {
                message: format!("panicked: {msg}"),
                location: None,
            })
        }
    }
}
