//! Result aggregation.
//!
//! Rolls executed specs up into a tree of [`SuiteResult`]s mirroring the
//! suite tree, with per-suite counts. Built once after a run; read-only
//! afterwards.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::humantime_serde;
use crate::failure::Failure;
use crate::suite::{Member, SuiteTree};
use crate::types::{SkipReason, SpecId, SpecStatus, SuiteId};

/// Status counts and total duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Specs counted.
    pub total: usize,
    /// Specs that passed.
    pub passed: usize,
    /// Specs with an assertion failure.
    pub failed: usize,
    /// Specs with a runtime error, timeout or cascade.
    pub errored: usize,
    /// Specs not executed.
    pub skipped: usize,
    /// Sum of spec durations.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

impl Summary {
    /// Counts one spec.
    pub fn record(&mut self, status: SpecStatus, duration: Duration) {
        self.total += 1;
        match status {
            SpecStatus::Passed => self.passed += 1,
            SpecStatus::Failed => self.failed += 1,
            SpecStatus::Errored => self.errored += 1,
            SpecStatus::Skipped => self.skipped += 1,
            SpecStatus::Pending | SpecStatus::Running => {}
        }
        self.duration += duration;
    }

    /// Adds another summary's counts.
    pub fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
        self.skipped += other.skipped;
        self.duration += other.duration;
    }

    /// True when every counted spec reached exactly one terminal status.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.passed + self.failed + self.errored + self.skipped == self.total
    }

    /// True when nothing failed or errored.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }
}

/// Outcome of one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecResult {
    /// Spec name.
    pub name: String,
    /// Own labels.
    pub labels: Vec<String>,
    /// Terminal status.
    pub status: SpecStatus,
    /// Elapsed time of hooks plus body.
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Failure detail for `failed` and `errored`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
    /// Why the spec was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
}

/// Outcome of one suite and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Suite name.
    pub name: String,
    /// Own labels.
    pub labels: Vec<String>,
    /// Counts over every spec below this suite.
    pub summary: Summary,
    /// `beforeAll` and `afterAll` failures raised by this suite's own hooks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hook_failures: Vec<Failure>,
    /// Members in declaration order.
    pub children: Vec<ResultNode>,
}

/// A member of a [`SuiteResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultNode {
    /// Nested suite.
    Suite(SuiteResult),
    /// Spec.
    Spec(SpecResult),
}

impl SuiteResult {
    /// True when no spec failed or errored and no suite hook failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.summary.all_passed() && self.suites().all(|s| s.hook_failures.is_empty())
    }

    /// Every spec result below this suite, depth-first.
    pub fn specs(&self) -> impl Iterator<Item = &SpecResult> + '_ {
        let mut out = Vec::new();
        self.collect(&mut out, &mut Vec::new());
        out.into_iter()
    }

    /// This suite and every nested suite, depth-first.
    pub fn suites(&self) -> impl Iterator<Item = &Self> + '_ {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);
        out.into_iter()
    }

    /// First spec result with the given name.
    #[must_use]
    pub fn find_spec(&self, name: &str) -> Option<&SpecResult> {
        self.specs().find(|s| s.name == name)
    }

    /// First suite result with the given name, this suite included.
    #[must_use]
    pub fn find_suite(&self, name: &str) -> Option<&Self> {
        self.suites().find(|s| s.name == name)
    }

    fn collect<'a>(&'a self, specs: &mut Vec<&'a SpecResult>, suites: &mut Vec<&'a Self>) {
        suites.push(self);
        for child in &self.children {
            match child {
                ResultNode::Spec(spec) => specs.push(spec),
                ResultNode::Suite(suite) => suite.collect(specs, suites),
            }
        }
    }
}

/// Builds result trees from executed suite trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator;

impl ResultAggregator {
    /// Aggregates the whole tree bottom-up.
    ///
    /// `hook_failures` carries suite-level hook failures recorded by the
    /// scheduler; suites absent from the map had none.
    #[must_use]
    pub fn aggregate(tree: &SuiteTree, hook_failures: &HashMap<SuiteId, Vec<Failure>>) -> SuiteResult {
        Self::suite(tree, tree.root(), hook_failures)
    }

    fn suite(
        tree: &SuiteTree,
        id: SuiteId,
        hook_failures: &HashMap<SuiteId, Vec<Failure>>,
    ) -> SuiteResult {
        let node = tree.suite(id);
        let mut summary = Summary::default();
        let mut children = Vec::with_capacity(node.members().len());

        for member in node.members() {
            match *member {
                Member::Spec(spec) => {
                    let result = Self::spec(tree, spec);
                    summary.record(result.status, result.duration);
                    children.push(ResultNode::Spec(result));
                }
                Member::Suite(child) => {
                    let result = Self::suite(tree, child, hook_failures);
                    summary.merge(&result.summary);
                    children.push(ResultNode::Suite(result));
                }
            }
        }

        SuiteResult {
            name: node.name().to_string(),
            labels: node.labels().iter().cloned().collect(),
            summary,
            hook_failures: hook_failures.get(&id).cloned().unwrap_or_default(),
            children,
        }
    }

    fn spec(tree: &SuiteTree, id: SpecId) -> SpecResult {
        let node = tree.spec(id);
        SpecResult {
            name: node.name().to_string(),
            labels: node.labels().iter().cloned().collect(),
            status: node.status(),
            duration: node.duration(),
            failure: node.failure().cloned(),
            skip_reason: node.skip_reason(),
        }
    }
}
