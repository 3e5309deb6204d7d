//! Registration DSL for suite trees.
//!
//! The builder itself is the context value: nested `describe` bodies
//! receive `&mut SuiteTreeBuilder`, and the current suite is a stack
//! pushed on entry and popped on exit. No global state is involved, so
//! any number of trees can be built side by side.
//!
//! ```rust,ignore
//! let mut b = SuiteTreeBuilder::new("calculator.spec");
//! b.describe("Calculator", |b| {
//!     b.before_each(|| Ok(()));
//!     b.it("adds", || expect(1 + 1).to_be(2));
//! });
//! let tree = b.finish()?;
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::{FrameworkError, Result};
use crate::failure::SpecOutcome;
use crate::suite::{NodeFlags, SuiteTree};
use crate::types::{Phase, SpecId, SuiteId};

/// Options for a declared suite.
#[derive(Debug, Clone, Default)]
pub struct SuiteConfig {
    flags: NodeFlags,
}

/// Options for a declared spec.
#[derive(Debug, Clone, Default)]
pub struct SpecConfig {
    flags: NodeFlags,
}

macro_rules! node_config {
    ($ty:ident) => {
        impl $ty {
            /// Creates default options.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Adds labels.
            #[must_use]
            pub fn labels<I, S>(mut self, labels: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.flags.labels.extend(labels.into_iter().map(Into::into));
                self
            }

            /// Sets the focus flag.
            #[must_use]
            pub const fn focused(mut self) -> Self {
                self.flags.focused = true;
                self
            }

            /// Sets the skip flag.
            #[must_use]
            pub const fn skipped(mut self) -> Self {
                self.flags.skipped = true;
                self
            }

            /// Sets a timeout for the spec step (hooks plus body).
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.flags.timeout = Some(timeout);
                self
            }

            /// Returns the configured labels.
            #[must_use]
            pub const fn label_set(&self) -> &BTreeSet<String> {
                &self.flags.labels
            }
        }
    };
}

node_config!(SuiteConfig);
node_config!(SpecConfig);

/// Builds a [`SuiteTree`] from declarative calls.
#[derive(Debug)]
pub struct SuiteTreeBuilder {
    tree: SuiteTree,
    context: Vec<SuiteId>,
    error: Option<FrameworkError>,
}

impl SuiteTreeBuilder {
    /// Creates a builder whose implicit root suite is named `root_name`.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        let tree = SuiteTree::new(root_name);
        let root = tree.root();
        Self {
            tree,
            context: vec![root],
            error: None,
        }
    }

    /// Returns the current context suite.
    #[must_use]
    pub fn current(&self) -> SuiteId {
        self.context.last().copied().unwrap_or_else(|| self.tree.root())
    }

    /// Returns the nesting depth; the implicit root is depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.context.len().saturating_sub(1)
    }

    /// Declares a suite under the current context and registers its
    /// members by running `body` immediately.
    pub fn declare_suite<F>(
        &mut self,
        name: impl Into<String>,
        config: SuiteConfig,
        body: F,
    ) -> SuiteId
    where
        F: FnOnce(&mut Self),
    {
        let name = name.into();
        self.check_name("suite", &name);
        let parent = self.current();
        let id = self.tree.add_suite(parent, name, config.flags);
        tracing::trace!(suite = %self.tree.suite(id).name(), depth = self.depth() + 1, "declared suite");

        self.context.push(id);
        body(self);
        self.context.pop();
        id
    }

    /// Declares a spec under the current context. `body` is stored, not run.
    pub fn declare_spec<F>(&mut self, name: impl Into<String>, config: SpecConfig, body: F) -> SpecId
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        let name = name.into();
        self.check_name("spec", &name);
        let suite = self.current();
        let id = self.tree.add_spec(suite, name, config.flags, Box::new(body));
        tracing::trace!(spec = %self.tree.spec(id).name(), "declared spec");
        id
    }

    /// Attaches a hook to the current context suite.
    pub fn declare_hook<F>(&mut self, phase: Phase, body: F)
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        let owner = self.current();
        self.tree.add_hook(owner, phase, Box::new(body));
    }

    /// `describe`: a plain suite.
    pub fn describe<F>(&mut self, name: impl Into<String>, body: F) -> SuiteId
    where
        F: FnOnce(&mut Self),
    {
        self.declare_suite(name, SuiteConfig::new(), body)
    }

    /// `fdescribe`: a focused suite.
    pub fn fdescribe<F>(&mut self, name: impl Into<String>, body: F) -> SuiteId
    where
        F: FnOnce(&mut Self),
    {
        self.declare_suite(name, SuiteConfig::new().focused(), body)
    }

    /// `xdescribe`: a skipped suite.
    pub fn xdescribe<F>(&mut self, name: impl Into<String>, body: F) -> SuiteId
    where
        F: FnOnce(&mut Self),
    {
        self.declare_suite(name, SuiteConfig::new().skipped(), body)
    }

    /// `it`: a plain spec.
    pub fn it<F>(&mut self, name: impl Into<String>, body: F) -> SpecId
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_spec(name, SpecConfig::new(), body)
    }

    /// `fit`: a focused spec.
    pub fn fit<F>(&mut self, name: impl Into<String>, body: F) -> SpecId
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_spec(name, SpecConfig::new().focused(), body)
    }

    /// `xit`: a skipped spec.
    pub fn xit<F>(&mut self, name: impl Into<String>, body: F) -> SpecId
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_spec(name, SpecConfig::new().skipped(), body)
    }

    /// Registers a `beforeAll` hook.
    pub fn before_all<F>(&mut self, body: F)
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_hook(Phase::BeforeAll, body);
    }

    /// Registers a `beforeEach` hook.
    pub fn before_each<F>(&mut self, body: F)
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_hook(Phase::BeforeEach, body);
    }

    /// Registers an `afterEach` hook.
    pub fn after_each<F>(&mut self, body: F)
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_hook(Phase::AfterEach, body);
    }

    /// Registers an `afterAll` hook.
    pub fn after_all<F>(&mut self, body: F)
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        self.declare_hook(Phase::AfterAll, body);
    }

    /// Read access to the tree under construction.
    #[must_use]
    pub const fn tree(&self) -> &SuiteTree {
        &self.tree
    }

    /// Finishes registration.
    ///
    /// # Errors
    /// Returns the first registration defect, if any.
    pub fn finish(self) -> Result<SuiteTree> {
        if let Some(err) = self.error {
            return Err(err);
        }
        tracing::debug!(
            root = %self.tree.suite(self.tree.root()).name(),
            suites = self.tree.suite_count(),
            specs = self.tree.spec_count(),
            focus = self.tree.has_focus(),
            "suite tree built"
        );
        Ok(self.tree)
    }

    fn check_name(&mut self, kind: &str, name: &str) {
        if self.error.is_none() && name.trim().is_empty() {
            let parent = self.tree.suite(self.current()).name().to_string();
            self.error = Some(FrameworkError::registration(format!(
                "{kind} name cannot be empty (declared in suite '{parent}')"
            )));
        }
    }
}
