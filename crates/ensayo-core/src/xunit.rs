//! xUnit-style adapter.
//!
//! Turns a flat list of named callables into a one-level suite tree. Test
//! methods are picked out by a name predicate; a handful of reserved names
//! become lifecycle hooks instead.

use std::fmt;

use crate::builder::{SpecConfig, SuiteTreeBuilder};
use crate::error::{FrameworkError, Result};
use crate::failure::SpecOutcome;
use crate::suite::{Body, SuiteTree};
use crate::types::Phase;

/// A named member of an xUnit-style test unit.
pub struct UnitMember {
    name: String,
    body: Body,
}

impl UnitMember {
    /// Creates a member.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> SpecOutcome + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for UnitMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitMember")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Registers xUnit-style units as specs and hooks.
pub struct XUnitAdapter {
    is_test: Predicate,
    setup: String,
    teardown: String,
    before_tests: String,
    after_tests: String,
}

impl Default for XUnitAdapter {
    fn default() -> Self {
        Self::with_prefix("test")
    }
}

impl fmt::Debug for XUnitAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XUnitAdapter")
            .field("setup", &self.setup)
            .field("teardown", &self.teardown)
            .field("before_tests", &self.before_tests)
            .field("after_tests", &self.after_tests)
            .finish_non_exhaustive()
    }
}

impl XUnitAdapter {
    /// Creates an adapter with the default `test` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter treating names starting with `prefix` as tests.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::with_predicate(move |name| name.starts_with(prefix.as_str()))
    }

    /// Creates an adapter with a custom test-name predicate.
    #[must_use]
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            is_test: Box::new(predicate),
            setup: "setup".to_string(),
            teardown: "teardown".to_string(),
            before_tests: "before_tests".to_string(),
            after_tests: "after_tests".to_string(),
        }
    }

    /// Renames the hook members: per-test setup and teardown, then
    /// once-per-unit before and after.
    #[must_use]
    pub fn hook_names(
        mut self,
        setup: impl Into<String>,
        teardown: impl Into<String>,
        before_tests: impl Into<String>,
        after_tests: impl Into<String>,
    ) -> Self {
        self.setup = setup.into();
        self.teardown = teardown.into();
        self.before_tests = before_tests.into();
        self.after_tests = after_tests.into();
        self
    }

    /// Returns the hook phase a reserved member name maps to.
    #[must_use]
    pub fn hook_phase(&self, name: &str) -> Option<Phase> {
        if name == self.setup {
            Some(Phase::BeforeEach)
        } else if name == self.teardown {
            Some(Phase::AfterEach)
        } else if name == self.before_tests {
            Some(Phase::BeforeAll)
        } else if name == self.after_tests {
            Some(Phase::AfterAll)
        } else {
            None
        }
    }

    /// Returns true if `name` is a test method. Reserved hook names never are.
    #[must_use]
    pub fn is_test(&self, name: &str) -> bool {
        self.hook_phase(name).is_none() && (self.is_test)(name)
    }

    /// Registers members into the builder's current suite, in order.
    /// Members that are neither tests nor hooks are ignored.
    pub fn register(&self, builder: &mut SuiteTreeBuilder, members: Vec<UnitMember>) {
        for member in members {
            let UnitMember { name, body } = member;
            if let Some(phase) = self.hook_phase(&name) {
                tracing::trace!(member = %name, phase = %phase, "xunit hook");
                builder.declare_hook(phase, body);
            } else if (self.is_test)(&name) {
                builder.declare_spec(name, SpecConfig::new(), body);
            } else {
                tracing::trace!(member = %name, "xunit member ignored");
            }
        }
    }

    /// Builds a tree whose implicit root is named after the unit.
    ///
    /// # Errors
    /// Returns a registration error for an empty unit or test name.
    pub fn build(&self, unit: impl Into<String>, members: Vec<UnitMember>) -> Result<SuiteTree> {
        let unit = unit.into();
        if unit.trim().is_empty() {
            return Err(FrameworkError::registration("unit name cannot be empty"));
        }
        let mut builder = SuiteTreeBuilder::new(unit);
        self.register(&mut builder, members);
        builder.finish()
    }
}
