//! Multi-unit runner.
//!
//! Resolves test units by name through a [`UnitLoader`], builds one suite
//! tree per unit (spec-style or xUnit-style) and executes them in order
//! with a shared [`ExecutionScheduler`]. A unit that fails to load is
//! recorded and the run moves on.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::builder::SuiteTreeBuilder;
use crate::config::RunConfig;
use crate::error::{LoadError, Result};
use crate::result::{SuiteResult, Summary};
use crate::scheduler::ExecutionScheduler;
use crate::types::RunId;
use crate::xunit::{UnitMember, XUnitAdapter};

/// Registration function of a spec-style unit.
pub type Registration = Box<dyn FnOnce(&mut SuiteTreeBuilder)>;

/// A resolved test unit.
pub enum LoadedUnit {
    /// Declares suites and specs through the builder.
    Spec(Registration),
    /// Flat named members, classified by the xUnit adapter.
    XUnit(Vec<UnitMember>),
}

impl LoadedUnit {
    /// Wraps a spec-style registration function.
    pub fn spec<F>(register: F) -> Self
    where
        F: FnOnce(&mut SuiteTreeBuilder) + 'static,
    {
        Self::Spec(Box::new(register))
    }
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(_) => f.write_str("LoadedUnit::Spec(..)"),
            Self::XUnit(members) => f.debug_tuple("LoadedUnit::XUnit").field(members).finish(),
        }
    }
}

/// Resolves test unit identifiers.
pub trait UnitLoader {
    /// Loads the unit named `id`.
    ///
    /// # Errors
    /// Returns a [`LoadError`] if the unit is unknown or cannot be built.
    fn load_unit(&self, id: &str) -> std::result::Result<LoadedUnit, LoadError>;
}

impl<F> UnitLoader for F
where
    F: Fn(&str) -> std::result::Result<LoadedUnit, LoadError>,
{
    fn load_unit(&self, id: &str) -> std::result::Result<LoadedUnit, LoadError> {
        self(id)
    }
}

/// Outcome of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    /// Unit identifier.
    pub unit: String,
    /// Result tree, absent when the unit failed to load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SuiteResult>,
    /// Load failure, when the unit could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl UnitReport {
    /// True when the unit loaded and every spec passed or was skipped.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.result.as_ref().is_some_and(SuiteResult::passed)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: RunId,
    /// Start time, milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Per-unit outcomes in request order.
    pub units: Vec<UnitReport>,
    /// Counts over every loaded unit.
    pub summary: Summary,
}

impl RunReport {
    /// True when every unit loaded and passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.units.iter().all(UnitReport::passed)
    }

    /// Units that failed to load.
    pub fn load_failures(&self) -> impl Iterator<Item = &UnitReport> + '_ {
        self.units.iter().filter(|u| u.load_error.is_some())
    }
}

/// Runs test units end to end.
#[derive(Debug, Default)]
pub struct Runner {
    scheduler: ExecutionScheduler,
    adapter: XUnitAdapter,
}

impl Runner {
    /// Creates a runner for the given configuration.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            scheduler: ExecutionScheduler::new(config),
            adapter: XUnitAdapter::default(),
        }
    }

    /// Replaces the xUnit adapter.
    #[must_use]
    pub fn with_xunit_adapter(mut self, adapter: XUnitAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Returns the scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &ExecutionScheduler {
        &self.scheduler
    }

    /// Runs the units listed in the configuration's `bundles`.
    ///
    /// # Errors
    /// See [`Runner::run_units`].
    pub fn run_configured(&self, loader: &dyn UnitLoader) -> Result<RunReport> {
        let units = self.scheduler.config().bundles.clone();
        self.run_units(&units, loader)
    }

    /// Loads and runs each unit in order.
    ///
    /// # Errors
    /// Returns a [`FrameworkError`](crate::FrameworkError) for registration
    /// or scheduling defects. Unit load failures are recorded in the report.
    pub fn run_units<S>(&self, units: &[S], loader: &dyn UnitLoader) -> Result<RunReport>
    where
        S: AsRef<str>,
    {
        let run_id = RunId::new();
        let started_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        tracing::info!(run_id = %run_id, units = units.len(), "run started");

        let mut reports = Vec::with_capacity(units.len());
        let mut summary = Summary::default();
        for unit in units {
            let unit = unit.as_ref();
            let report = match loader.load_unit(unit) {
                Ok(loaded) => {
                    let result = self.run_unit(unit, loaded)?;
                    summary.merge(&result.summary);
                    UnitReport {
                        unit: unit.to_string(),
                        result: Some(result),
                        load_error: None,
                    }
                }
                Err(err) => {
                    tracing::warn!(unit = %unit, error = %err, "unit failed to load");
                    UnitReport {
                        unit: unit.to_string(),
                        result: None,
                        load_error: Some(err.to_string()),
                    }
                }
            };
            reports.push(report);
        }

        tracing::info!(
            run_id = %run_id,
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            skipped = summary.skipped,
            "run finished"
        );
        Ok(RunReport {
            run_id,
            started_at_ms,
            units: reports,
            summary,
        })
    }

    fn run_unit(&self, unit: &str, loaded: LoadedUnit) -> Result<SuiteResult> {
        let mut tree = match loaded {
            LoadedUnit::Spec(register) => {
                let mut builder = SuiteTreeBuilder::new(unit);
                register(&mut builder);
                builder.finish()?
            }
            LoadedUnit::XUnit(members) => self.adapter.build(unit, members)?,
        };
        tracing::debug!(unit = %unit, specs = tree.spec_count(), "unit loaded");
        self.scheduler.run(&mut tree)
    }
}
