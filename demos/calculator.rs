//! Calculator demo: spec-style and xUnit-style units, a mocked
//! collaborator and a JSON run report.
//!
//! Run with `RUST_LOG=ensayo_core=debug cargo run --example calculator`.

use std::sync::Arc;

use ensayo::core::LoadError;
use ensayo::prelude::*;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

/// Adds numbers and records each result in a ledger.
struct Calculator {
    ledger: Arc<dyn Component>,
}

impl Calculator {
    fn add(&self, a: i64, b: i64) -> Result<i64, MockError> {
        let sum = a + b;
        self.ledger
            .invoke("record", &[json!("add"), json!(sum)])
            .map_err(MockError::Raised)?;
        Ok(sum)
    }
}

fn ledger_contract() -> Contract {
    Contract::new("Ledger", ["record", "total"])
}

fn calculator_unit(b: &mut SuiteTreeBuilder) {
    b.describe("Calculator", |b| {
        b.it("adds", || expect(1 + 1).to_be(2));
        b.it("reports the wrong sum", || expect(1 + 1).to_be(3));

        b.describe("with a ledger", |b| {
            b.it("records every sum", || {
                let ledger = MockFactory::new().create_mock(ledger_contract())?;
                let calc = Calculator {
                    ledger: Arc::new(ledger.clone()),
                };
                expect(calc.add(2, 3)?).to_be(5)?;
                expect(calc.add(4, 4)?).to_be(8)?;
                expect(ledger.times(2, "record")).to_be_true()?;
                expect(ledger.times_matching(1, "record", &ArgMatcher::exact([json!("add"), json!(8)])))
                    .to_be_true()
            });

            b.it("surfaces ledger failures", || {
                let ledger = MockFactory::new().create_mock(ledger_contract())?;
                ledger.stub("record").raises("ledger offline");
                let calc = Calculator {
                    ledger: Arc::new(ledger),
                };
                expect_fn(|| calc.add(1, 1)).to_throw_with("offline")
            });
        });

        b.xit("divides", || expect(10 / 4).to_be(2.5));
    });
}

fn legacy_unit() -> Vec<UnitMember> {
    vec![
        UnitMember::new("test_negation", || expect(-(2_i64)).to_be(-2)),
        UnitMember::new("test_overflow_guard", || expect(i64::MAX.checked_add(1)).to_be_null()),
        UnitMember::new("helper", || Err(SpecError::runtime("helpers are not run"))),
    ]
}

fn load(id: &str) -> Result<LoadedUnit, LoadError> {
    match id {
        "calculator.spec" => Ok(LoadedUnit::spec(calculator_unit)),
        "legacy.tests" => Ok(LoadedUnit::XUnit(legacy_unit())),
        other => Err(LoadError::not_found(other)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RunConfig::new();
    let report = Runner::new(config).run_units(&["calculator.spec", "legacy.tests", "missing.spec"], &load)?;

    let json: Value = serde_json::to_value(&report)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    println!(
        "total={} passed={} failed={} errored={} skipped={} load_failures={}",
        report.summary.total,
        report.summary.passed,
        report.summary.failed,
        report.summary.errored,
        report.summary.skipped,
        report.load_failures().count()
    );
    Ok(())
}
