//! Falsification Tests: Category D - Multi-unit runs (F233-F241)

use ensayo::core::LoadError;
use ensayo::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::Events;

fn math_unit(b: &mut SuiteTreeBuilder) {
    b.describe("Calculator", |b| {
        b.it("adds", || expect(1 + 1).to_be(2));
        b.it("subtracts", || expect(5 - 3).to_be(2));
    });
}

fn loader(id: &str) -> Result<LoadedUnit, LoadError> {
    match id {
        "math.spec" => Ok(LoadedUnit::spec(math_unit)),
        "legacy.tests" => Ok(LoadedUnit::XUnit(vec![
            UnitMember::new("test_one", || Ok(())),
            UnitMember::new("test_two", || expect("a").to_be("b")),
            UnitMember::new("helper", || Err(SpecError::runtime("never run"))),
        ])),
        "broken.spec" => Err(LoadError::failed("broken.spec", "syntax error")),
        other => Err(LoadError::not_found(other)),
    }
}

/// F233: A unit that fails to load is recorded and the run continues
#[test]
fn f233_load_failure_recorded() {
    let report = Runner::default()
        .run_units(&["math.spec", "missing.spec", "legacy.tests"], &loader)
        .unwrap();

    assert_eq!(report.units.len(), 3);
    assert_eq!(report.units[1].load_error.as_deref(), Some("not found: missing.spec"), "F233 FALSIFIED");
    assert!(report.units[1].result.is_none());
    assert!(report.units[2].result.is_some(), "F233 FALSIFIED: run stopped after load failure");
    assert_eq!(report.load_failures().count(), 1);
    assert!(!report.passed());
}

/// F234: Run summary merges every loaded unit
#[test]
fn f234_summary_merges_units() {
    let report = Runner::default().run_units(&["math.spec", "legacy.tests"], &loader).unwrap();

    assert_eq!(report.summary.total, 4, "F234 FALSIFIED: helper counted or test lost");
    assert_eq!(report.summary.passed, 3);
    assert_eq!(report.summary.failed, 1);
    assert!(report.summary.is_consistent());
}

/// F235: xUnit setup and teardown wrap every test
#[test]
fn f235_xunit_hooks_wrap_tests() {
    let events = Events::default();
    let members = vec![
        UnitMember::new("before_tests", events.ok("before_tests")),
        UnitMember::new("setup", events.ok("setup")),
        UnitMember::new("teardown", events.ok("teardown")),
        UnitMember::new("test_a", events.ok("test_a")),
        UnitMember::new("test_b", events.ok("test_b")),
        UnitMember::new("after_tests", events.ok("after_tests")),
    ];
    let mut tree = XUnitAdapter::new().build("order.tests", members).unwrap();
    let result = ExecutionScheduler::default().run(&mut tree).unwrap();

    assert_eq!(result.summary.passed, 2);
    assert_eq!(
        events.take(),
        vec![
            "before_tests", "setup", "test_a", "teardown", "setup", "test_b", "teardown", "after_tests"
        ],
        "F235 FALSIFIED: xunit hook order"
    );
}

/// F236: The test-name rule is injectable
#[test]
fn f236_custom_xunit_predicate() {
    let runner = Runner::default().with_xunit_adapter(XUnitAdapter::with_predicate(|name| name.ends_with("Spec")));
    let report = runner
        .run_units(&["legacy.tests"], &|_: &str| -> Result<LoadedUnit, LoadError> {
            Ok(LoadedUnit::XUnit(vec![
                UnitMember::new("parsesSpec", || Ok(())),
                UnitMember::new("test_ignored", || Ok(())),
            ]))
        })
        .unwrap();

    let result = report.units[0].result.as_ref().unwrap();
    assert_eq!(result.summary.total, 1, "F236 FALSIFIED: predicate not applied");
    assert!(result.find_spec("parsesSpec").is_some());
}

/// F237: Bundles and filters come from TOML configuration
#[test]
fn f237_configured_run() {
    let config = RunConfig::from_toml(
        r#"
        bundles = ["math.spec", "broken.spec"]
        reporter = "json"
        excludes = ["slow"]
        default_timeout = "2s"
        "#,
    )
    .unwrap();
    let report = Runner::new(config).run_configured(&loader).unwrap();

    assert_eq!(report.units.len(), 2, "F237 FALSIFIED: bundles ignored");
    assert_eq!(report.summary.passed, 2);
    assert_eq!(
        report.units[1].load_error.as_deref(),
        Some("failed to load 'broken.spec': syntax error")
    );
}

/// F238: A registration defect aborts the run
#[test]
fn f238_registration_error_is_fatal() {
    let err = Runner::default()
        .run_units(&["bad.spec", "math.spec"], &|_: &str| -> Result<LoadedUnit, LoadError> {
            Ok(LoadedUnit::spec(|b: &mut SuiteTreeBuilder| {
                b.it("", || Ok(()));
            }))
        })
        .unwrap_err();
    assert!(matches!(err, ensayo::core::FrameworkError::Registration(_)), "F238 FALSIFIED: {err}");
}

/// F239: The run report is plain structured data
#[test]
fn f239_report_serializes() {
    let report = Runner::default().run_units(&["math.spec", "nope"], &loader).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["units"][0]["unit"], "math.spec");
    assert_eq!(json["units"][0]["result"]["name"], "math.spec");
    assert_eq!(json["units"][1]["load_error"], "not found: nope");
    assert_eq!(json["run_id"], report.run_id.to_string(), "F239 FALSIFIED: run id");

    let back: RunReport = serde_json::from_value(json).unwrap();
    assert_eq!(back, report);
}

/// F240: Invalid configuration is rejected before anything runs
#[test]
fn f240_invalid_config_rejected() {
    let err = RunConfig::from_toml("labels = [\"\"]").unwrap_err();
    assert!(matches!(err, ensayo::core::FrameworkError::Config(_)), "F240 FALSIFIED: {err}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// F241: Per-unit reports line up with the request and the summary
    /// counts exactly the loaded units
    #[test]
    fn f241_report_matches_request(picks in prop::collection::vec(0usize..4, 0..8)) {
        let names = ["math.spec", "legacy.tests", "broken.spec", "missing.spec"];
        let units: Vec<&str> = picks.iter().map(|&i| names[i]).collect();
        let report = Runner::default().run_units(&units, &loader).unwrap();

        prop_assert_eq!(report.units.len(), units.len());
        for (unit, requested) in report.units.iter().zip(&units) {
            prop_assert_eq!(unit.unit.as_str(), *requested);
            prop_assert!(unit.result.is_some() != unit.load_error.is_some(), "F241 FALSIFIED: {}", requested);
        }
        let loaded: usize = picks.iter().map(|&i| [2, 2, 0, 0][i]).sum();
        prop_assert_eq!(report.summary.total, loaded, "F241 FALSIFIED: total");
        prop_assert!(report.summary.is_consistent());
    }
}
