//! Falsification Tests: Category A - Scheduling (F201-F210)

use std::time::Duration;

use ensayo::core::{FailureKind, SkipReason};
use ensayo::prelude::*;
use pretty_assertions::assert_eq;

use super::{Events, run, status};

/// F201: A spec whose expectation holds passes
#[test]
fn f201_calculator_adds_passes() {
    let mut b = SuiteTreeBuilder::new("calculator.spec");
    b.describe("Calculator", |b| {
        b.it("adds", || expect(1 + 1).to_be(2));
    });
    let result = run(b);

    assert_eq!(status(&result, "adds"), SpecStatus::Passed, "F201 FALSIFIED: adds did not pass");
    assert!(result.passed());
    assert_eq!(result.summary.passed, 1);
}

/// F202: A failed expectation is a failed spec naming expected and actual
#[test]
fn f202_calculator_wrong_sum_fails_with_message() {
    let mut b = SuiteTreeBuilder::new("calculator.spec");
    b.describe("Calculator", |b| {
        b.it("adds", || expect(1 + 1).to_be(3));
    });
    let result = run(b);
    let spec = result.find_spec("adds").unwrap();

    assert_eq!(spec.status, SpecStatus::Failed, "F202 FALSIFIED: status {}", spec.status);
    let failure = spec.failure.as_ref().expect("F202 FALSIFIED: no failure recorded");
    assert_eq!(failure.kind, FailureKind::Assertion);
    assert_eq!(failure.message, "expected 3 but received 2");
    let location = failure.location.as_ref().expect("F202 FALSIFIED: no location");
    assert!(location.file.ends_with("scheduling.rs"), "F202 FALSIFIED: located in {}", location.file);
}

/// F203: each-hooks wrap a nested spec outermost first, then unwind
#[test]
fn f203_nested_each_hook_order() {
    let events = Events::default();
    let mut b = SuiteTreeBuilder::new("order.spec");
    b.describe("A", |b| {
        b.before_each(events.ok("A.beforeEach"));
        b.after_each(events.ok("A.afterEach"));
        b.describe("B", |b| {
            b.before_each(events.ok("B.beforeEach"));
            b.after_each(events.ok("B.afterEach"));
            b.it("S", events.ok("S"));
        });
    });
    run(b);

    assert_eq!(
        events.take(),
        vec!["A.beforeEach", "B.beforeEach", "S", "B.afterEach", "A.afterEach"],
        "F203 FALSIFIED: hook order"
    );
}

/// F204: A runtime error in one spec never stops the rest of the run
#[test]
fn f204_runtime_error_is_isolated() {
    let events = Events::default();
    let mut b = SuiteTreeBuilder::new("isolation.spec");
    b.describe("first", |b| {
        b.it("boom", || Err(SpecError::runtime("disk full")));
        b.it("panics", || panic!("index out of bounds"));
        b.it("sibling", events.ok("sibling"));
    });
    b.describe("second", |b| {
        b.it("later", events.ok("later"));
    });
    let result = run(b);

    assert_eq!(status(&result, "boom"), SpecStatus::Errored);
    assert_eq!(status(&result, "panics"), SpecStatus::Errored);
    assert_eq!(events.take(), vec!["sibling", "later"], "F204 FALSIFIED: run stopped early");
    assert_eq!(result.summary.errored, 2);
    assert_eq!(result.summary.passed, 2);
}

/// F205: A failing beforeAll errors every spec below it, citing the cause
#[test]
fn f205_before_all_cascade() {
    let events = Events::default();
    let mut b = SuiteTreeBuilder::new("cascade.spec");
    b.describe("db", |b| {
        b.before_all(|| Err(SpecError::runtime("connection refused")));
        b.after_all(events.ok("db.afterAll"));
        b.it("reads", events.ok("reads"));
        b.describe("nested", |b| {
            b.it("writes", events.ok("writes"));
        });
    });
    b.it("unaffected", events.ok("unaffected"));
    let result = run(b);

    for name in ["reads", "writes"] {
        let spec = result.find_spec(name).unwrap();
        assert_eq!(spec.status, SpecStatus::Errored, "F205 FALSIFIED: {name} is {}", spec.status);
        let message = &spec.failure.as_ref().unwrap().message;
        assert!(message.contains("connection refused"), "F205 FALSIFIED: {message}");
    }
    assert_eq!(events.take(), vec!["db.afterAll", "unaffected"]);
    assert_eq!(result.find_suite("db").unwrap().hook_failures.len(), 1);
}

/// F206: Focus anywhere skips everything off the focused path
#[test]
fn f206_focus_skips_unfocused() {
    let mut b = SuiteTreeBuilder::new("focus.spec");
    b.describe("parser", |b| {
        b.fit("tokenizes", || Ok(()));
        b.it("parses", || Ok(()));
    });
    b.fdescribe("printer", |b| {
        b.it("prints", || Ok(()));
    });
    b.it("top", || Ok(()));
    let result = run(b);

    assert_eq!(status(&result, "tokenizes"), SpecStatus::Passed);
    assert_eq!(status(&result, "prints"), SpecStatus::Passed);
    for name in ["parses", "top"] {
        let spec = result.find_spec(name).unwrap();
        assert_eq!(spec.skip_reason, Some(SkipReason::NotFocused), "F206 FALSIFIED: {name} ran");
    }

    let mut b = SuiteTreeBuilder::new("focus.spec");
    b.fit("a", || Ok(()));
    b.it("b", || Ok(()));
    let result = ensayo::run(b, RunConfig::new().ignoring_focus()).unwrap();
    assert_eq!(result.summary.passed, 2, "F206 FALSIFIED: ignore_focus still filtered");
}

/// F207: A skipped suite wins over focus inside it
#[test]
fn f207_skip_beats_focus() {
    let mut b = SuiteTreeBuilder::new("skip.spec");
    b.xdescribe("legacy", |b| {
        b.fit("focused inside", || Ok(()));
    });
    b.it("plain", || Ok(()));
    let result = run(b);

    let spec = result.find_spec("focused inside").unwrap();
    assert_eq!(spec.status, SpecStatus::Skipped, "F207 FALSIFIED: skipped suite ran");
    assert_eq!(spec.skip_reason, Some(SkipReason::Skipped));
}

/// F208: Label filters apply to inherited labels; excludes win
#[test]
fn f208_label_filters() {
    let build = || {
        let mut b = SuiteTreeBuilder::new("labels.spec");
        b.declare_suite("io", SuiteConfig::new().labels(["slow"]), |b| {
            b.it("reads disk", || Ok(()));
            b.declare_spec("flaky read", SpecConfig::new().labels(["flaky"]), || Ok(()));
        });
        b.it("pure", || Ok(()));
        b
    };

    let config = RunConfig::new().with_labels(["slow"]).with_excludes(["flaky"]);
    let result = ensayo::run(build(), config).unwrap();
    assert_eq!(status(&result, "reads disk"), SpecStatus::Passed, "F208 FALSIFIED: inherited label ignored");
    assert_eq!(result.find_spec("flaky read").unwrap().skip_reason, Some(SkipReason::Excluded));
    assert_eq!(result.find_spec("pure").unwrap().skip_reason, Some(SkipReason::NotIncluded));
}

/// F209: Exceeding a timeout errors the spec with a timeout failure
#[test]
fn f209_timeout_errors_spec() {
    let mut b = SuiteTreeBuilder::new("timeout.spec");
    b.declare_spec("slow", SpecConfig::new().timeout(Duration::from_millis(5)), || {
        std::thread::sleep(Duration::from_millis(30));
        Ok(())
    });
    b.it("fast", || Ok(()));
    let result = ensayo::run(b, RunConfig::new().with_default_timeout(Duration::from_secs(10))).unwrap();

    let slow = result.find_spec("slow").unwrap();
    assert_eq!(slow.status, SpecStatus::Errored, "F209 FALSIFIED: slow spec is {}", slow.status);
    assert_eq!(slow.failure.as_ref().unwrap().kind, FailureKind::Timeout);
    assert_eq!(status(&result, "fast"), SpecStatus::Passed);
}

/// F210: Malformed registration is a framework error, not a spec status
#[test]
fn f210_blank_name_is_framework_error() {
    let mut b = SuiteTreeBuilder::new("bad.spec");
    b.describe("ok", |b| {
        b.it("  ", || Ok(()));
    });
    let err = ensayo::run(b, RunConfig::new()).unwrap_err();
    assert!(
        matches!(err, ensayo::core::FrameworkError::Registration(_)),
        "F210 FALSIFIED: {err}"
    );
}
