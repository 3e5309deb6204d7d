//! Falsification Tests: Category B - Expectations inside specs (F211-F220)

use ensayo::assertions::{MatchContext, Verdict, global_matcher_names};
use ensayo::core::FailureKind;
use ensayo::prelude::*;
use serde_json::json;

use super::{run, status};

type MatchResult = ensayo::assertions::Result<Verdict>;

fn failure_of(result: &SuiteResult, name: &str) -> (FailureKind, String) {
    let failure = result.find_spec(name).unwrap().failure.clone().unwrap();
    (failure.kind, failure.message)
}

/// F211: Negation flips the outcome and uses the negated message
#[test]
fn f211_negated_expectation() {
    let mut b = SuiteTreeBuilder::new("negation.spec");
    b.it("holds", || expect(1).not().to_be(2));
    b.it("breaks", || expect(1).not().to_be(1));
    b.it("double negation", || expect(1).not().not().to_be(1));
    let result = run(b);

    assert_eq!(status(&result, "holds"), SpecStatus::Passed);
    assert_eq!(status(&result, "double negation"), SpecStatus::Passed, "F211 FALSIFIED: not() is not a toggle");
    assert_eq!(
        failure_of(&result, "breaks"),
        (FailureKind::Assertion, "expected 1 not to be 1".to_string()),
        "F211 FALSIFIED: negated message"
    );
}

/// F212: No type coercion in equality
#[test]
fn f212_equality_is_strict() {
    let mut b = SuiteTreeBuilder::new("coercion.spec");
    b.it("string vs number", || expect("1").to_be(1));
    b.it("bool vs number", || expect(true).to_equal(1));
    b.it("int vs float", || expect(1).to_be(1.0));
    let result = run(b);

    assert_eq!(status(&result, "string vs number"), SpecStatus::Failed, "F212 FALSIFIED: \"1\" == 1");
    assert_eq!(status(&result, "bool vs number"), SpecStatus::Failed, "F212 FALSIFIED: true == 1");
    assert_eq!(status(&result, "int vs float"), SpecStatus::Passed);
    assert_eq!(failure_of(&result, "string vs number").1, "expected 1 but received \"1\"");
}

/// F213: Matcher misuse is a runtime error, not an assertion failure
#[test]
fn f213_matcher_misuse_errors() {
    let mut b = SuiteTreeBuilder::new("misuse.spec");
    b.it("unknown matcher", || expect(1).to("to_be_prime", &[]));
    b.it("wrong arity", || expect(1).to("to_be_between", &[json!(0)]));
    let result = run(b);

    assert_eq!(status(&result, "unknown matcher"), SpecStatus::Errored, "F213 FALSIFIED");
    assert_eq!(status(&result, "wrong arity"), SpecStatus::Errored, "F213 FALSIFIED");
    assert_eq!(
        failure_of(&result, "unknown matcher"),
        (FailureKind::Runtime, "unknown matcher 'to_be_prime'".to_string())
    );
}

/// F214: A globally registered matcher is usable in any spec
#[test]
fn f214_custom_matcher_global() {
    register_matcher("to_be_even", |ctx: &MatchContext<'_>| -> MatchResult {
        let n = ctx.actual.as_i64().ok_or_else(|| ctx.invalid("actual must be an integer"))?;
        Ok(Verdict::new(
            n % 2 == 0,
            format!("expected {n} to be even"),
            format!("expected {n} not to be even"),
        ))
    });

    let mut b = SuiteTreeBuilder::new("custom.spec");
    b.it("four", || expect(4).to("to_be_even", &[]));
    b.it("three", || expect(3).to("to_be_even", &[]));
    b.it("not three", || expect(3).not().to("to_be_even", &[]));
    b.it("string", || expect("4").to("to_be_even", &[]));
    let result = run(b);

    assert_eq!(status(&result, "four"), SpecStatus::Passed);
    assert_eq!(status(&result, "three"), SpecStatus::Failed);
    assert_eq!(status(&result, "not three"), SpecStatus::Passed);
    assert_eq!(status(&result, "string"), SpecStatus::Errored, "F214 FALSIFIED: misuse not errored");
    assert!(global_matcher_names().iter().any(|n| n == "to_be_even"));
}

/// F215: An isolated registry ignores global registrations
#[test]
fn f215_isolated_registry() {
    register_matcher("to_be_global_only", |_: &MatchContext<'_>| -> MatchResult { Ok(Verdict::new(true, "", "")) });
    let local = MatcherRegistry::with_builtins();

    assert!(local.expect(1).to_be(1).is_ok());
    let err = local.expect(1).to("to_be_global_only", &[]).unwrap_err();
    assert!(matches!(err, SpecError::Runtime { .. }), "F215 FALSIFIED: global matcher leaked");
}

/// F216: Last registration under a name wins
#[test]
fn f216_override_last_wins() {
    let mut local = MatcherRegistry::with_builtins();
    local.register("to_be", |_: &MatchContext<'_>| -> MatchResult {
        Ok(Verdict::new(true, "", "never fails"))
    });
    assert!(local.expect(1).to_be(2).is_ok(), "F216 FALSIFIED: override ignored");
    assert!(expect(1).to_be(2).is_err(), "F216 FALSIFIED: override leaked to the global registry");
}

/// F217: to_throw observes returned errors
#[test]
fn f217_to_throw() {
    let mut b = SuiteTreeBuilder::new("throw.spec");
    b.it("parse error", || expect_fn(|| "x".parse::<u8>()).to_throw_with("invalid digit"));
    b.it("no error", || expect_fn(|| "7".parse::<u8>()).to_throw());
    let result = run(b);

    assert_eq!(status(&result, "parse error"), SpecStatus::Passed);
    assert_eq!(status(&result, "no error"), SpecStatus::Failed, "F217 FALSIFIED: Ok counted as raise");
}

/// F218: Collection and string matchers on structured values
#[test]
fn f218_structured_values() {
    let config = json!({"name": "ensayo", "tags": ["bdd", "mock"], "retries": 3});

    assert!(expect(&config).to_have_key("tags").is_ok());
    assert!(expect(&config["tags"]).to_contain("mock").is_ok());
    assert!(expect(&config["tags"]).to_have_length(2).is_ok());
    assert!(expect(&config["name"]).to_match("^ens").is_ok());
    assert!(expect(&config["retries"]).to_be_between(1, 5).is_ok());
    assert!(expect(&config).to_equal(json!({"retries": 3.0, "tags": ["bdd", "mock"], "name": "ensayo"})).is_ok());
    assert!(expect(&config["tags"]).to_equal(json!(["mock", "bdd"])).is_err(), "F218 FALSIFIED: arrays unordered");
}

/// F219: Every built-in matcher answers both polarities
#[test]
fn f219_builtin_negation_round_trip() {
    let cases = [
        ("to_be", json!(2), vec![json!(2)]),
        ("to_equal", json!({"a": 1}), vec![json!({"a": 1})]),
        ("to_contain", json!("haystack"), vec![json!("st")]),
        ("to_be_greater_than", json!(3), vec![json!(1)]),
        ("to_be_close_to", json!(0.3), vec![json!(0.1 + 0.2)]),
        ("to_start_with", json!("ensayo"), vec![json!("en")]),
        ("to_be_type_of", json!([]), vec![json!("array")]),
    ];
    for (name, actual, expected) in cases {
        let positive = expect(&actual).evaluate(name, &expected).unwrap();
        let negative = expect(&actual).not().evaluate(name, &expected).unwrap();
        assert!(positive, "F219 FALSIFIED: {name} did not hold");
        assert_ne!(positive, negative, "F219 FALSIFIED: {name} negation");
    }
}

/// F220: Assertion failures carry the caller's location
#[test]
fn f220_failure_location_is_caller() {
    let line = line!() + 1;
    let err = expect(2).to_be(3).unwrap_err();
    let failure = Failure::from(err);
    let location = failure.location.unwrap();
    assert_eq!(location.line, line, "F220 FALSIFIED: location {location}");
    assert!(location.file.ends_with("matchers.rs"));
}
