//! Falsification Tests: Category C - Mock surfaces (F221-F232, F242-F243)

use std::sync::{Arc, OnceLock, mpsc};
use std::thread;
use std::time::Duration;

use ensayo::core::LoadError;
use ensayo::mock::{CallOutcome, ComponentRegistry, SurfaceKind, TargetIdentity};
use ensayo::prelude::*;
use serde_json::{Value, json};

use super::{run, status};

/// In-memory key-value store used as a spy target.
struct KvStore {
    entries: parking_lot::Mutex<Vec<(String, Value)>>,
}

impl KvStore {
    fn new() -> Self {
        Self {
            entries: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

impl Component for KvStore {
    fn contract(&self) -> Contract {
        Contract::new("KvStore", ["get", "put", "len"])
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        let mut entries = self.entries.lock();
        match (method, args) {
            ("put", [Value::String(k), v]) => {
                entries.push((k.clone(), v.clone()));
                Ok(Value::Null)
            }
            ("get", [Value::String(k)]) => entries
                .iter()
                .rev()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| format!("no key {k}")),
            ("len", []) => Ok(json!(entries.len())),
            _ => Err(format!("bad call {method}")),
        }
    }
}

/// F221: Newest matching rule wins; older rules still answer the rest
#[test]
fn f221_rule_precedence() {
    let s = MockFactory::new().create_stub();
    s.stub("foo").returns("R1");
    s.stub("foo").with_args([json!("x")]).returns("R2");

    assert_eq!(s.invoke("foo", &[json!("x")]).unwrap(), json!("R2"), "F221 FALSIFIED: R2 not selected");
    assert_eq!(s.invoke("foo", &[json!("y")]).unwrap(), json!("R1"), "F221 FALSIFIED: R1 not selected");
}

/// F222: times(n) is an exact count
#[test]
fn f222_times_is_exact() {
    let s = MockFactory::new().create_stub();
    s.invoke("foo", &[json!(1)]).unwrap();
    s.invoke("foo", &[]).unwrap();
    assert!(s.times(2, "foo"), "F222 FALSIFIED: two calls not counted");
    s.invoke("foo", &[json!("z")]).unwrap();
    assert!(!s.times(2, "foo"), "F222 FALSIFIED: three calls counted as two");
}

/// F223: times with an argument constraint counts only matching calls
#[test]
fn f223_times_matching() {
    let s = MockFactory::new().create_stub();
    for n in [1, 2, 3, 4, 5] {
        s.invoke("push", &[json!(n)]).unwrap();
    }
    let even = ArgMatcher::predicate(|args| args.first().and_then(Value::as_i64).is_some_and(|n| n % 2 == 0));
    assert!(s.times_matching(2, "push", &even), "F223 FALSIFIED: predicate count");
    assert!(s.times_matching(1, "push", &ArgMatcher::exact([json!(3)])));
}

/// F224: Unstubbed mock methods return null instead of failing
#[test]
fn f224_unstubbed_returns_null() {
    let mock = MockFactory::new().create_mock(Contract::new("Clock", ["now"])).unwrap();
    assert_eq!(mock.invoke("now", &[]).unwrap(), Value::Null, "F224 FALSIFIED");
    assert_eq!(mock.kind(), SurfaceKind::Mock);
}

/// F225: A spy delegates unless stubbed and logs every call
#[test]
fn f225_spy_delegates() {
    let spy = MockFactory::new().create_spy(TargetRef::component(KvStore::new()), "get").unwrap();
    spy.invoke("put", &[json!("k"), json!(1)]).unwrap();
    assert_eq!(spy.invoke("get", &[json!("k")]).unwrap(), json!(1), "F225 FALSIFIED: no delegation");

    spy.stub("get").with_args([json!("k")]).returns(99);
    assert_eq!(spy.invoke("get", &[json!("k")]).unwrap(), json!(99), "F225 FALSIFIED: stub ignored");
    assert_eq!(spy.invoke("len", &[]).unwrap(), json!(1));

    assert!(spy.times(2, "get"));
    assert!(spy.times(1, "put"));
    let log = spy.call_log("get");
    assert_eq!(log.records()[0].outcome, CallOutcome::Returned(json!(1)));
    assert_eq!(log.records()[1].outcome, CallOutcome::Returned(json!(99)));
}

/// F226: Raising rules surface as runtime errors in specs
#[test]
fn f226_raise_errors_spec() {
    let mut b = SuiteTreeBuilder::new("raise.spec");
    b.it("uses a failing dependency", || {
        let db = MockFactory::new().create_stub();
        db.stub("query").raises("connection reset");
        db.invoke("query", &[json!("select 1")])?;
        Ok(())
    });
    let result = run(b);

    let spec = result.find_spec("uses a failing dependency").unwrap();
    assert_eq!(spec.status, SpecStatus::Errored, "F226 FALSIFIED: {}", spec.status);
    assert_eq!(spec.failure.as_ref().unwrap().message, "connection reset");
}

/// F227: Calls outside a contract are rejected and not logged
#[test]
fn f227_unknown_method_rejected() {
    let mock = MockFactory::new().create_empty_mock(&Contract::new("Mailer", ["send"]));
    let err = mock.invoke("sned", &[]).unwrap_err();
    assert_eq!(err.to_string(), "Mailer has no method 'sned'", "F227 FALSIFIED");
    assert!(mock.call_logs().is_empty());
}

/// F228: Call logs keep argument lists in call order
#[test]
fn f228_call_log_order() {
    let s = MockFactory::new().create_stub();
    s.invoke("log", &[json!("a")]).unwrap();
    s.invoke("other", &[]).unwrap();
    s.invoke("log", &[json!("b"), json!(2)]).unwrap();

    let log = s.call_log("log");
    assert_eq!(log.args(), vec![&[json!("a")][..], &[json!("b"), json!(2)][..]]);
    let sequences: Vec<u64> = log.iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![0, 2], "F228 FALSIFIED: sequence not surface-wide");
}

/// F229: Named targets resolve through the loader; failures are load errors
#[test]
fn f229_named_targets() {
    let mut registry = ComponentRegistry::new();
    registry.register("store.Kv", || Ok(Arc::new(KvStore::new()) as Arc<dyn Component>));
    registry.register("store.Broken", || Err("disk missing".to_string()));
    let factory = MockFactory::new().with_loader(registry);

    let mock = factory.create_mock(TargetRef::named("store.Kv")).unwrap();
    assert_eq!(mock.target(), &TargetIdentity::Component("KvStore".into()));

    let err = factory.create_mock(TargetRef::named("store.Broken")).unwrap_err();
    assert_eq!(
        err,
        MockError::Load(LoadError::failed("store.Broken", "disk missing")),
        "F229 FALSIFIED: {err}"
    );
}

/// F230: A load failure inside a spec errors that spec only
#[test]
fn f230_load_failure_errors_spec() {
    let mut b = SuiteTreeBuilder::new("load.spec");
    b.it("needs a missing component", || {
        let factory = MockFactory::new().with_loader(ComponentRegistry::new());
        factory.create_mock(TargetRef::named("app.Missing"))?;
        Ok(())
    });
    b.it("carries on", || Ok(()));
    let result = run(b);

    assert_eq!(status(&result, "needs a missing component"), SpecStatus::Errored, "F230 FALSIFIED");
    assert_eq!(status(&result, "carries on"), SpecStatus::Passed);
}

/// F231: A surface can stand in wherever a component is expected
#[test]
fn f231_surface_injected_as_component() {
    fn total(store: &dyn Component) -> Result<i64, String> {
        let a = store.invoke("get", &[json!("a")])?;
        let b = store.invoke("get", &[json!("b")])?;
        Ok(a.as_i64().unwrap_or(0) + b.as_i64().unwrap_or(0))
    }

    let mock = MockFactory::new().create_mock(TargetRef::component(KvStore::new())).unwrap();
    mock.stub("get").with_args([json!("a")]).returns(40);
    mock.stub("get").with_args([json!("b")]).returns(2);

    assert_eq!(total(&mock), Ok(42), "F231 FALSIFIED");
    assert!(mock.was_called_with("get", &[json!("b")]));
}

/// F232: max_calls hands control back to older rules
#[test]
fn f232_max_calls() {
    let s = MockFactory::new().create_stub();
    s.stub("token").returns("expired");
    s.stub("token").returns_each(["t1", "t2"]).max_calls(2);

    let got: Vec<Value> = (0..3).map(|_| s.invoke("token", &[]).unwrap()).collect();
    assert_eq!(got, vec![json!("t1"), json!("t2"), json!("expired")], "F232 FALSIFIED");
}

/// F242: An argument predicate may read the surface it guards
#[test]
fn f242_predicate_reads_own_surface() {
    let s = MockFactory::new().create_stub();
    let peek = s.clone();
    s.stub("get").matching(move |_| peek.call_count("other") == 0).returns("quiet");

    let (tx, rx) = mpsc::channel();
    let worker = s.clone();
    thread::spawn(move || {
        let _ = tx.send(worker.invoke("get", &[]));
    });
    let got = rx
        .recv_timeout(Duration::from_secs(5))
        .unwrap_or_else(|_| panic!("F242 FALSIFIED: invoke blocked on its own predicate"));

    assert_eq!(got.unwrap(), json!("quiet"), "F242 FALSIFIED");
    let peek = s.clone();
    assert!(s.times_matching(1, "get", &ArgMatcher::predicate(move |_| peek.was_called("get"))));
}

/// Recursive factorial whose inner calls go back through a spy.
struct Factorial {
    spy: OnceLock<MockSurface>,
}

impl Component for Factorial {
    fn contract(&self) -> Contract {
        Contract::new("Factorial", ["fact"])
    }

    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, String> {
        let n = match (method, args) {
            ("fact", [n]) => n.as_u64().ok_or("fact needs a number")?,
            _ => return Err(format!("bad call {method}")),
        };
        if n <= 1 {
            return Ok(json!(1));
        }
        let spy = self.spy.get().ok_or("spy not attached")?;
        let below = spy.invoke("fact", &[json!(n - 1)]).map_err(|e| e.to_string())?;
        Ok(json!(n * below.as_u64().unwrap_or(0)))
    }
}

/// F243: Call logs keep invocation order across re-entrant calls
#[test]
fn f243_recursive_spy_logs_entry_order() {
    let factorial = Arc::new(Factorial { spy: OnceLock::new() });
    let target: Arc<dyn Component> = factorial.clone();
    let spy = MockFactory::new().create_spy(target, "fact").unwrap();
    factorial.spy.set(spy.clone()).unwrap();

    assert_eq!(spy.invoke("fact", &[json!(4)]).unwrap(), json!(24));

    let log = spy.call_log("fact");
    let entries: Vec<(u64, Value)> = log.iter().map(|r| (r.sequence, r.args[0].clone())).collect();
    assert_eq!(
        entries,
        vec![(0, json!(4)), (1, json!(3)), (2, json!(2)), (3, json!(1))],
        "F243 FALSIFIED: log not in entry order"
    );
    assert_eq!(log.records()[0].outcome, CallOutcome::Returned(json!(24)), "F243 FALSIFIED");
    assert!(log.iter().all(|r| !r.outcome.is_pending()), "F243 FALSIFIED: call left pending");
}
