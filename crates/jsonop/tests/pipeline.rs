//! End-to-end pipeline tests.

use jsonop::{process, OperationDescriptor, Pipeline, PipelineError};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::error::Error as _;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

fn op(name: &str, expression: Option<&str>) -> OperationDescriptor {
    OperationDescriptor::new(name, expression)
}

fn check(input: Value, ops: &[OperationDescriptor], expected: Value) {
    let result = process(&input.to_string(), ops, false)
        .unwrap_or_else(|e| panic!("process({:?}) failed: {}", ops, e));
    assert_eq!(result, expected, "ops: {:?}", ops);
}

fn check_err(input: Value, ops: &[OperationDescriptor]) -> PipelineError {
    process(&input.to_string(), ops, false)
        .err()
        .unwrap_or_else(|| panic!("expected error for {:?}", ops))
}

fn people() -> Value {
    json!([
        {"name": "Ann", "age": 31, "team": "red"},
        {"name": "Bob", "age": 40, "team": "blue"},
        {"name": "Cid", "age": 17, "team": "red"},
        {"name": "Dee", "age": 25, "team": "green"}
    ])
}

// ----------------------------------------------------------------- Scenarios

#[test]
fn test_findall_adults() {
    check(
        json!([{"age": 15}, {"age": 20}, {"age": 30}]),
        &[op("findall", Some("it.age > 18"))],
        json!([{"age": 20}, {"age": 30}]),
    );
}

#[test]
fn test_prop_then_count() {
    check(
        json!({"metadata": {"a": 1, "b": 2, "c": 3}}),
        &[op("prop", Some("metadata")), op("count", None)],
        json!(3),
    );
}

#[test]
fn test_transform_into_keyed_accumulator() {
    check(
        json!([{"name": "Bob", "age": 40}]),
        &[op("transform", Some("out[key]={name: it.name, dob: 2014 - it.age}"))],
        json!([{"name": "Bob", "dob": 1974}]),
    );
}

#[test]
fn test_unknown_operation() {
    match check_err(json!([]), &[op("zzz", None)]) {
        PipelineError::UnknownOperation(name) => assert_eq!(name, "zzz"),
        other => panic!("unexpected error: {:?}", other),
    }
}

// ----------------------------------------------------------------- count

#[test]
fn test_count_shapes() {
    check(json!([1, 2, 3]), &[op("count", None)], json!(3));
    check(json!({"a": 1}), &[op("count", None)], json!(1));
    check(json!("héllo"), &[op("count", None)], json!(5));
    check(json!(null), &[op("count", None)], json!(0));
    check(json!(42), &[op("count", None)], json!(1));
}

#[test]
fn test_count_rejects_expression() {
    let err = check_err(json!([]), &[op("count", Some("it"))]);
    assert!(matches!(err, PipelineError::Argument { .. }), "got: {:?}", err);
}

// ----------------------------------------------------------------- search

#[test]
fn test_find() {
    check(people(), &[op("find", Some("it.team == 'red'")), op("prop", Some("name"))], json!("Ann"));
    check(people(), &[op("find", Some("it.age > 100"))], json!(null));
}

#[test]
fn test_find_binds_index() {
    check(json!(["a", "b", "c"]), &[op("findall", Some("key % 2 == 0"))], json!(["a", "c"]));
}

#[test]
fn test_indexof() {
    check(people(), &[op("indexof", Some("it.team == 'red'"))], json!(0));
    check(people(), &[op("lastindexof", Some("it.team == 'red'"))], json!(2));
    check(people(), &[op("indexof", Some("it.team == 'pink'"))], json!(-1));
    check(json!([]), &[op("lastindexof", Some("true"))], json!(-1));
}

#[test]
fn test_find_requires_expression() {
    let err = check_err(json!([]), &[op("find", None)]);
    assert!(err.to_string().contains("requires an expression"), "got: {}", err);
}

// ----------------------------------------------------------------- aggregate

#[test]
fn test_countby() {
    check(people(), &[op("countby", Some("it.team"))], json!({"red": 2, "blue": 1, "green": 1}));
    check(json!([1, 2, 1, true]), &[op("countby", None)], json!({"1": 2, "2": 1, "true": 1}));
}

#[test]
fn test_group_preserves_order() {
    check(
        people(),
        &[op("groupby", Some("it.age >= 30 ? 'senior' : 'junior'")), op("prop", Some("junior")), op("collect", Some("name"))],
        json!(["Cid", "Dee"]),
    );
    let result = process(&people().to_string(), &[op("group", Some("it.team")), op("keys", None)], false).unwrap();
    assert_eq!(result, json!(["red", "blue", "green"]));
}

#[test]
fn test_min_max() {
    check(people(), &[op("min", Some("it.age")), op("prop", Some("name"))], json!("Cid"));
    check(people(), &[op("max", Some("it.age")), op("prop", Some("name"))], json!("Bob"));
    check(json!([3, "a", null, 1]), &[op("min", None)], json!(null));
    check(json!([3, "a", null, 1]), &[op("max", None)], json!("a"));
    check(json!([]), &[op("max", None)], json!(null));
}

// ----------------------------------------------------------------- order

#[test]
fn test_head_tail() {
    let seq = json!([1, 2, 3, 4, 5, 6, 7]);
    check(seq.clone(), &[op("head", None)], json!([1, 2, 3, 4, 5]));
    check(seq.clone(), &[op("tail", None)], json!([3, 4, 5, 6, 7]));
    check(seq.clone(), &[op("head", Some("2"))], json!([1, 2]));
    check(seq.clone(), &[op("tail", Some("it.length - 5"))], json!([6, 7]));
    check(seq.clone(), &[op("head", Some("100"))], seq.clone());
    check(seq, &[op("head", Some("4")), op("tail", Some("2"))], json!([3, 4]));
}

#[test]
fn test_head_rejects_bad_count() {
    for source in ["-1", "'x'", "2.5"] {
        let err = check_err(json!([1, 2]), &[op("head", Some(source))]);
        assert!(matches!(err, PipelineError::Argument { .. }), "{}: {:?}", source, err);
    }
}

#[test]
fn test_sortby_is_stable() {
    check(
        people(),
        &[op("s", Some("it.team")), op("collect", Some("name"))],
        json!(["Bob", "Dee", "Ann", "Cid"]),
    );
    check(json!([3, "b", 1, null, "a"]), &[op("sortby", None)], json!([null, 1, 3, "a", "b"]));
}

#[test]
fn test_sample() {
    let result = process("[1, 2, 3, 4]", &[op("sample", None)], false).unwrap();
    assert_eq!(result.as_array().map(Vec::len), Some(2));

    let err = check_err(json!([1, 2, 3]), &[op("sample", Some("4"))]);
    assert!(matches!(err, PipelineError::Argument { .. }), "got: {:?}", err);
}

// ----------------------------------------------------------------- transform

#[test]
fn test_transform_plain_value() {
    check(people(), &[op("t", Some("it.name.toUpperCase()")), op("head", Some("2"))], json!(["ANN", "BOB"]));
}

#[test]
fn test_transform_multi_field_accumulator() {
    check(
        json!([{"a": 1, "b": 2}]),
        &[op("transform", Some("out.sum = it.a + it.b; out.diff = it.a - it.b"))],
        json!([{"sum": 3, "diff": -1}]),
    );
}

#[test]
fn test_transform_mapping_and_scalar() {
    check(json!({"x": 1, "y": 2}), &[op("transform", Some("it * 10"))], json!({"x": 10, "y": 20}));
    check(json!({"x": 1}), &[op("transform", Some("key + '=' + it"))], json!({"x": "x=1"}));
    check(json!(4), &[op("transform", Some("it * it"))], json!(16));
}

#[test]
fn test_transform_missing_property_is_null() {
    check(json!([{}]), &[op("transform", Some("it.nope"))], json!([null]));
}

#[test]
fn test_transform_uses_namespace() {
    check(
        json!([{"tags": ["b", "a", "b"]}]),
        &[op("transform", Some("_.uniq(it.tags)"))],
        json!([["b", "a"]]),
    );
}

// ----------------------------------------------------------------- collection

#[test]
fn test_collect() {
    check(people(), &[op("collect", Some("age"))], json!([31, 40, 17, 25]));
    check(json!([{"a": 1}, {}]), &[op("collect", Some("a"))], json!([1, null]));
    check(json!({"p": {"n": 1}, "q": {"n": 2}}), &[op("collect", Some("n"))], json!([1, 2]));
}

#[test]
fn test_collect_type_mismatch() {
    let err = check_err(json!([{"a": 1}, 2]), &[op("collect", Some("a"))]);
    match err {
        PipelineError::TypeMismatch { expected, found, .. } => {
            assert_eq!(expected, "mapping");
            assert_eq!(found, "number");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let err = check_err(json!(5), &[op("collect", Some("a"))]);
    assert!(matches!(err, PipelineError::TypeMismatch { .. }), "got: {:?}", err);
}

#[test]
fn test_prop_missing_is_null() {
    check(json!({"a": 1}), &[op("prop", Some("b"))], json!(null));
    check(json!({"first name": "Ann"}), &[op("prop", Some("first name"))], json!("Ann"));
}

#[test]
fn test_keys_values() {
    check(json!({"b": 1, "a": 2}), &[op("keys", None)], json!(["b", "a"]));
    check(json!({"b": 1, "a": 2}), &[op("values", None)], json!([1, 2]));
    let err = check_err(json!([1]), &[op("keys", None)]);
    assert!(matches!(err, PipelineError::TypeMismatch { .. }), "got: {:?}", err);
}

// ----------------------------------------------------------------- errors

#[test]
fn test_invalid_json() {
    let err = process("{\"a\": ", &[], false).unwrap_err();
    match err {
        PipelineError::Parse(ref e) => {
            assert_eq!(e.line(), 1);
            let message = err.to_string();
            assert!(message.starts_with("invalid JSON input: "), "got: {}", message);
            assert!(message.contains("line 1 column"), "got: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_compile_fails_before_running() {
    // The second step is invalid, so the first never runs.
    let err = Pipeline::compile(&[op("count", None), op("findall", Some("it >"))]).unwrap_err();
    match err {
        PipelineError::Expression { operation, expression, .. } => {
            assert_eq!(operation, "findall");
            assert_eq!(expression, "it >");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_evaluation_error_is_terminal() {
    let err = check_err(json!([{"a": null}]), &[op("findall", Some("it.a.b"))]);
    assert!(matches!(err, PipelineError::Expression { .. }), "got: {:?}", err);
    assert_eq!(err.to_string(), "findall: expression `it.a.b` failed");
    let cause = err.source().map(|e| e.to_string()).unwrap_or_default();
    assert!(cause.contains("cannot read property b of null"), "got: {}", cause);
}

#[test]
fn test_type_mismatch_on_scalar() {
    let err = check_err(json!("text"), &[op("sortby", None)]);
    assert_eq!(err.to_string(), "sortby: expected sequence, found string");
}

#[test]
fn test_observer_sees_every_step() {
    let pipeline = Pipeline::compile(&[op("head", Some("3")), op("count", None)]).unwrap();
    let mut seen = Vec::new();
    let result = pipeline
        .run_with(json!([1, 2, 3, 4]), |step, name, value| {
            seen.push((step, name.to_string(), value.clone()));
        })
        .unwrap();
    assert_eq!(result, json!(3));
    assert_eq!(
        seen,
        vec![
            (1, "head".to_string(), json!([1, 2, 3])),
            (2, "count".to_string(), json!(3)),
        ]
    );
}

#[test]
fn test_debug_mode_returns_same_result() {
    let ops = [op("findall", Some("it > 1"))];
    assert_eq!(process("[1,2,3]", &ops, true).unwrap(), process("[1,2,3]", &ops, false).unwrap());
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_string).collect()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLog {
    type Writer = CapturedLog;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_debug_mode_emits_every_intermediate_value() {
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();
    let ops = [op("findall", Some("it > 1")), op("count", None)];
    let result = tracing::subscriber::with_default(subscriber, || process("[1,2,3]", &ops, true));
    assert_eq!(result.unwrap(), json!(2));

    let events: Vec<String> = log
        .lines()
        .into_iter()
        .filter(|line| line.contains("jsonop::debug"))
        .collect();
    assert_eq!(events.len(), 2, "events: {:?}", events);
    assert!(events[0].contains("[2,3]") && events[0].contains("step=1"), "got: {}", events[0]);
    assert!(events[0].contains("findall"), "got: {}", events[0]);
    assert!(events[1].contains("step=2") && events[1].contains("count"), "got: {}", events[1]);
}

#[test]
fn test_debug_mode_off_emits_nothing() {
    let log = CapturedLog::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(log.clone())
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .finish();
    let ops = [op("count", None)];
    let result = tracing::subscriber::with_default(subscriber, || process("[1]", &ops, false));
    assert_eq!(result.unwrap(), json!(1));
    assert!(log.lines().iter().all(|line| !line.contains("jsonop::debug")));
}

// ----------------------------------------------------------------- Laws

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn empty_pipeline_is_identity(value in arb_json()) {
        prop_assert_eq!(process(&value.to_string(), &[], false).unwrap(), value);
    }

    #[test]
    fn count_of_sequence_is_its_length(items in prop::collection::vec(arb_json(), 0..20)) {
        let n = items.len();
        let result = process(&Value::Array(items).to_string(), &[op("count", None)], false).unwrap();
        prop_assert_eq!(result, json!(n));
    }

    #[test]
    fn steps_apply_in_declared_order(items in prop::collection::vec(-50i64..50, 0..20), h in 0usize..10, t in 0usize..10) {
        let json = Value::from(items).to_string();
        let head = op("head", Some(&h.to_string()));
        let tail = op("tail", Some(&t.to_string()));
        let chained = process(&json, &[head.clone(), tail.clone()], false).unwrap();
        let first = process(&json, &[head], false).unwrap();
        let manual = process(&first.to_string(), &[tail], false).unwrap();
        prop_assert_eq!(chained, manual);
    }

    #[test]
    fn sortby_is_idempotent(items in prop::collection::vec(arb_json(), 0..12)) {
        let json = Value::Array(items).to_string();
        let once = process(&json, &[op("sortby", None)], false).unwrap();
        let twice = process(&json, &[op("sortby", None), op("sortby", None)], false).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn keys_and_values_zip_back(map in prop::collection::btree_map("[a-z]{1,5}", -100i64..100, 0..8)) {
        let value = Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
        let json = value.to_string();
        let keys = process(&json, &[op("keys", None)], false).unwrap();
        let values = process(&json, &[op("values", None)], false).unwrap();
        let rebuilt: serde_json::Map<String, Value> = keys
            .as_array()
            .unwrap()
            .iter()
            .zip(values.as_array().unwrap())
            .map(|(k, v)| (k.as_str().unwrap().to_string(), v.clone()))
            .collect();
        prop_assert_eq!(Value::Object(rebuilt), value);
    }

    #[test]
    fn sample_draws_distinct_positions(len in 0usize..15, n in 0usize..20) {
        let items: Vec<Value> = (0..len).map(|i| json!(i)).collect();
        let json = Value::Array(items).to_string();
        let result = process(&json, &[op("sample", Some(&n.to_string()))], false);
        if n > len {
            let is_argument_err = matches!(result, Err(PipelineError::Argument { .. }));
            prop_assert!(is_argument_err);
        } else {
            let drawn = result.unwrap();
            let drawn = drawn.as_array().unwrap();
            prop_assert_eq!(drawn.len(), n);
            let mut positions: Vec<u64> = drawn.iter().filter_map(Value::as_u64).collect();
            positions.sort_unstable();
            positions.dedup();
            prop_assert_eq!(positions.len(), n);
        }
    }
}
