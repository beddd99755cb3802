//! Integration tests for expression parsing and evaluation.

use json_expression::{evaluate_str, CompiledExpression, ExprError, JsValue, Vars};
use serde_json::{json, Value};

fn check(expression: &str, expected: Value, item: Value) {
    let mut vars = Vars::new(item).with_key(json!(0));
    let result = evaluate_str(expression, &mut vars)
        .unwrap_or_else(|e| panic!("evaluate({}) failed: {}", expression, e));
    assert_eq!(result.into_json(), expected, "expression: {}", expression);
}

fn check_err(expression: &str, item: Value) -> ExprError {
    let mut vars = Vars::new(item);
    evaluate_str(expression, &mut vars)
        .err()
        .unwrap_or_else(|| panic!("expected error for {}", expression))
}

// ----------------------------------------------------------------- Literals

#[test]
fn test_literals() {
    check("1", json!(1), json!(null));
    check("1.5", json!(1.5), json!(null));
    check("1e3", json!(1000), json!(null));
    check("'single'", json!("single"), json!(null));
    check("\"double\\n\"", json!("double\n"), json!(null));
    check("'\\u0041'", json!("A"), json!(null));
    check("true", json!(true), json!(null));
    check("null", json!(null), json!(null));
    check("undefined", json!(null), json!(null));
}

#[test]
fn test_array_and_object_literals() {
    check("[1, 'a', [true]]", json!([1, "a", [true]]), json!(null));
    check("[1, 2,]", json!([1, 2]), json!(null));
    check(
        "{a: 1, 'b c': 2, [it.k]: 3}",
        json!({"a": 1, "b c": 2, "dyn": 3}),
        json!({"k": "dyn"}),
    );
    check("{it}", json!({"it": 5}), json!(5));
    // Undefined members are dropped.
    check("{a: it.missing, b: 1}", json!({"b": 1}), json!({}));
}

// ----------------------------------------------------------------- Arithmetic

#[test]
fn test_arithmetic() {
    check("1 + 2 * 3", json!(7), json!(null));
    check("(1 + 2) * 3", json!(9), json!(null));
    check("2014 - it.age", json!(1974), json!({"age": 40}));
    check("7 % 4", json!(3), json!(null));
    check("1 / 4", json!(0.25), json!(null));
    check("-it", json!(-3), json!(3));
    check("+'42'", json!(42), json!(null));
    check("10 - 2 - 3", json!(5), json!(null));
}

#[test]
fn test_string_concatenation() {
    check("'a' + 1", json!("a1"), json!(null));
    check("'' + 1e20", json!("100000000000000000000"), json!(null));
    check("'' + it", json!("-90000000000000000000"), json!(-9e19));
    check("it.first + ' ' + it.last", json!("Ada Lovelace"), json!({"first": "Ada", "last": "Lovelace"}));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(check_err("1 / 0", json!(null)), ExprError::DivisionByZero);
    assert_eq!(check_err("1 % 0", json!(null)), ExprError::DivisionByZero);
}

// ----------------------------------------------------------------- Comparison

#[test]
fn test_comparison() {
    check("it.age > 18", json!(true), json!({"age": 20}));
    check("it.age > 18", json!(false), json!({"age": 15}));
    check("it.age >= 20", json!(true), json!({"age": 20}));
    check("'b' < 'a'", json!(false), json!(null));
    check("'10' < 9", json!(false), json!(null));
    check("it.missing > 1", json!(false), json!({}));
}

#[test]
fn test_equality() {
    check("it == 1", json!(true), json!(1.0));
    check("it === {a: [1, 2]}", json!(true), json!({"a": [1, 2]}));
    check("it != 'x'", json!(true), json!("y"));
    check("it !== null", json!(false), json!(null));
}

// ----------------------------------------------------------------- Logical

#[test]
fn test_logical() {
    check("!it", json!(true), json!(""));
    check("it && it.a", json!(null), json!(null));
    check("it.a || 'default'", json!("default"), json!({"a": 0}));
    check("it.a ?? 'default'", json!(0), json!({"a": 0}));
    check("it.b ?? 'default'", json!("default"), json!({}));
    check("it > 1 ? 'big' : 'small'", json!("big"), json!(2));
    check("typeof it", json!("object"), json!([1]));
}

#[test]
fn test_short_circuit_skips_errors() {
    check("it.a && it.a.b.c", json!(null), json!({"a": null}));
    check("false && undefinedName", json!(false), json!(null));
}

// ----------------------------------------------------------------- Member access

#[test]
fn test_member_access() {
    check("it.a.b", json!(2), json!({"a": {"b": 2}}));
    check("it['a']['b']", json!(2), json!({"a": {"b": 2}}));
    check("it[1]", json!("y"), json!(["x", "y"]));
    check("it.length", json!(3), json!([1, 2, 3]));
    check("it.name.length", json!(3), json!({"name": "Bob"}));
    check("key", json!(0), json!(null));
}

#[test]
fn test_member_of_undefined_fails() {
    let err = check_err("it.a.b", json!({}));
    assert!(matches!(err, ExprError::NotContainer { .. }), "got: {:?}", err);
    assert!(err.to_string().contains("cannot read property b"), "got: {}", err);
}

#[test]
fn test_unbound_name_fails() {
    assert_eq!(check_err("foo + 1", json!(null)), ExprError::NotDefined("foo".to_string()));
}

// ----------------------------------------------------------------- Methods

#[test]
fn test_string_methods() {
    check("it.toUpperCase()", json!("ABC"), json!("abc"));
    check("it.split(',')", json!(["a", "b"]), json!("a,b"));
    check("it.slice(-3)", json!("xyz"), json!("abcxyz"));
    check("it.includes('bc')", json!(true), json!("abc"));
    check("it.indexOf('c')", json!(2), json!("abc"));
}

#[test]
fn test_array_methods() {
    check("it.includes(2)", json!(true), json!([1, 2]));
    check("it.join('-')", json!("1-2-3"), json!([1, 2, 3]));
    check("it.slice(1, 2)", json!([2]), json!([1, 2, 3]));
    check("(1.005).toFixed(1)", json!("1.0"), json!(null));
}

#[test]
fn test_unknown_method_fails() {
    let err = check_err("it.frobnicate()", json!("abc"));
    assert!(matches!(err, ExprError::NotCallable(_)), "got: {:?}", err);
}

// ----------------------------------------------------------------- Assignment

#[test]
fn test_assign_into_accumulator() {
    let expr = CompiledExpression::compile("out[key] = {name: it.name, dob: 2014 - it.age}").unwrap();
    let mut vars = Vars::new(json!({"name": "Bob", "age": 40}))
        .with_key(json!(0))
        .with_accumulator();
    let result = expr.call(&mut vars).unwrap();
    assert_eq!(result.into_json(), json!({"name": "Bob", "dob": 1974}));
    assert_eq!(
        vars.take("out").unwrap().into_json(),
        json!({"0": {"name": "Bob", "dob": 1974}})
    );
}

#[test]
fn test_assign_nested_creates_objects() {
    let expr = CompiledExpression::compile("out.a.b = 1; out.c = it; out").unwrap();
    let mut vars = Vars::new(json!(true)).with_accumulator();
    let result = expr.call(&mut vars).unwrap();
    assert_eq!(result.into_json(), json!({"a": {"b": 1}, "c": true}));
}

#[test]
fn test_assign_local_variable() {
    check("x = it * 2; x + 1", json!(7), json!(3));
}

#[test]
fn test_assign_array_index_extends() {
    check("a = []; a[2] = 'z'; a", json!([null, null, "z"]), json!(null));
}

#[test]
fn test_assign_far_array_index_fails() {
    for source in ["it[1e20] = 5", "it[5e9] = 1", "it[5e9].a = 1"] {
        let err = check_err(source, json!([[1]]));
        assert!(err.to_string().contains("invalid array index"), "{}: {}", source, err);
    }
    check("it[3] = 'x'; it", json!([1, null, null, "x"]), json!([1]));
}

#[test]
fn test_invalid_assignment_target() {
    let err = check_err("1 = 2", json!(null));
    assert!(matches!(err, ExprError::Syntax { .. }), "got: {:?}", err);
    assert_eq!(check_err("_ = 1", json!(null)), ExprError::InvalidAssignment);
}

// ----------------------------------------------------------------- Namespace

#[test]
fn test_namespace_calls() {
    check("_.size(it)", json!(3), json!([1, 2, 3]));
    check("_.groupBy(it, 'kind')", json!({"a": [{"kind": "a"}], "b": [{"kind": "b"}]}), json!([{"kind": "a"}, {"kind": "b"}]));
    check("_.toUpper(it.name)", json!("BOB"), json!({"name": "Bob"}));
    check("_.round(it, 1)", json!(1.3), json!(1.26));
}

#[test]
fn test_random_rejects_unbounded_range() {
    for source in ["_.random(0.5, 'Infinity')", "_.random('-Infinity', 1)", "_.random(1, 'x')"] {
        let err = check_err(source, json!(null));
        assert_eq!(err, ExprError::Other("_.random: invalid bounds".to_string()), "{}", source);
    }
    check("_.random(3, 3)", json!(3), json!(null));
}

#[test]
fn test_range() {
    check("_.range(4)", json!([0, 1, 2, 3]), json!(null));
    check("_.range(1, 2, 0.25)", json!([1, 1.25, 1.5, 1.75]), json!(null));
    check("_.range(3, 0)", json!([3, 2, 1]), json!(null));
    check("_.range(0, 3, -1)", json!([]), json!(null));
}

#[test]
fn test_range_rejects_unbounded_length() {
    for source in ["_.range(1, 2, 1e-20)", "_.range(0, 1e12)", "_.range('Infinity')"] {
        assert!(matches!(check_err(source, json!(null)), ExprError::Other(_)), "{}", source);
    }
}

#[test]
fn test_namespace_is_not_a_value() {
    assert_eq!(check_err("_", json!(null)), ExprError::NamespaceNotValue);
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        check_err("_.nope(1)", json!(null)),
        ExprError::UnknownFunction("nope".to_string())
    );
}

#[test]
fn test_arity_error() {
    let err = check_err("_.size(1, 2)", json!(null));
    assert!(err.to_string().contains("expects 1 arguments"), "got: {}", err);
}

// ----------------------------------------------------------------- Syntax

#[test]
fn test_syntax_errors() {
    for source in ["", "   ", "it.", "(1", "[1, 2", "{a 1}", "'open", "1 +", "it @ 2"] {
        let err = check_err(source, json!(null));
        assert!(matches!(err, ExprError::Syntax { .. }), "{:?} -> {:?}", source, err);
    }
}

#[test]
fn test_syntax_error_position() {
    match check_err("it.a + )", json!(null)) {
        ExprError::Syntax { pos, .. } => assert_eq!(pos, 7),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_compiled_expression_is_reusable() {
    let expr = CompiledExpression::compile("it * 2").unwrap();
    for n in 0i64..5 {
        let mut vars = Vars::new(json!(n));
        assert_eq!(expr.call(&mut vars).unwrap(), JsValue::from(n * 2));
    }
    assert_eq!(expr.source(), "it * 2");
}
