//! Value helpers shared by the evaluator and the `_` namespace.

use crate::error::ExprError;
use crate::types::JsValue;
use serde_json::{Map, Value};
use std::cmp::Ordering;

// ---------------------------------------------------------------- Numbers

/// JSON number for `n`. Integral values that fit an `i64` become integers so
/// `2014 - 40` renders as `1974`. `None` for NaN and infinities.
pub fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        // -0.0 collapses to 0 here as well.
        return Some(Value::Number(serde_json::Number::from(n as i64)));
    }
    serde_json::Number::from_f64(n).map(Value::Number)
}

/// Like `number_value` but fails on non-finite results.
pub fn f64_to_jsval(n: f64) -> Result<JsValue, ExprError> {
    number_value(n).map(JsValue::Json).ok_or(ExprError::NotFinite)
}

pub fn usize_to_jsval(n: usize) -> JsValue {
    JsValue::Json(Value::Number(serde_json::Number::from(n as u64)))
}

/// JavaScript `ToNumber`. NaN is kept so comparisons against it fail.
pub fn num(value: &JsValue) -> f64 {
    match value {
        JsValue::Undefined => f64::NAN,
        JsValue::Json(v) => match v {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        },
    }
}

/// Renders a number the way JavaScript prints it: no trailing `.0`.
pub fn fmt_number(n: f64) -> String {
    if n == 0.0 {
        // Covers -0.
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

// ---------------------------------------------------------------- Strings

/// JavaScript `ToString`, with objects and arrays rendered as JSON.
pub fn str_val(value: &JsValue) -> String {
    match value {
        JsValue::Undefined => "undefined".to_string(),
        JsValue::Json(v) => value_to_string(v),
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => fmt_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        _ => v.to_string(),
    }
}

// ------------------------------------------------------------------ Types

/// The `typeof`-style name of a value.
pub fn js_type(value: &JsValue) -> &'static str {
    match value {
        JsValue::Undefined => "undefined",
        JsValue::Json(v) => json_type(v),
    }
}

pub fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JavaScript truthiness.
pub fn is_truthy(value: &JsValue) -> bool {
    match value {
        JsValue::Undefined => false,
        JsValue::Json(v) => is_truthy_json(v),
    }
}

pub fn is_truthy_json(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn is_nil(value: &JsValue) -> bool {
    matches!(value, JsValue::Undefined | JsValue::Json(Value::Null))
}

// ------------------------------------------------------------- Comparison

/// Structural equality with numbers compared by value, so `1 == 1.0`.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(fx), Some(fy)) => fx == fy,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => a == b,
    }
}

pub fn js_equal(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Json(x), JsValue::Json(y)) => deep_equal(x, y),
        (JsValue::Undefined, JsValue::Undefined) => true,
        _ => false,
    }
}

/// Relational comparison. Two strings compare by code point, anything else
/// is coerced to numbers. `None` when a side is NaN.
pub fn js_compare(a: &JsValue, b: &JsValue) -> Option<Ordering> {
    match (a, b) {
        (JsValue::Json(Value::String(x)), JsValue::Json(Value::String(y))) => Some(x.cmp(y)),
        _ => num(a).partial_cmp(&num(b)),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total "natural" ordering across JSON values:
/// null < booleans < numbers < strings < arrays < objects.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let fx = x.as_f64().unwrap_or(0.0);
            let fy = y.as_f64().unwrap_or(0.0);
            fx.total_cmp(&fy)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(xs), Value::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        (Value::Object(xs), Value::Object(ys)) => {
            for ((kx, x), (ky, y)) in xs.iter().zip(ys) {
                let ord = kx.cmp(ky).then_with(|| compare_values(x, y));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

// ------------------------------------------------------------- Containers

pub fn as_arr(value: &JsValue) -> Result<&Vec<Value>, ExprError> {
    match value {
        JsValue::Json(Value::Array(a)) => Ok(a),
        _ => Err(ExprError::NotArray),
    }
}

pub fn as_obj(value: &JsValue) -> Result<&Map<String, Value>, ExprError> {
    match value {
        JsValue::Json(Value::Object(o)) => Ok(o),
        _ => Err(ExprError::NotObject),
    }
}

pub fn as_str(value: &JsValue) -> Result<&str, ExprError> {
    match value {
        JsValue::Json(Value::String(s)) => Ok(s.as_str()),
        _ => Err(ExprError::NotString),
    }
}

/// Number of elements, entries or characters.
pub fn len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        _ => 0,
    }
}

/// Reads `value[property]` with JavaScript member semantics. Missing
/// properties are `undefined`; reading from `null`/`undefined` fails.
pub fn member(value: &JsValue, property: &JsValue) -> Result<JsValue, ExprError> {
    let container = match value {
        JsValue::Json(v) if !v.is_null() => v,
        _ => {
            return Err(ExprError::NotContainer {
                property: str_val(property),
                target: js_type(value),
            })
        }
    };
    let key = str_val(property);
    match container {
        Value::Array(arr) => {
            if key == "length" {
                return Ok(usize_to_jsval(arr.len()));
            }
            Ok(array_index(property)
                .and_then(|i| arr.get(i))
                .map(|v| JsValue::Json(v.clone()))
                .unwrap_or(JsValue::Undefined))
        }
        Value::String(s) => {
            if key == "length" {
                return Ok(usize_to_jsval(s.chars().count()));
            }
            Ok(array_index(property)
                .and_then(|i| s.chars().nth(i))
                .map(|c| JsValue::Json(Value::String(c.to_string())))
                .unwrap_or(JsValue::Undefined))
        }
        Value::Object(obj) => Ok(obj
            .get(&key)
            .map(|v| JsValue::Json(v.clone()))
            .unwrap_or(JsValue::Undefined)),
        _ => Ok(JsValue::Undefined),
    }
}

/// Interprets a property as a non-negative array index.
pub fn array_index(property: &JsValue) -> Option<usize> {
    match property {
        JsValue::Json(Value::Number(n)) => {
            let f = n.as_f64()?;
            if f >= 0.0 && f.fract() == 0.0 {
                Some(f as usize)
            } else {
                None
            }
        }
        JsValue::Json(Value::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    }
}

/// Follows a dotted property path (`"a.b.0"`). Missing steps give `None`.
pub fn get_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, step| match current {
        Value::Object(obj) => obj.get(step),
        Value::Array(arr) => step.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    })
}

/// Applies an iteratee argument to an element: a property path string
/// selects a nested value, `null`/`undefined` is the identity.
pub fn apply_iteratee(item: &Value, iteratee: &JsValue) -> Result<Value, ExprError> {
    match iteratee {
        JsValue::Undefined | JsValue::Json(Value::Null) => Ok(item.clone()),
        JsValue::Json(Value::String(path)) => {
            Ok(get_path(item, path).cloned().unwrap_or(Value::Null))
        }
        JsValue::Json(Value::Number(_)) => Ok(get_path(item, &str_val(iteratee))
            .cloned()
            .unwrap_or(Value::Null)),
        other => Err(ExprError::Other(format!(
            "iteratee must be a property path, got {}",
            js_type(other)
        ))),
    }
}

/// Grouping key for a value: strings as-is, everything else stringified.
pub fn group_key(v: &Value) -> String {
    value_to_string(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_floats_become_integers() {
        assert_eq!(number_value(1974.0), Some(json!(1974)));
        assert_eq!(number_value(0.5), Some(json!(0.5)));
        assert_eq!(number_value(f64::NAN), None);
    }

    #[test]
    fn fmt_number_prints_large_integers_exactly() {
        assert_eq!(fmt_number(1e20), "100000000000000000000");
        assert_eq!(fmt_number(-4e19), "-40000000000000000000");
        assert_eq!(fmt_number(-0.0), "0");
        assert_eq!(fmt_number(2.5), "2.5");
        assert_eq!(value_to_string(&json!(1e20)), "100000000000000000000");
    }

    #[test]
    fn natural_ordering_ranks_types() {
        let mut values = vec![json!("a"), json!(2), json!(null), json!([1]), json!(true), json!(1)];
        values.sort_by(compare_values);
        assert_eq!(
            values,
            vec![json!(null), json!(true), json!(1), json!(2), json!("a"), json!([1])]
        );
    }

    #[test]
    fn deep_equal_ignores_number_representation() {
        assert!(deep_equal(&json!({"a": [1, 2.0]}), &json!({"a": [1.0, 2]})));
        assert!(!deep_equal(&json!({"a": 1}), &json!({"a": "1"})));
    }

    #[test]
    fn get_path_walks_objects_and_arrays() {
        let v = json!({"a": {"b": [10, 20]}});
        assert_eq!(get_path(&v, "a.b.1"), Some(&json!(20)));
        assert_eq!(get_path(&v, "a.c"), None);
    }

    #[test]
    fn member_reads_length_and_missing_properties() {
        let arr = JsValue::Json(json!([1, 2, 3]));
        assert_eq!(member(&arr, &"length".into()).unwrap(), JsValue::from(3i64));
        let obj = JsValue::Json(json!({"a": 1}));
        assert_eq!(member(&obj, &"b".into()).unwrap(), JsValue::Undefined);
        assert!(member(&JsValue::Undefined, &"b".into()).is_err());
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                (-1e6f64..1e6).prop_map(|n| number_value(n).unwrap_or(Value::Null)),
                "[a-c]{0,3}".prop_map(Value::String),
            ];
            leaf.prop_recursive(2, 12, 3, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                    prop::collection::btree_map("[a-c]{1,2}", inner, 0..3)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn compare_values_is_antisymmetric(a in arb_value(), b in arb_value()) {
                prop_assert_eq!(compare_values(&a, &b), compare_values(&b, &a).reverse());
            }

            #[test]
            fn compare_values_agrees_with_deep_equal(a in arb_value()) {
                prop_assert_eq!(compare_values(&a, &a.clone()), Ordering::Equal);
                prop_assert!(deep_equal(&a, &a.clone()));
            }
        }
    }
}
