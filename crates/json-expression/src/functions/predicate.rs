//! Type checks and comparison.

use super::arg;
use crate::error::ExprError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use serde_json::Value;
use std::sync::Arc;

fn is_equal_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::js_equal(arg(args, 0), arg(args, 1))))
}

fn is_nil_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::is_nil(arg(args, 0))))
}

fn is_null_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::Null))))
}

fn is_undefined_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(arg(args, 0).is_undefined()))
}

fn is_number_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::Number(_)))))
}

fn is_string_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::String(_)))))
}

fn is_boolean_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::Bool(_)))))
}

fn is_array_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::Array(_)))))
}

fn is_object_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(matches!(arg(args, 0), JsValue::Json(Value::Object(_)))))
}

fn is_empty_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let empty = match arg(args, 0) {
        JsValue::Json(v @ (Value::String(_) | Value::Array(_) | Value::Object(_))) => util::len(v) == 0,
        // Scalars have no elements.
        _ => true,
    };
    Ok(JsValue::from(empty))
}

fn cmp_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let a = arg(args, 0).clone().into_json();
    let b = arg(args, 1).clone().into_json();
    let n: i64 = match util::compare_values(&a, &b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    Ok(JsValue::from(n))
}

fn type_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::js_type(arg(args, 0))))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "isEqual",
            aliases: &["eq"],
            arity: Arity::Fixed(2),
            eval_fn: is_equal_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isNil",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_nil_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isNull",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_null_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isUndefined",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_undefined_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isNumber",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_number_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isString",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_string_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isBoolean",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_boolean_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isArray",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_array_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isObject",
            aliases: &["isPlainObject"],
            arity: Arity::Fixed(1),
            eval_fn: is_object_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "isEmpty",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: is_empty_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "cmp",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: cmp_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "type",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: type_eval,
        }),
    ]
}
