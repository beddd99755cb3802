//! Object functions.

use super::arg;
use crate::error::ExprError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use serde_json::{Map, Value};
use std::sync::Arc;

fn keys_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let keys: Vec<Value> = match arg(args, 0) {
        JsValue::Json(Value::Array(arr)) => (0..arr.len()).map(|i| Value::String(i.to_string())).collect(),
        other => util::as_obj(other)?
            .keys()
            .map(|k| Value::String(k.clone()))
            .collect(),
    };
    Ok(JsValue::Json(Value::Array(keys)))
}

fn values_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let values: Vec<Value> = match arg(args, 0) {
        JsValue::Json(Value::Array(arr)) => arr.clone(),
        other => util::as_obj(other)?.values().cloned().collect(),
    };
    Ok(JsValue::Json(Value::Array(values)))
}

fn entries_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let obj = util::as_obj(arg(args, 0))?;
    let entries: Vec<Value> = obj
        .iter()
        .map(|(k, v)| Value::Array(vec![Value::String(k.clone()), v.clone()]))
        .collect();
    Ok(JsValue::Json(Value::Array(entries)))
}

fn from_pairs_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let pairs = util::as_arr(arg(args, 0))?;
    let mut obj = Map::new();
    for pair in pairs {
        match pair {
            Value::Array(kv) if kv.len() == 2 => {
                obj.insert(util::value_to_string(&kv[0]), kv[1].clone());
            }
            _ => return Err(ExprError::Other("_.fromPairs: expected [key, value] pairs".to_string())),
        }
    }
    Ok(JsValue::Json(Value::Object(obj)))
}

fn get_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let found = match arg(args, 0) {
        JsValue::Json(v) => util::get_path(v, &util::str_val(arg(args, 1))).cloned(),
        JsValue::Undefined => None,
    };
    Ok(match found {
        Some(v) => JsValue::Json(v),
        None => arg(args, 2).clone(),
    })
}

fn has_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let found = match arg(args, 0) {
        JsValue::Json(v) => util::get_path(v, &util::str_val(arg(args, 1))).is_some(),
        JsValue::Undefined => false,
    };
    Ok(JsValue::from(found))
}

/// Flattens the key arguments of `pick`/`omit`, which may be strings or
/// arrays of strings.
fn key_list(args: &[JsValue]) -> Vec<String> {
    let mut keys = Vec::new();
    for a in args {
        match a {
            JsValue::Json(Value::Array(items)) => keys.extend(items.iter().map(util::value_to_string)),
            other => keys.push(util::str_val(other)),
        }
    }
    keys
}

fn pick_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let obj = util::as_obj(arg(args, 0))?;
    let keys = key_list(&args[1..]);
    let picked: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| keys.contains(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(JsValue::Json(Value::Object(picked)))
}

fn omit_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let obj = util::as_obj(arg(args, 0))?;
    let keys = key_list(&args[1..]);
    let kept: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !keys.contains(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Ok(JsValue::Json(Value::Object(kept)))
}

fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (k, v) in source {
        match (target.get_mut(k), v) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_into(existing, incoming),
            _ => {
                target.insert(k.clone(), v.clone());
            }
        }
    }
}

fn merge_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let mut result = Map::new();
    for a in args {
        merge_into(&mut result, util::as_obj(a)?);
    }
    Ok(JsValue::Json(Value::Object(result)))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "keys",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: keys_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "values",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: values_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "entries",
            aliases: &["toPairs"],
            arity: Arity::Fixed(1),
            eval_fn: entries_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "fromPairs",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: from_pairs_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "get",
            aliases: &[],
            arity: Arity::Range(2, Some(3)),
            eval_fn: get_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "has",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: has_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "pick",
            aliases: &[],
            arity: Arity::Range(1, None),
            eval_fn: pick_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "omit",
            aliases: &[],
            arity: Arity::Range(1, None),
            eval_fn: omit_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "merge",
            aliases: &[],
            arity: Arity::Range(1, None),
            eval_fn: merge_eval,
        }),
    ]
}
