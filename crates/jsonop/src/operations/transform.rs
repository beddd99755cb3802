//! `transform`: rebuild every element through an expression with a fresh
//! `out` accumulator.

use super::index_key;
use crate::error::PipelineError;
use crate::types::{ArgSpec, OpCtx, OperationDefinition};
use json_expression::vars::OUT;
use json_expression::{util, CompiledExpression, JsValue, Vars};
use serde_json::{Map, Value};
use std::sync::Arc;

fn transform_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let expr = expr.ok_or_else(|| PipelineError::argument(ctx.operation, "requires an expression"))?;
    match value {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                out.push(transform_one(expr, item, index_key(i), ctx)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, item) in map {
                let result = transform_one(expr, item, Value::String(k.clone()), ctx)?;
                out.insert(k, result);
            }
            Ok(Value::Object(out))
        }
        scalar => transform_one(expr, scalar, Value::Null, ctx),
    }
}

fn transform_one(
    expr: &CompiledExpression,
    item: Value,
    key: Value,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let key_name = util::value_to_string(&key);
    let mut vars = Vars::new(item).with_key(key).with_accumulator();
    let result = expr
        .call(&mut vars)
        .map_err(|e| PipelineError::expression(ctx.operation, expr.source(), e))?;
    Ok(read_back(result, vars.take(OUT), &key_name))
}

/// Per-item result from the expression value and the accumulator:
/// an untouched `out` yields the expression value, `out[key] = v` alone
/// yields `v`, anything else yields `out`.
fn read_back(result: JsValue, out: Option<JsValue>, key_name: &str) -> Value {
    match out {
        Some(JsValue::Json(Value::Object(map))) if map.is_empty() => result.into_json(),
        Some(JsValue::Json(Value::Object(map))) if map.len() == 1 && map.contains_key(key_name) => {
            map.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null)
        }
        Some(out) => out.into_json(),
        None => result.into_json(),
    }
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![Arc::new(OperationDefinition {
        name: "transform",
        aliases: &["t"],
        arg: ArgSpec::Required,
        apply_fn: transform_apply,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untouched_accumulator_yields_expression_value() {
        let out = Some(JsValue::Json(json!({})));
        assert_eq!(read_back(JsValue::from("x"), out, "0"), json!("x"));
    }

    #[test]
    fn undefined_result_becomes_null() {
        let out = Some(JsValue::Json(json!({})));
        assert_eq!(read_back(JsValue::Undefined, out, "0"), json!(null));
    }

    #[test]
    fn own_key_entry_is_unwrapped() {
        let out = Some(JsValue::Json(json!({"3": {"a": 1}})));
        assert_eq!(read_back(JsValue::Undefined, out, "3"), json!({"a": 1}));
    }

    #[test]
    fn other_entries_return_accumulator() {
        let out = Some(JsValue::Json(json!({"a": 1, "b": 2})));
        assert_eq!(read_back(JsValue::from(2), out, "0"), json!({"a": 1, "b": 2}));
        let out = Some(JsValue::Json(json!({"name": "x"})));
        assert_eq!(read_back(JsValue::from("x"), out, "0"), json!({"name": "x"}));
    }

    #[test]
    fn reassigned_accumulator_is_returned() {
        let out = Some(JsValue::Json(json!(7)));
        assert_eq!(read_back(JsValue::from(7), out, "0"), json!(7));
    }
}
