//! The operation registry and the helpers operation bodies share.

pub mod aggregate;
pub mod collection;
pub mod order;
pub mod search;
pub mod transform;

use crate::error::PipelineError;
use crate::types::{operations_to_map, OpCtx, OperationDefinition, OperationMap};
use json_expression::{util, CompiledExpression, JsValue, Vars};
use serde_json::{Map, Value};
use std::sync::Arc;

/// All operations combined.
pub fn all_operations() -> Vec<Arc<OperationDefinition>> {
    let mut ops = Vec::new();
    ops.extend(collection::operations());
    ops.extend(search::operations());
    ops.extend(aggregate::operations());
    ops.extend(order::operations());
    ops.extend(transform::operations());
    ops
}

/// Build the operation map from all operations.
pub fn operations_map() -> OperationMap {
    operations_to_map(all_operations())
}

// ------------------------------------------------------------ Evaluation

/// Evaluates `expr` with `it = item` and `key = key`.
pub(crate) fn eval(
    expr: &CompiledExpression,
    item: &Value,
    key: Value,
    ctx: &OpCtx<'_>,
) -> Result<JsValue, PipelineError> {
    let mut vars = Vars::new(item.clone()).with_key(key);
    expr.call(&mut vars)
        .map_err(|e| PipelineError::expression(ctx.operation, expr.source(), e))
}

/// Evaluates `expr` for a sequence element and tests the result.
pub(crate) fn eval_truthy(
    expr: &CompiledExpression,
    item: &Value,
    index: usize,
    ctx: &OpCtx<'_>,
) -> Result<bool, PipelineError> {
    Ok(util::is_truthy(&eval(expr, item, index_key(index), ctx)?))
}

/// Sort/group key of an element: the expression result, or the element
/// itself without an expression.
pub(crate) fn element_key(
    expr: Option<&CompiledExpression>,
    item: &Value,
    index: usize,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    match expr {
        Some(expr) => Ok(eval(expr, item, index_key(index), ctx)?.into_json()),
        None => Ok(item.clone()),
    }
}

pub(crate) fn index_key(index: usize) -> Value {
    Value::from(index as u64)
}

/// Resolves a count argument (`head`, `tail`, `sample`).
///
/// The expression sees the whole sequence as `it` and `key = null`.
pub(crate) fn count_arg(
    expr: Option<&CompiledExpression>,
    items: &[Value],
    default: usize,
    ctx: &OpCtx<'_>,
) -> Result<usize, PipelineError> {
    let Some(expr) = expr else {
        return Ok(default);
    };
    let whole = Value::Array(items.to_vec());
    let result = eval(expr, &whole, Value::Null, ctx)?.into_json();
    as_count(&result).ok_or_else(|| {
        PipelineError::argument(
            ctx.operation,
            format!("expected a non-negative integer, got {}", result),
        )
    })
}

fn as_count(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok();
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => Some(f as usize),
        _ => None,
    }
}

// ------------------------------------------------------------ Shapes

pub(crate) fn into_sequence(value: Value, ctx: &OpCtx<'_>) -> Result<Vec<Value>, PipelineError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(PipelineError::type_mismatch(ctx.operation, "sequence", &other)),
    }
}

pub(crate) fn into_mapping(
    value: Value,
    ctx: &OpCtx<'_>,
) -> Result<Map<String, Value>, PipelineError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(PipelineError::type_mismatch(ctx.operation, "mapping", &other)),
    }
}

/// The property name an operation with a key argument was given.
pub(crate) fn key_arg<'a>(ctx: &OpCtx<'a>) -> Result<&'a str, PipelineError> {
    ctx.source
        .ok_or_else(|| PipelineError::argument(ctx.operation, "requires a property name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CTX: OpCtx<'static> = OpCtx {
        operation: "head",
        source: None,
    };

    #[test]
    fn every_operation_and_alias_is_registered() {
        let map = operations_map();
        for name in [
            "count", "countby", "find", "findall", "group", "groupby", "indexof",
            "lastindexof", "collect", "min", "max", "head", "tail", "s", "sortby",
            "sample", "t", "transform", "prop", "keys", "values",
        ] {
            assert!(map.contains_key(name), "missing operation {}", name);
        }
        assert_eq!(map["s"].name, "sortby");
        assert_eq!(map["groupby"].name, "group");
    }

    #[test]
    fn count_arg_defaults_without_expression() {
        assert_eq!(count_arg(None, &[], 5, &CTX).unwrap(), 5);
    }

    #[test]
    fn count_arg_sees_whole_sequence() {
        let expr = CompiledExpression::compile("it.length - 1").unwrap();
        let items = vec![json!(1), json!(2), json!(3)];
        assert_eq!(count_arg(Some(&expr), &items, 5, &CTX).unwrap(), 2);
    }

    #[test]
    fn count_arg_rejects_non_integers() {
        for source in ["-1", "1.5", "'three'", "null"] {
            let expr = CompiledExpression::compile(source).unwrap();
            let err = count_arg(Some(&expr), &[], 5, &CTX).unwrap_err();
            assert!(matches!(err, PipelineError::Argument { .. }), "{}: {:?}", source, err);
        }
    }
}
