//! Shape-level operations: count, keys, values, prop, collect.

use super::{into_mapping, key_arg};
use crate::error::PipelineError;
use crate::types::{ArgSpec, OpCtx, OperationDefinition};
use json_expression::CompiledExpression;
use serde_json::Value;
use std::sync::Arc;

/// Element count of a container, character count of a string.
fn count_apply(
    value: Value,
    _expr: Option<&CompiledExpression>,
    _ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let n = match &value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
    };
    Ok(Value::from(n as u64))
}

fn keys_apply(
    value: Value,
    _expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let map = into_mapping(value, ctx)?;
    Ok(Value::Array(map.into_iter().map(|(k, _)| Value::String(k)).collect()))
}

fn values_apply(
    value: Value,
    _expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let map = into_mapping(value, ctx)?;
    Ok(Value::Array(map.into_iter().map(|(_, v)| v).collect()))
}

/// Value under a property name, `null` when the property is absent.
fn prop_apply(
    value: Value,
    _expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let name = key_arg(ctx)?;
    let mut map = into_mapping(value, ctx)?;
    Ok(map.remove(name).unwrap_or(Value::Null))
}

/// Plucks one property out of every element of a sequence, or out of every
/// value of a mapping.
fn collect_apply(
    value: Value,
    _expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let name = key_arg(ctx)?;
    let elements: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(PipelineError::type_mismatch(
                ctx.operation,
                "sequence or mapping",
                &other,
            ))
        }
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Value::Object(mut map) => out.push(map.remove(name).unwrap_or(Value::Null)),
            other => return Err(PipelineError::type_mismatch(ctx.operation, "mapping", &other)),
        }
    }
    Ok(Value::Array(out))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "count",
            aliases: &[],
            arg: ArgSpec::None,
            apply_fn: count_apply,
        }),
        Arc::new(OperationDefinition {
            name: "keys",
            aliases: &[],
            arg: ArgSpec::None,
            apply_fn: keys_apply,
        }),
        Arc::new(OperationDefinition {
            name: "values",
            aliases: &[],
            arg: ArgSpec::None,
            apply_fn: values_apply,
        }),
        Arc::new(OperationDefinition {
            name: "prop",
            aliases: &[],
            arg: ArgSpec::Key,
            apply_fn: prop_apply,
        }),
        Arc::new(OperationDefinition {
            name: "collect",
            aliases: &[],
            arg: ArgSpec::Key,
            apply_fn: collect_apply,
        }),
    ]
}
