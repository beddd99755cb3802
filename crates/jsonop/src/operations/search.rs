//! Predicate searches over a sequence.

use super::{eval_truthy, into_sequence};
use crate::error::PipelineError;
use crate::types::{ArgSpec, OpCtx, OperationDefinition};
use json_expression::CompiledExpression;
use serde_json::Value;
use std::sync::Arc;

fn predicate<'e>(
    expr: Option<&'e CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<&'e CompiledExpression, PipelineError> {
    expr.ok_or_else(|| PipelineError::argument(ctx.operation, "requires an expression"))
}

fn find_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let expr = predicate(expr, ctx)?;
    for (i, item) in into_sequence(value, ctx)?.into_iter().enumerate() {
        if eval_truthy(expr, &item, i, ctx)? {
            return Ok(item);
        }
    }
    Ok(Value::Null)
}

fn findall_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let expr = predicate(expr, ctx)?;
    let mut out = Vec::new();
    for (i, item) in into_sequence(value, ctx)?.into_iter().enumerate() {
        if eval_truthy(expr, &item, i, ctx)? {
            out.push(item);
        }
    }
    Ok(Value::Array(out))
}

fn indexof_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let expr = predicate(expr, ctx)?;
    let items = into_sequence(value, ctx)?;
    for (i, item) in items.iter().enumerate() {
        if eval_truthy(expr, item, i, ctx)? {
            return Ok(Value::from(i as i64));
        }
    }
    Ok(Value::from(-1))
}

fn lastindexof_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let expr = predicate(expr, ctx)?;
    let items = into_sequence(value, ctx)?;
    for (i, item) in items.iter().enumerate().rev() {
        if eval_truthy(expr, item, i, ctx)? {
            return Ok(Value::from(i as i64));
        }
    }
    Ok(Value::from(-1))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "find",
            aliases: &[],
            arg: ArgSpec::Required,
            apply_fn: find_apply,
        }),
        Arc::new(OperationDefinition {
            name: "findall",
            aliases: &[],
            arg: ArgSpec::Required,
            apply_fn: findall_apply,
        }),
        Arc::new(OperationDefinition {
            name: "indexof",
            aliases: &[],
            arg: ArgSpec::Required,
            apply_fn: indexof_apply,
        }),
        Arc::new(OperationDefinition {
            name: "lastindexof",
            aliases: &[],
            arg: ArgSpec::Required,
            apply_fn: lastindexof_apply,
        }),
    ]
}
