//! Slicing, sorting and sampling of a sequence.

use super::{count_arg, element_key, into_sequence};
use crate::error::PipelineError;
use crate::types::{ArgSpec, OpCtx, OperationDefinition};
use json_expression::{util, CompiledExpression};
use rand::seq::SliceRandom;
use serde_json::Value;
use std::sync::Arc;

const DEFAULT_SLICE: usize = 5;
const DEFAULT_SAMPLE: usize = 2;

fn head_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let mut items = into_sequence(value, ctx)?;
    let n = count_arg(expr, &items, DEFAULT_SLICE, ctx)?;
    items.truncate(n);
    Ok(Value::Array(items))
}

fn tail_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let mut items = into_sequence(value, ctx)?;
    let n = count_arg(expr, &items, DEFAULT_SLICE, ctx)?;
    let start = items.len().saturating_sub(n);
    Ok(Value::Array(items.split_off(start)))
}

/// Stable ascending sort by key.
fn sortby_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let items = into_sequence(value, ctx)?;
    let mut keyed = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        keyed.push((element_key(expr, &item, i, ctx)?, item));
    }
    keyed.sort_by(|(a, _), (b, _)| util::compare_values(a, b));
    Ok(Value::Array(keyed.into_iter().map(|(_, item)| item).collect()))
}

fn sample_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let items = into_sequence(value, ctx)?;
    let n = count_arg(expr, &items, DEFAULT_SAMPLE, ctx)?;
    if n > items.len() {
        return Err(PipelineError::argument(
            ctx.operation,
            format!("cannot draw {} elements from a sequence of {}", n, items.len()),
        ));
    }
    let mut rng = rand::thread_rng();
    let picked = items.choose_multiple(&mut rng, n).cloned().collect();
    Ok(Value::Array(picked))
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "head",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: head_apply,
        }),
        Arc::new(OperationDefinition {
            name: "tail",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: tail_apply,
        }),
        Arc::new(OperationDefinition {
            name: "sortby",
            aliases: &["s"],
            arg: ArgSpec::Optional,
            apply_fn: sortby_apply,
        }),
        Arc::new(OperationDefinition {
            name: "sample",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: sample_apply,
        }),
    ]
}
