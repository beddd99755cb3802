//! Aggregations over a sequence: countby, group, min, max.

use super::{element_key, into_sequence};
use crate::error::PipelineError;
use crate::types::{ArgSpec, OpCtx, OperationDefinition};
use indexmap::IndexMap;
use json_expression::{util, CompiledExpression};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

fn countby_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for (i, item) in into_sequence(value, ctx)?.iter().enumerate() {
        let key = util::group_key(&element_key(expr, item, i, ctx)?);
        *counts.entry(key).or_insert(0) += 1;
    }
    let map: Map<String, Value> = counts.into_iter().map(|(k, n)| (k, Value::from(n))).collect();
    Ok(Value::Object(map))
}

fn group_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (i, item) in into_sequence(value, ctx)?.into_iter().enumerate() {
        let key = util::group_key(&element_key(expr, &item, i, ctx)?);
        groups.entry(key).or_default().push(item);
    }
    let map: Map<String, Value> = groups
        .into_iter()
        .map(|(k, items)| (k, Value::Array(items)))
        .collect();
    Ok(Value::Object(map))
}

/// Element whose key compares as `wanted` against every other; the first
/// occurrence wins ties.
fn extreme(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
    wanted: Ordering,
) -> Result<Value, PipelineError> {
    let mut best: Option<(Value, Value)> = None;
    for (i, item) in into_sequence(value, ctx)?.into_iter().enumerate() {
        let key = element_key(expr, &item, i, ctx)?;
        let replace = match &best {
            None => true,
            Some((best_key, _)) => util::compare_values(&key, best_key) == wanted,
        };
        if replace {
            best = Some((key, item));
        }
    }
    Ok(best.map(|(_, item)| item).unwrap_or(Value::Null))
}

fn min_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    extreme(value, expr, ctx, Ordering::Less)
}

fn max_apply(
    value: Value,
    expr: Option<&CompiledExpression>,
    ctx: &OpCtx<'_>,
) -> Result<Value, PipelineError> {
    extreme(value, expr, ctx, Ordering::Greater)
}

pub fn operations() -> Vec<Arc<OperationDefinition>> {
    vec![
        Arc::new(OperationDefinition {
            name: "countby",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: countby_apply,
        }),
        Arc::new(OperationDefinition {
            name: "group",
            aliases: &["groupby"],
            arg: ArgSpec::Optional,
            apply_fn: group_apply,
        }),
        Arc::new(OperationDefinition {
            name: "min",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: min_apply,
        }),
        Arc::new(OperationDefinition {
            name: "max",
            aliases: &[],
            arg: ArgSpec::Optional,
            apply_fn: max_apply,
        }),
    ]
}
