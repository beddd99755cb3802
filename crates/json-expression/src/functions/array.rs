//! Collection functions: `_.groupBy`, `_.sortBy`, `_.sample`, ...

use super::arg;
use crate::error::ExprError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Longest sequence `_.range` will build.
const MAX_RANGE_LEN: usize = 1 << 20;

fn arr_result(arr: Vec<Value>) -> Result<JsValue, ExprError> {
    Ok(JsValue::Json(Value::Array(arr)))
}

/// Reads an optional count argument, `default` when omitted.
fn count_arg(value: &JsValue, default: usize) -> usize {
    if value.is_undefined() {
        return default;
    }
    let n = util::num(value);
    if n.is_nan() || n < 0.0 {
        0
    } else {
        n as usize
    }
}

/// Computes the iteratee key of every element.
fn keyed(arr: &[Value], iteratee: &JsValue) -> Result<Vec<Value>, ExprError> {
    arr.iter().map(|v| util::apply_iteratee(v, iteratee)).collect()
}

fn size_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let n = arg(args, 0).as_json().map(util::len).unwrap_or(0);
    Ok(util::usize_to_jsval(n))
}

fn first_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    Ok(arr.first().cloned().map(JsValue::Json).unwrap_or_default())
}

fn last_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    Ok(arr.last().cloned().map(JsValue::Json).unwrap_or_default())
}

fn take_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let n = count_arg(arg(args, 1), 1).min(arr.len());
    arr_result(arr[..n].to_vec())
}

fn drop_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let n = count_arg(arg(args, 1), 1).min(arr.len());
    arr_result(arr[n..].to_vec())
}

fn reverse_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let mut arr = util::as_arr(arg(args, 0))?.clone();
    arr.reverse();
    arr_result(arr)
}

fn uniq_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let mut result: Vec<Value> = Vec::new();
    for item in arr {
        if !result.iter().any(|seen| util::deep_equal(seen, item)) {
            result.push(item.clone());
        }
    }
    arr_result(result)
}

fn flatten_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let mut result = Vec::new();
    for item in arr {
        match item {
            Value::Array(inner) => result.extend(inner.iter().cloned()),
            other => result.push(other.clone()),
        }
    }
    arr_result(result)
}

fn compact_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    arr_result(arr.iter().filter(|v| util::is_truthy_json(v)).cloned().collect())
}

fn concat_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let mut result = Vec::new();
    for a in args {
        match a {
            JsValue::Json(Value::Array(items)) => result.extend(items.iter().cloned()),
            other => result.push(other.clone().into_json()),
        }
    }
    arr_result(result)
}

fn includes_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let needle = arg(args, 1);
    match arg(args, 0) {
        JsValue::Json(Value::String(s)) => Ok(JsValue::from(s.contains(&util::str_val(needle)))),
        JsValue::Json(Value::Object(obj)) => Ok(JsValue::from(
            needle
                .as_json()
                .is_some_and(|n| obj.values().any(|v| util::deep_equal(v, n))),
        )),
        haystack => {
            let arr = util::as_arr(haystack)?;
            Ok(JsValue::from(
                needle
                    .as_json()
                    .is_some_and(|n| arr.iter().any(|v| util::deep_equal(v, n))),
            ))
        }
    }
}

fn index_of_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let index = arg(args, 1)
        .as_json()
        .and_then(|n| arr.iter().position(|v| util::deep_equal(v, n)))
        .map(|i| i as i64)
        .unwrap_or(-1);
    Ok(JsValue::from(index))
}

fn join_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let sep = match arg(args, 1) {
        JsValue::Undefined => ",".to_string(),
        sep => util::str_val(sep),
    };
    let parts: Vec<String> = arr.iter().map(util::value_to_string).collect();
    Ok(JsValue::from(parts.join(&sep)))
}

fn range_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    // range(end) | range(start, end) | range(start, end, step)
    let (start, end) = if args.len() == 1 {
        (0.0, util::num(arg(args, 0)))
    } else {
        (util::num(arg(args, 0)), util::num(arg(args, 1)))
    };
    let step = match arg(args, 2) {
        JsValue::Undefined => {
            if end < start {
                -1.0
            } else {
                1.0
            }
        }
        s => util::num(s),
    };
    if step == 0.0 || !step.is_finite() || !start.is_finite() || !end.is_finite() {
        return Err(ExprError::Other("_.range: invalid bounds".to_string()));
    }
    let count = ((end - start) / step).ceil();
    if !count.is_finite() || count > MAX_RANGE_LEN as f64 {
        return Err(ExprError::Other("_.range: too many elements".to_string()));
    }
    let count = if count > 0.0 { count as usize } else { 0 };
    let mut result = Vec::with_capacity(count);
    for i in 0..count {
        if let Some(n) = util::number_value(start + i as f64 * step) {
            result.push(n);
        }
    }
    arr_result(result)
}

fn numbers(arr: &[Value], iteratee: &JsValue) -> Result<Vec<f64>, ExprError> {
    keyed(arr, iteratee).map(|keys| keys.into_iter().map(|k| util::num(&JsValue::Json(k))).collect())
}

fn sum_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    util::f64_to_jsval(numbers(arr, arg(args, 1))?.into_iter().sum())
}

fn mean_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    if arr.is_empty() {
        return Ok(JsValue::Json(Value::Null));
    }
    let total: f64 = numbers(arr, arg(args, 1))?.into_iter().sum();
    util::f64_to_jsval(total / arr.len() as f64)
}

/// Element with the extreme iteratee key, first occurrence wins ties.
fn extreme(args: &[JsValue], want_max: bool) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let keys = keyed(arr, arg(args, 1))?;
    let mut best: Option<usize> = None;
    for (i, key) in keys.iter().enumerate() {
        let better = match best {
            None => true,
            Some(b) => {
                let ord = util::compare_values(key, &keys[b]);
                if want_max {
                    ord.is_gt()
                } else {
                    ord.is_lt()
                }
            }
        };
        if better {
            best = Some(i);
        }
    }
    Ok(best.map(|i| JsValue::Json(arr[i].clone())).unwrap_or_default())
}

fn min_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    extreme(args, false)
}

fn max_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    extreme(args, true)
}

fn map_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    arr_result(keyed(arr, arg(args, 1))?)
}

fn group_by_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let keys = keyed(arr, arg(args, 1))?;
    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (item, key) in arr.iter().zip(&keys) {
        groups
            .entry(util::group_key(key))
            .or_default()
            .push(item.clone());
    }
    let obj: Map<String, Value> = groups
        .into_iter()
        .map(|(k, items)| (k, Value::Array(items)))
        .collect();
    Ok(JsValue::Json(Value::Object(obj)))
}

fn count_by_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for key in keyed(arr, arg(args, 1))? {
        *counts.entry(util::group_key(&key)).or_insert(0) += 1;
    }
    let obj: Map<String, Value> = counts.into_iter().map(|(k, n)| (k, Value::from(n))).collect();
    Ok(JsValue::Json(Value::Object(obj)))
}

fn key_by_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let keys = keyed(arr, arg(args, 1))?;
    let mut obj = Map::new();
    for (item, key) in arr.iter().zip(&keys) {
        obj.insert(util::group_key(key), item.clone());
    }
    Ok(JsValue::Json(Value::Object(obj)))
}

fn sort_by_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let keys = keyed(arr, arg(args, 1))?;
    let mut pairs: Vec<(Value, &Value)> = keys.into_iter().zip(arr.iter()).collect();
    pairs.sort_by(|(a, _), (b, _)| util::compare_values(a, b));
    arr_result(pairs.into_iter().map(|(_, v)| v.clone()).collect())
}

fn sample_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let mut rng = rand::thread_rng();
    Ok(arr.choose(&mut rng).cloned().map(JsValue::Json).unwrap_or_default())
}

fn sample_size_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let arr = util::as_arr(arg(args, 0))?;
    let n = count_arg(arg(args, 1), 1).min(arr.len());
    let mut rng = rand::thread_rng();
    arr_result(arr.choose_multiple(&mut rng, n).cloned().collect())
}

fn shuffle_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let mut arr = util::as_arr(arg(args, 0))?.clone();
    arr.shuffle(&mut rand::thread_rng());
    arr_result(arr)
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "size",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: size_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "first",
            aliases: &["head"],
            arity: Arity::Fixed(1),
            eval_fn: first_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "last",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: last_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "take",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: take_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "drop",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: drop_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "reverse",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: reverse_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "uniq",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: uniq_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "flatten",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: flatten_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "compact",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: compact_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "concat",
            aliases: &[],
            arity: Arity::Range(1, None),
            eval_fn: concat_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "includes",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: includes_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "indexOf",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: index_of_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "join",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: join_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "range",
            aliases: &[],
            arity: Arity::Range(1, Some(3)),
            eval_fn: range_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "sum",
            aliases: &["sumBy"],
            arity: Arity::Range(1, Some(2)),
            eval_fn: sum_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "mean",
            aliases: &["meanBy"],
            arity: Arity::Range(1, Some(2)),
            eval_fn: mean_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "min",
            aliases: &["minBy"],
            arity: Arity::Range(1, Some(2)),
            eval_fn: min_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "max",
            aliases: &["maxBy"],
            arity: Arity::Range(1, Some(2)),
            eval_fn: max_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "map",
            aliases: &["pluck"],
            arity: Arity::Fixed(2),
            eval_fn: map_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "groupBy",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: group_by_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "countBy",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: count_by_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "keyBy",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: key_by_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "sortBy",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: sort_by_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "sample",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: sample_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "sampleSize",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: sample_size_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "shuffle",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: shuffle_eval,
        }),
    ]
}
