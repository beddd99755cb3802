//! Math functions.

use super::arg;
use crate::error::ExprError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use rand::Rng;
use std::sync::Arc;

/// Applies `f` at the given decimal precision (second argument, default 0).
fn with_precision(args: &[JsValue], f: fn(f64) -> f64) -> Result<JsValue, ExprError> {
    let n = util::num(arg(args, 0));
    let precision = match arg(args, 1) {
        JsValue::Undefined => 0,
        p => util::num(p) as i32,
    };
    let factor = 10f64.powi(precision);
    util::f64_to_jsval(f(n * factor) / factor)
}

fn round_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    with_precision(args, f64::round)
}

fn floor_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    with_precision(args, f64::floor)
}

fn ceil_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    with_precision(args, f64::ceil)
}

fn abs_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    util::f64_to_jsval(util::num(arg(args, 0)).abs())
}

fn clamp_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let n = util::num(arg(args, 0));
    let lower = util::num(arg(args, 1));
    let upper = util::num(arg(args, 2));
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(ExprError::Other("_.clamp: invalid bounds".to_string()));
    }
    util::f64_to_jsval(n.max(lower).min(upper))
}

/// `random()` in [0, 1), `random(upper)` / `random(lower, upper)` inclusive,
/// integral when both bounds are integers.
fn random_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let mut rng = rand::thread_rng();
    let (lower, upper) = match args.len() {
        0 => return util::f64_to_jsval(rng.gen::<f64>()),
        1 => (0.0, util::num(arg(args, 0))),
        _ => (util::num(arg(args, 0)), util::num(arg(args, 1))),
    };
    if !lower.is_finite() || !upper.is_finite() {
        return Err(ExprError::Other("_.random: invalid bounds".to_string()));
    }
    let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };
    if lower.fract() == 0.0 && upper.fract() == 0.0 {
        let n = rng.gen_range(lower as i64..=upper as i64);
        return Ok(JsValue::from(n));
    }
    util::f64_to_jsval(rng.gen_range(lower..=upper))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "round",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: round_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "floor",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: floor_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "ceil",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: ceil_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "abs",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: abs_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "clamp",
            aliases: &[],
            arity: Arity::Fixed(3),
            eval_fn: clamp_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "random",
            aliases: &[],
            arity: Arity::Range(0, Some(2)),
            eval_fn: random_eval,
        }),
    ]
}
