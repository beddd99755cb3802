//! String functions.

use super::arg;
use crate::error::ExprError;
use crate::types::{Arity, FunctionDefinition, JsValue};
use crate::util;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

fn to_upper_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::str_val(arg(args, 0)).to_uppercase()))
}

fn to_lower_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::str_val(arg(args, 0)).to_lowercase()))
}

fn trim_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    Ok(JsValue::from(util::as_str(arg(args, 0))?.trim()))
}

fn split_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let s = util::as_str(arg(args, 0))?;
    let parts: Vec<Value> = match arg(args, 1) {
        JsValue::Undefined => vec![Value::String(s.to_string())],
        sep => {
            let sep = util::str_val(sep);
            if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
            }
        }
    };
    Ok(JsValue::Json(Value::Array(parts)))
}

fn starts_with_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let s = util::str_val(arg(args, 0));
    Ok(JsValue::from(s.starts_with(&util::str_val(arg(args, 1)))))
}

fn ends_with_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let s = util::str_val(arg(args, 0));
    Ok(JsValue::from(s.ends_with(&util::str_val(arg(args, 1)))))
}

fn capitalize_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let s = util::str_val(arg(args, 0)).to_lowercase();
    let mut chars = s.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(JsValue::from(capitalized))
}

/// Pads both sides to `length`, the right side taking the odd character.
fn pad_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let s = util::str_val(arg(args, 0));
    let target = util::num(arg(args, 1));
    let fill: Vec<char> = match arg(args, 2) {
        JsValue::Undefined => vec![' '],
        f => util::str_val(f).chars().collect(),
    };
    let len = s.chars().count();
    if fill.is_empty() || target.is_nan() || target as usize <= len {
        return Ok(JsValue::from(s));
    }
    let total = target as usize - len;
    let left = total / 2;
    let filler = |n: usize| -> String { fill.iter().cycle().take(n).collect() };
    Ok(JsValue::from(format!("{}{}{}", filler(left), s, filler(total - left))))
}

fn compile_pattern(pattern: &JsValue) -> Result<Regex, ExprError> {
    let pattern = util::as_str(pattern)?;
    Regex::new(pattern).map_err(|e| ExprError::Other(format!("invalid pattern: {}", e)))
}

fn matches_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let re = compile_pattern(arg(args, 1))?;
    Ok(JsValue::from(re.is_match(&util::str_val(arg(args, 0)))))
}

fn replace_eval(args: &[JsValue]) -> Result<JsValue, ExprError> {
    let re = compile_pattern(arg(args, 1))?;
    let s = util::str_val(arg(args, 0));
    let replacement = util::str_val(arg(args, 2));
    Ok(JsValue::from(re.replace_all(&s, replacement.as_str()).into_owned()))
}

pub fn functions() -> Vec<Arc<FunctionDefinition>> {
    vec![
        Arc::new(FunctionDefinition {
            name: "toUpper",
            aliases: &["upperCase"],
            arity: Arity::Fixed(1),
            eval_fn: to_upper_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "toLower",
            aliases: &["lowerCase"],
            arity: Arity::Fixed(1),
            eval_fn: to_lower_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "trim",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: trim_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "split",
            aliases: &[],
            arity: Arity::Range(1, Some(2)),
            eval_fn: split_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "startsWith",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: starts_with_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "endsWith",
            aliases: &[],
            arity: Arity::Fixed(2),
            eval_fn: ends_with_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "capitalize",
            aliases: &[],
            arity: Arity::Fixed(1),
            eval_fn: capitalize_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "pad",
            aliases: &[],
            arity: Arity::Range(2, Some(3)),
            eval_fn: pad_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "matches",
            aliases: &["test"],
            arity: Arity::Fixed(2),
            eval_fn: matches_eval,
        }),
        Arc::new(FunctionDefinition {
            name: "replace",
            aliases: &[],
            arity: Arity::Fixed(3),
            eval_fn: replace_eval,
        }),
    ]
}
