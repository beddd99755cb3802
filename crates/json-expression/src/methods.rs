//! Methods callable directly on strings, arrays and numbers
//! (`it.name.toUpperCase()`, `it.tags.includes('x')`).

use crate::error::ExprError;
use crate::types::JsValue;
use crate::util;
use serde_json::Value;

static UNDEFINED: JsValue = JsValue::Undefined;

fn arg(args: &[JsValue], i: usize) -> &JsValue {
    args.get(i).unwrap_or(&UNDEFINED)
}

pub fn call_method(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, ExprError> {
    match target {
        JsValue::Json(Value::String(s)) => string_method(s, method, args),
        JsValue::Json(Value::Array(arr)) => array_method(arr, method, args),
        JsValue::Json(Value::Number(n)) => number_method(n.as_f64().unwrap_or(f64::NAN), method, args),
        _ => Err(not_callable(target, method)),
    }
}

fn not_callable(target: &JsValue, method: &str) -> ExprError {
    ExprError::NotCallable(format!("{}.{}", util::js_type(target), method))
}

/// Resolves JavaScript `slice` bounds over a sequence of `len` items.
fn slice_bounds(len: usize, start: &JsValue, end: &JsValue) -> (usize, usize) {
    let len = len as i64;
    let clamp = |v: &JsValue, default: i64| -> i64 {
        if v.is_undefined() {
            return default;
        }
        let n = util::num(v);
        let n = if n.is_nan() { 0 } else { n.trunc() as i64 };
        if n < 0 {
            (len + n).max(0)
        } else {
            n.min(len)
        }
    };
    let from = clamp(start, 0);
    let to = clamp(end, len);
    (from as usize, to.max(from) as usize)
}

fn string_method(s: &str, method: &str, args: &[JsValue]) -> Result<JsValue, ExprError> {
    match method {
        "toUpperCase" => Ok(JsValue::from(s.to_uppercase())),
        "toLowerCase" => Ok(JsValue::from(s.to_lowercase())),
        "trim" => Ok(JsValue::from(s.trim())),
        "toString" => Ok(JsValue::from(s)),
        "startsWith" => Ok(JsValue::from(s.starts_with(&util::str_val(arg(args, 0))))),
        "endsWith" => Ok(JsValue::from(s.ends_with(&util::str_val(arg(args, 0))))),
        "includes" => Ok(JsValue::from(s.contains(&util::str_val(arg(args, 0))))),
        "indexOf" => {
            let needle = util::str_val(arg(args, 0));
            let index = s
                .find(&needle)
                .map(|byte| s[..byte].chars().count() as i64)
                .unwrap_or(-1);
            Ok(JsValue::from(index))
        }
        "split" => {
            let parts: Vec<Value> = match arg(args, 0) {
                JsValue::Undefined => vec![Value::String(s.to_string())],
                sep => {
                    let sep = util::str_val(sep);
                    if sep.is_empty() {
                        s.chars().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str())
                            .map(|p| Value::String(p.to_string()))
                            .collect()
                    }
                }
            };
            Ok(JsValue::Json(Value::Array(parts)))
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = slice_bounds(chars.len(), arg(args, 0), arg(args, 1));
            Ok(JsValue::from(chars[from..to].iter().collect::<String>()))
        }
        _ => Err(not_callable(&JsValue::from(s), method)),
    }
}

fn array_method(arr: &[Value], method: &str, args: &[JsValue]) -> Result<JsValue, ExprError> {
    match method {
        "includes" => {
            let needle = arg(args, 0);
            Ok(JsValue::from(
                needle
                    .as_json()
                    .is_some_and(|n| arr.iter().any(|v| util::deep_equal(v, n))),
            ))
        }
        "indexOf" => {
            let index = arg(args, 0)
                .as_json()
                .and_then(|n| arr.iter().position(|v| util::deep_equal(v, n)))
                .map(|i| i as i64)
                .unwrap_or(-1);
            Ok(JsValue::from(index))
        }
        "join" => {
            let sep = match arg(args, 0) {
                JsValue::Undefined => ",".to_string(),
                sep => util::str_val(sep),
            };
            let joined = arr
                .iter()
                .map(|v| match v {
                    Value::Null => String::new(),
                    other => util::value_to_string(other),
                })
                .collect::<Vec<_>>()
                .join(&sep);
            Ok(JsValue::from(joined))
        }
        "slice" => {
            let (from, to) = slice_bounds(arr.len(), arg(args, 0), arg(args, 1));
            Ok(JsValue::Json(Value::Array(arr[from..to].to_vec())))
        }
        _ => Err(ExprError::NotCallable(format!("array.{}", method))),
    }
}

fn number_method(n: f64, method: &str, args: &[JsValue]) -> Result<JsValue, ExprError> {
    match method {
        "toFixed" => {
            let digits = match arg(args, 0) {
                JsValue::Undefined => 0,
                d => util::num(d).clamp(0.0, 100.0) as usize,
            };
            Ok(JsValue::from(format!("{:.*}", digits, n)))
        }
        "toString" => Ok(JsValue::from(util::fmt_number(n))),
        _ => Err(ExprError::NotCallable(format!("number.{}", method))),
    }
}
