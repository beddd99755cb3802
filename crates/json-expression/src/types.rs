use crate::error::ExprError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A value produced while evaluating an expression.
///
/// `Undefined` is what reading a missing property or an absent argument
/// yields. It has no JSON counterpart and turns into `null` once a result
/// leaves the evaluator.
#[derive(Debug, Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Json(Value),
}

impl JsValue {
    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    /// Borrows the JSON value, `None` for `undefined`.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            JsValue::Json(v) => Some(v),
            JsValue::Undefined => None,
        }
    }

    /// Converts into a JSON value, `undefined` becomes `null`.
    pub fn into_json(self) -> Value {
        match self {
            JsValue::Json(v) => v,
            JsValue::Undefined => Value::Null,
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Json(a), JsValue::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Value> for JsValue {
    fn from(v: Value) -> Self {
        JsValue::Json(v)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Json(Value::Bool(b))
    }
}

impl From<i64> for JsValue {
    fn from(n: i64) -> Self {
        JsValue::Json(Value::Number(serde_json::Number::from(n)))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::Json(Value::String(s))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::Json(Value::String(s.to_string()))
    }
}

/// Number of arguments a utility function accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Arity {
    /// Exactly `n` arguments.
    Fixed(usize),
    /// Between `min` and `max` arguments. `None` for max = unlimited.
    Range(usize, Option<usize>),
}

/// Signature of a utility function body. Arguments arrive evaluated.
pub type EvalFn = fn(&[JsValue]) -> Result<JsValue, ExprError>;

/// A function exposed through the `_` namespace.
pub struct FunctionDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub arity: Arity,
    pub eval_fn: EvalFn,
}

impl std::fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Map of function name/alias -> definition.
pub type FunctionMap = HashMap<String, Arc<FunctionDefinition>>;

/// Checks that a call passes an acceptable number of arguments.
pub fn assert_arity(function: &str, arity: &Arity, argc: usize) -> Result<(), ExprError> {
    match arity {
        Arity::Fixed(n) => {
            if argc != *n {
                Err(ExprError::ArityError(format!(
                    "\"_.{}\" expects {} arguments, got {}.",
                    function, n, argc
                )))
            } else {
                Ok(())
            }
        }
        Arity::Range(min, max) => {
            if argc < *min {
                Err(ExprError::ArityError(format!(
                    "\"_.{}\" expects at least {} arguments.",
                    function, min
                )))
            } else if let Some(max) = max {
                if argc > *max {
                    return Err(ExprError::ArityError(format!(
                        "\"_.{}\" expects at most {} arguments.",
                        function, max
                    )));
                }
                Ok(())
            } else {
                Ok(())
            }
        }
    }
}

/// Builds a `FunctionMap` from a list of function definitions.
pub fn functions_to_map(functions: Vec<Arc<FunctionDefinition>>) -> FunctionMap {
    let mut map = HashMap::new();
    for func in functions {
        map.insert(func.name.to_string(), Arc::clone(&func));
        for alias in func.aliases {
            map.insert(alias.to_string(), Arc::clone(&func));
        }
    }
    map
}
