//! Tree-walking evaluator.

use crate::ast::{BinaryOp, Expr, LogicalOp, PropKey, UnaryOp};
use crate::error::ExprError;
use crate::eval_ctx::EvalCtx;
use crate::types::{assert_arity, JsValue};
use crate::util;
use crate::vars::NAMESPACE;
use serde_json::{Map, Value};

/// Evaluates a parsed expression against an execution context.
///
/// Assignments write into `ctx.vars`; nothing else is mutated.
pub fn evaluate(expr: &Expr, ctx: &mut EvalCtx<'_>) -> Result<JsValue, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(JsValue::Json(v.clone())),
        Expr::Undefined => Ok(JsValue::Undefined),
        Expr::Ident(name) => {
            if name == NAMESPACE {
                return Err(ExprError::NamespaceNotValue);
            }
            ctx.vars
                .get(name)
                .cloned()
                .ok_or_else(|| ExprError::NotDefined(name.clone()))
        }
        Expr::Array(items) => {
            let mut arr = Vec::with_capacity(items.len());
            for item in items {
                arr.push(evaluate(item, ctx)?.into_json());
            }
            Ok(JsValue::Json(Value::Array(arr)))
        }
        Expr::Object(props) => {
            let mut obj = Map::new();
            for (key, value) in props {
                let key = match key {
                    PropKey::Static(k) => k.clone(),
                    PropKey::Computed(e) => util::str_val(&evaluate(e, ctx)?),
                };
                // Like JSON.stringify, undefined members are dropped.
                if let JsValue::Json(v) = evaluate(value, ctx)? {
                    obj.insert(key, v);
                }
            }
            Ok(JsValue::Json(Value::Object(obj)))
        }
        Expr::Member { object, property } => {
            let target = evaluate(object, ctx)?;
            let key = evaluate(property, ctx)?;
            util::member(&target, &key)
        }
        Expr::Call { callee, args } => call(callee, args, ctx),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, ctx)?;
            match op {
                UnaryOp::Not => Ok(JsValue::from(!util::is_truthy(&value))),
                UnaryOp::Neg => util::f64_to_jsval(-util::num(&value)),
                UnaryOp::Plus => util::f64_to_jsval(util::num(&value)),
                UnaryOp::TypeOf => Ok(JsValue::from(type_of(&value))),
            }
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            binary(*op, &left, &right)
        }
        Expr::Logical { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let short_circuit = match op {
                LogicalOp::And => !util::is_truthy(&left),
                LogicalOp::Or => util::is_truthy(&left),
                LogicalOp::Nullish => !util::is_nil(&left),
            };
            if short_circuit {
                Ok(left)
            } else {
                evaluate(right, ctx)
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if util::is_truthy(&evaluate(test, ctx)?) {
                evaluate(consequent, ctx)
            } else {
                evaluate(alternate, ctx)
            }
        }
        Expr::Assign { target, value } => {
            let value = evaluate(value, ctx)?;
            assign(target, value.clone(), ctx)?;
            Ok(value)
        }
        Expr::Sequence(statements) => {
            let mut last = JsValue::Undefined;
            for statement in statements {
                last = evaluate(statement, ctx)?;
            }
            Ok(last)
        }
    }
}

fn type_of(value: &JsValue) -> &'static str {
    match value {
        JsValue::Undefined => "undefined",
        JsValue::Json(Value::Bool(_)) => "boolean",
        JsValue::Json(Value::Number(_)) => "number",
        JsValue::Json(Value::String(_)) => "string",
        JsValue::Json(_) => "object",
    }
}

fn binary(op: BinaryOp, left: &JsValue, right: &JsValue) -> Result<JsValue, ExprError> {
    match op {
        BinaryOp::Add => {
            let is_str = |v: &JsValue| matches!(v, JsValue::Json(Value::String(_)));
            if is_str(left) || is_str(right) {
                let mut s = util::str_val(left);
                s.push_str(&util::str_val(right));
                Ok(JsValue::from(s))
            } else {
                util::f64_to_jsval(util::num(left) + util::num(right))
            }
        }
        BinaryOp::Sub => util::f64_to_jsval(util::num(left) - util::num(right)),
        BinaryOp::Mul => util::f64_to_jsval(util::num(left) * util::num(right)),
        BinaryOp::Div | BinaryOp::Mod => {
            let divisor = util::num(right);
            if divisor == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            let dividend = util::num(left);
            let res = if op == BinaryOp::Div {
                dividend / divisor
            } else {
                dividend % divisor
            };
            util::f64_to_jsval(res)
        }
        BinaryOp::Lt => Ok(JsValue::from(util::js_compare(left, right).is_some_and(|o| o.is_lt()))),
        BinaryOp::Le => Ok(JsValue::from(util::js_compare(left, right).is_some_and(|o| o.is_le()))),
        BinaryOp::Gt => Ok(JsValue::from(util::js_compare(left, right).is_some_and(|o| o.is_gt()))),
        BinaryOp::Ge => Ok(JsValue::from(util::js_compare(left, right).is_some_and(|o| o.is_ge()))),
        BinaryOp::Eq => Ok(JsValue::from(util::js_equal(left, right))),
        BinaryOp::Ne => Ok(JsValue::from(!util::js_equal(left, right))),
    }
}

fn call(callee: &Expr, args: &[Expr], ctx: &mut EvalCtx<'_>) -> Result<JsValue, ExprError> {
    let Expr::Member { object, property } = callee else {
        return Err(ExprError::NotCallable(describe(callee)));
    };
    if matches!(object.as_ref(), Expr::Ident(name) if name == NAMESPACE) {
        let name = match property.as_ref() {
            Expr::Literal(Value::String(name)) => name.clone(),
            other => util::str_val(&evaluate(other, ctx)?),
        };
        let def = ctx
            .functions
            .get(name.as_str())
            .cloned()
            .ok_or(ExprError::UnknownFunction(name))?;
        let args = evaluate_args(args, ctx)?;
        assert_arity(def.name, &def.arity, args.len())?;
        return (def.eval_fn)(&args);
    }
    let target = evaluate(object, ctx)?;
    let method = util::str_val(&evaluate(property, ctx)?);
    let args = evaluate_args(args, ctx)?;
    crate::methods::call_method(&target, &method, &args)
}

fn evaluate_args(args: &[Expr], ctx: &mut EvalCtx<'_>) -> Result<Vec<JsValue>, ExprError> {
    args.iter().map(|arg| evaluate(arg, ctx)).collect()
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Literal(v) => v.to_string(),
        _ => "expression".to_string(),
    }
}

// ------------------------------------------------------------ Assignment

fn assign(target: &Expr, value: JsValue, ctx: &mut EvalCtx<'_>) -> Result<(), ExprError> {
    let mut path = Vec::new();
    let mut node = target;
    let root = loop {
        match node {
            Expr::Ident(name) => break name,
            Expr::Member { object, property } => {
                path.push(property.as_ref());
                node = object;
            }
            _ => return Err(ExprError::InvalidAssignment),
        }
    };
    path.reverse();

    let mut keys = Vec::with_capacity(path.len());
    for property in path {
        keys.push(evaluate(property, ctx)?);
    }
    let Some((last, init)) = keys.split_last() else {
        return ctx.vars.set(root, value);
    };
    if root == NAMESPACE {
        return Err(ExprError::InvalidAssignment);
    }

    let slot = ctx
        .vars
        .get_mut(root)
        .ok_or_else(|| ExprError::NotDefined(root.clone()))?;
    let mut current = match slot {
        JsValue::Json(v) => v,
        JsValue::Undefined => {
            return Err(ExprError::NotContainer {
                property: util::str_val(&keys[0]),
                target: "undefined",
            })
        }
    };
    for key in init {
        current = child_mut(current, key)?;
    }
    set_child(current, last, value.into_json())
}

/// Steps into `container[key]`, creating an empty object when the slot is
/// missing or null.
fn child_mut<'v>(container: &'v mut Value, key: &JsValue) -> Result<&'v mut Value, ExprError> {
    match container {
        Value::Object(obj) => {
            let child = obj.entry(util::str_val(key)).or_insert(Value::Null);
            if child.is_null() {
                *child = Value::Object(Map::new());
            }
            Ok(child)
        }
        Value::Array(arr) => {
            let index = grow_to(arr, key)?;
            if arr[index].is_null() {
                arr[index] = Value::Object(Map::new());
            }
            Ok(&mut arr[index])
        }
        other => Err(ExprError::NotContainer {
            property: util::str_val(key),
            target: util::json_type(other),
        }),
    }
}

fn set_child(container: &mut Value, key: &JsValue, value: Value) -> Result<(), ExprError> {
    match container {
        Value::Object(obj) => {
            obj.insert(util::str_val(key), value);
            Ok(())
        }
        Value::Array(arr) => {
            let index = grow_to(arr, key)?;
            arr[index] = value;
            Ok(())
        }
        other => Err(ExprError::NotContainer {
            property: util::str_val(key),
            target: util::json_type(other),
        }),
    }
}

/// Most `null` slots a single assignment may append to an array.
const MAX_ARRAY_GROWTH: usize = 1 << 16;

/// Resolves `key` as an index into `arr`, padding with `null` up to it.
fn grow_to(arr: &mut Vec<Value>, key: &JsValue) -> Result<usize, ExprError> {
    let index = util::array_index(key).ok_or_else(|| invalid_index(key))?;
    if index >= arr.len() {
        if index - arr.len() >= MAX_ARRAY_GROWTH {
            return Err(invalid_index(key));
        }
        arr.resize(index + 1, Value::Null);
    }
    Ok(index)
}

fn invalid_index(key: &JsValue) -> ExprError {
    ExprError::Other(format!("invalid array index {}", util::str_val(key)))
}
