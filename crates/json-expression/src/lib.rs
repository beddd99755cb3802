//! A small JavaScript-flavoured expression language over JSON values.
//!
//! # Overview
//!
//! Expressions are plain text such as `it.age > 18` or
//! `out[key] = {name: it.name}`. They are parsed once into a syntax tree and
//! evaluated against explicit bindings ([`Vars`]): the current item `it`,
//! an optional `key`, an optional accumulator `out`, and the `_` utility
//! namespace ([`functions_map`]).
//!
//! # Example
//!
//! ```
//! use json_expression::{CompiledExpression, JsValue, Vars};
//! use serde_json::json;
//!
//! let expr = CompiledExpression::compile("it.age > 18 && _.size(it.tags) > 0").unwrap();
//! let mut vars = Vars::new(json!({"age": 20, "tags": ["a"]}));
//! let result = expr.call(&mut vars).unwrap();
//!
//! assert_eq!(result, JsValue::Json(json!(true)));
//! ```

pub mod ast;
pub mod compile;
pub mod error;
pub mod eval_ctx;
pub mod evaluate;
pub mod functions;
pub mod methods;
pub mod parser;
pub mod types;
pub mod util;
pub mod vars;

pub use compile::{evaluate_str, CompiledExpression};
pub use error::ExprError;
pub use eval_ctx::EvalCtx;
pub use evaluate::evaluate;
pub use functions::functions_map;
pub use parser::ExprParser;
pub use types::{Arity, FunctionDefinition, FunctionMap, JsValue};
pub use vars::Vars;
