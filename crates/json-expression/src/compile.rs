//! Parse-once, call-many expressions.

use crate::ast::Expr;
use crate::error::ExprError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::functions::functions_map;
use crate::parser::ExprParser;
use crate::types::{FunctionMap, JsValue};
use crate::vars::Vars;
use std::sync::Arc;

/// An expression parsed once and evaluated against many binding sets.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
    functions: Arc<FunctionMap>,
}

impl CompiledExpression {
    /// Parses `source` with the default `_` namespace.
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        Self::compile_with(source, Arc::new(functions_map()))
    }

    /// Parses `source`, resolving `_` calls against `functions`.
    pub fn compile_with(source: &str, functions: Arc<FunctionMap>) -> Result<Self, ExprError> {
        let ast = ExprParser::parse(source)?;
        Ok(CompiledExpression {
            source: source.to_string(),
            ast,
            functions,
        })
    }

    /// Evaluates the expression with the given bindings.
    pub fn call(&self, vars: &mut Vars) -> Result<JsValue, ExprError> {
        let mut ctx = EvalCtx::new(vars, Arc::clone(&self.functions));
        evaluate(&self.ast, &mut ctx)
    }

    /// The raw source text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Parses and evaluates `source` in one go.
pub fn evaluate_str(source: &str, vars: &mut Vars) -> Result<JsValue, ExprError> {
    CompiledExpression::compile(source)?.call(vars)
}
