use crate::types::FunctionMap;
use crate::vars::Vars;
use std::sync::Arc;

/// The execution context threaded through evaluation.
pub struct EvalCtx<'a> {
    /// Bindings for this evaluation.
    pub vars: &'a mut Vars,
    /// The `_` namespace.
    pub functions: Arc<FunctionMap>,
}

impl<'a> EvalCtx<'a> {
    pub fn new(vars: &'a mut Vars, functions: Arc<FunctionMap>) -> Self {
        EvalCtx { vars, functions }
    }
}
