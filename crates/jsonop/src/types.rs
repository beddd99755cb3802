use crate::error::PipelineError;
use json_expression::CompiledExpression;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One requested pipeline step: an operation name and its optional
/// expression text, in the order given by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: String,
    pub expression: Option<String>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>, expression: Option<&str>) -> Self {
        OperationDescriptor {
            name: name.into(),
            expression: expression.map(str::to_string),
        }
    }
}

/// What an operation does with its argument text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSpec {
    /// Takes no argument.
    None,
    /// Optional expression.
    Optional,
    /// Mandatory expression.
    Required,
    /// Mandatory raw property name, not parsed as an expression.
    Key,
}

/// Per-step context handed to an operation body.
#[derive(Debug, Clone, Copy)]
pub struct OpCtx<'a> {
    /// Canonical operation name, used in error messages.
    pub operation: &'static str,
    /// Raw argument text as given by the caller.
    pub source: Option<&'a str>,
}

/// Signature of an operation body. The input value is moved in.
pub type ApplyFn =
    fn(Value, Option<&CompiledExpression>, &OpCtx<'_>) -> Result<Value, PipelineError>;

/// A registered pipeline operation.
pub struct OperationDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub arg: ArgSpec,
    pub apply_fn: ApplyFn,
}

impl std::fmt::Debug for OperationDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arg", &self.arg)
            .finish()
    }
}

/// Map of operation name/alias -> definition.
pub type OperationMap = HashMap<String, Arc<OperationDefinition>>;

/// Builds an `OperationMap` from a list of operation definitions.
pub fn operations_to_map(operations: Vec<Arc<OperationDefinition>>) -> OperationMap {
    let mut map = HashMap::new();
    for op in operations {
        map.insert(op.name.to_string(), Arc::clone(&op));
        for alias in op.aliases {
            map.insert(alias.to_string(), Arc::clone(&op));
        }
    }
    map
}
