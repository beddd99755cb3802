//! Compiling and running a chain of operations.

use crate::error::PipelineError;
use crate::operations::operations_map;
use crate::types::{ArgSpec, OpCtx, OperationDefinition, OperationDescriptor, OperationMap};
use json_expression::{functions_map, CompiledExpression, FunctionMap};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Target of the per-step diagnostic events emitted in debug mode.
pub const DEBUG_TARGET: &str = "jsonop::debug";

/// A validated step: the resolved operation plus its parsed argument.
#[derive(Debug)]
struct Step {
    definition: Arc<OperationDefinition>,
    source: Option<String>,
    expression: Option<CompiledExpression>,
}

impl Step {
    fn apply(&self, value: Value) -> Result<Value, PipelineError> {
        let ctx = OpCtx {
            operation: self.definition.name,
            source: self.source.as_deref(),
        };
        (self.definition.apply_fn)(value, self.expression.as_ref(), &ctx)
    }
}

/// An ordered list of operations, compiled up front.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    /// Compiles `descriptors` against the built-in operations and `_`
    /// namespace.
    pub fn compile(descriptors: &[OperationDescriptor]) -> Result<Self, PipelineError> {
        Self::compile_with(descriptors, &operations_map(), Arc::new(functions_map()))
    }

    /// Resolves every operation name, checks argument presence and parses
    /// every expression. Nothing is evaluated.
    pub fn compile_with(
        descriptors: &[OperationDescriptor],
        operations: &OperationMap,
        functions: Arc<FunctionMap>,
    ) -> Result<Self, PipelineError> {
        let mut steps = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let definition = operations
                .get(&descriptor.name)
                .ok_or_else(|| PipelineError::UnknownOperation(descriptor.name.clone()))?;
            let source = descriptor.expression.clone();
            let expression = match (definition.arg, source.as_deref()) {
                (ArgSpec::None, Some(_)) => {
                    return Err(PipelineError::argument(
                        definition.name,
                        "does not take an expression",
                    ))
                }
                (ArgSpec::Required, None) => {
                    return Err(PipelineError::argument(
                        definition.name,
                        "requires an expression",
                    ))
                }
                (ArgSpec::Key, None) => {
                    return Err(PipelineError::argument(
                        definition.name,
                        "requires a property name",
                    ))
                }
                (ArgSpec::Optional | ArgSpec::Required, Some(text)) => Some(
                    CompiledExpression::compile_with(text, Arc::clone(&functions))
                        .map_err(|e| PipelineError::expression(definition.name, text, e))?,
                ),
                _ => None,
            };
            debug!(operation = definition.name, expression = ?source, "compiled step");
            steps.push(Step {
                definition: Arc::clone(definition),
                source,
                expression,
            });
        }
        Ok(Pipeline { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Folds the steps over `value`.
    pub fn run(&self, value: Value) -> Result<Value, PipelineError> {
        self.run_with(value, |_, _, _| {})
    }

    /// Like [`Pipeline::run`], calling `observer(step, operation, value)`
    /// after each step. Steps are numbered from 1.
    pub fn run_with<F>(&self, mut value: Value, mut observer: F) -> Result<Value, PipelineError>
    where
        F: FnMut(usize, &str, &Value),
    {
        for (i, step) in self.steps.iter().enumerate() {
            debug!(step = i + 1, operation = step.definition.name, "applying");
            value = step.apply(value)?;
            observer(i + 1, step.definition.name, &value);
        }
        Ok(value)
    }
}

/// Parses `json_text`, then applies `operations` in order.
///
/// With `debug`, every intermediate value is emitted as an `INFO` event on
/// the [`DEBUG_TARGET`] target.
pub fn process(
    json_text: &str,
    operations: &[OperationDescriptor],
    debug: bool,
) -> Result<Value, PipelineError> {
    let value: Value = serde_json::from_str(json_text)?;
    let pipeline = Pipeline::compile(operations)?;
    if !debug {
        return pipeline.run(value);
    }
    pipeline.run_with(value, |step, operation, value| {
        info!(target: DEBUG_TARGET, step, operation, "{}", value);
    })
}
