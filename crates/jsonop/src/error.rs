use json_expression::ExprError;
use serde_json::Value;
use thiserror::Error;

/// Failure of a pipeline run. Every variant is terminal.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid JSON input: {0}")]
    Parse(serde_json::Error),

    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("{operation}: expression `{expression}` failed")]
    Expression {
        operation: String,
        expression: String,
        #[source]
        source: ExprError,
    },

    #[error("{operation}: expected {expected}, found {found}")]
    TypeMismatch {
        operation: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{operation}: {msg}")]
    Argument { operation: String, msg: String },
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Parse(e)
    }
}

impl PipelineError {
    pub fn type_mismatch(operation: &str, expected: &'static str, found: &Value) -> Self {
        PipelineError::TypeMismatch {
            operation: operation.to_string(),
            expected,
            found: shape_name(found),
        }
    }

    pub fn argument(operation: &str, msg: impl Into<String>) -> Self {
        PipelineError::Argument {
            operation: operation.to_string(),
            msg: msg.into(),
        }
    }

    pub fn expression(operation: &str, expression: &str, source: ExprError) -> Self {
        PipelineError::Expression {
            operation: operation.to_string(),
            expression: expression.to_string(),
            source,
        }
    }
}

/// Name of a value's shape as it appears in error messages.
pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
