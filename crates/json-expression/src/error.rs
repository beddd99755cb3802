use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("syntax error: {msg} (at {pos})")]
    Syntax { msg: String, pos: usize },

    #[error("{0}")]
    ArityError(String),

    #[error("{0} is not defined")]
    NotDefined(String),

    #[error("cannot read property {property} of {target}")]
    NotContainer { property: String, target: &'static str },

    #[error("{0} is not a function")]
    NotCallable(String),

    #[error("unknown function `_.{0}`")]
    UnknownFunction(String),

    #[error("invalid assignment target")]
    InvalidAssignment,

    #[error("the `_` namespace can only be used to call functions")]
    NamespaceNotValue,

    #[error("DIVISION_BY_ZERO")]
    DivisionByZero,

    #[error("NOT_FINITE")]
    NotFinite,

    #[error("NOT_ARRAY")]
    NotArray,

    #[error("NOT_OBJECT")]
    NotObject,

    #[error("NOT_STRING")]
    NotString,

    #[error("{0}")]
    Other(String),
}

impl ExprError {
    pub fn syntax(msg: impl Into<String>, pos: usize) -> Self {
        ExprError::Syntax {
            msg: msg.into(),
            pos,
        }
    }
}
