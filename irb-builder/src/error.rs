//! Build error types

use irb_common::IrbError;
use irb_model::Type;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{operation}: expected operand of type {expected}, found {found}")]
    TypeMismatch {
        operation: &'static str,
        expected: Type,
        found: Type,
    },

    #[error("{operation}: expected a pointer, found {found}")]
    NotAPointer {
        operation: &'static str,
        found: Type,
    },

    #[error("{operation}: expected a vector, found {found}")]
    NotAVector {
        operation: &'static str,
        found: Type,
    },

    #[error("{operation}: expected an array or structure, found {found}")]
    NotAnAggregate {
        operation: &'static str,
        found: Type,
    },

    #[error("{operation}: condition must be i1 or a vector of i1, found {found}")]
    InvalidCondition {
        operation: &'static str,
        found: Type,
    },

    #[error("index {index} is out of range for {ty}")]
    IndexOutOfRange { ty: Type, index: u64 },

    #[error("structure {ty} can only be indexed by an integer constant")]
    NonConstantStructIndex { ty: Type },

    #[error("cannot handle call target of type {ty}")]
    UnsupportedCallTarget { ty: Type },

    #[error("call to {callee} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot convert literal {literal} to {ty}")]
    LiteralTarget { literal: String, ty: Type },

    #[error("{operation}: at least one operand must be a typed value")]
    UntypedOperands { operation: &'static str },

    #[error("va_arg of type {ty} is not implemented")]
    UnsupportedVaArgType { ty: Type },

    #[error("cannot {operator} from {from} to {to}")]
    UnsupportedCast {
        operator: &'static str,
        from: Type,
        to: Type,
    },

    #[error("function '{function}' declares only {declared} parameter(s)")]
    NoMoreParameters { function: String, declared: usize },
}

impl From<BuildError> for IrbError {
    fn from(err: BuildError) -> Self {
        IrbError::Build {
            message: err.to_string(),
        }
    }
}
