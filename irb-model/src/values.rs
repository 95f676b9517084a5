//! IR Value Representations
//!
//! Defines values that can be used as operands in IR instructions:
//! constants, instruction results, function parameters and functions.

use irb_common::InstId;
use serde::{Deserialize, Serialize};
use crate::constants::Constant;
use crate::types::{FunctionType, Type};

/// Result of a value-producing instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionValue {
    /// Index into the owning function's instruction arena
    pub id: InstId,
    pub name: String,
    pub ty: Type,
}

/// Formal parameter of a function definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub index: usize,
    pub name: String,
    pub ty: Type,
}

/// A function definition or declaration, referenced by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    pub name: String,
    pub ty: FunctionType,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>, ty: FunctionType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Constant of any kind
    Constant(Constant),

    /// Result of an instruction
    Instruction(InstructionValue),

    /// Function parameter
    Parameter(FunctionParameter),

    /// Function used as a callee
    Function(FunctionRef),
}

impl Value {
    /// Type of the value. A function used as a value has its function type.
    pub fn ty(&self) -> Type {
        match self {
            Value::Constant(c) => c.ty(),
            Value::Instruction(inst) => inst.ty.clone(),
            Value::Parameter(param) => param.ty.clone(),
            Value::Function(func) => Type::Function(func.ty.clone()),
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Value::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instruction(&self) -> Option<&InstructionValue> {
        match self {
            Value::Instruction(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Constant(_))
    }

    /// Name of named values (instructions, parameters, functions)
    pub fn name(&self) -> Option<&str> {
        match self {
            Value::Constant(_) => None,
            Value::Instruction(inst) => Some(&inst.name),
            Value::Parameter(param) => Some(&param.name),
            Value::Function(func) => Some(&func.name),
        }
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Value::Constant(constant)
    }
}

impl From<FunctionRef> for Value {
    fn from(func: FunctionRef) -> Self {
        Value::Function(func)
    }
}

impl From<FunctionParameter> for Value {
    fn from(param: FunctionParameter) -> Self {
        Value::Parameter(param)
    }
}
