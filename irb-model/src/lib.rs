//! Data model of the IR builder
//!
//! This crate defines the typed, LLVM-style intermediate representation that
//! the builders produce and the writer prints.
//!
//! ## Architecture
//!
//! The crate is structured as follows:
//! - `types` - Type system (Type, StructType, FunctionType)
//! - `constants` - Constant values and float bit patterns
//! - `values` - Operand values (constants, instruction results, parameters, functions)
//! - `ops` - Binary, compare and cast operators, atomic orderings
//! - `instructions` - IR instructions
//! - `symbols` - Function-scoped symbol table
//! - `blocks` - Basic blocks
//! - `function` - Function definitions
//! - `module` - Module and global variables
//! - `layout` - Target data layout queries

// Public exports - clean API surface
pub use self::types::{FloatKind, FunctionType, StructType, Type};
pub use self::constants::{Constant, FloatConstant, GlobalRef, InlineAsmConstant};
pub use self::values::{FunctionParameter, FunctionRef, InstructionValue, Value};
pub use self::ops::{AtomicOrdering, BinaryFlag, BinaryOperator, CastOperator, CompareOperator, SynchronizationScope};
pub use self::instructions::{Instruction, MemoryAccess};
pub use self::symbols::SymbolTable;
pub use self::blocks::InstructionBlock;
pub use self::function::FunctionDefinition;
pub use self::module::{GlobalVariable, Linkage, Module};
pub use self::layout::{DataLayout, DEFAULT_DATA_LAYOUT, X86_64_DATA_LAYOUT};

pub use irb_common::{BlockRef, InstId, SymbolIndex};

pub mod constants;
pub mod instructions;
pub mod layout;
mod types;
mod values;
mod ops;
mod symbols;
mod blocks;
mod function;
mod module;
