//! IR Instructions
//!
//! Defines all instruction kinds the builder can produce. Operands are
//! indices into the owning function's symbol table; branch targets are
//! stable block handles.

use irb_common::{BlockRef, SymbolIndex};
use serde::{Deserialize, Serialize};
use crate::ops::{AtomicOrdering, BinaryFlag, BinaryOperator, CastOperator, CompareOperator, SynchronizationScope};
use crate::types::Type;

/// Memory access attributes shared by loads and stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryAccess {
    /// Encoded alignment: `log2(align) + 1`, 0 when unspecified
    pub align: u32,
    pub is_volatile: bool,
    pub ordering: AtomicOrdering,
    pub scope: SynchronizationScope,
}

impl MemoryAccess {
    /// Plain, non-atomic access with the given encoded alignment
    pub fn aligned(align: u32) -> Self {
        Self { align, ..Self::default() }
    }
}

/// Decode a stored alignment back to bytes
pub fn decode_alignment(encoded: u32) -> Option<u64> {
    if encoded == 0 {
        None
    } else {
        Some(1u64 << (encoded - 1))
    }
}

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Stack allocation: result = alloca allocated_type [, count] [, align]
    Allocate {
        result: String,
        /// Pointer to `allocated_type`
        result_type: Type,
        allocated_type: Type,
        count: SymbolIndex,
        align: u32,
    },

    /// Load from memory: result = load ptr
    Load {
        result: String,
        result_type: Type,
        source: SymbolIndex,
        access: MemoryAccess,
    },

    /// Store to memory: store source, destination
    Store {
        destination: SymbolIndex,
        source: SymbolIndex,
        access: MemoryAccess,
    },

    /// Binary operation: result = op [flags] lhs, rhs
    BinaryOperation {
        result: String,
        result_type: Type,
        operator: BinaryOperator,
        flags: Vec<BinaryFlag>,
        lhs: SymbolIndex,
        rhs: SymbolIndex,
    },

    /// Comparison: result = icmp/fcmp pred lhs, rhs
    Compare {
        result: String,
        result_type: Type,
        operator: CompareOperator,
        lhs: SymbolIndex,
        rhs: SymbolIndex,
    },

    /// Conversion: result = op value to result_type
    Cast {
        result: String,
        result_type: Type,
        operator: CastOperator,
        value: SymbolIndex,
    },

    /// Call with a result
    Call {
        result: String,
        result_type: Type,
        target: SymbolIndex,
        arguments: Vec<SymbolIndex>,
    },

    /// Call of a function returning void
    VoidCall {
        target: SymbolIndex,
        arguments: Vec<SymbolIndex>,
    },

    /// Unconditional branch
    Branch { successor: BlockRef },

    /// Conditional branch on an i1
    ConditionalBranch {
        condition: SymbolIndex,
        true_successor: BlockRef,
        false_successor: BlockRef,
    },

    /// Branch to an address taken from a block
    IndirectBranch {
        address: SymbolIndex,
        successors: Vec<BlockRef>,
    },

    /// Switch with symbol case values
    Switch {
        condition: SymbolIndex,
        default_block: BlockRef,
        cases: Vec<(SymbolIndex, BlockRef)>,
    },

    /// Switch in the old encoding, with literal case values
    SwitchOld {
        condition: SymbolIndex,
        default_block: BlockRef,
        cases: Vec<(i64, BlockRef)>,
    },

    /// Phi node: one incoming value per predecessor
    Phi {
        result: String,
        result_type: Type,
        incoming: Vec<(SymbolIndex, BlockRef)>,
    },

    /// Address computation
    GetElementPointer {
        result: String,
        result_type: Type,
        base: SymbolIndex,
        indices: Vec<SymbolIndex>,
        inbounds: bool,
    },

    ExtractElement {
        result: String,
        result_type: Type,
        vector: SymbolIndex,
        index: SymbolIndex,
    },

    InsertElement {
        result: String,
        result_type: Type,
        vector: SymbolIndex,
        value: SymbolIndex,
        index: SymbolIndex,
    },

    /// Aggregate member read; the index is a literal
    ExtractValue {
        result: String,
        result_type: Type,
        aggregate: SymbolIndex,
        index: u64,
    },

    /// Aggregate member write; the index is a literal
    InsertValue {
        result: String,
        result_type: Type,
        aggregate: SymbolIndex,
        value: SymbolIndex,
        index: u64,
    },

    Select {
        result: String,
        result_type: Type,
        condition: SymbolIndex,
        true_value: SymbolIndex,
        false_value: SymbolIndex,
    },

    ShuffleVector {
        result: String,
        result_type: Type,
        vector1: SymbolIndex,
        vector2: SymbolIndex,
        mask: SymbolIndex,
    },

    /// Return, with or without a value
    Return { value: Option<SymbolIndex> },

    Unreachable,
}

impl Instruction {
    /// Name of the produced value, if the instruction produces one
    pub fn result(&self) -> Option<&str> {
        match self {
            Instruction::Allocate { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::BinaryOperation { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::GetElementPointer { result, .. }
            | Instruction::ExtractElement { result, .. }
            | Instruction::InsertElement { result, .. }
            | Instruction::ExtractValue { result, .. }
            | Instruction::InsertValue { result, .. }
            | Instruction::Select { result, .. }
            | Instruction::ShuffleVector { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn result_mut(&mut self) -> Option<&mut String> {
        match self {
            Instruction::Allocate { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::BinaryOperation { result, .. }
            | Instruction::Compare { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::Call { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::GetElementPointer { result, .. }
            | Instruction::ExtractElement { result, .. }
            | Instruction::InsertElement { result, .. }
            | Instruction::ExtractValue { result, .. }
            | Instruction::InsertValue { result, .. }
            | Instruction::Select { result, .. }
            | Instruction::ShuffleVector { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn result_type(&self) -> Option<&Type> {
        match self {
            Instruction::Allocate { result_type, .. }
            | Instruction::Load { result_type, .. }
            | Instruction::BinaryOperation { result_type, .. }
            | Instruction::Compare { result_type, .. }
            | Instruction::Cast { result_type, .. }
            | Instruction::Call { result_type, .. }
            | Instruction::Phi { result_type, .. }
            | Instruction::GetElementPointer { result_type, .. }
            | Instruction::ExtractElement { result_type, .. }
            | Instruction::InsertElement { result_type, .. }
            | Instruction::ExtractValue { result_type, .. }
            | Instruction::InsertValue { result_type, .. }
            | Instruction::Select { result_type, .. }
            | Instruction::ShuffleVector { result_type, .. } => Some(result_type),
            _ => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Branch { .. }
                | Instruction::ConditionalBranch { .. }
                | Instruction::IndirectBranch { .. }
                | Instruction::Switch { .. }
                | Instruction::SwitchOld { .. }
                | Instruction::Return { .. }
                | Instruction::Unreachable
        )
    }

    /// Blocks control may transfer to
    pub fn successors(&self) -> Vec<BlockRef> {
        match self {
            Instruction::Branch { successor } => vec![*successor],
            Instruction::ConditionalBranch { true_successor, false_successor, .. } => {
                vec![*true_successor, *false_successor]
            }
            Instruction::IndirectBranch { successors, .. } => successors.clone(),
            Instruction::Switch { default_block, cases, .. } => {
                std::iter::once(*default_block).chain(cases.iter().map(|(_, b)| *b)).collect()
            }
            Instruction::SwitchOld { default_block, cases, .. } => {
                std::iter::once(*default_block).chain(cases.iter().map(|(_, b)| *b)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Assembly opcode of the instruction
    pub fn opcode(&self) -> String {
        let opcode = match self {
            Instruction::Allocate { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::BinaryOperation { operator, .. } => return operator.to_string(),
            Instruction::Compare { operator, .. } => {
                if operator.is_floating_point() { "fcmp" } else { "icmp" }
            }
            Instruction::Cast { operator, .. } => return operator.to_string(),
            Instruction::Call { .. } | Instruction::VoidCall { .. } => "call",
            Instruction::Branch { .. } | Instruction::ConditionalBranch { .. } => "br",
            Instruction::IndirectBranch { .. } => "indirectbr",
            Instruction::Switch { .. } | Instruction::SwitchOld { .. } => "switch",
            Instruction::Phi { .. } => "phi",
            Instruction::GetElementPointer { .. } => "getelementptr",
            Instruction::ExtractElement { .. } => "extractelement",
            Instruction::InsertElement { .. } => "insertelement",
            Instruction::ExtractValue { .. } => "extractvalue",
            Instruction::InsertValue { .. } => "insertvalue",
            Instruction::Select { .. } => "select",
            Instruction::ShuffleVector { .. } => "shufflevector",
            Instruction::Return { .. } => "ret",
            Instruction::Unreachable => "unreachable",
        };
        opcode.to_string()
    }
}
