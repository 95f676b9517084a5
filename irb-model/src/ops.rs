//! IR Operations
//!
//! Defines the operators, flags and memory-ordering enums carried by
//! instructions. Every `Display` impl prints the exact assembly keyword.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary operations in IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Integer arithmetic
    Add, Sub, Mul,
    UDiv, SDiv,    // Unsigned/signed division
    URem, SRem,    // Unsigned/signed remainder

    // Bitwise
    Shl, LShr, AShr,
    And, Or, Xor,

    // Floating point arithmetic
    FAdd, FSub, FMul, FDiv, FRem,
}

impl BinaryOperator {
    pub fn is_floating_point(self) -> bool {
        matches!(
            self,
            BinaryOperator::FAdd | BinaryOperator::FSub | BinaryOperator::FMul
                | BinaryOperator::FDiv | BinaryOperator::FRem
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::UDiv => "udiv",
            BinaryOperator::SDiv => "sdiv",
            BinaryOperator::URem => "urem",
            BinaryOperator::SRem => "srem",
            BinaryOperator::Shl => "shl",
            BinaryOperator::LShr => "lshr",
            BinaryOperator::AShr => "ashr",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Xor => "xor",
            BinaryOperator::FAdd => "fadd",
            BinaryOperator::FSub => "fsub",
            BinaryOperator::FMul => "fmul",
            BinaryOperator::FDiv => "fdiv",
            BinaryOperator::FRem => "frem",
        };
        write!(f, "{op_str}")
    }
}

/// Wrap/exactness flags of integer binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryFlag {
    NoUnsignedWrap,
    NoSignedWrap,
    Exact,
}

impl fmt::Display for BinaryFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryFlag::NoUnsignedWrap => write!(f, "nuw"),
            BinaryFlag::NoSignedWrap => write!(f, "nsw"),
            BinaryFlag::Exact => write!(f, "exact"),
        }
    }
}

/// Comparison predicates (`icmp` and `fcmp`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOperator {
    // Floating point, ordered/unordered
    FpFalse,
    FpOrderedEqual,
    FpOrderedGreaterThan,
    FpOrderedGreaterOrEqual,
    FpOrderedLessThan,
    FpOrderedLessOrEqual,
    FpOrderedNotEqual,
    FpOrdered,
    FpUnordered,
    FpUnorderedEqual,
    FpUnorderedGreaterThan,
    FpUnorderedGreaterOrEqual,
    FpUnorderedLessThan,
    FpUnorderedLessOrEqual,
    FpUnorderedNotEqual,
    FpTrue,

    // Integer
    IntEqual,
    IntNotEqual,
    IntUnsignedGreaterThan,
    IntUnsignedGreaterOrEqual,
    IntUnsignedLessThan,
    IntUnsignedLessOrEqual,
    IntSignedGreaterThan,
    IntSignedGreaterOrEqual,
    IntSignedLessThan,
    IntSignedLessOrEqual,
}

impl CompareOperator {
    /// `fcmp` predicates
    pub fn is_floating_point(self) -> bool {
        !matches!(
            self,
            CompareOperator::IntEqual
                | CompareOperator::IntNotEqual
                | CompareOperator::IntUnsignedGreaterThan
                | CompareOperator::IntUnsignedGreaterOrEqual
                | CompareOperator::IntUnsignedLessThan
                | CompareOperator::IntUnsignedLessOrEqual
                | CompareOperator::IntSignedGreaterThan
                | CompareOperator::IntSignedGreaterOrEqual
                | CompareOperator::IntSignedLessThan
                | CompareOperator::IntSignedLessOrEqual
        )
    }

    /// Predicates that hold when the operands differ
    pub fn is_inequality(self) -> bool {
        matches!(
            self,
            CompareOperator::IntNotEqual
                | CompareOperator::FpOrderedNotEqual
                | CompareOperator::FpUnorderedNotEqual
        )
    }
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pred = match self {
            CompareOperator::FpFalse => "false",
            CompareOperator::FpOrderedEqual => "oeq",
            CompareOperator::FpOrderedGreaterThan => "ogt",
            CompareOperator::FpOrderedGreaterOrEqual => "oge",
            CompareOperator::FpOrderedLessThan => "olt",
            CompareOperator::FpOrderedLessOrEqual => "ole",
            CompareOperator::FpOrderedNotEqual => "one",
            CompareOperator::FpOrdered => "ord",
            CompareOperator::FpUnordered => "uno",
            CompareOperator::FpUnorderedEqual => "ueq",
            CompareOperator::FpUnorderedGreaterThan => "ugt",
            CompareOperator::FpUnorderedGreaterOrEqual => "uge",
            CompareOperator::FpUnorderedLessThan => "ult",
            CompareOperator::FpUnorderedLessOrEqual => "ule",
            CompareOperator::FpUnorderedNotEqual => "une",
            CompareOperator::FpTrue => "true",
            CompareOperator::IntEqual => "eq",
            CompareOperator::IntNotEqual => "ne",
            CompareOperator::IntUnsignedGreaterThan => "ugt",
            CompareOperator::IntUnsignedGreaterOrEqual => "uge",
            CompareOperator::IntUnsignedLessThan => "ult",
            CompareOperator::IntUnsignedLessOrEqual => "ule",
            CompareOperator::IntSignedGreaterThan => "sgt",
            CompareOperator::IntSignedGreaterOrEqual => "sge",
            CompareOperator::IntSignedLessThan => "slt",
            CompareOperator::IntSignedLessOrEqual => "sle",
        };
        write!(f, "{pred}")
    }
}

/// Conversion operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOperator {
    Trunc,
    ZExt,
    SExt,
    FpTrunc,
    FpExt,
    FpToUi,
    FpToSi,
    UiToFp,
    SiToFp,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,
}

impl fmt::Display for CastOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            CastOperator::Trunc => "trunc",
            CastOperator::ZExt => "zext",
            CastOperator::SExt => "sext",
            CastOperator::FpTrunc => "fptrunc",
            CastOperator::FpExt => "fpext",
            CastOperator::FpToUi => "fptoui",
            CastOperator::FpToSi => "fptosi",
            CastOperator::UiToFp => "uitofp",
            CastOperator::SiToFp => "sitofp",
            CastOperator::PtrToInt => "ptrtoint",
            CastOperator::IntToPtr => "inttoptr",
            CastOperator::BitCast => "bitcast",
            CastOperator::AddrSpaceCast => "addrspacecast",
        };
        write!(f, "{op_str}")
    }
}

/// Memory ordering of loads and stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AtomicOrdering {
    #[default]
    NotAtomic,
    Unordered,
    Monotonic,
    Acquire,
    Release,
    AcquireRelease,
    SequentiallyConsistent,
}

impl AtomicOrdering {
    pub fn is_atomic(self) -> bool {
        self != AtomicOrdering::NotAtomic
    }
}

impl fmt::Display for AtomicOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ordering = match self {
            AtomicOrdering::NotAtomic => "",
            AtomicOrdering::Unordered => "unordered",
            AtomicOrdering::Monotonic => "monotonic",
            AtomicOrdering::Acquire => "acquire",
            AtomicOrdering::Release => "release",
            AtomicOrdering::AcquireRelease => "acq_rel",
            AtomicOrdering::SequentiallyConsistent => "seq_cst",
        };
        write!(f, "{ordering}")
    }
}

/// Synchronization scope of atomic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SynchronizationScope {
    SingleThread,
    #[default]
    CrossThread,
}
