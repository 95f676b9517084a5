//! IR Type System
//!
//! Defines the type system for the IR: integers of any width, the LLVM
//! floating point kinds, pointers, arrays, vectors, structures, functions
//! and the few non-first-class types (void, label, metadata, opaque).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Floating point kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatKind {
    Half,
    Float,
    Double,
    X86Fp80,
    Fp128,
}

impl FloatKind {
    /// Width of the value representation in bits
    pub fn bit_width(self) -> u32 {
        match self {
            FloatKind::Half => 16,
            FloatKind::Float => 32,
            FloatKind::Double => 64,
            FloatKind::X86Fp80 => 80,
            FloatKind::Fp128 => 128,
        }
    }
}

impl fmt::Display for FloatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FloatKind::Half => "half",
            FloatKind::Float => "float",
            FloatKind::Double => "double",
            FloatKind::X86Fp80 => "x86_fp80",
            FloatKind::Fp128 => "fp128",
        };
        write!(f, "{name}")
    }
}

/// Structure type, either named (`%struct.foo`) or literal (`{ i32, i8* }`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    pub name: Option<String>,
    pub fields: Vec<Type>,
    pub packed: bool,
}

impl StructType {
    pub fn named(name: impl Into<String>, fields: Vec<Type>) -> Self {
        Self {
            name: Some(name.into()),
            fields,
            packed: false,
        }
    }

    pub fn literal(fields: Vec<Type>) -> Self {
        Self {
            name: None,
            fields,
            packed: false,
        }
    }
}

/// Prints the structure body `{ a, b }` (or `<{ a, b }>` when packed),
/// regardless of the structure's name
impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.packed {
            write!(f, "<")?;
        }
        if self.fields.is_empty() {
            write!(f, "{{}}")?;
        } else {
            write!(f, "{{ ")?;
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "{field}")?;
            }
            write!(f, " }}")?;
        }
        if self.packed {
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    pub return_type: Box<Type>,
    pub param_types: Vec<Type>,
    pub is_vararg: bool,
}

impl FunctionType {
    pub fn new(return_type: Type, param_types: Vec<Type>, is_vararg: bool) -> Self {
        Self {
            return_type: Box::new(return_type),
            param_types,
            is_vararg,
        }
    }

    pub fn returns_void(&self) -> bool {
        matches!(*self.return_type, Type::Void)
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.return_type)?;
        for (i, param) in self.param_types.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{param}")?;
        }
        if self.is_vararg {
            if !self.param_types.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")
    }
}

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// Void type
    Void,

    /// Integer type with an arbitrary bit width (`i1`, `i32`, `i128`, ...)
    Integer(u32),

    /// Floating point type
    Float(FloatKind),

    /// Pointer type
    Pointer(Box<Type>),

    /// Array type [len x element_type]
    Array { len: u64, element_type: Box<Type> },

    /// Vector type <len x element_type>
    Vector { len: u32, element_type: Box<Type> },

    /// Structure type
    Struct(StructType),

    /// Function type
    Function(FunctionType),

    /// Named type without a body
    Opaque(String),

    /// Label type (for basic block addresses)
    Label,

    /// Metadata type
    Metadata,
}

impl Type {
    pub const I1: Type = Type::Integer(1);
    pub const I8: Type = Type::Integer(8);
    pub const I16: Type = Type::Integer(16);
    pub const I32: Type = Type::Integer(32);
    pub const I64: Type = Type::Integer(64);
    pub const HALF: Type = Type::Float(FloatKind::Half);
    pub const FLOAT: Type = Type::Float(FloatKind::Float);
    pub const DOUBLE: Type = Type::Float(FloatKind::Double);
    pub const X86_FP80: Type = Type::Float(FloatKind::X86Fp80);
    pub const FP128: Type = Type::Float(FloatKind::Fp128);

    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    pub fn array_of(len: u64, element_type: Type) -> Type {
        Type::Array { len, element_type: Box::new(element_type) }
    }

    pub fn vector_of(len: u32, element_type: Type) -> Type {
        Type::Vector { len, element_type: Box::new(element_type) }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_))
    }

    /// Integers wider than 64 bits keep full precision in constants
    pub fn is_big_integer(&self) -> bool {
        matches!(self, Type::Integer(bits) if *bits > 64)
    }

    /// Check if this is a floating point type
    pub fn is_floating_point(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    /// Check if this is a pointer type
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Type::Vector { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Integer bit width, if this is an integer
    pub fn integer_width(&self) -> Option<u32> {
        match self {
            Type::Integer(bits) => Some(*bits),
            _ => None,
        }
    }

    /// Get the pointee type of a pointer
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(pointee) => Some(pointee),
            _ => None,
        }
    }

    /// Get the element type for arrays and vectors
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array { element_type, .. } | Type::Vector { element_type, .. } => Some(element_type),
            _ => None,
        }
    }

    /// Element type of an aggregate at a specific index.
    ///
    /// Arrays and vectors ignore the index; structures select the field.
    pub fn aggregate_element(&self, index: u64) -> Option<&Type> {
        match self {
            Type::Array { element_type, .. } | Type::Vector { element_type, .. } => Some(element_type),
            Type::Struct(st) => usize::try_from(index).ok().and_then(|i| st.fields.get(i)),
            _ => None,
        }
    }

    /// Number of elements of an aggregate
    pub fn element_count(&self) -> Option<u64> {
        match self {
            Type::Array { len, .. } => Some(*len),
            Type::Vector { len, .. } => Some(u64::from(*len)),
            Type::Struct(st) => Some(st.fields.len() as u64),
            _ => None,
        }
    }

    /// Collect every named structure and opaque type reachable from this type,
    /// without duplicates and in first-seen order.
    pub fn collect_named_types(&self, out: &mut Vec<Type>) {
        match self {
            Type::Pointer(inner) => inner.collect_named_types(out),
            Type::Array { element_type, .. } | Type::Vector { element_type, .. } => {
                element_type.collect_named_types(out)
            }
            Type::Struct(st) => {
                if st.name.is_some() {
                    if out.contains(self) {
                        return;
                    }
                    out.push(self.clone());
                }
                for field in &st.fields {
                    field.collect_named_types(out);
                }
            }
            Type::Function(ft) => {
                ft.return_type.collect_named_types(out);
                for param in &ft.param_types {
                    param.collect_named_types(out);
                }
            }
            Type::Opaque(_) => {
                if !out.contains(self) {
                    out.push(self.clone());
                }
            }
            Type::Void | Type::Integer(_) | Type::Float(_) | Type::Label | Type::Metadata => {}
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Integer(bits) => write!(f, "i{bits}"),
            Type::Float(kind) => write!(f, "{kind}"),
            Type::Pointer(pointee) => write!(f, "{pointee}*"),
            Type::Array { len, element_type } => write!(f, "[{len} x {element_type}]"),
            Type::Vector { len, element_type } => write!(f, "<{len} x {element_type}>"),
            Type::Struct(StructType { name: Some(name), .. }) => write!(f, "%{name}"),
            Type::Struct(st) => write!(f, "{st}"),
            Type::Function(ft) => write!(f, "{ft}"),
            Type::Opaque(name) => write!(f, "%{name}"),
            Type::Label => write!(f, "label"),
            Type::Metadata => write!(f, "metadata"),
        }
    }
}
