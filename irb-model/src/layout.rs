//! Target data layout
//!
//! Parses an LLVM data-layout string and answers size and alignment
//! queries. Sizes are allocation sizes in bytes, alignments are ABI
//! alignments in bytes.

use irb_common::IrbError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use crate::types::{FloatKind, Type};

/// Layout of the x86-64 targets the builder generates code for
pub const X86_64_DATA_LAYOUT: &str = "e-p:64:64:64-i1:8:8-i8:8:8-i16:16:16-i32:32:32-i64:64:64-f32:32:32-f64:64:64-v64:64:64-v128:128:128-a0:0:64-s0:64:64-f80:128:128-n8:16:32:64-S128";

/// Default layout, parsed once per process
pub static DEFAULT_DATA_LAYOUT: Lazy<DataLayout> = Lazy::new(|| {
    DataLayout::parse(X86_64_DATA_LAYOUT)
        .unwrap_or_else(|err| panic!("built-in data layout is invalid: {err}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

/// One `<kind><bits>:<abi>[:<pref>]` entry, all values in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignEntry {
    pub bits: u32,
    pub abi: u32,
    pub preferred: u32,
}

/// Parsed data layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLayout {
    pub endianness: Endianness,
    /// Pointer size and ABI alignment in bits (address space 0)
    pub pointer_size: u32,
    pub pointer_abi: u32,
    pub integers: Vec<AlignEntry>,
    pub floats: Vec<AlignEntry>,
    pub vectors: Vec<AlignEntry>,
    pub aggregate_abi: u32,
    pub stack_object_abi: u32,
    pub native_integer_widths: Vec<u32>,
    pub stack_alignment: Option<u32>,
    pub mangling: Option<String>,
}

impl Default for DataLayout {
    fn default() -> Self {
        DEFAULT_DATA_LAYOUT.clone()
    }
}

fn parse_bits(token: &str, field: &str) -> Result<u32, IrbError> {
    field
        .parse::<u32>()
        .map_err(|_| IrbError::data_layout(token, format!("'{field}' is not a bit count")))
}

/// Parse `<abi>[:<pref>]` fields; the preferred alignment defaults to the ABI one
fn parse_alignments(token: &str, fields: &[&str]) -> Result<(u32, u32), IrbError> {
    match fields {
        [abi] => {
            let abi = parse_bits(token, abi)?;
            Ok((abi, abi))
        }
        [abi, preferred] => Ok((parse_bits(token, abi)?, parse_bits(token, preferred)?)),
        _ => Err(IrbError::data_layout(token, "expected <abi>[:<pref>]")),
    }
}

fn upsert(entries: &mut Vec<AlignEntry>, entry: AlignEntry) {
    match entries.iter_mut().find(|e| e.bits == entry.bits) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

fn bytes(bits: u32) -> u64 {
    u64::from(bits).div_ceil(8)
}

fn round_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        value
    } else {
        value.div_ceil(align) * align
    }
}

impl DataLayout {
    /// Parse a layout string such as `e-p:64:64:64-i32:32:32-n8:16:32:64-S128`
    pub fn parse(spec: &str) -> Result<DataLayout, IrbError> {
        let mut layout = DataLayout {
            endianness: Endianness::Little,
            pointer_size: 64,
            pointer_abi: 64,
            integers: Vec::new(),
            floats: Vec::new(),
            vectors: Vec::new(),
            aggregate_abi: 0,
            stack_object_abi: 64,
            native_integer_widths: Vec::new(),
            stack_alignment: None,
            mangling: None,
        };

        for token in spec.split('-').filter(|t| !t.is_empty()) {
            let mut fields = token.split(':');
            let head = fields.next().unwrap_or_default();
            let rest: Vec<&str> = fields.collect();
            let (kind, size) = head.split_at(head.chars().next().map_or(0, char::len_utf8));

            match kind {
                "e" | "E" if size.is_empty() && rest.is_empty() => {
                    layout.endianness = if kind == "e" { Endianness::Little } else { Endianness::Big };
                }
                "p" => {
                    let address_space = if size.is_empty() { 0 } else { parse_bits(token, size)? };
                    let (size_field, aligns) = rest
                        .split_first()
                        .ok_or_else(|| IrbError::data_layout(token, "expected p[n]:<size>:<abi>[:<pref>]"))?;
                    let pointer_size = parse_bits(token, size_field)?;
                    let (abi, _) = parse_alignments(token, aligns)?;
                    if address_space == 0 {
                        layout.pointer_size = pointer_size;
                        layout.pointer_abi = abi;
                    }
                }
                "i" | "f" | "v" => {
                    let bits = parse_bits(token, size)?;
                    let (abi, preferred) = parse_alignments(token, &rest)?;
                    let entry = AlignEntry { bits, abi, preferred };
                    let entries = match kind {
                        "i" => &mut layout.integers,
                        "f" => &mut layout.floats,
                        _ => &mut layout.vectors,
                    };
                    upsert(entries, entry);
                }
                "a" | "s" => {
                    let (abi, _) = parse_alignments(token, &rest)?;
                    if kind == "a" {
                        layout.aggregate_abi = abi;
                    } else {
                        layout.stack_object_abi = abi;
                    }
                }
                "n" => {
                    let mut widths = vec![parse_bits(token, size)?];
                    for width in &rest {
                        widths.push(parse_bits(token, width)?);
                    }
                    layout.native_integer_widths = widths;
                }
                "S" if rest.is_empty() => {
                    layout.stack_alignment = Some(parse_bits(token, size)?);
                }
                "m" if size.is_empty() && rest.len() == 1 => {
                    layout.mangling = Some(rest[0].to_string());
                }
                _ => return Err(IrbError::data_layout(token, "unrecognized specification")),
            }
        }

        layout.integers.sort_by_key(|e| e.bits);
        layout.floats.sort_by_key(|e| e.bits);
        layout.vectors.sort_by_key(|e| e.bits);
        Ok(layout)
    }

    fn integer_abi(&self, bits: u32) -> u64 {
        let entry = self
            .integers
            .iter()
            .find(|e| e.bits == bits)
            .or_else(|| self.integers.iter().find(|e| e.bits > bits))
            .or_else(|| self.integers.last());
        match entry {
            Some(e) => bytes(e.abi).max(1),
            None => bytes(bits).next_power_of_two().max(1),
        }
    }

    fn float_abi(&self, kind: FloatKind) -> u64 {
        let bits = kind.bit_width();
        match self.floats.iter().find(|e| e.bits == bits) {
            Some(e) => bytes(e.abi).max(1),
            None => bytes(bits).next_power_of_two(),
        }
    }

    fn vector_abi(&self, total_bits: u64) -> u64 {
        match self.vectors.iter().find(|e| u64::from(e.bits) == total_bits) {
            Some(e) => bytes(e.abi).max(1),
            None => total_bits.div_ceil(8).next_power_of_two().max(1),
        }
    }

    /// Bit width of a scalar type, as packed into a vector
    fn scalar_bits(&self, ty: &Type) -> u64 {
        match ty {
            Type::Integer(bits) => u64::from(*bits),
            Type::Float(kind) => u64::from(kind.bit_width()),
            Type::Pointer(_) => u64::from(self.pointer_size),
            _ => self.size_of(ty) * 8,
        }
    }

    /// Number of bytes written by a store of the type
    pub fn store_size_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Integer(bits) => bytes(*bits),
            Type::Float(kind) => bytes(kind.bit_width()),
            Type::Pointer(_) => bytes(self.pointer_size),
            Type::Vector { len, element_type } => {
                (u64::from(*len) * self.scalar_bits(element_type)).div_ceil(8)
            }
            _ => self.size_of(ty),
        }
    }

    /// Allocation size in bytes, including tail padding
    pub fn size_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Integer(_) | Type::Float(_) | Type::Pointer(_) | Type::Vector { .. } => {
                round_up(self.store_size_of(ty), self.alignment_of(ty))
            }
            Type::Array { len, element_type } => len * self.size_of(element_type),
            Type::Struct(st) => {
                if st.packed {
                    return st.fields.iter().map(|f| self.size_of(f)).sum();
                }
                let mut offset = 0;
                for field in &st.fields {
                    offset = round_up(offset, self.alignment_of(field)) + self.size_of(field);
                }
                round_up(offset, self.alignment_of(ty))
            }
            Type::Void | Type::Function(_) | Type::Opaque(_) | Type::Label | Type::Metadata => 0,
        }
    }

    /// ABI alignment in bytes, always a power of two
    pub fn alignment_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Integer(bits) => self.integer_abi(*bits),
            Type::Float(kind) => self.float_abi(*kind),
            Type::Pointer(_) => bytes(self.pointer_abi).max(1),
            Type::Vector { len, element_type } => {
                self.vector_abi(u64::from(*len) * self.scalar_bits(element_type))
            }
            Type::Array { element_type, .. } => self.alignment_of(element_type),
            Type::Struct(st) => {
                if st.packed {
                    return 1;
                }
                st.fields
                    .iter()
                    .map(|f| self.alignment_of(f))
                    .fold(bytes(self.aggregate_abi).max(1), u64::max)
            }
            Type::Void | Type::Function(_) | Type::Opaque(_) | Type::Label | Type::Metadata => 1,
        }
    }

    /// Byte offset of every field of a non-packed or packed structure
    pub fn field_offsets(&self, fields: &[Type], packed: bool) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for field in fields {
            if !packed {
                offset = round_up(offset, self.alignment_of(field));
            }
            offsets.push(offset);
            offset += self.size_of(field);
        }
        offsets
    }
}
