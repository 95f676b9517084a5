//! IR Constants
//!
//! Constants are immutable value objects. Integers are kept normalized to
//! their type's width (truncated, then sign-extended into an `i64`), big
//! integers keep full precision, and floating point constants store the raw
//! bit pattern of their own width.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use crate::types::{FloatKind, Type};

/// Floating point constant stored as the bit pattern of its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloatConstant {
    pub kind: FloatKind,
    /// Raw bits; only the low `kind.bit_width()` bits are used
    pub bits: u128,
}

impl FloatConstant {
    /// Convert a double into the bit pattern of `kind`
    pub fn from_f64(kind: FloatKind, value: f64) -> Self {
        let bits = match kind {
            FloatKind::Half => u128::from(f64_to_half_bits(value)),
            FloatKind::Float => u128::from((value as f32).to_bits()),
            FloatKind::Double => u128::from(value.to_bits()),
            FloatKind::X86Fp80 => f64_to_x87_bits(value),
            FloatKind::Fp128 => f64_to_quad_bits(value),
        };
        Self { kind, bits }
    }

    /// Decode the constant back into a double, for the kinds a double can hold exactly
    pub fn to_f64(&self) -> Option<f64> {
        match self.kind {
            FloatKind::Half => Some(half_bits_to_f64(self.bits as u16)),
            FloatKind::Float => Some(f64::from(f32::from_bits(self.bits as u32))),
            FloatKind::Double => Some(f64::from_bits(self.bits as u64)),
            FloatKind::X86Fp80 | FloatKind::Fp128 => None,
        }
    }

    pub fn ty(&self) -> Type {
        Type::Float(self.kind)
    }
}

/// Inline assembly used as a call target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineAsmConstant {
    /// Pointer to the function type of the assembly snippet
    pub ty: Type,
    pub asm: String,
    pub constraints: String,
    pub has_side_effects: bool,
    pub align_stack: bool,
}

/// Reference to a module-level global variable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalRef {
    pub name: String,
    /// Pointer to the global's value type
    pub ty: Type,
}

/// IR Constant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    /// Integer of at most 64 bits
    Integer { ty: Type, value: i64 },

    /// Integer wider than 64 bits
    BigInteger { ty: Type, value: BigInt },

    /// Floating point value
    Float(FloatConstant),

    /// `null` of a pointer type
    Null(Type),

    /// `undef` of any first-class type
    Undef(Type),

    /// `zeroinitializer` of an aggregate type
    ZeroInitializer(Type),

    /// Array, structure or vector of constants
    Aggregate { ty: Type, elements: Vec<Constant> },

    /// Inline assembly
    InlineAsm(InlineAsmConstant),

    /// Constant address computation: getelementptr (base, indices...)
    GetElementPointer {
        ty: Type,
        base: Box<Constant>,
        indices: Vec<Constant>,
        inbounds: bool,
    },

    /// Address of a global variable
    Global(GlobalRef),
}

impl Constant {
    /// Integer constant of `ty`, truncated and sign-extended to the type's width
    pub fn integer(ty: Type, value: i64) -> Self {
        let width = ty.integer_width().unwrap_or(64);
        Constant::Integer { value: sign_normalize(value, width), ty }
    }

    pub fn i1(value: bool) -> Self {
        Self::integer(Type::I1, i64::from(value))
    }

    pub fn i8(value: i64) -> Self {
        Self::integer(Type::I8, value)
    }

    pub fn i32(value: i64) -> Self {
        Self::integer(Type::I32, value)
    }

    pub fn i64(value: i64) -> Self {
        Self::integer(Type::I64, value)
    }

    pub fn big_integer(ty: Type, value: BigInt) -> Self {
        Constant::BigInteger { ty, value }
    }

    pub fn float(kind: FloatKind, value: f64) -> Self {
        Constant::Float(FloatConstant::from_f64(kind, value))
    }

    pub fn ty(&self) -> Type {
        match self {
            Constant::Integer { ty, .. }
            | Constant::BigInteger { ty, .. }
            | Constant::Null(ty)
            | Constant::Undef(ty)
            | Constant::ZeroInitializer(ty)
            | Constant::Aggregate { ty, .. }
            | Constant::GetElementPointer { ty, .. } => ty.clone(),
            Constant::Float(fc) => fc.ty(),
            Constant::InlineAsm(asm) => asm.ty.clone(),
            Constant::Global(global) => global.ty.clone(),
        }
    }

    /// Integer value of an integer constant
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Constant::Integer { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Truncate `value` to `width` bits and sign-extend it back to 64 bits
pub fn sign_normalize(value: i64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value;
    }
    let shift = 64 - width;
    (value << shift) >> shift
}

/// Low 64 bits of a big integer, two's complement
pub fn big_integer_low_bits(value: &BigInt) -> i64 {
    let bytes = value.to_signed_bytes_le();
    let fill = if bytes.last().is_some_and(|b| b & 0x80 != 0) { 0xff } else { 0 };
    let mut buf = [fill; 8];
    for (dst, src) in buf.iter_mut().zip(bytes.iter()) {
        *dst = *src;
    }
    i64::from_le_bytes(buf)
}

const F64_FRACTION_BITS: u32 = 52;
const F64_FRACTION_MASK: u64 = (1 << F64_FRACTION_BITS) - 1;
const F64_EXPONENT_BIAS: i32 = 1023;
const EXTENDED_EXPONENT_BIAS: i32 = 16383;

/// Shift right by `shift`, rounding to nearest, ties to even
fn shift_round_even(value: u64, shift: u32) -> u64 {
    if shift == 0 {
        return value;
    }
    if shift >= 64 {
        return 0;
    }
    let kept = value >> shift;
    let rest = value & ((1u64 << shift) - 1);
    let half = 1u64 << (shift - 1);
    if rest > half || (rest == half && kept & 1 == 1) {
        kept + 1
    } else {
        kept
    }
}

fn split_f64(value: f64) -> (u64, i32, u64) {
    let bits = value.to_bits();
    let sign = bits >> 63;
    let exponent = ((bits >> F64_FRACTION_BITS) & 0x7ff) as i32;
    (sign, exponent, bits & F64_FRACTION_MASK)
}

fn f64_to_half_bits(value: f64) -> u16 {
    let (sign, exponent, fraction) = split_f64(value);
    let sign = (sign as u16) << 15;
    if exponent == 0x7ff {
        let nan_payload = if fraction != 0 { 0x200 } else { 0 };
        return sign | 0x7c00 | nan_payload;
    }
    if exponent == 0 {
        // doubles this small are zero in half precision
        return sign;
    }
    let biased = exponent - F64_EXPONENT_BIAS + 15;
    if biased >= 0x1f {
        return sign | 0x7c00;
    }
    if biased <= 0 {
        if biased < -10 {
            return sign;
        }
        let mantissa = fraction | (1 << F64_FRACTION_BITS);
        let shift = (42 + 1 - biased) as u32;
        return sign | shift_round_even(mantissa, shift) as u16;
    }
    // the rounding carry may ripple into the exponent, which is the right result
    let combined = ((biased as u64) << F64_FRACTION_BITS) | fraction;
    sign | shift_round_even(combined, 42).min(0x7c00) as u16
}

fn half_bits_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from((bits >> 10) & 0x1f);
    let fraction = f64::from(bits & 0x3ff);
    match exponent {
        0 => sign * fraction * 2f64.powi(-24),
        0x1f if fraction == 0.0 => sign * f64::INFINITY,
        0x1f => f64::NAN,
        _ => sign * (1.0 + fraction / 1024.0) * 2f64.powi(exponent - 15),
    }
}

/// Normalized (exponent, fraction) of a finite non-zero double, with the
/// exponent unbiased and the fraction left-aligned to 52 bits
fn normalize_f64(exponent: i32, fraction: u64) -> (i32, u64) {
    if exponent != 0 {
        return (exponent - F64_EXPONENT_BIAS, fraction);
    }
    let shift = fraction.leading_zeros() - 11;
    let normalized = (fraction << shift) & F64_FRACTION_MASK;
    (1 - F64_EXPONENT_BIAS - shift as i32, normalized)
}

fn f64_to_x87_bits(value: f64) -> u128 {
    let (sign, exponent, fraction) = split_f64(value);
    let sign = u128::from(sign) << 79;
    if exponent == 0 && fraction == 0 {
        return sign;
    }
    if exponent == 0x7ff {
        let mantissa = (1u64 << 63) | (fraction << 11);
        return sign | (0x7fffu128 << 64) | u128::from(mantissa);
    }
    let (unbiased, fraction) = normalize_f64(exponent, fraction);
    let biased = (unbiased + EXTENDED_EXPONENT_BIAS) as u128;
    let mantissa = (1u64 << 63) | (fraction << 11);
    sign | (biased << 64) | u128::from(mantissa)
}

fn f64_to_quad_bits(value: f64) -> u128 {
    let (sign, exponent, fraction) = split_f64(value);
    let sign = u128::from(sign) << 127;
    if exponent == 0 && fraction == 0 {
        return sign;
    }
    if exponent == 0x7ff {
        return sign | (0x7fffu128 << 112) | (u128::from(fraction) << 60);
    }
    let (unbiased, fraction) = normalize_f64(exponent, fraction);
    let biased = (unbiased + EXTENDED_EXPONENT_BIAS) as u128;
    sign | (biased << 112) | (u128::from(fraction) << 60)
}
