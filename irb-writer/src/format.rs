//! Text of identifiers, constants and operands

use irb_model::{Constant, FloatConstant, FloatKind, Type, Value};
use crate::{DialectVersion, WriteError};

/// `%name` or `@name`, quoted when the name is not a plain identifier
pub fn identifier(sigil: char, name: &str) -> String {
    let plain = !name.is_empty()
        && (name.bytes().all(|b| b.is_ascii_digit())
            || (!name.as_bytes()[0].is_ascii_digit()
                && name.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'$' | b'.' | b'_'))));
    if plain {
        format!("{sigil}{name}")
    } else {
        format!("{sigil}\"{}\"", escape_string(name))
    }
}

pub fn local(name: &str) -> String {
    identifier('%', name)
}

pub fn global(name: &str) -> String {
    identifier('@', name)
}

/// Escape quotes, backslashes and non-printable bytes as `\XX`
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b == b'"' || b == b'\\' || !(0x20..0x7f).contains(&b) {
            out.push_str(&format!("\\{b:02X}"));
        } else {
            out.push(char::from(b));
        }
    }
    out
}

/// Hexadecimal float literal in the notation of the constant's kind
pub fn float_literal(constant: &FloatConstant) -> String {
    match constant.kind {
        FloatKind::Half => format!("0xH{:04X}", constant.bits as u16),
        FloatKind::Float => {
            let widened = f64::from(f32::from_bits(constant.bits as u32));
            format!("0x{:016X}", widened.to_bits())
        }
        FloatKind::Double => format!("0x{:016X}", constant.bits as u64),
        FloatKind::X86Fp80 => format!("0xK{:020X}", constant.bits & ((1u128 << 80) - 1)),
        FloatKind::Fp128 => {
            let low = constant.bits as u64;
            let high = (constant.bits >> 64) as u64;
            format!("0xL{low:016X}{high:016X}")
        }
    }
}

/// Constant in operand position, without its type
pub fn constant(c: &Constant, version: DialectVersion) -> Result<String, WriteError> {
    let text = match c {
        Constant::Integer { ty: Type::Integer(1), value } => (*value != 0).to_string(),
        Constant::Integer { value, .. } => value.to_string(),
        Constant::BigInteger { value, .. } => value.to_string(),
        Constant::Float(fc) => float_literal(fc),
        Constant::Null(_) => "null".to_string(),
        Constant::Undef(_) => "undef".to_string(),
        Constant::ZeroInitializer(_) => "zeroinitializer".to_string(),
        Constant::Aggregate { ty, elements } => {
            let (open, close) = match ty {
                Type::Array { .. } => ("[", "]"),
                Type::Vector { .. } => ("<", ">"),
                Type::Struct(st) if st.packed => ("<{ ", " }>"),
                Type::Struct(_) => ("{ ", " }"),
                other => return Err(WriteError::not_implemented(format!("aggregate constant of type {other}"))),
            };
            let items = elements
                .iter()
                .map(|element| typed_constant(element, version))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{open}{}{close}", items.join(", "))
        }
        Constant::InlineAsm(asm) => {
            let mut text = "asm ".to_string();
            if asm.has_side_effects {
                text.push_str("sideeffect ");
            }
            if asm.align_stack {
                text.push_str("alignstack ");
            }
            text.push_str(&format!("\"{}\", \"{}\"", escape_string(&asm.asm), escape_string(&asm.constraints)));
            text
        }
        Constant::GetElementPointer { base, indices, inbounds, .. } => {
            let base_type = base.ty();
            let mut text = "getelementptr".to_string();
            if *inbounds {
                text.push_str(" inbounds");
            }
            text.push_str(" (");
            if version.explicit_pointee_types() {
                match base_type.pointee() {
                    Some(pointee) => text.push_str(&format!("{pointee}, ")),
                    None => return Err(WriteError::not_implemented(format!("getelementptr on {base_type}"))),
                }
            }
            text.push_str(&typed_constant(base, version)?);
            for index in indices {
                text.push_str(", ");
                text.push_str(&typed_constant(index, version)?);
            }
            text.push(')');
            text
        }
        Constant::Global(g) => global(&g.name),
    };
    Ok(text)
}

pub fn typed_constant(c: &Constant, version: DialectVersion) -> Result<String, WriteError> {
    Ok(format!("{} {}", c.ty(), constant(c, version)?))
}

/// Type of a value in operand position; functions are used through a pointer
pub fn operand_type(value: &Value) -> Type {
    match value {
        Value::Function(_) => Type::pointer_to(value.ty()),
        _ => value.ty(),
    }
}

/// Value in operand position, without its type
pub fn value(v: &Value, version: DialectVersion) -> Result<String, WriteError> {
    match v {
        Value::Constant(c) => constant(c, version),
        Value::Instruction(inst) => Ok(local(&inst.name)),
        Value::Parameter(param) => Ok(local(&param.name)),
        Value::Function(func) => Ok(global(&func.name)),
    }
}

pub fn typed_value(v: &Value, version: DialectVersion) -> Result<String, WriteError> {
    Ok(format!("{} {}", operand_type(v), value(v, version)?))
}
