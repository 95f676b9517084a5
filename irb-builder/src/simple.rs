//! Convenience builder
//!
//! Wraps an [`InstructionBuilder`] and accepts Rust literals wherever an
//! operand's type can be taken from the other operand or from the
//! instruction itself. Also builds the multi-instruction patterns
//! (vector compare, vector fill, return with cast).

use std::fmt;
use irb_common::BlockRef;
use irb_model::constants::big_integer_low_bits;
use irb_model::{
    BinaryOperator, CastOperator, CompareOperator, Constant, DataLayout, FunctionDefinition, Type, Value,
};
use num_bigint::BigInt;
use crate::{BuildError, InstructionBuilder};

/// Untyped literal operand
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    BigInt(BigInt),
    Float(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::BigInt(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Operand of a convenience builder call: a typed value or a literal
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Literal(Literal),
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<&Value> for Operand {
    fn from(value: &Value) -> Self {
        Operand::Value(value.clone())
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Operand::Value(Value::Constant(constant))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Literal(Literal::Bool(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Literal(Literal::Int(i64::from(value)))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(Literal::Int(value))
    }
}

impl From<BigInt> for Operand {
    fn from(value: BigInt) -> Self {
        Operand::Literal(Literal::BigInt(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Literal(Literal::Float(value))
    }
}

/// Convert a literal into a constant of type `ty`.
///
/// Integers are truncated or sign-extended into the target width; integer
/// types wider than 64 bits keep the literal's full precision. Floating
/// point targets get the bit pattern of their own width.
pub fn literal_to_constant(ty: &Type, literal: &Literal) -> Result<Constant, BuildError> {
    match ty {
        Type::Integer(_) if ty.is_big_integer() => {
            let value = match literal {
                Literal::Bool(b) => BigInt::from(u8::from(*b)),
                Literal::Int(v) => BigInt::from(*v),
                Literal::BigInt(v) => v.clone(),
                Literal::Float(_) => return Err(literal_target(ty, literal)),
            };
            Ok(Constant::big_integer(ty.clone(), value))
        }
        Type::Integer(_) => {
            let value = match literal {
                Literal::Bool(b) => i64::from(*b),
                Literal::Int(v) => *v,
                Literal::BigInt(v) => big_integer_low_bits(v),
                Literal::Float(_) => return Err(literal_target(ty, literal)),
            };
            Ok(Constant::integer(ty.clone(), value))
        }
        Type::Float(kind) => {
            let value = match literal {
                Literal::Bool(b) => if *b { 1.0 } else { 0.0 },
                Literal::Int(v) => *v as f64,
                Literal::BigInt(v) => big_integer_low_bits(v) as f64,
                Literal::Float(v) => *v,
            };
            Ok(Constant::float(*kind, value))
        }
        _ => Err(literal_target(ty, literal)),
    }
}

fn literal_target(ty: &Type, literal: &Literal) -> BuildError {
    BuildError::LiteralTarget {
        literal: literal.to_string(),
        ty: ty.clone(),
    }
}

/// Resolve an operand against the type it has to have
pub fn operand_to_value(ty: &Type, operand: Operand) -> Result<Value, BuildError> {
    match operand {
        Operand::Value(value) => Ok(value),
        Operand::Literal(literal) => literal_to_constant(ty, &literal).map(Value::Constant),
    }
}

/// Resolve two operands of a binary instruction; a literal takes the type of
/// the other operand
fn resolve_pair(operation: &'static str, lhs: Operand, rhs: Operand) -> Result<(Value, Value), BuildError> {
    match (lhs, rhs) {
        (Operand::Value(lhs), Operand::Value(rhs)) => Ok((lhs, rhs)),
        (Operand::Literal(lhs), Operand::Value(rhs)) => Ok((Value::Constant(literal_to_constant(&rhs.ty(), &lhs)?), rhs)),
        (Operand::Value(lhs), Operand::Literal(rhs)) => {
            let rhs = literal_to_constant(&lhs.ty(), &rhs)?;
            Ok((lhs, Value::Constant(rhs)))
        }
        (Operand::Literal(_), Operand::Literal(_)) => Err(BuildError::UntypedOperands { operation }),
    }
}

/// Literal-accepting builder on top of [`InstructionBuilder`]
pub struct SimpleBuilder<'f> {
    pub(crate) builder: InstructionBuilder<'f>,
}

impl<'f> SimpleBuilder<'f> {
    pub fn new(function: &'f mut FunctionDefinition) -> Self {
        Self::from_builder(InstructionBuilder::new(function))
    }

    pub fn with_data_layout(function: &'f mut FunctionDefinition, layout: &'f DataLayout) -> Self {
        Self::from_builder(InstructionBuilder::with_data_layout(function, layout))
    }

    pub fn from_builder(builder: InstructionBuilder<'f>) -> Self {
        Self { builder }
    }

    /// The underlying instruction builder, for instructions without a
    /// convenience wrapper
    pub fn instruction_builder(&mut self) -> &mut InstructionBuilder<'f> {
        &mut self.builder
    }

    pub fn function(&self) -> &FunctionDefinition {
        self.builder.function()
    }

    pub fn exit_function(self) {
        self.builder.exit_function();
    }

    /// Create the next declared parameter of the function
    pub fn next_parameter(&mut self) -> Result<Value, BuildError> {
        let function = self.builder.function();
        let index = self.builder.arg_counter() - 1;
        match function.ty.param_types.get(index) {
            Some(ty) => {
                let ty = ty.clone();
                Ok(self.builder.create_parameter(ty))
            }
            None => Err(BuildError::NoMoreParameters {
                function: function.name.clone(),
                declared: function.ty.param_types.len(),
            }),
        }
    }

    pub fn allocate(&mut self, ty: Type) -> Result<Value, BuildError> {
        self.builder.build_allocate(ty)
    }

    pub fn load(&mut self, source: &Value) -> Result<Value, BuildError> {
        self.builder.build_load(source)
    }

    /// Store `value` through `destination`; a literal takes the pointee type
    pub fn store(&mut self, destination: &Value, value: impl Into<Operand>, align: u64) -> Result<(), BuildError> {
        let pointee = match destination.ty() {
            Type::Pointer(pointee) => *pointee,
            found => return Err(BuildError::NotAPointer { operation: "store", found }),
        };
        let value = operand_to_value(&pointee, value.into())?;
        self.builder.build_store(destination, &value, align)
    }

    pub fn binary_operator(
        &mut self,
        operator: BinaryOperator,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Result<Value, BuildError> {
        let (lhs, rhs) = resolve_pair("binary operation", lhs.into(), rhs.into())?;
        self.builder.build_binary(operator, &lhs, &rhs)
    }

    pub fn compare(
        &mut self,
        operator: CompareOperator,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Result<Value, BuildError> {
        let (lhs, rhs) = resolve_pair("compare", lhs.into(), rhs.into())?;
        self.builder.build_compare(operator, &lhs, &rhs)
    }

    /// Compare two vectors and reduce the lanes to a single `i1`.
    ///
    /// Inequality predicates are folded with `or`, every other predicate
    /// with `and`, lane by lane in ascending order.
    pub fn compare_vector(
        &mut self,
        operator: CompareOperator,
        lhs: impl Into<Operand>,
        rhs: impl Into<Operand>,
    ) -> Result<Value, BuildError> {
        let lanes = self.compare(operator, lhs, rhs)?;
        let count = match lanes.ty() {
            Type::Vector { len, .. } => len,
            found => return Err(BuildError::NotAVector { operation: "vector compare", found }),
        };
        let fold = if operator.is_inequality() {
            BinaryOperator::Or
        } else {
            BinaryOperator::And
        };

        let mut result = self.extract_element(&lanes, 0)?;
        for lane in 1..count {
            let element = self.extract_element(&lanes, lane)?;
            result = self.binary_operator(fold, result, element)?;
        }
        Ok(result)
    }

    pub fn call(&mut self, target: &Value, arguments: &[Value]) -> Result<Option<Value>, BuildError> {
        self.builder.build_call(target, arguments)
    }

    pub fn cast(&mut self, operator: CastOperator, ty: Type, value: &Value) -> Result<Value, BuildError> {
        self.builder.build_cast(operator, ty, value)
    }

    pub fn extract_element(&mut self, vector: &Value, index: u32) -> Result<Value, BuildError> {
        self.builder.build_extract_element(vector, index)
    }

    /// Insert `value` at `index`; a literal takes the vector's element type
    pub fn insert_element(&mut self, vector: &Value, value: impl Into<Operand>, index: u32) -> Result<Value, BuildError> {
        let element = match vector.ty() {
            Type::Vector { element_type, .. } => *element_type,
            found => return Err(BuildError::NotAVector { operation: "insertelement", found }),
        };
        let value = operand_to_value(&element, value.into())?;
        self.builder.build_insert_element(vector, &value, index)
    }

    /// Load a vector from `source` and insert `values` into lanes 0, 1, ...
    pub fn fill_vector<I, O>(&mut self, source: &Value, values: I) -> Result<Value, BuildError>
    where
        I: IntoIterator<Item = O>,
        O: Into<Operand>,
    {
        let mut vector = self.load(source)?;
        for (lane, value) in (0u32..).zip(values) {
            vector = self.insert_element(&vector, value, lane)?;
        }
        Ok(vector)
    }

    // Blocks and control flow

    pub fn current_block(&self) -> BlockRef {
        self.builder.current_block()
    }

    pub fn next_block(&mut self) -> BlockRef {
        self.builder.next_block()
    }

    pub fn get_next_block(&mut self) -> BlockRef {
        self.builder.get_next_block()
    }

    pub fn get_block(&mut self, index: usize) -> BlockRef {
        self.builder.get_block(index)
    }

    pub fn branch(&mut self, target: BlockRef) {
        self.builder.build_branch(target);
    }

    pub fn conditional_branch(&mut self, condition: &Value, if_block: BlockRef, else_block: BlockRef) -> Result<(), BuildError> {
        self.builder.build_cond_branch(condition, if_block, else_block)
    }

    /// Return `value`; a literal takes the function's return type
    pub fn return_value(&mut self, value: impl Into<Operand>) -> Result<(), BuildError> {
        let expected = self.function().return_type().clone();
        let value = operand_to_value(&expected, value.into())?;
        if value.ty() != expected {
            return Err(BuildError::TypeMismatch {
                operation: "ret",
                expected,
                found: value.ty(),
            });
        }
        self.builder.build_return(&value);
        Ok(())
    }

    pub fn return_void(&mut self) {
        self.builder.build_return_void();
    }

    /// Return `value` converted to the function's return type: integers are
    /// zero-extended or truncated, pointers and integers convert with
    /// `ptrtoint` / `inttoptr`, pointers and other values of the same size are
    /// bitcast
    pub fn return_with_cast(&mut self, value: &Value) -> Result<(), BuildError> {
        let target = self.function().return_type().clone();
        let source = value.ty();
        if source == target {
            self.builder.build_return(value);
            return Ok(());
        }

        let operator = match (source.integer_width(), target.integer_width()) {
            (Some(from), Some(to)) if from < to => CastOperator::ZExt,
            (Some(_), Some(_)) => CastOperator::Trunc,
            _ if source.is_pointer() && target.is_integer() => CastOperator::PtrToInt,
            _ if source.is_integer() && target.is_pointer() => CastOperator::IntToPtr,
            _ if source.is_pointer() && target.is_pointer() => CastOperator::BitCast,
            _ if source.is_pointer() || target.is_pointer() => {
                return Err(BuildError::UnsupportedCast {
                    operator: "cast",
                    from: source,
                    to: target,
                });
            }
            _ => {
                let layout = self.builder.data_layout();
                let same_size = layout.size_of(&source) == layout.size_of(&target) && layout.size_of(&target) > 0;
                if !same_size {
                    return Err(BuildError::UnsupportedCast {
                        operator: "bitcast",
                        from: source,
                        to: target,
                    });
                }
                CastOperator::BitCast
            }
        };
        let cast = self.builder.build_cast(operator, target, value)?;
        self.builder.build_return(&cast);
        Ok(())
    }
}
