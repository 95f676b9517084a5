//! Variable arguments for x86-64 System V
//!
//! A `va_list` is `[1 x %struct.__va_list_tag]`, where the tag holds the
//! offsets of the next general purpose and floating point register in the
//! register save area, a pointer to the overflow (stack) area and a pointer
//! to the register save area.

use irb_model::{BinaryOperator, CastOperator, CompareOperator, Constant, FloatKind, StructType, Type, Value};
use log::debug;
use crate::intrinsics::Intrinsic;
use crate::{BuildError, SimpleBuilder};

/// Field indices of `%struct.__va_list_tag`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VaListField {
    GpOffset = 0,
    FpOffset = 1,
    OverflowArgArea = 2,
    RegSaveArea = 3,
}

impl VaListField {
    fn index(self) -> Value {
        Value::from(Constant::i32(self as i64))
    }
}

/// Bytes of general purpose registers in the register save area
const GP_REGISTER_LIMIT: i64 = 40;
/// End of the floating point registers in the register save area
const FP_REGISTER_LIMIT: i64 = 160;
const GP_REGISTER_STEP: i64 = 8;
const FP_REGISTER_STEP: i64 = 16;
const STACK_SLOT_STEP: i64 = 8;

/// `%struct.__va_list_tag = type { i32, i32, i8*, i8* }`
pub fn va_list_tag_type() -> Type {
    let byte_ptr = Type::pointer_to(Type::I8);
    Type::Struct(StructType::named(
        "struct.__va_list_tag",
        vec![Type::I32, Type::I32, byte_ptr.clone(), byte_ptr],
    ))
}

/// `[1 x %struct.__va_list_tag]`, the type to allocate for a `va_list`
pub fn va_list_type() -> Type {
    Type::array_of(1, va_list_tag_type())
}

fn zero() -> Value {
    Value::from(Constant::i32(0))
}

impl SimpleBuilder<'_> {
    /// `&list[0]` as a `%struct.__va_list_tag*`
    fn va_list_tag(&mut self, list: &Value) -> Result<Value, BuildError> {
        self.builder.build_get_element_pointer(list, &[zero(), zero()], true)
    }

    fn va_list_field(&mut self, tag: &Value, field: VaListField) -> Result<Value, BuildError> {
        self.builder.build_get_element_pointer(tag, &[zero(), field.index()], true)
    }

    fn call_va_intrinsic(&mut self, intrinsic: Intrinsic, list: &Value) -> Result<(), BuildError> {
        let tag = self.va_list_tag(list)?;
        let bytes = self.cast(CastOperator::BitCast, Type::pointer_to(Type::I8), &tag)?;
        self.call(&Value::from(intrinsic.callable()), &[bytes])?;
        Ok(())
    }

    /// `llvm.va_start` on an allocated `va_list`
    pub fn va_start(&mut self, list: &Value) -> Result<(), BuildError> {
        self.call_va_intrinsic(Intrinsic::VaStart, list)
    }

    /// `llvm.va_end` on an allocated `va_list`
    pub fn va_end(&mut self, list: &Value) -> Result<(), BuildError> {
        self.call_va_intrinsic(Intrinsic::VaEnd, list)
    }

    /// Fetch the next variable argument of type `ty`.
    ///
    /// Inserts three blocks after the current one: the register path, the
    /// stack path and the join block, which becomes the current block.
    /// Branches built earlier that jump past the current block by position
    /// must account for the inserted blocks; block handles stay valid.
    ///
    /// `x86_fp80` is passed in memory, not in the register save area, and is
    /// rejected.
    pub fn va_arg(&mut self, list: &Value, ty: Type) -> Result<Value, BuildError> {
        let (offset_field, limit, step) = if ty.is_integer() || ty.is_pointer() {
            (VaListField::GpOffset, GP_REGISTER_LIMIT, GP_REGISTER_STEP)
        } else if ty == Type::Float(FloatKind::X86Fp80) {
            return Err(BuildError::UnsupportedVaArgType { ty });
        } else if ty.is_floating_point() {
            (VaListField::FpOffset, FP_REGISTER_LIMIT, FP_REGISTER_STEP)
        } else {
            return Err(BuildError::UnsupportedVaArgType { ty });
        };

        let blocks = self.builder.insert_blocks(3);
        let (register_block, stack_block, join_block) = (blocks[0], blocks[1], blocks[2]);
        debug!("va_arg {ty}: register/stack/join blocks inserted after block {}",
            self.builder.block_index(self.current_block()));

        // is a register left?
        let tag = self.va_list_tag(list)?;
        let offset_ptr = self.va_list_field(&tag, offset_field)?;
        let offset = self.load(&offset_ptr)?;
        let in_registers = self.compare(CompareOperator::IntUnsignedLessOrEqual, &offset, limit)?;
        self.conditional_branch(&in_registers, register_block, stack_block)?;

        // address in the register save area
        let entered = self.next_block();
        debug_assert_eq!(entered, register_block);
        let save_area_ptr = self.va_list_field(&tag, VaListField::RegSaveArea)?;
        let save_area = self.load(&save_area_ptr)?;
        let slot = self.builder.build_get_element_pointer(&save_area, &[offset.clone()], false)?;
        let register_arg = self.cast(CastOperator::BitCast, Type::pointer_to(ty.clone()), &slot)?;
        let next_offset = self.binary_operator(BinaryOperator::Add, &offset, step)?;
        let offset_align = self.builder.data_layout().alignment_of(&Type::I32);
        self.store(&offset_ptr, &next_offset, offset_align)?;
        self.branch(join_block);

        // address in the overflow area
        let entered = self.next_block();
        debug_assert_eq!(entered, stack_block);
        let overflow_ptr = self.va_list_field(&tag, VaListField::OverflowArgArea)?;
        let overflow = self.load(&overflow_ptr)?;
        let stack_arg = self.cast(CastOperator::BitCast, Type::pointer_to(ty.clone()), &overflow)?;
        let next_slot = self.builder.build_get_element_pointer(
            &overflow,
            &[Value::from(Constant::i32(STACK_SLOT_STEP))],
            false,
        )?;
        let pointer_align = self.builder.data_layout().alignment_of(&next_slot.ty());
        self.store(&overflow_ptr, &next_slot, pointer_align)?;
        self.branch(join_block);

        let entered = self.next_block();
        debug_assert_eq!(entered, join_block);
        let address = self.builder.build_phi(
            Type::pointer_to(ty),
            &[(register_arg, register_block), (stack_arg, stack_block)],
        )?;
        self.load(&address)
    }

    /// Fetch an aggregate that is always passed on the stack: copy it out of
    /// the overflow area into a fresh stack allocation and return a pointer
    /// to the copy
    pub fn va_arg_stack_only(&mut self, list: &Value, ty: Type) -> Result<Value, BuildError> {
        if !matches!(ty, Type::Array { .. } | Type::Struct(_) | Type::Vector { .. }) {
            return Err(BuildError::UnsupportedVaArgType { ty });
        }
        let byte_ptr = Type::pointer_to(Type::I8);
        let size = self.builder.data_layout().size_of(&ty) as i64;

        let tag = self.va_list_tag(list)?;
        let overflow_ptr = self.va_list_field(&tag, VaListField::OverflowArgArea)?;
        let overflow = self.load(&overflow_ptr)?;
        let source = self.cast(CastOperator::BitCast, Type::pointer_to(ty.clone()), &overflow)?;
        let next_slot = self.builder.build_get_element_pointer(&overflow, &[Value::from(Constant::i32(size))], false)?;
        let pointer_align = self.builder.data_layout().alignment_of(&byte_ptr);
        self.store(&overflow_ptr, &next_slot, pointer_align)?;

        let copy = self.allocate(ty)?;
        let copy_bytes = self.cast(CastOperator::BitCast, byte_ptr.clone(), &copy)?;
        let source_bytes = self.cast(CastOperator::BitCast, byte_ptr, &source)?;
        self.call(
            &Value::from(Intrinsic::MemcpyP0i8P0i8I64.callable()),
            &[
                copy_bytes,
                source_bytes,
                Value::from(Constant::i64(size)),
                Value::from(Constant::i32(4)),
                Value::from(Constant::i1(false)),
            ],
        )?;
        Ok(copy)
    }
}
