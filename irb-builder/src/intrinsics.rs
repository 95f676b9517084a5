//! LLVM intrinsics used by the convenience builder

use irb_model::{FunctionRef, FunctionType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    VaStart,
    VaEnd,
    /// `llvm.memcpy.p0i8.p0i8.i64(dest, src, len, align, volatile)`
    MemcpyP0i8P0i8I64,
}

impl Intrinsic {
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::VaStart => "llvm.va_start",
            Intrinsic::VaEnd => "llvm.va_end",
            Intrinsic::MemcpyP0i8P0i8I64 => "llvm.memcpy.p0i8.p0i8.i64",
        }
    }

    pub fn function_type(self) -> FunctionType {
        let byte_ptr = Type::pointer_to(Type::I8);
        match self {
            Intrinsic::VaStart | Intrinsic::VaEnd => FunctionType::new(Type::Void, vec![byte_ptr], false),
            Intrinsic::MemcpyP0i8P0i8I64 => FunctionType::new(
                Type::Void,
                vec![byte_ptr.clone(), byte_ptr, Type::I64, Type::I32, Type::I1],
                false,
            ),
        }
    }

    /// Callee reference; the module declares it when finished
    pub fn callable(self) -> FunctionRef {
        FunctionRef::new(self.name(), self.function_type())
    }
}
