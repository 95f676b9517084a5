//! IR construction
//!
//! - `instruction` - [`InstructionBuilder`], one constructor per instruction kind
//!   plus the block API (lazy creation, random access, block insertion)
//! - `simple` - [`SimpleBuilder`], literal promotion and multi-instruction patterns
//! - `vararg` - x86-64 variable argument access on top of [`SimpleBuilder`]
//! - `module_builder` - [`ModuleBuilder`], assembling functions into a module

pub mod error;
pub mod instruction;
pub mod intrinsics;
pub mod module_builder;
pub mod simple;
pub mod vararg;

pub use error::BuildError;
pub use instruction::{encode_alignment, InstructionBuilder};
pub use intrinsics::Intrinsic;
pub use module_builder::{ModuleBuilder, X86_64_TARGET_TRIPLE};
pub use simple::{literal_to_constant, Literal, Operand, SimpleBuilder};
pub use vararg::{va_list_tag_type, va_list_type};

#[cfg(test)]
mod tests;
