//! LLVM assembly writer
//!
//! Prints an `irb_model::Module` as textual LLVM IR in the 3.2 or 3.8
//! dialect.
//!
//! - `version` - [`DialectVersion`] and its environment override
//! - `format` - identifiers, constants and typed operands
//! - `instructions` - one line per instruction
//! - `writer` - [`IrWriter`] for modules and functions, file output

pub mod error;
pub mod format;
mod instructions;
pub mod version;
mod writer;

pub use error::WriteError;
pub use version::{DialectVersion, VERSION_ENV_VAR};
pub use writer::{write_module_to_file, write_module_to_string, IrWriter};
