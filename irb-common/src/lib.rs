//! LLVM IR Builder - Common Types and Errors
//! 
//! This crate contains the identifiers and the top-level error type shared
//! by the model, builder, writer and generator crates.

pub mod error;
pub mod types;

pub use error::IrbError;
pub use types::*;
