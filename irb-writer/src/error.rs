//! Writer error types

use irb_common::{IrbError, SymbolIndex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cannot print {what}: not implemented")]
    NotImplemented { what: String },

    #[error("function '{function}' has no symbol {index}")]
    UnknownSymbol { function: String, index: SymbolIndex },
}

impl WriteError {
    pub fn not_implemented(what: impl Into<String>) -> Self {
        WriteError::NotImplemented { what: what.into() }
    }
}

impl From<WriteError> for IrbError {
    fn from(err: WriteError) -> Self {
        IrbError::Write {
            message: err.to_string(),
        }
    }
}
