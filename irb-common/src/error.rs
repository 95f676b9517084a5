//! Error handling for the IR builder
//! 
//! Precondition violations inside the builder panic; everything that a
//! caller can reasonably hit from the outside (a malformed data layout, an
//! output file that cannot be created, a rejected build or write request)
//! ends up in [`IrbError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type shared by all IR builder crates
#[derive(Error, Debug)]
pub enum IrbError {
    #[error("could not open output '{}': {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data layout token '{token}': {message}")]
    DataLayout {
        token: String,
        message: String,
    },

    #[error("build error: {message}")]
    Build { message: String },

    #[error("write error: {message}")]
    Write { message: String },
}

impl IrbError {
    /// Create an output error for the given target path
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IrbError::Output {
            path: path.into(),
            source,
        }
    }

    /// Create a data layout error
    pub fn data_layout(token: &str, message: impl Into<String>) -> Self {
        IrbError::DataLayout {
            token: token.to_string(),
            message: message.into(),
        }
    }
}
