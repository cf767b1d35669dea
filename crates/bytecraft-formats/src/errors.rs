//! Error type for format handlers.

use std::path::PathBuf;

use bytecraft::errors::{ReadError, SchemaError, WriteError};
use thiserror::Error;

/// Errors raised while parsing a file with one of the format handlers.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Error from the schema engine
    #[error(transparent)]
    Engine(#[from] bytecraft::Error),

    /// Header values cannot describe a valid layout
    #[error("invalid {format} header: {reason}")]
    InvalidHeader { format: &'static str, reason: String },

    /// File could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FormatError {
    pub(crate) fn invalid_header(format: &'static str, reason: impl Into<String>) -> Self {
        FormatError::InvalidHeader {
            format,
            reason: reason.into(),
        }
    }
}

impl From<ReadError> for FormatError {
    fn from(value: ReadError) -> Self {
        FormatError::Engine(value.into())
    }
}

impl From<SchemaError> for FormatError {
    fn from(value: SchemaError) -> Self {
        FormatError::Engine(value.into())
    }
}

impl From<WriteError> for FormatError {
    fn from(value: WriteError) -> Self {
        FormatError::Engine(value.into())
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
