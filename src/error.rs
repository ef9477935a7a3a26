//! Error types for docxfmt.

use std::io;
use thiserror::Error;

/// Result type alias for docxfmt operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input package or writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file is not a readable DOCX package.
    #[error("invalid DOCX package: {0}")]
    InvalidPackage(String),

    /// Malformed XML inside a package part.
    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },

    /// A custom preset file could not be parsed or failed validation.
    #[error("invalid preset: {0}")]
    Preset(String),
}

impl Error {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        Error::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}
