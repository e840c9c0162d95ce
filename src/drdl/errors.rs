//! # DRDL I/O Error Types
//!
//! Errors raised while reading, parsing, serializing or writing DRDL documents.
//! None of these are recoverable: a run that hits one writes no output.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DrdlError {
    #[error("Failed to read DRDL file '{path}': {error}")]
    ReadError { path: String, error: String },
    #[error("Failed to parse DRDL file '{path}': {error}")]
    ParseError { path: String, error: String },
    #[error("Failed to serialize DRDL document: {error}")]
    SerializeError { error: String },
    #[error("Failed to write DRDL file '{path}': {error}")]
    WriteError { path: String, error: String },
}

impl DrdlError {
    /// Create a parse error for content that did not come from a file
    ///
    /// # Example
    /// ```ignore
    /// DrdlError::inline_parse_error("expected a `schema` key")
    /// ```
    pub fn inline_parse_error(error: impl Into<String>) -> Self {
        DrdlError::ParseError {
            path: "<inline>".to_string(),
            error: error.into(),
        }
    }
}
