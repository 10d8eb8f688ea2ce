//! Error types for Longan.
//!
//! Only resource failures are errors. Calling the XML writer out of sequence
//! is reported through [`crate::common::xml::Misuse`] instead.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error, including failure to open an output part
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer whose output sink is gone was asked for it
    #[error("XML writer unusable: {0}")]
    WriterUnusable(String),

    /// Part name that cannot be mapped inside a package
    #[error("Invalid part name: {0}")]
    InvalidPartName(String),

    /// Worksheet name rejected by spreadsheet applications
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Worksheet name already used in the workbook
    #[error("Duplicate sheet name: {0}")]
    DuplicateSheetName(String),

    /// Worksheet name that is not in the workbook
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// Defined name that is malformed or already defined in its scope
    #[error("Invalid defined name: {0}")]
    InvalidDefinedName(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
