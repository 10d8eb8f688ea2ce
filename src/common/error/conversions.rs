//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert errors of the
//! packaging dependencies to the unified Error type.

#[cfg(feature = "xlsx")]
use super::types::Error;

#[cfg(feature = "xlsx")]
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Zip(other.to_string()),
        }
    }
}
