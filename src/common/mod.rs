//! Common types and utilities shared across the crate.
//!
//! This module provides the error type and the streaming XML layer that
//! every package part is written with.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
