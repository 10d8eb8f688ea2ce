//! Office Open XML (OOXML) package writing.
//!
//! The module is organized into two layers:
//!
//! 1. **OPC Layer** (`opc`): namespace and content type tables, part
//!    staging and ZIP packaging
//! 2. **Format-Specific Modules**:
//!    - `xlsx`: Excel spreadsheets
pub mod opc;

#[cfg(feature = "xlsx")]
pub mod xlsx;
