//! Streaming workbook writer components for XLSX.

pub mod names;
pub mod parts;
pub mod sheet;
pub mod strings;
pub mod styles;
pub mod workbook;

// Re-export main types
pub use sheet::{ColumnWidth, FreezePanes, SheetOptions, Worksheet, WorksheetMut};
pub use names::{DefinedName, NameEntry, NameTarget};
pub use strings::SharedStrings;
pub use styles::Stylesheet;
pub use workbook::{Workbook, WorkbookOptions, validate_sheet_name};
