//! Longan - A Rust library for streaming XML and spreadsheet packages
//!
//! This library writes XML documents in one forward pass, with no document
//! tree in memory, and builds Office Open XML spreadsheet packages on top of
//! that writer.
//!
//! # Features
//!
//! - **Streaming XML writer**: Start-tags, attributes, text and end-tags are
//!   emitted as they are requested; only the stack of open element names is
//!   kept
//! - **Self-closing elements**: Elements closed with nothing inside them are
//!   written as `<name/>`
//! - **Light tags**: Attribute-only leaf elements that bypass the stack
//! - **Locale-invariant numbers**: Floats use `.` and a settable number of
//!   significant digits, whatever the process locale
//! - **Misuse detection**: Out-of-sequence calls panic in debug builds and
//!   are logged and repaired in release builds
//! - **XLSX packages**: Workbooks whose worksheets are streamed row by row,
//!   with cell styles, date cells and defined names (feature `xlsx`,
//!   enabled by default)
//!
//! # Example - Writing XML
//!
//! ```
//! use longan::common::xml::XmlWriter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut w = XmlWriter::new(Vec::new());
//! w.open_tag("Relationships").attribute("xmlns", "urn:example");
//! w.open_light_tag("Relationship")
//!     .attribute("Id", "rId1")
//!     .attribute("Target", "a&b.xml")
//!     .close_light_tag();
//! w.open_tag("Empty").close_tag();
//! w.tag_only_content("Count", 2.5);
//! w.close_tag_named("Relationships");
//!
//! let xml = String::from_utf8(w.finish()?)?;
//! assert!(xml.ends_with(
//!     "<Relationships xmlns=\"urn:example\"><Relationship Id=\"rId1\" Target=\"a&amp;b.xml\"/>\
//!      <Empty/><Count>2.5</Count></Relationships>"
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing a spreadsheet
//!
//! ```no_run
//! use longan::ooxml::xlsx::{CellValue, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut book = Workbook::new()?;
//! let mut sheet = book.add_worksheet("Measurements")?;
//! sheet.add_row(&["sensor".into(), "reading".into()]);
//! for i in 0..1000 {
//!     sheet.add_row(&[CellValue::Integer(i), CellValue::Number(i as f64 * 0.1)]);
//! }
//! book.save("measurements.xlsx")?;
//! # Ok(())
//! # }
//! ```

/// Building blocks shared by every output format
///
/// This module contains the crate error type and the streaming XML writer
/// with its escaping and value-rendering rules.
pub mod common;

/// OOXML (Office Open XML) package writer
///
/// This module provides the OPC tables and packaging helpers, and the
/// spreadsheet (.xlsx) emitter built on them.
pub mod ooxml;

// Re-export commonly used types for convenience
pub use common::xml::{Misuse, Strictness, WriterOptions, XmlValue, XmlWriter};
pub use common::{Error, Result};
