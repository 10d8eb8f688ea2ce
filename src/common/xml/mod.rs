//! Streaming XML emission.
//!
//! Every part of a spreadsheet package is produced by one [`XmlWriter`] bound
//! to one output file. The writer never builds a document tree; memory use is
//! proportional to the nesting depth of the part, not to its size.

pub mod escape;
pub mod value;
pub mod writer;

pub use escape::{escape_xml, write_escaped};
pub use value::{DEFAULT_FLOAT_PRECISION, Utf16Text, XmlValue, format_float};
pub use writer::{Misuse, Strictness, WriterOptions, XML_PROLOG, XmlWriter};
