//! Shared strings table for XLSX workbooks.

use std::collections::HashMap;
use std::io::Write;

use crate::common::xml::XmlWriter;
use crate::ooxml::opc::constants::namespace;

/// Shared strings table.
///
/// Excel stores text cells as indices into one workbook-wide table. Cells
/// are streamed to disk as soon as they are added, so the table only grows;
/// it is written out once, when the workbook is saved.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
    string_to_index: HashMap<String, usize>,
    references: usize,
}

impl SharedStrings {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string and return its index.
    ///
    /// If the string already exists, returns the existing index.
    pub fn add_string(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&index) = self.string_to_index.get(s) {
            return index;
        }
        let index = self.strings.len();
        self.strings.push(s.to_string());
        self.string_to_index.insert(s.to_string(), index);
        index
    }

    /// Number of unique strings.
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Number of cells referring to the table.
    pub fn references(&self) -> usize {
        self.references
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Write the `sst` part.
    pub fn write_part<W: Write>(&self, w: &mut XmlWriter<W>) {
        w.open_tag("sst")
            .attribute("xmlns", namespace::SML_MAIN)
            .attribute("count", self.references)
            .attribute("uniqueCount", self.strings.len());
        for s in &self.strings {
            w.open_tag("si").open_tag("t");
            if needs_space_preserve(s) {
                w.attribute("xml:space", "preserve");
            }
            w.content(s.as_str()).close_tag_named("t").close_tag_named("si");
        }
        w.close_tag_named("sst");
    }
}

/// Leading or trailing whitespace is dropped by readers unless preserved.
fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}
