//! Workbook assembly.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use super::names::{DefinedName, NameEntry};
use super::parts::{self, PartSummary};
use super::sheet::{SheetOptions, Worksheet, WorksheetMut};
use super::strings::SharedStrings;
use super::styles::Stylesheet;
use crate::common::error::{Error, Result};
use crate::common::xml::{WriterOptions, XmlWriter};
use crate::ooxml::opc::{PackageWriter, PathManager};
use crate::ooxml::xlsx::format::{CellStyle, StyleId};

/// Longest sheet name spreadsheet applications accept.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters not allowed in sheet names.
pub const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Parts written at save time, registered up front so they lead the package.
const FIXED_PARTS: [&str; 7] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "docProps/app.xml",
    "docProps/core.xml",
    "xl/workbook.xml",
    "xl/_rels/workbook.xml.rels",
    "xl/styles.xml",
];

/// Workbook configuration.
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    /// Written as creator and last editor in the document properties.
    pub author: String,
    /// Staging directory for parts; a fresh temporary directory if `None`.
    pub temp_dir: Option<PathBuf>,
    /// Options of every part writer.
    pub writer: WriterOptions,
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        Self {
            author: "longan".to_string(),
            temp_dir: None,
            writer: WriterOptions::default(),
        }
    }
}

/// A workbook whose worksheets are streamed to disk as they are filled.
///
/// # Example
///
/// ```no_run
/// use longan::ooxml::xlsx::{CellStyle, CellValue, NumberFormat, Workbook};
///
/// let mut book = Workbook::new()?;
/// let fixed = book.add_style(&CellStyle::with_number_format(NumberFormat::Number {
///     decimals: 3,
///     thousands: false,
/// }));
/// book.add_worksheet("Data")?
///     .add_row(&["name".into(), "value".into()])
///     .add_styled_row(&[
///         CellValue::from("pi").into(),
///         CellValue::Number(std::f64::consts::PI).with_style(fixed),
///     ]);
/// book.save("data.xlsx")?;
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug)]
pub struct Workbook {
    options: WorkbookOptions,
    // Declared before `parts` so the sheet writers are dropped before
    // the staging directory is removed.
    sheets: Vec<Worksheet>,
    strings: SharedStrings,
    styles: Stylesheet,
    active_sheet: usize,
    defined_names: Vec<NameEntry>,
    parts: PathManager,
}

impl Workbook {
    /// Create an empty workbook staged in a temporary directory.
    pub fn new() -> Result<Self> {
        Self::with_options(WorkbookOptions::default())
    }

    /// Create an empty workbook.
    pub fn with_options(options: WorkbookOptions) -> Result<Self> {
        let mut parts = match &options.temp_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                PathManager::new(dir)
            },
            None => PathManager::in_temp_dir()?,
        };
        for part in FIXED_PARTS {
            parts.register_xml(part)?;
        }
        Ok(Self {
            options,
            sheets: Vec::new(),
            strings: SharedStrings::new(),
            styles: Stylesheet::new(),
            active_sheet: 0,
            defined_names: Vec::new(),
            parts,
        })
    }

    /// Add a worksheet with default layout.
    pub fn add_worksheet(&mut self, name: &str) -> Result<WorksheetMut<'_>> {
        self.add_worksheet_with(name, SheetOptions::default())
    }

    /// Add a worksheet whose header uses `options`.
    pub fn add_worksheet_with(
        &mut self,
        name: &str,
        options: SheetOptions,
    ) -> Result<WorksheetMut<'_>> {
        validate_sheet_name(name)?;
        let folded = name.to_lowercase();
        if self.sheets.iter().any(|s| s.name().to_lowercase() == folded) {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }

        let index = self.sheets.len() + 1;
        let path = self
            .parts
            .register_xml(&format!("xl/worksheets/sheet{index}.xml"))?;
        let sheet = Worksheet::create(index, name, &options, path, self.options.writer)?;
        log::debug!("added worksheet {index}: {name}");
        self.sheets.push(sheet);

        let Some(sheet) = self.sheets.last_mut() else {
            return Err(Error::Other("worksheet list is empty".to_string()));
        };
        Ok(WorksheetMut {
            sheet,
            strings: &mut self.strings,
            styles: &mut self.styles,
        })
    }

    /// Handle on the worksheet called `name` (case-insensitive).
    pub fn worksheet_mut(&mut self, name: &str) -> Option<WorksheetMut<'_>> {
        let folded = name.to_lowercase();
        let sheet = self
            .sheets
            .iter_mut()
            .find(|s| s.name().to_lowercase() == folded)?;
        Some(WorksheetMut {
            sheet,
            strings: &mut self.strings,
            styles: &mut self.styles,
        })
    }

    /// Register a cell format; equal styles share one id.
    pub fn add_style(&mut self, style: &CellStyle) -> StyleId {
        self.styles.add_style(style)
    }

    pub fn styles(&self) -> &Stylesheet {
        &self.styles
    }

    /// Show the sheet called `name` (case-insensitive) when the file is opened.
    pub fn set_active_sheet(&mut self, name: &str) -> Result<()> {
        let folded = name.to_lowercase();
        let index = self
            .sheets
            .iter()
            .position(|s| s.name().to_lowercase() == folded)
            .ok_or_else(|| Error::UnknownSheet(name.to_string()))?;
        self.active_sheet = index;
        Ok(())
    }

    /// Name of the sheet shown when the file is opened.
    pub fn active_sheet(&self) -> Option<&str> {
        self.sheets.get(self.active_sheet).map(Worksheet::name)
    }

    /// Add a workbook or sheet-local name.
    ///
    /// Sheets the name refers to must already exist. Names are unique per
    /// scope, ignoring case.
    pub fn add_defined_name(&mut self, name: DefinedName<'_>) -> Result<()> {
        let sheet_names = self.sheet_names();
        let entry = name.resolve(&sheet_names)?;
        let folded = entry.name.to_lowercase();
        if self
            .defined_names
            .iter()
            .any(|e| e.local_sheet_id == entry.local_sheet_id && e.name.to_lowercase() == folded)
        {
            return Err(Error::InvalidDefinedName(format!("{:?} already exists", entry.name)));
        }
        log::debug!("defined name {} = {}", entry.name, entry.formula);
        self.defined_names.push(entry);
        Ok(())
    }

    pub fn worksheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Sheet names in tab order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Worksheet::name).collect()
    }

    pub fn shared_strings(&self) -> &SharedStrings {
        &self.strings
    }

    /// `false` if writing any worksheet has failed.
    pub fn is_ok(&self) -> bool {
        self.sheets.iter().all(Worksheet::is_ok)
    }

    /// Finish every part and write the package to `path`.
    ///
    /// The staging files are removed whether or not the save succeeds.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let Workbook {
            options,
            sheets,
            strings,
            styles,
            active_sheet,
            mut defined_names,
            parts: mut staging,
        } = self;

        if sheets.is_empty() {
            return Err(Error::Other("workbook has no worksheets".to_string()));
        }

        let sheet_names: Vec<String> = sheets.iter().map(|s| s.name().to_string()).collect();
        for sheet in sheets {
            sheet.finish()?;
        }

        defined_names.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.local_sheet_id.cmp(&b.local_sheet_id))
        });
        let summary = PartSummary {
            sheet_names: &sheet_names,
            has_shared_strings: !strings.is_empty(),
            active_tab: active_sheet,
            defined_names: &defined_names,
        };
        let writer_options = options.writer;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        write_part(&mut staging, "[Content_Types].xml", writer_options, |w| {
            parts::write_content_types(w, &summary)
        })?;
        write_part(&mut staging, "_rels/.rels", writer_options, parts::write_package_rels)?;
        write_part(&mut staging, "docProps/app.xml", writer_options, |w| {
            parts::write_app_properties(w, &summary)
        })?;
        write_part(&mut staging, "docProps/core.xml", writer_options, |w| {
            parts::write_core_properties(w, &options.author, &timestamp)
        })?;
        write_part(&mut staging, "xl/workbook.xml", writer_options, |w| {
            parts::write_workbook(w, &summary)
        })?;
        write_part(&mut staging, "xl/_rels/workbook.xml.rels", writer_options, |w| {
            parts::write_workbook_rels(w, &summary)
        })?;
        write_part(&mut staging, "xl/styles.xml", writer_options, |w| styles.write_part(w))?;
        if summary.has_shared_strings {
            write_part(&mut staging, "xl/sharedStrings.xml", writer_options, |w| {
                strings.write_part(w)
            })?;
        }

        PackageWriter::write(path, &staging)?;
        staging.clear_temp();
        Ok(())
    }
}

/// Register `name`, stream it through `emit`, and flush it.
fn write_part<F>(parts: &mut PathManager, name: &str, options: WriterOptions, emit: F) -> Result<()>
where
    F: FnOnce(&mut XmlWriter<BufWriter<File>>),
{
    let path = parts.register_xml(name)?;
    let mut writer = XmlWriter::create_with(path, options);
    emit(&mut writer);
    writer.finish()?;
    Ok(())
}

/// Check `name` against the rules spreadsheet applications enforce.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "{name:?} must be 1 to {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!("{name:?} contains {c:?}")));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(format!(
            "{name:?} starts or ends with an apostrophe"
        )));
    }
    Ok(())
}
