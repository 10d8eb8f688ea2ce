//! Streaming worksheet writer.
//!
//! A worksheet part is opened when the sheet is added to the workbook and
//! written row by row: the header (views, format, columns) goes out
//! immediately, each [`WorksheetMut::add_row`] call appends one `<row>`,
//! and the trailer (merged cells, page setup) is written by
//! [`Worksheet::finish`] when the workbook is saved. Rows therefore never
//! accumulate in memory.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::common::error::{Error, Result};
use crate::common::xml::{WriterOptions, XmlWriter};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::cell::{
    Cell, CellValue, cell_reference, date_to_serial, datetime_to_serial, range_reference,
};
use crate::ooxml::xlsx::format::StyleId;

use super::strings::SharedStrings;
use super::styles::Stylesheet;

/// Significant digits of numeric cells; enough to round-trip what Excel shows.
pub const NUMBER_PRECISION: usize = 15;

/// Frozen rows and columns at the top-left of a sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreezePanes {
    /// Number of columns to freeze from the left
    pub freeze_cols: u32,
    /// Number of rows to freeze from the top
    pub freeze_rows: u32,
}

/// Width of a run of columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidth {
    /// First column, 0-based
    pub first: u32,
    /// Last column, 0-based and inclusive
    pub last: u32,
    /// Width in characters of the default font
    pub width: f64,
}

/// Layout fixed when the sheet is created, since it precedes the rows.
#[derive(Debug, Clone, Default)]
pub struct SheetOptions {
    pub column_widths: Vec<ColumnWidth>,
    pub freeze: Option<FreezePanes>,
}

/// One worksheet part being streamed to disk.
#[derive(Debug)]
pub struct Worksheet {
    index: usize,
    name: String,
    writer: XmlWriter<BufWriter<File>>,
    next_row: u32,
    merged_cells: Vec<String>,
}

impl Worksheet {
    /// Create the part file at `path` and write the sheet header.
    pub(crate) fn create(
        index: usize,
        name: &str,
        options: &SheetOptions,
        path: PathBuf,
        writer_options: WriterOptions,
    ) -> Result<Self> {
        let writer = XmlWriter::create_with(&path, writer_options);
        if let Some(err) = writer.error() {
            return Err(Error::Io(io::Error::new(
                err.kind(),
                format!("cannot create {}: {}", path.display(), err),
            )));
        }

        let mut sheet = Self {
            index,
            name: name.to_string(),
            writer,
            next_row: 0,
            merged_cells: Vec::new(),
        };
        sheet.write_header(options);
        Ok(sheet)
    }

    /// 1-based position in the workbook.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `false` once a write to the part has failed.
    pub fn is_ok(&self) -> bool {
        self.writer.is_ok()
    }

    fn write_header(&mut self, options: &SheetOptions) {
        let w = &mut self.writer;
        w.open_tag("worksheet")
            .attribute("xmlns", namespace::SML_MAIN)
            .attribute("xmlns:r", namespace::OFC_RELATIONSHIPS)
            .attribute("xmlns:mc", namespace::MC)
            .attribute("mc:Ignorable", "x14ac")
            .attribute("xmlns:x14ac", namespace::X14AC);
        w.open_light_tag("dimension").attribute("ref", "A1").close_light_tag();

        w.open_tag("sheetViews")
            .open_tag("sheetView")
            .attribute("tabSelected", false)
            .attribute("workbookViewId", 0);
        if let Some(freeze) = options.freeze {
            if freeze.freeze_cols != 0 || freeze.freeze_rows != 0 {
                write_frozen_pane(w, freeze);
            }
        }
        w.close_tag_named("sheetView").close_tag_named("sheetViews");

        w.open_light_tag("sheetFormatPr")
            .attribute("defaultRowHeight", 15)
            .attribute("x14ac:dyDescent", 0.25)
            .close_light_tag();

        if !options.column_widths.is_empty() {
            w.open_tag("cols");
            for col in &options.column_widths {
                w.open_light_tag("col")
                    .attribute("min", u64::from(col.first) + 1)
                    .attribute("max", u64::from(col.last) + 1)
                    .attribute("width", col.width)
                    .attribute("customWidth", true)
                    .close_light_tag();
            }
            w.close_tag_named("cols");
        }

        w.open_tag("sheetData");
    }

    fn write_row<'c, 'v: 'c>(
        &mut self,
        cells: impl Iterator<Item = (&'c CellValue<'v>, StyleId)>,
        strings: &mut SharedStrings,
        styles: &mut Stylesheet,
    ) {
        let row = self.next_row;
        self.next_row = self.next_row.saturating_add(1);

        let w = &mut self.writer;
        w.open_tag("row").attribute("r", u64::from(row) + 1);
        for (col, (value, style)) in cells.enumerate() {
            let Ok(col) = u32::try_from(col) else {
                break;
            };
            write_cell(w, row, col, value, style, strings, styles);
        }
        w.close_tag_named("row");
    }

    /// Close `sheetData`, write the trailer and flush the part.
    pub(crate) fn finish(mut self) -> Result<()> {
        let w = &mut self.writer;
        w.close_tag_named("sheetData");

        if !self.merged_cells.is_empty() {
            w.open_tag("mergeCells").attribute("count", self.merged_cells.len());
            for range in &self.merged_cells {
                w.open_light_tag("mergeCell").attribute("ref", range.as_str()).close_light_tag();
            }
            w.close_tag_named("mergeCells");
        }

        w.open_light_tag("pageMargins")
            .attribute("left", 0.7)
            .attribute("right", 0.7)
            .attribute("top", 0.75)
            .attribute("bottom", 0.75)
            .attribute("header", 0.3)
            .attribute("footer", 0.3)
            .close_light_tag();
        w.close_tag_named("worksheet");

        log::debug!("finished worksheet {} ({} rows)", self.name, self.next_row);
        self.writer.finish()?;
        Ok(())
    }
}

fn write_cell(
    w: &mut XmlWriter<BufWriter<File>>,
    row: u32,
    col: u32,
    cell: &CellValue<'_>,
    style: StyleId,
    strings: &mut SharedStrings,
    styles: &mut Stylesheet,
) {
    if matches!(cell, CellValue::Empty) {
        return;
    }

    // Serial numbers are unreadable without a date format.
    let style = match cell {
        CellValue::Date(_) if style.is_default() => styles.default_date_style(false),
        CellValue::DateTime(_) if style.is_default() => styles.default_date_style(true),
        _ => style,
    };

    w.open_tag("c").attribute("r", cell_reference(row, col));
    if !style.is_default() {
        w.attribute("s", style.index());
    }
    match cell {
        CellValue::Empty => {},
        CellValue::Number(n) if n.is_finite() => {
            w.with_float_precision(NUMBER_PRECISION, |w| {
                w.tag_only_content("v", *n);
            });
        },
        CellValue::Number(_) => {
            w.attribute("t", "e").tag_only_content("v", "#NUM!");
        },
        CellValue::Integer(i) => {
            w.tag_only_content("v", *i);
        },
        CellValue::Text(text) => {
            let index = strings.add_string(text);
            w.attribute("t", "s").tag_only_content("v", index);
        },
        CellValue::Bool(b) => {
            w.attribute("t", "b").tag_only_content("v", *b);
        },
        CellValue::Formula(formula) => {
            let formula: &str = formula;
            w.tag_only_content("f", formula.strip_prefix('=').unwrap_or(formula));
        },
        CellValue::Date(date) => {
            w.with_float_precision(NUMBER_PRECISION, |w| {
                w.tag_only_content("v", date_to_serial(*date));
            });
        },
        CellValue::DateTime(datetime) => {
            w.with_float_precision(NUMBER_PRECISION, |w| {
                w.tag_only_content("v", datetime_to_serial(*datetime));
            });
        },
    }
    w.close_tag_named("c");
}

/// `<pane>` and the per-pane selections of a frozen sheet view.
fn write_frozen_pane<W: io::Write>(w: &mut XmlWriter<W>, freeze: FreezePanes) {
    let cols = freeze.freeze_cols;
    let rows = freeze.freeze_rows;
    let top_left = cell_reference(rows, cols);

    w.open_tag("pane");
    if cols != 0 {
        w.attribute("xSplit", cols);
    }
    if rows != 0 {
        w.attribute("ySplit", rows);
    }
    w.attribute("topLeftCell", top_left.as_str());
    let active_pane = match (cols != 0, rows != 0) {
        (true, true) => "bottomRight",
        (false, true) => "bottomLeft",
        _ => "topRight",
    };
    w.attribute("activePane", active_pane)
        .attribute("state", "frozen")
        .close_tag_named("pane");

    let mut selection = |pane: &str, cell: &str| {
        w.open_light_tag("selection")
            .attribute("pane", pane)
            .attribute("activeCell", cell)
            .attribute("sqref", cell)
            .close_light_tag();
    };
    if cols != 0 && rows != 0 {
        selection("topRight", cell_reference(rows - 1, cols).as_str());
        selection("bottomLeft", cell_reference(rows, cols - 1).as_str());
        selection("bottomRight", top_left.as_str());
    } else {
        selection(active_pane, top_left.as_str());
    }
}

/// Mutable handle on one worksheet of a [`Workbook`](super::Workbook).
#[derive(Debug)]
pub struct WorksheetMut<'a> {
    pub(crate) sheet: &'a mut Worksheet,
    pub(crate) strings: &'a mut SharedStrings,
    pub(crate) styles: &'a mut Stylesheet,
}

impl WorksheetMut<'_> {
    /// Append one row; cell `i` lands in column `i`.
    ///
    /// The row is written to disk immediately.
    pub fn add_row(&mut self, cells: &[CellValue<'_>]) -> &mut Self {
        self.add_row_with_style(cells, StyleId::DEFAULT)
    }

    /// Append one row whose cells all use `style`.
    pub fn add_row_with_style(&mut self, cells: &[CellValue<'_>], style: StyleId) -> &mut Self {
        self.sheet
            .write_row(cells.iter().map(|value| (value, style)), self.strings, self.styles);
        self
    }

    /// Append one row of individually styled cells.
    pub fn add_styled_row(&mut self, cells: &[Cell<'_>]) -> &mut Self {
        self.sheet.write_row(
            cells.iter().map(|cell| (&cell.value, cell.style)),
            self.strings,
            self.styles,
        );
        self
    }

    /// Skip one row.
    pub fn add_empty_row(&mut self) -> &mut Self {
        self.sheet.next_row = self.sheet.next_row.saturating_add(1);
        self
    }

    /// Merge the cells between two 0-based `(row, col)` corners.
    pub fn merge_cells(&mut self, first: (u32, u32), last: (u32, u32)) -> &mut Self {
        let first_corner = (first.0.min(last.0), first.1.min(last.1));
        let last_corner = (first.0.max(last.0), first.1.max(last.1));
        self.sheet
            .merged_cells
            .push(range_reference(first_corner, last_corner));
        self
    }

    /// 0-based index of the row the next [`add_row`](Self::add_row) writes.
    pub fn current_row(&self) -> u32 {
        self.sheet.next_row
    }

    pub fn name(&self) -> &str {
        &self.sheet.name
    }

    pub fn index(&self) -> usize {
        self.sheet.index
    }

    pub fn is_ok(&self) -> bool {
        self.sheet.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XML_PROLOG;
    use crate::ooxml::xlsx::format::{CellFont, CellStyle, NumberFormat};
    use chrono::NaiveDate;
    use std::borrow::Cow;

    fn pane_xml(cols: u32, rows: u32) -> String {
        let mut w = XmlWriter::new(Vec::new());
        w.open_tag("sheetView");
        write_frozen_pane(
            &mut w,
            FreezePanes {
                freeze_cols: cols,
                freeze_rows: rows,
            },
        );
        w.close_tag();
        let xml = String::from_utf8(w.finish().unwrap()).unwrap();
        xml.strip_prefix(XML_PROLOG).unwrap().to_string()
    }

    fn sheet_xml(options: SheetOptions, f: impl FnOnce(&mut WorksheetMut<'_>)) -> String {
        let mut styles = Stylesheet::new();
        styled_sheet_xml(options, &mut styles, f)
    }

    fn styled_sheet_xml(
        options: SheetOptions,
        styles: &mut Stylesheet,
        f: impl FnOnce(&mut WorksheetMut<'_>),
    ) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet1.xml");
        let mut sheet =
            Worksheet::create(1, "Sheet1", &options, path.clone(), WriterOptions::default())
                .unwrap();
        let mut strings = SharedStrings::new();
        f(&mut WorksheetMut {
            sheet: &mut sheet,
            strings: &mut strings,
            styles,
        });
        sheet.finish().unwrap();
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_frozen_rows() {
        assert_eq!(
            pane_xml(0, 1),
            "<sheetView><pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>\
             <selection pane=\"bottomLeft\" activeCell=\"A2\" sqref=\"A2\"/></sheetView>"
        );
    }

    #[test]
    fn test_frozen_columns() {
        assert_eq!(
            pane_xml(2, 0),
            "<sheetView><pane xSplit=\"2\" topLeftCell=\"C1\" activePane=\"topRight\" state=\"frozen\"/>\
             <selection pane=\"topRight\" activeCell=\"C1\" sqref=\"C1\"/></sheetView>"
        );
    }

    #[test]
    fn test_frozen_rows_and_columns() {
        let xml = pane_xml(1, 2);
        assert!(xml.contains(r#"<pane xSplit="1" ySplit="2" topLeftCell="B3" activePane="bottomRight" state="frozen"/>"#));
        assert!(xml.contains(r#"<selection pane="topRight" activeCell="B2" sqref="B2"/>"#));
        assert!(xml.contains(r#"<selection pane="bottomLeft" activeCell="A3" sqref="A3"/>"#));
        assert!(xml.contains(r#"<selection pane="bottomRight" activeCell="B3" sqref="B3"/>"#));
    }

    #[test]
    fn test_header_and_rows() {
        let options = SheetOptions {
            column_widths: vec![ColumnWidth {
                first: 0,
                last: 1,
                width: 12.5,
            }],
            freeze: None,
        };
        let xml = sheet_xml(options, |sheet| {
            sheet
                .add_row(&[
                    CellValue::Text(Cow::Borrowed("name")),
                    CellValue::Empty,
                    CellValue::Integer(-3),
                ])
                .add_empty_row()
                .add_row(&[
                    CellValue::Number(45123.123456789),
                    CellValue::Bool(true),
                    CellValue::Formula(Cow::Borrowed("=SUM(A1:A3)")),
                    CellValue::Number(f64::NAN),
                ]);
            assert_eq!(sheet.current_row(), 3);
        });

        assert!(xml.starts_with(XML_PROLOG));
        assert!(xml.contains(r#"<sheetView tabSelected="0" workbookViewId="0"/>"#));
        assert!(xml.contains(r#"<sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/>"#));
        assert!(xml.contains(r#"<cols><col min="1" max="2" width="12.5" customWidth="1"/></cols>"#));
        assert!(xml.contains(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1"><v>-3</v></c></row>"#
        ));
        assert!(!xml.contains(r#"<row r="2""#));
        assert!(xml.contains(r#"<c r="A3"><v>45123.123456789</v></c>"#));
        assert!(xml.contains(r#"<c r="B3" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<c r="C3"><f>SUM(A1:A3)</f></c>"#));
        assert!(xml.contains(r#"<c r="D3" t="e"><v>#NUM!</v></c>"#));
        assert!(xml.ends_with("</sheetData><pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/></worksheet>"));
    }

    #[test]
    fn test_styled_cells_carry_style_index() {
        let mut styles = Stylesheet::new();
        let bold = styles.add_style(&CellStyle {
            font: Some(CellFont {
                bold: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        let money = styles.add_style(&CellStyle::with_number_format(NumberFormat::Number {
            decimals: 2,
            thousands: true,
        }));
        let xml = styled_sheet_xml(SheetOptions::default(), &mut styles, |sheet| {
            sheet
                .add_row_with_style(&[CellValue::from("item"), CellValue::from("cost")], bold)
                .add_styled_row(&[
                    CellValue::from("pen").into(),
                    CellValue::Number(1234.5).with_style(money),
                ]);
        });
        assert!(xml.contains(
            r#"<row r="1"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="1" t="s"><v>1</v></c></row>"#
        ));
        assert!(xml.contains(
            r#"<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2" s="2"><v>1234.5</v></c></row>"#
        ));
    }

    #[test]
    fn test_date_cells_get_a_date_format() {
        let mut styles = Stylesheet::new();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let noon = date.and_hms_opt(12, 0, 0).unwrap();
        let custom = styles.add_style(&CellStyle::with_number_format(NumberFormat::Custom(
            "d mmm yyyy".into(),
        )));
        let xml = styled_sheet_xml(SheetOptions::default(), &mut styles, |sheet| {
            sheet.add_styled_row(&[
                CellValue::Date(date).into(),
                CellValue::DateTime(noon).into(),
                CellValue::Date(date).with_style(custom),
            ]);
        });
        // Ids follow registration: 1 is the custom format, 2 and 3 are added on demand.
        assert!(xml.contains(r#"<c r="A1" s="2"><v>45352</v></c>"#));
        assert!(xml.contains(r#"<c r="B1" s="3"><v>45352.5</v></c>"#));
        assert!(xml.contains(r#"<c r="C1" s="1"><v>45352</v></c>"#));
        assert_eq!(styles.style_count(), 4);
    }

    #[test]
    fn test_numbers_keep_fifteen_digits_only_inside_cells() {
        let mut styles = Stylesheet::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet1.xml");
        let mut sheet = Worksheet::create(
            1,
            "Sheet1",
            &SheetOptions::default(),
            path.clone(),
            WriterOptions::default(),
        )
        .unwrap();
        let mut strings = SharedStrings::new();
        WorksheetMut {
            sheet: &mut sheet,
            strings: &mut strings,
            styles: &mut styles,
        }
        .add_row(&[CellValue::Number(1.0 / 3.0)]);
        assert_eq!(sheet.writer.float_precision(), crate::common::xml::DEFAULT_FLOAT_PRECISION);
        sheet.finish().unwrap();
        let xml = std::fs::read_to_string(path).unwrap();
        assert!(xml.contains("<v>0.333333333333333</v>"));
    }

    #[test]
    fn test_empty_sheet_self_closes_sheet_data() {
        let xml = sheet_xml(SheetOptions::default(), |_| {});
        assert!(xml.contains("<sheetData/>"));
        assert!(!xml.contains("<cols"));
    }

    #[test]
    fn test_merge_cells_normalizes_corners() {
        let xml = sheet_xml(SheetOptions::default(), |sheet| {
            sheet
                .add_row(&[CellValue::Integer(1)])
                .merge_cells((2, 3), (0, 0))
                .merge_cells((4, 0), (4, 5));
        });
        assert!(xml.contains(
            r#"<mergeCells count="2"><mergeCell ref="A1:D3"/><mergeCell ref="A5:F5"/></mergeCells>"#
        ));
    }

    #[test]
    fn test_row_with_only_empty_cells() {
        let xml = sheet_xml(SheetOptions::default(), |sheet| {
            sheet.add_row(&[CellValue::Empty, CellValue::Empty]);
        });
        assert!(xml.contains(r#"<sheetData><row r="1"/></sheetData>"#));
    }

    #[test]
    fn test_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("sheet1.xml");
        let result = Worksheet::create(1, "S", &SheetOptions::default(), path, WriterOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
