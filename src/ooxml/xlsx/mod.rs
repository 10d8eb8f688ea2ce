//! Excel (.xlsx) spreadsheet writing.
//!
//! A thin emitter layer over [`XmlWriter`](crate::common::xml::XmlWriter):
//! every part of the package is streamed to its own staging file, and the
//! files are zipped when the workbook is saved. Worksheets are written row
//! by row, so memory use does not grow with the number of rows; only the
//! shared strings table and the registered cell styles are kept until the
//! end.
//!
//! # Example
//!
//! ```no_run
//! use longan::ooxml::xlsx::{CellValue, FreezePanes, SheetOptions, Workbook};
//!
//! let mut book = Workbook::new()?;
//! let mut sheet = book.add_worksheet_with(
//!     "Report",
//!     SheetOptions {
//!         freeze: Some(FreezePanes { freeze_cols: 0, freeze_rows: 1 }),
//!         ..Default::default()
//!     },
//! )?;
//! sheet.add_row(&["item".into(), "amount".into()]);
//! sheet.add_row(&["coffee".into(), CellValue::Number(3.5)]);
//! sheet.add_row(&["total".into(), CellValue::Formula("=SUM(B2:B2)".into())]);
//! book.save("report.xlsx")?;
//! # Ok::<(), longan::Error>(())
//! ```

pub mod cell;
pub mod format;
pub mod writer;

pub use cell::{
    Cell, CellValue, absolute_cell_reference, cell_reference, column_to_letters, date_to_serial,
    datetime_to_serial, quote_sheet_name, range_reference,
};
pub use format::{
    BorderLineStyle, CellAlignment, CellBorder, CellBorderSide, CellFill, CellFont, CellStyle,
    FillPattern, HorizontalAlignment, NumberFormat, StyleId, VerticalAlignment,
};
pub use writer::{
    ColumnWidth, DefinedName, FreezePanes, NameTarget, SharedStrings, SheetOptions, Stylesheet,
    Workbook, WorkbookOptions, WorksheetMut,
};
