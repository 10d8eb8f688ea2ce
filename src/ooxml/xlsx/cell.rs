//! Cell values and A1-style references.

use std::borrow::Cow;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::format::StyleId;

/// `NaiveDate::num_days_from_ce` of 1899-12-30, day 0 of the 1900 date system.
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Value of one cell in a row handed to
/// [`WorksheetMut::add_row`](super::writer::WorksheetMut::add_row).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue<'a> {
    /// No cell is written; the column is skipped.
    Empty,
    /// Floating point number, written with 15 significant digits.
    Number(f64),
    /// Integer, written exactly.
    Integer(i64),
    /// Text, stored in the shared strings table.
    Text(Cow<'a, str>),
    /// Boolean, written as `1`/`0` with `t="b"`.
    Bool(bool),
    /// Formula; a leading `=` is optional. Evaluated when the file is opened.
    Formula(Cow<'a, str>),
    /// Calendar date, written as a serial day number.
    Date(NaiveDate),
    /// Date and time of day, written as a fractional serial day number.
    DateTime(NaiveDateTime),
}

impl<'a> CellValue<'a> {
    /// Pair the value with a registered style.
    pub fn with_style(self, style: StyleId) -> Cell<'a> {
        Cell { value: self, style }
    }
}

/// A value and the style it is displayed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    pub value: CellValue<'a>,
    pub style: StyleId,
}

impl<'a> From<CellValue<'a>> for Cell<'a> {
    fn from(value: CellValue<'a>) -> Self {
        value.with_style(StyleId::DEFAULT)
    }
}

impl<'a> From<&'a str> for CellValue<'a> {
    fn from(value: &'a str) -> Self {
        CellValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for CellValue<'_> {
    fn from(value: String) -> Self {
        CellValue::Text(Cow::Owned(value))
    }
}

impl From<f64> for CellValue<'_> {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue<'_> {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue<'_> {
    fn from(value: i32) -> Self {
        CellValue::Integer(i64::from(value))
    }
}

impl From<bool> for CellValue<'_> {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDate> for CellValue<'_> {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue<'_> {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<'a, T: Into<CellValue<'a>>> From<Option<T>> for CellValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// Convert a 0-based column index to its letters (0 -> "A", 26 -> "AA").
pub fn column_to_letters(col: u32) -> String {
    let mut letters = [0u8; 8];
    let mut start = letters.len();
    let mut n = u64::from(col) + 1;

    while n > 0 {
        n -= 1;
        start -= 1;
        letters[start] = (n % 26) as u8 + b'A';
        n /= 26;
    }

    letters[start..].iter().map(|&b| b as char).collect()
}

/// A1-style reference of a 0-based `(row, col)` position.
pub fn cell_reference(row: u32, col: u32) -> String {
    let mut reference = column_to_letters(col);
    let mut buffer = itoa::Buffer::new();
    reference.push_str(buffer.format(u64::from(row) + 1));
    reference
}

/// Absolute reference (`$A$1`) of a 0-based `(row, col)` position.
pub fn absolute_cell_reference(row: u32, col: u32) -> String {
    let mut buffer = itoa::Buffer::new();
    format!("${}${}", column_to_letters(col), buffer.format(u64::from(row) + 1))
}

/// Sheet name as it appears in a formula: `'Q1 ''24'`.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Serial day number of `date` in the 1900 date system.
///
/// Day 1 is 1900-01-01 for every date from 1900-03-01 on; earlier dates are
/// one day off, as spreadsheet applications count a 1900-02-29.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE)
}

/// Fractional serial day number of `datetime` in the 1900 date system.
pub fn datetime_to_serial(datetime: NaiveDateTime) -> f64 {
    let time = datetime.time();
    let seconds = f64::from(time.num_seconds_from_midnight())
        + f64::from(time.nanosecond().min(999_999_999)) / 1e9;
    date_to_serial(datetime.date()) + seconds / SECONDS_PER_DAY
}

/// `A1:B2` range between two 0-based positions.
pub fn range_reference(first: (u32, u32), last: (u32, u32)) -> String {
    format!(
        "{}:{}",
        cell_reference(first.0, first.1),
        cell_reference(last.0, last.1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(51), "AZ");
        assert_eq!(column_to_letters(701), "ZZ");
        assert_eq!(column_to_letters(702), "AAA");
        assert_eq!(column_to_letters(16383), "XFD");
        assert_eq!(column_to_letters(u32::MAX), "MWLQKWV");
    }

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(9, 2), "C10");
        assert_eq!(cell_reference(1_048_575, 16383), "XFD1048576");
        assert_eq!(cell_reference(u32::MAX, 0), "A4294967296");
    }

    #[test]
    fn test_range_reference() {
        assert_eq!(range_reference((0, 0), (1, 3)), "A1:D2");
    }

    #[test]
    fn test_absolute_reference_and_quoting() {
        assert_eq!(absolute_cell_reference(0, 0), "$A$1");
        assert_eq!(absolute_cell_reference(9, 27), "$AB$10");
        assert_eq!(quote_sheet_name("Data"), "'Data'");
        assert_eq!(quote_sheet_name("Q1 '24"), "'Q1 ''24'");
    }

    #[test]
    fn test_date_serials() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(date_to_serial(date(1899, 12, 30)), 0.0);
        assert_eq!(date_to_serial(date(1900, 3, 1)), 61.0);
        assert_eq!(date_to_serial(date(1970, 1, 1)), 25569.0);
        assert_eq!(date_to_serial(date(2024, 3, 1)), 45352.0);

        let noon = date(2024, 3, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(noon), 45352.5);
        let six_am = date(1970, 1, 1).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(datetime_to_serial(six_am), 25569.25);
    }

    #[test]
    fn test_with_style() {
        let cell = CellValue::Integer(1).with_style(StyleId(3));
        assert_eq!(cell.style.index(), 3);
        assert_eq!(Cell::from(CellValue::Bool(true)).style, StyleId::DEFAULT);
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from("x"), CellValue::Text(Cow::Borrowed("x")));
        assert_eq!(CellValue::from(String::from("y")), CellValue::Text(Cow::Borrowed("y")));
        assert_eq!(CellValue::from(1.5), CellValue::Number(1.5));
        assert_eq!(CellValue::from(7i32), CellValue::Integer(7));
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Empty);
        assert_eq!(CellValue::from(Some(3i64)), CellValue::Integer(3));
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(CellValue::from(day), CellValue::Date(day));
    }
}
