//! Defined names: workbook labels for constants, cells, ranges and formulas.

use crate::common::error::{Error, Result};
use crate::common::xml::{DEFAULT_FLOAT_PRECISION, format_float};
use crate::ooxml::xlsx::cell::{absolute_cell_reference, quote_sheet_name};

/// What a defined name stands for. Cells are 0-based `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub enum NameTarget<'a> {
    Constant(f64),
    Cell {
        sheet: &'a str,
        cell: (u32, u32),
    },
    Range {
        sheet: &'a str,
        first: (u32, u32),
        last: (u32, u32),
    },
    /// Formula text; a leading `=` is optional
    Formula(&'a str),
}

/// A name to add with [`Workbook::add_defined_name`](super::Workbook::add_defined_name).
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedName<'a> {
    pub name: &'a str,
    pub target: NameTarget<'a>,
    pub comment: Option<&'a str>,
    /// Sheet the name is local to; workbook-wide if `None`
    pub scope: Option<&'a str>,
}

impl<'a> DefinedName<'a> {
    pub fn new(name: &'a str, target: NameTarget<'a>) -> Self {
        Self {
            name,
            target,
            comment: None,
            scope: None,
        }
    }

    pub fn with_comment(mut self, comment: &'a str) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn scoped_to(mut self, sheet: &'a str) -> Self {
        self.scope = Some(sheet);
        self
    }
}

/// A defined name resolved against the workbook's sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct NameEntry {
    pub name: String,
    pub formula: String,
    pub comment: Option<String>,
    /// 0-based tab index of the scope sheet
    pub local_sheet_id: Option<usize>,
}

impl DefinedName<'_> {
    /// Check the name and turn sheet names into tab indexes and references.
    ///
    /// `sheets` are the workbook's sheet names in tab order; lookups are
    /// case-insensitive and references use the stored spelling.
    pub(crate) fn resolve(&self, sheets: &[&str]) -> Result<NameEntry> {
        validate_defined_name(self.name)?;
        let find = |wanted: &str| {
            let folded = wanted.to_lowercase();
            sheets
                .iter()
                .position(|s| s.to_lowercase() == folded)
                .map(|index| (index, sheets[index]))
                .ok_or_else(|| Error::UnknownSheet(wanted.to_string()))
        };

        let formula = match &self.target {
            NameTarget::Constant(value) => format_float(*value, DEFAULT_FLOAT_PRECISION),
            NameTarget::Cell { sheet, cell } => {
                let (_, sheet) = find(sheet)?;
                format!(
                    "{}!{}",
                    quote_sheet_name(sheet),
                    absolute_cell_reference(cell.0, cell.1)
                )
            },
            NameTarget::Range { sheet, first, last } => {
                let (_, sheet) = find(sheet)?;
                format!(
                    "{}!{}:{}",
                    quote_sheet_name(sheet),
                    absolute_cell_reference(first.0, first.1),
                    absolute_cell_reference(last.0, last.1)
                )
            },
            NameTarget::Formula(formula) => formula.strip_prefix('=').unwrap_or(formula).to_string(),
        };
        if formula.is_empty() {
            return Err(Error::InvalidDefinedName(format!("{:?} has an empty formula", self.name)));
        }

        let local_sheet_id = match self.scope {
            Some(sheet) => Some(find(sheet)?.0),
            None => None,
        };
        Ok(NameEntry {
            name: self.name.to_string(),
            formula,
            comment: self.comment.map(str::to_string),
            local_sheet_id,
        })
    }
}

/// Names start with a letter, `_` or `\` and continue with letters,
/// digits, `_`, `.` or `\`.
fn validate_defined_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '\\');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '\\'));
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(Error::InvalidDefinedName(format!("{name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEETS: [&str; 2] = ["Data", "Q1 '24"];

    #[test]
    fn test_constant_and_formula() {
        let entry = DefinedName::new("Rate", NameTarget::Constant(0.075)).resolve(&SHEETS).unwrap();
        assert_eq!(entry.formula, "0.075");
        assert_eq!(entry.local_sheet_id, None);

        let entry = DefinedName::new("Total", NameTarget::Formula("=SUM(Data!A:A)"))
            .with_comment("all rows")
            .resolve(&SHEETS)
            .unwrap();
        assert_eq!(entry.formula, "SUM(Data!A:A)");
        assert_eq!(entry.comment.as_deref(), Some("all rows"));
    }

    #[test]
    fn test_cell_and_range_references() {
        let cell = DefinedName::new(
            "Origin",
            NameTarget::Cell {
                sheet: "data",
                cell: (0, 0),
            },
        )
        .resolve(&SHEETS)
        .unwrap();
        assert_eq!(cell.formula, "'Data'!$A$1");

        let range = DefinedName::new(
            "Block",
            NameTarget::Range {
                sheet: "Q1 '24",
                first: (1, 1),
                last: (9, 2),
            },
        )
        .scoped_to("Data")
        .resolve(&SHEETS)
        .unwrap();
        assert_eq!(range.formula, "'Q1 ''24'!$B$2:$C$10");
        assert_eq!(range.local_sheet_id, Some(0));
    }

    #[test]
    fn test_unknown_sheets_rejected() {
        let target = NameTarget::Cell {
            sheet: "Missing",
            cell: (0, 0),
        };
        assert!(matches!(
            DefinedName::new("X", target).resolve(&SHEETS),
            Err(Error::UnknownSheet(_))
        ));
        assert!(matches!(
            DefinedName::new("X", NameTarget::Constant(1.0))
                .scoped_to("Nope")
                .resolve(&SHEETS),
            Err(Error::UnknownSheet(_))
        ));
    }

    #[test]
    fn test_name_rules() {
        for good in ["Rate", "_tmp", "\\x", "tax.rate", "Année2"] {
            assert!(validate_defined_name(good).is_ok(), "{good:?} rejected");
        }
        for bad in ["", "1st", "a b", "x-y", ".dot"] {
            assert!(
                matches!(validate_defined_name(bad), Err(Error::InvalidDefinedName(_))),
                "{bad:?} accepted"
            );
        }
        assert!(DefinedName::new("Empty", NameTarget::Formula("=")).resolve(&SHEETS).is_err());
    }
}
