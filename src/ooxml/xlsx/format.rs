//! Cell formatting: number formats, fonts, fills, borders and alignment.
//!
//! A [`CellStyle`] is registered once with
//! [`Workbook::add_style`](super::Workbook::add_style), which returns the
//! [`StyleId`] to attach to cells.

/// Index of a registered cell format in `cellXfs`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StyleId(pub(crate) u32);

impl StyleId {
    /// The `Normal` style; cells with it carry no `s` attribute.
    pub const DEFAULT: StyleId = StyleId(0);

    pub fn index(self) -> u32 {
        self.0
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

/// Complete formatting of a cell.
///
/// `None` parts fall back to the workbook defaults (Calibri 11, no fill, no
/// border, bottom-left aligned).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub number_format: NumberFormat,
    pub font: Option<CellFont>,
    pub fill: Option<CellFill>,
    pub border: Option<CellBorder>,
    pub alignment: Option<CellAlignment>,
}

impl CellStyle {
    /// Default formatting apart from the number format.
    pub fn with_number_format(number_format: NumberFormat) -> Self {
        Self {
            number_format,
            ..Default::default()
        }
    }
}

/// How a numeric value is displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    General,
    /// Format known to every spreadsheet application by id (below 164)
    BuiltIn(u32),
    /// Fixed decimals, optionally with thousands grouping (`#,##0.00`)
    Number { decimals: u8, thousands: bool },
    /// Percentage with fixed decimals (`0.0%`)
    Percent { decimals: u8 },
    /// Exponential notation (`0.00E+00`)
    Exponential { decimals: u8 },
    /// `yyyy-mm-dd`
    Date,
    /// `hh:mm:ss`
    Time,
    /// `yyyy-mm-dd hh:mm:ss`
    DateTime,
    /// Any format code, written as given
    Custom(String),
}

impl NumberFormat {
    /// Id of formats that need no `numFmt` entry.
    pub(crate) fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::BuiltIn(id) => Some(*id),
            _ => None,
        }
    }

    /// Format code of formats that need a `numFmt` entry.
    pub fn format_code(&self) -> Option<String> {
        let code = match self {
            NumberFormat::General | NumberFormat::BuiltIn(_) => return None,
            NumberFormat::Number { decimals, thousands } => digits_code(*decimals, *thousands, ""),
            NumberFormat::Percent { decimals } => digits_code(*decimals, false, "%"),
            NumberFormat::Exponential { decimals } => digits_code(*decimals, false, "E+00"),
            NumberFormat::Date => "yyyy-mm-dd".to_string(),
            NumberFormat::Time => "hh:mm:ss".to_string(),
            NumberFormat::DateTime => "yyyy-mm-dd hh:mm:ss".to_string(),
            NumberFormat::Custom(code) => code.clone(),
        };
        Some(code)
    }
}

fn digits_code(decimals: u8, thousands: bool, affix: &str) -> String {
    let mut code = String::with_capacity(8 + usize::from(decimals) + affix.len());
    if thousands {
        code.push_str("#,##");
    }
    code.push('0');
    if decimals > 0 {
        code.push('.');
        code.extend(std::iter::repeat_n('0', usize::from(decimals)));
    }
    code.push_str(affix);
    code
}

/// Font properties for a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFont {
    pub name: Option<String>,
    /// Size in points
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// ARGB hex, e.g. `FFFF0000`
    pub color: Option<String>,
}

/// Fill properties for a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellFill {
    pub pattern: FillPattern,
    /// ARGB hex of the pattern foreground
    pub fg_color: Option<String>,
    /// ARGB hex of the pattern background
    pub bg_color: Option<String>,
}

impl CellFill {
    /// Solid fill in one ARGB color.
    pub fn solid(color: &str) -> Self {
        Self {
            pattern: FillPattern::Solid,
            fg_color: Some(color.to_string()),
            bg_color: None,
        }
    }
}

/// Fill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl FillPattern {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::MediumGray => "mediumGray",
            Self::DarkGray => "darkGray",
            Self::LightGray => "lightGray",
            Self::DarkHorizontal => "darkHorizontal",
            Self::DarkVertical => "darkVertical",
            Self::DarkDown => "darkDown",
            Self::DarkUp => "darkUp",
            Self::DarkGrid => "darkGrid",
            Self::DarkTrellis => "darkTrellis",
            Self::LightHorizontal => "lightHorizontal",
            Self::LightVertical => "lightVertical",
            Self::LightDown => "lightDown",
            Self::LightUp => "lightUp",
            Self::LightGrid => "lightGrid",
            Self::LightTrellis => "lightTrellis",
            Self::Gray125 => "gray125",
            Self::Gray0625 => "gray0625",
        }
    }
}

/// Border properties for a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellBorder {
    pub left: Option<CellBorderSide>,
    pub right: Option<CellBorderSide>,
    pub top: Option<CellBorderSide>,
    pub bottom: Option<CellBorderSide>,
    pub diagonal: Option<CellBorderSide>,
    pub diagonal_up: bool,
    pub diagonal_down: bool,
}

impl CellBorder {
    /// The same line on all four edges.
    pub fn all(style: BorderLineStyle) -> Self {
        let side = Some(CellBorderSide { style, color: None });
        Self {
            left: side.clone(),
            right: side.clone(),
            top: side.clone(),
            bottom: side,
            ..Default::default()
        }
    }
}

/// One edge of a cell border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBorderSide {
    pub style: BorderLineStyle,
    /// ARGB hex; automatic color if `None`
    pub color: Option<String>,
}

/// Border line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderLineStyle {
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderLineStyle {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Thick => "thick",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::MediumDashed => "mediumDashed",
            Self::DashDot => "dashDot",
            Self::MediumDashDot => "mediumDashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }
}

/// Placement of the value inside the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellAlignment {
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub wrap_text: bool,
    /// Degrees, 0-180
    pub text_rotation: u16,
}

impl CellAlignment {
    pub(crate) fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    Center,
    Right,
}

impl HorizontalAlignment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
}

impl VerticalAlignment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert_eq!(NumberFormat::General.format_code(), None);
        assert_eq!(NumberFormat::BuiltIn(14).format_code(), None);
        assert_eq!(
            NumberFormat::Number { decimals: 2, thousands: true }.format_code().as_deref(),
            Some("#,##0.00")
        );
        assert_eq!(
            NumberFormat::Number { decimals: 0, thousands: false }.format_code().as_deref(),
            Some("0")
        );
        assert_eq!(NumberFormat::Percent { decimals: 1 }.format_code().as_deref(), Some("0.0%"));
        assert_eq!(
            NumberFormat::Exponential { decimals: 2 }.format_code().as_deref(),
            Some("0.00E+00")
        );
        assert_eq!(NumberFormat::DateTime.format_code().as_deref(), Some("yyyy-mm-dd hh:mm:ss"));
        assert_eq!(
            NumberFormat::Custom("0.000 \"kg\"".into()).format_code().as_deref(),
            Some("0.000 \"kg\"")
        );
    }

    #[test]
    fn test_builtin_ids() {
        assert_eq!(NumberFormat::General.builtin_id(), Some(0));
        assert_eq!(NumberFormat::BuiltIn(22).builtin_id(), Some(22));
        assert_eq!(NumberFormat::Date.builtin_id(), None);
    }

    #[test]
    fn test_border_all_leaves_diagonal_empty() {
        let border = CellBorder::all(BorderLineStyle::Thin);
        assert_eq!(border.left.as_ref().map(|s| s.style), Some(BorderLineStyle::Thin));
        assert!(border.diagonal.is_none());
        assert!(!border.diagonal_up);
    }

    #[test]
    fn test_default_alignment() {
        assert!(CellAlignment::default().is_default());
        let wrap = CellAlignment {
            wrap_text: true,
            ..Default::default()
        };
        assert!(!wrap.is_default());
    }
}
