//! The `xl/styles.xml` part.
//!
//! [`Stylesheet`] collects the distinct fonts, fills, borders and number
//! formats of every registered [`CellStyle`] and assigns each style its
//! `cellXfs` index. The tables start with the entries every stylesheet must
//! have: one default font, the `none` and `gray125` fills, one empty border
//! and the `Normal` cell format.

use std::io::Write;

use crate::common::xml::XmlWriter;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::format::{
    CellAlignment, CellBorder, CellBorderSide, CellFill, CellFont, CellStyle, FillPattern,
    NumberFormat, StyleId,
};

/// Default font of new workbooks.
pub const DEFAULT_FONT_NAME: &str = "Calibri";
/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f64 = 11.0;
/// First id available to custom number formats.
pub const FIRST_CUSTOM_NUM_FMT_ID: u32 = 164;

/// One `cellXfs` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CellXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Option<CellAlignment>,
}

/// Registered cell formats and the tables they point into.
#[derive(Debug)]
pub struct Stylesheet {
    fonts: Vec<CellFont>,
    fills: Vec<CellFill>,
    borders: Vec<CellBorder>,
    /// Custom format codes; id is `FIRST_CUSTOM_NUM_FMT_ID + index`
    number_formats: Vec<String>,
    cell_formats: Vec<CellXf>,
    /// Lazily registered styles for date cells without an explicit style
    date_style: Option<StyleId>,
    date_time_style: Option<StyleId>,
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylesheet {
    pub fn new() -> Self {
        let blank = |pattern| CellFill {
            pattern,
            fg_color: None,
            bg_color: None,
        };
        Self {
            fonts: vec![CellFont::default()],
            fills: vec![blank(FillPattern::None), blank(FillPattern::Gray125)],
            borders: vec![CellBorder::default()],
            number_formats: Vec::new(),
            cell_formats: vec![CellXf::default()],
            date_style: None,
            date_time_style: None,
        }
    }

    /// Register `style` and return its index; equal styles share an index.
    pub fn add_style(&mut self, style: &CellStyle) -> StyleId {
        let xf = CellXf {
            num_fmt_id: self.add_number_format(&style.number_format),
            font_id: style.font.as_ref().map_or(0, |font| intern(&mut self.fonts, font)),
            fill_id: style.fill.as_ref().map_or(0, |fill| intern(&mut self.fills, fill)),
            border_id: style
                .border
                .as_ref()
                .map_or(0, |border| intern(&mut self.borders, border)),
            alignment: style.alignment.filter(|a| !a.is_default()),
        };
        let index = intern(&mut self.cell_formats, &xf);
        StyleId(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Style used for date cells that were not given one.
    pub(crate) fn default_date_style(&mut self, with_time: bool) -> StyleId {
        let cached = if with_time {
            self.date_time_style
        } else {
            self.date_style
        };
        if let Some(id) = cached {
            return id;
        }
        let format = if with_time {
            NumberFormat::DateTime
        } else {
            NumberFormat::Date
        };
        let id = self.add_style(&CellStyle::with_number_format(format));
        if with_time {
            self.date_time_style = Some(id);
        } else {
            self.date_style = Some(id);
        }
        id
    }

    /// Number of `cellXfs` records, the `Normal` one included.
    pub fn style_count(&self) -> usize {
        self.cell_formats.len()
    }

    fn add_number_format(&mut self, format: &NumberFormat) -> u32 {
        if let Some(id) = format.builtin_id() {
            return id;
        }
        let Some(code) = format.format_code() else {
            return 0;
        };
        let index = match self.number_formats.iter().position(|c| *c == code) {
            Some(index) => index,
            None => {
                self.number_formats.push(code);
                self.number_formats.len() - 1
            },
        };
        FIRST_CUSTOM_NUM_FMT_ID + u32::try_from(index).unwrap_or(u32::MAX - FIRST_CUSTOM_NUM_FMT_ID)
    }

    /// Write the whole stylesheet.
    pub fn write_part<W: Write>(&self, w: &mut XmlWriter<W>) {
        w.open_tag("styleSheet")
            .attribute("xmlns", namespace::SML_MAIN)
            .attribute("xmlns:mc", namespace::MC)
            .attribute("mc:Ignorable", "x14ac")
            .attribute("xmlns:x14ac", namespace::X14AC);

        if !self.number_formats.is_empty() {
            w.open_tag("numFmts").attribute("count", self.number_formats.len());
            for (i, code) in self.number_formats.iter().enumerate() {
                w.open_light_tag("numFmt")
                    .attribute("numFmtId", FIRST_CUSTOM_NUM_FMT_ID as usize + i)
                    .attribute("formatCode", code.as_str())
                    .close_light_tag();
            }
            w.close_tag_named("numFmts");
        }

        w.open_tag("fonts").attribute("count", self.fonts.len());
        for font in &self.fonts {
            write_font(w, font);
        }
        w.close_tag_named("fonts");

        w.open_tag("fills").attribute("count", self.fills.len());
        for fill in &self.fills {
            write_fill(w, fill);
        }
        w.close_tag_named("fills");

        w.open_tag("borders").attribute("count", self.borders.len());
        for border in &self.borders {
            write_border(w, border);
        }
        w.close_tag_named("borders");

        w.open_tag("cellStyleXfs").attribute("count", 1);
        write_xf(w, &CellXf::default(), None);
        w.close_tag_named("cellStyleXfs");

        w.open_tag("cellXfs").attribute("count", self.cell_formats.len());
        for xf in &self.cell_formats {
            write_xf(w, xf, Some(0));
        }
        w.close_tag_named("cellXfs");

        w.open_tag("cellStyles").attribute("count", 1);
        w.open_light_tag("cellStyle")
            .attribute("name", "Normal")
            .attribute("xfId", 0)
            .attribute("builtinId", 0)
            .close_light_tag();
        w.close_tag_named("cellStyles");

        w.open_light_tag("dxfs").attribute("count", 0).close_light_tag();
        w.open_light_tag("tableStyles")
            .attribute("count", 0)
            .attribute("defaultTableStyle", "TableStyleMedium2")
            .attribute("defaultPivotStyle", "PivotStyleLight16")
            .close_light_tag();

        w.open_tag("extLst")
            .open_tag("ext")
            .attribute("uri", "{EB79DEF2-80B8-43e5-95BD-54CBDDF9020C}")
            .attribute("xmlns:x14", namespace::X14);
        w.open_light_tag("x14:slicerStyles")
            .attribute("defaultSlicerStyle", "SlicerStyleLight1")
            .close_light_tag();
        w.close_tag_named("ext").close_tag_named("extLst");

        w.close_tag_named("styleSheet");
    }
}

/// Index of `item` in `list`, appending it first if absent.
fn intern<T: Clone + PartialEq>(list: &mut Vec<T>, item: &T) -> usize {
    if let Some(index) = list.iter().position(|existing| existing == item) {
        return index;
    }
    list.push(item.clone());
    list.len() - 1
}

fn write_font<W: Write>(w: &mut XmlWriter<W>, font: &CellFont) {
    w.open_tag("font");
    if font.bold {
        w.open_light_tag("b").close_light_tag();
    }
    if font.italic {
        w.open_light_tag("i").close_light_tag();
    }
    if font.underline {
        w.open_light_tag("u").close_light_tag();
    }
    w.open_light_tag("sz")
        .attribute("val", font.size.unwrap_or(DEFAULT_FONT_SIZE))
        .close_light_tag();
    if let Some(color) = &font.color {
        w.open_light_tag("color").attribute("rgb", color.as_str()).close_light_tag();
    }
    w.open_light_tag("name")
        .attribute("val", font.name.as_deref().unwrap_or(DEFAULT_FONT_NAME))
        .close_light_tag();
    w.open_light_tag("family").attribute("val", 2).close_light_tag();
    w.close_tag_named("font");
}

fn write_fill<W: Write>(w: &mut XmlWriter<W>, fill: &CellFill) {
    w.open_tag("fill")
        .open_tag("patternFill")
        .attribute("patternType", fill.pattern.as_str());
    if let Some(color) = &fill.fg_color {
        w.open_light_tag("fgColor").attribute("rgb", color.as_str()).close_light_tag();
    }
    if let Some(color) = &fill.bg_color {
        w.open_light_tag("bgColor").attribute("rgb", color.as_str()).close_light_tag();
    }
    w.close_tag_named("patternFill").close_tag_named("fill");
}

fn write_border<W: Write>(w: &mut XmlWriter<W>, border: &CellBorder) {
    w.open_tag("border");
    if border.diagonal_up {
        w.attribute("diagonalUp", true);
    }
    if border.diagonal_down {
        w.attribute("diagonalDown", true);
    }
    for (name, side) in [
        ("left", &border.left),
        ("right", &border.right),
        ("top", &border.top),
        ("bottom", &border.bottom),
        ("diagonal", &border.diagonal),
    ] {
        write_border_side(w, name, side.as_ref());
    }
    w.close_tag_named("border");
}

fn write_border_side<W: Write>(w: &mut XmlWriter<W>, name: &str, side: Option<&CellBorderSide>) {
    w.open_tag(name);
    if let Some(side) = side {
        w.attribute("style", side.style.as_str());
        match &side.color {
            Some(color) => w.open_light_tag("color").attribute("rgb", color.as_str()),
            None => w.open_light_tag("color").attribute("auto", true),
        };
        w.close_light_tag();
    }
    w.close_tag_named(name);
}

fn write_xf<W: Write>(w: &mut XmlWriter<W>, xf: &CellXf, xf_id: Option<u32>) {
    w.open_tag("xf")
        .attribute("numFmtId", xf.num_fmt_id)
        .attribute("fontId", xf.font_id)
        .attribute("fillId", xf.fill_id)
        .attribute("borderId", xf.border_id);
    if let Some(id) = xf_id {
        w.attribute("xfId", id);
    }
    if xf.num_fmt_id != 0 {
        w.attribute("applyNumberFormat", true);
    }
    if xf.font_id != 0 {
        w.attribute("applyFont", true);
    }
    if xf.fill_id != 0 {
        w.attribute("applyFill", true);
    }
    if xf.border_id != 0 {
        w.attribute("applyBorder", true);
    }
    if let Some(alignment) = xf.alignment {
        w.attribute("applyAlignment", true);
        w.open_light_tag("alignment");
        if let Some(horizontal) = alignment.horizontal {
            w.attribute("horizontal", horizontal.as_str());
        }
        if let Some(vertical) = alignment.vertical {
            w.attribute("vertical", vertical.as_str());
        }
        if alignment.text_rotation != 0 {
            w.attribute("textRotation", alignment.text_rotation);
        }
        if alignment.wrap_text {
            w.attribute("wrapText", true);
        }
        w.close_light_tag();
    }
    w.close_tag_named("xf");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::xml::XML_PROLOG;
    use crate::ooxml::xlsx::format::{BorderLineStyle, HorizontalAlignment};

    fn render(sheet: &Stylesheet) -> String {
        let mut w = XmlWriter::new(Vec::new());
        sheet.write_part(&mut w);
        assert_eq!(w.depth(), 0);
        assert_eq!(w.misuse_count(), 0);
        let xml = String::from_utf8(w.finish().unwrap()).unwrap();
        xml.strip_prefix(XML_PROLOG).unwrap().to_string()
    }

    #[test]
    fn test_default_stylesheet() {
        let xml = render(&Stylesheet::new());

        assert!(!xml.contains("<numFmts"));
        assert!(xml.contains(r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#));
        assert!(xml.contains(r#"<fill><patternFill patternType="gray125"/></fill>"#));
        assert!(xml.contains(r#"<border><left/><right/><top/><bottom/><diagonal/></border>"#));
        assert!(xml.contains(r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#));
        assert!(xml.contains(r#"<x14:slicerStyles defaultSlicerStyle="SlicerStyleLight1"/>"#));
        assert!(xml.ends_with("</extLst></styleSheet>"));
    }

    #[test]
    fn test_equal_styles_share_an_index() {
        let mut sheet = Stylesheet::new();
        let bold = CellStyle {
            font: Some(CellFont {
                bold: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        let first = sheet.add_style(&bold);
        assert_eq!(first, StyleId(1));
        assert_eq!(sheet.add_style(&bold), first);
        assert_eq!(sheet.add_style(&CellStyle::default()), StyleId::DEFAULT);
        assert_eq!(sheet.style_count(), 2);
    }

    #[test]
    fn test_custom_number_formats_start_at_164() {
        let mut sheet = Stylesheet::new();
        let date = sheet.add_style(&CellStyle::with_number_format(NumberFormat::Date));
        let money = sheet.add_style(&CellStyle::with_number_format(NumberFormat::Number {
            decimals: 2,
            thousands: true,
        }));
        let builtin = sheet.add_style(&CellStyle::with_number_format(NumberFormat::BuiltIn(10)));
        assert_eq!((date.index(), money.index(), builtin.index()), (1, 2, 3));

        let xml = render(&sheet);
        assert!(xml.contains(
            r##"<numFmts count="2"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/><numFmt numFmtId="165" formatCode="#,##0.00"/></numFmts>"##
        ));
        assert!(xml.contains(r#"<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#));
        assert!(xml.contains(r#"<xf numFmtId="10" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#));
    }

    #[test]
    fn test_font_fill_border_and_alignment() {
        let mut sheet = Stylesheet::new();
        let style = CellStyle {
            number_format: NumberFormat::General,
            font: Some(CellFont {
                name: Some("Arial".into()),
                size: Some(9.5),
                bold: true,
                italic: true,
                underline: false,
                color: Some("FFFF0000".into()),
            }),
            fill: Some(CellFill::solid("FFFFFF00")),
            border: Some(CellBorder::all(BorderLineStyle::Thin)),
            alignment: Some(CellAlignment {
                horizontal: Some(HorizontalAlignment::Center),
                wrap_text: true,
                ..Default::default()
            }),
        };
        assert_eq!(sheet.add_style(&style), StyleId(1));
        let xml = render(&sheet);

        assert!(xml.contains(
            r#"<font><b/><i/><sz val="9.5"/><color rgb="FFFF0000"/><name val="Arial"/><family val="2"/></font></fonts>"#
        ));
        assert!(xml.contains(
            r#"<fills count="3">"#
        ));
        assert!(xml.contains(
            r#"<fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/></patternFill></fill>"#
        ));
        assert!(xml.contains(
            r#"<border><left style="thin"><color auto="1"/></left><right style="thin"><color auto="1"/></right><top style="thin"><color auto="1"/></top><bottom style="thin"><color auto="1"/></bottom><diagonal/></border>"#
        ));
        assert!(xml.contains(
            r#"<xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" wrapText="1"/></xf>"#
        ));
    }

    #[test]
    fn test_default_alignment_is_not_written() {
        let mut sheet = Stylesheet::new();
        let style = CellStyle {
            alignment: Some(CellAlignment::default()),
            ..Default::default()
        };
        assert_eq!(sheet.add_style(&style), StyleId::DEFAULT);
    }

    #[test]
    fn test_default_date_styles_are_cached() {
        let mut sheet = Stylesheet::new();
        let date = sheet.default_date_style(false);
        let date_time = sheet.default_date_style(true);
        assert_ne!(date, date_time);
        assert_eq!(sheet.default_date_style(false), date);
        assert_eq!(
            sheet.add_style(&CellStyle::with_number_format(NumberFormat::DateTime)),
            date_time
        );
        assert_eq!(sheet.style_count(), 3);
    }
}
