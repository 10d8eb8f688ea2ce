//! Rendering of attribute values and text content.
//!
//! Output is consumed by spreadsheet applications running under arbitrary
//! locales, so every number is rendered with a fixed rule: `.` as the decimal
//! separator, no digit grouping. Floats follow the `%g` conversion of the C
//! locale with a caller-controlled number of significant digits.

use std::borrow::Cow;
use std::io::{self, Write};

use super::escape::write_escaped;

/// Significant digits used for floats unless a caller overrides them.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// A value that can be written as XML text or as an attribute value.
///
/// Implementations write the final, already escaped bytes.
pub trait XmlValue {
    /// Write the value to `out`. `precision` is the number of significant
    /// digits for floating point values; other types ignore it.
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, precision: usize) -> io::Result<()>;
}

impl<T: XmlValue + ?Sized> XmlValue for &T {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, precision: usize) -> io::Result<()> {
        (**self).write_xml(out, precision)
    }
}

impl XmlValue for str {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        write_escaped(out, self)
    }
}

impl XmlValue for String {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        write_escaped(out, self)
    }
}

impl XmlValue for Cow<'_, str> {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        write_escaped(out, self)
    }
}

impl XmlValue for char {
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        let mut buf = [0u8; 4];
        write_escaped(out, self.encode_utf8(&mut buf))
    }
}

impl XmlValue for bool {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        out.write_all(if *self { b"1" } else { b"0" })
    }
}

macro_rules! impl_xml_value_for_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl XmlValue for $ty {
                #[inline]
                fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
                    let mut buffer = itoa::Buffer::new();
                    out.write_all(buffer.format(*self).as_bytes())
                }
            }
        )*
    };
}

impl_xml_value_for_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl XmlValue for f64 {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, precision: usize) -> io::Result<()> {
        out.write_all(format_float(*self, precision).as_bytes())
    }
}

impl XmlValue for f32 {
    #[inline]
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, precision: usize) -> io::Result<()> {
        out.write_all(format_float(f64::from(*self), precision).as_bytes())
    }
}

/// UTF-16 text, transcoded to UTF-8 while it is escaped.
///
/// Lone surrogates are replaced with U+FFFD.
///
/// # Examples
///
/// ```
/// use longan::common::xml::{Utf16Text, XmlWriter};
///
/// let wide: Vec<u16> = "a<b".encode_utf16().collect();
/// let mut writer = XmlWriter::new(Vec::new());
/// writer.tag_only_content("t", Utf16Text(&wide));
/// let xml = String::from_utf8(writer.finish().unwrap()).unwrap();
/// assert!(xml.ends_with("<t>a&lt;b</t>"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Utf16Text<'a>(pub &'a [u16]);

impl XmlValue for Utf16Text<'_> {
    fn write_xml<W: Write + ?Sized>(&self, out: &mut W, _precision: usize) -> io::Result<()> {
        let mut buf = [0u8; 4];
        for ch in char::decode_utf16(self.0.iter().copied()) {
            let ch = ch.unwrap_or(char::REPLACEMENT_CHARACTER);
            write_escaped(out, ch.encode_utf8(&mut buf))?;
        }
        Ok(())
    }
}

/// Format a float like the C locale's `%g` with `precision` significant digits.
///
/// Trailing zeros are trimmed; scientific notation (`1.5e+07`) is used when the
/// decimal exponent is below -4 or at least `precision`. A precision of 0 is
/// treated as 1. Negative zero renders as `0`.
///
/// # Examples
///
/// ```
/// use longan::common::xml::format_float;
/// assert_eq!(format_float(1234.5, 6), "1234.5");
/// assert_eq!(format_float(0.25, 6), "0.25");
/// assert_eq!(format_float(1234567.0, 6), "1.23457e+06");
/// assert_eq!(format_float(45123.123456789, 15), "45123.123456789");
/// ```
pub fn format_float(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let precision = precision.clamp(1, 40);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let mut out = trim_fraction(mantissa).to_string();
        out.push('e');
        out.push(if exponent < 0 { '-' } else { '+' });
        let magnitude = exponent.unsigned_abs();
        if magnitude < 10 {
            out.push('0');
        }
        let mut buffer = itoa::Buffer::new();
        out.push_str(buffer.format(magnitude));
        out
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{value:.decimals$}");
        trim_fraction(&fixed).to_string()
    }
}

/// Drop trailing zeros of a fractional part, and the point if nothing is left.
fn trim_fraction(number: &str) -> &str {
    if !number.contains('.') {
        return number;
    }
    number.trim_end_matches('0').trim_end_matches('.')
}
