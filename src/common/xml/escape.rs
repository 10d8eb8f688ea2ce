//! XML character escaping.
//!
//! Text content and attribute values share one fixed rule: the five reserved
//! characters are replaced by their predefined entities and every other byte
//! passes through untouched. The scan is a single forward pass, so an `&`
//! introduced by an entity is never seen again and cannot be escaped twice.

use std::borrow::Cow;
use std::io::{self, Write};

#[inline]
fn entity_for(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b'&' => Some(b"&amp;"),
        b'<' => Some(b"&lt;"),
        b'>' => Some(b"&gt;"),
        b'\'' => Some(b"&apos;"),
        b'"' => Some(b"&quot;"),
        _ => None,
    }
}

/// Write `text` to `out`, escaping XML special characters.
///
/// Runs of plain bytes are forwarded as one slice, so clean text costs a
/// single `write_all`.
pub fn write_escaped<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    let bytes = text.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(entity) = entity_for(byte) {
            if start < i {
                out.write_all(&bytes[start..i])?;
            }
            out.write_all(entity)?;
            start = i + 1;
        }
    }

    if start < bytes.len() {
        out.write_all(&bytes[start..])?;
    }
    Ok(())
}

/// Escape XML special characters.
///
/// Borrows the input when nothing needs replacing.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// assert_eq!(escape_xml("&amp;"), "&amp;amp;");
/// ```
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    let Some(first) = s.bytes().position(|b| entity_for(b).is_some()) else {
        return Cow::Borrowed(s);
    };

    let mut escaped = String::with_capacity(s.len() + 8);
    escaped.push_str(&s[..first]);
    for ch in s[first..].chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn escaped(text: &str) -> String {
        let mut out = Vec::new();
        write_escaped(&mut out, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_each_reserved_character_once() {
        assert_eq!(escaped("&<>'\""), "&amp;&lt;&gt;&apos;&quot;");
    }

    #[test]
    fn test_no_double_escaping() {
        assert_eq!(escaped("&"), "&amp;");
        assert_eq!(escaped("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(escaped("hello world"), "hello world");
        assert_eq!(escaped(""), "");
        assert!(matches!(escape_xml("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn test_multibyte_passes_through() {
        assert_eq!(escaped("Größe < 5 €"), "Größe &lt; 5 €");
        assert_eq!(escape_xml("日本 & 中国"), "日本 &amp; 中国");
    }

    proptest! {
        #[test]
        fn prop_stream_and_string_forms_agree(s in any::<String>()) {
            prop_assert_eq!(escaped(&s), escape_xml(&s).into_owned());
        }

        #[test]
        fn prop_no_reserved_characters_survive(s in any::<String>()) {
            let out = escaped(&s);
            prop_assert!(!out.contains(['<', '>', '"', '\'']));
            // every '&' left in the output starts an entity
            for (i, _) in out.match_indices('&') {
                let tail = &out[i..];
                prop_assert!(
                    ["&amp;", "&lt;", "&gt;", "&apos;", "&quot;"]
                        .iter()
                        .any(|e| tail.starts_with(e))
                );
            }
        }
    }
}
