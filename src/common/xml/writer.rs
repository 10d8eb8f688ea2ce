//! Forward-only streaming XML writer.
//!
//! [`XmlWriter`] serializes one XML document to one sink in a single pass. It
//! keeps no document tree: the only state is a stack of the names of open
//! elements and a small state machine recording whether the current start-tag
//! is still accepting attributes.
//!
//! Two kinds of element are supported:
//!
//! - **Full tags** ([`XmlWriter::open_tag`] / [`XmlWriter::close_tag`]) are
//!   tracked on the stack and may hold attributes, text and children. A full
//!   tag closed with nothing inside it is emitted self-closing (`<a/>`); the
//!   `>` of every start-tag is deferred until something is written inside.
//! - **Light tags** ([`XmlWriter::open_light_tag`] /
//!   [`XmlWriter::close_light_tag`]) skip the stack entirely. They carry
//!   attributes only, never nest, and are always self-closing. Most cells and
//!   settings in a spreadsheet part are light tags.
//!
//! Calling the API out of sequence is a bug in the emitter, not a data error.
//! Such calls are reported as [`Misuse`] through the writer's [`Strictness`]:
//! a panic in strict mode, a logged warning and a best-effort recovery in
//! lenient mode. The only recoverable failure is I/O, surfaced through
//! [`XmlWriter::is_ok`] and [`XmlWriter::finish`].
//!
//! # Example
//!
//! ```
//! use longan::common::xml::XmlWriter;
//!
//! let mut w = XmlWriter::new(Vec::new());
//! w.open_tag("a").attribute("id", 1)
//!     .open_tag("b").content("hello & world").close_tag_named("b")
//!     .close_tag_named("a");
//! let xml = String::from_utf8(w.finish().unwrap()).unwrap();
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
//!      <a id=\"1\"><b>hello &amp; world</b></a>"
//! );
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::value::{DEFAULT_FLOAT_PRECISION, XmlValue};
use crate::common::error::{Error, Result};

/// The prolog written at the start of every document.
pub const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// How structural misuse of the writer API is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Log the misuse and panic (unless the thread is already panicking).
    Strict,
    /// Log the misuse and keep writing the most plausible document.
    Lenient,
}

impl Default for Strictness {
    /// `Strict` in debug builds, `Lenient` in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Strictness::Strict
        } else {
            Strictness::Lenient
        }
    }
}

/// Writer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Misuse policy.
    pub strictness: Strictness,
    /// Initial number of significant digits for floats.
    pub float_precision: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            float_precision: DEFAULT_FLOAT_PRECISION,
        }
    }
}

/// A call made out of sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Misuse {
    #[error("light tag opened while another light tag is pending")]
    NestedLightTag,

    #[error("<{0}> opened while a light tag is pending")]
    TagInsideLightTag(String),

    #[error("content written while a light tag is pending")]
    ContentInsideLightTag,

    #[error("close_light_tag called with no light tag pending")]
    NoLightTagOpen,

    #[error("attribute `{0}` written with no start-tag pending")]
    AttributeOutsideStartTag(String),

    #[error("close_tag called with no open tag")]
    CloseWithoutOpenTag,

    #[error("close_tag called while a light tag is pending")]
    CloseInsideLightTag,

    #[error("wrong tag name for close: {requested}, wanted: {open}")]
    MismatchedClose { open: String, requested: String },

    #[error("light tag left open at finalization")]
    UnclosedLightTag,
}

/// Where the writer stands relative to the element being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagState {
    /// Nothing open: the stack is empty and no start-tag is pending.
    Idle,
    /// A full tag's start-tag is pending; it can still self-close.
    FullOpen,
    /// The top full tag already holds content or children.
    FullWithContent,
    /// A light tag's start-tag is pending.
    LightOpen,
}

/// Streaming XML writer with structural checks.
///
/// See the [module documentation](self) for the tag model. All tag methods
/// return `&mut Self` so that calls chain the way elements nest.
pub struct XmlWriter<W: Write> {
    sink: Option<W>,
    error: Option<io::Error>,
    tags: Vec<String>,
    state: TagState,
    precision: usize,
    strictness: Strictness,
    misuses: usize,
}

impl XmlWriter<BufWriter<File>> {
    /// Create (or truncate) the file at `path` and write the prolog.
    ///
    /// If the file cannot be opened the writer is returned anyway, in a
    /// permanently unusable state: every call is a no-op and
    /// [`is_ok`](Self::is_ok) reports `false`.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        Self::create_with(path, WriterOptions::default())
    }

    /// [`create`](Self::create) with explicit options.
    pub fn create_with<P: AsRef<Path>>(path: P, options: WriterOptions) -> Self {
        let path = path.as_ref();
        match File::create(path) {
            Ok(file) => Self::with_options(BufWriter::new(file), options),
            Err(err) => {
                log::warn!("cannot open {} for XML output: {}", path.display(), err);
                Self {
                    sink: None,
                    error: Some(err),
                    tags: Vec::new(),
                    state: TagState::Idle,
                    precision: options.float_precision,
                    strictness: options.strictness,
                    misuses: 0,
                }
            },
        }
    }
}

impl<W: Write> XmlWriter<W> {
    /// Bind a writer to `sink` and write the prolog.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    /// Bind a writer to `sink` with explicit options and write the prolog.
    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        let mut writer = Self {
            sink: Some(sink),
            error: None,
            tags: Vec::with_capacity(16),
            state: TagState::Idle,
            precision: options.float_precision,
            strictness: options.strictness,
            misuses: 0,
        };
        writer.put(XML_PROLOG.as_bytes());
        writer
    }

    /// `true` while the sink is open and no write has failed.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.sink.is_some() && self.error.is_none()
    }

    /// The I/O error that made the writer unusable, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    /// Number of open full tags.
    #[inline]
    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    /// Number of misuses reported so far.
    pub fn misuse_count(&self) -> usize {
        self.misuses
    }

    /// The misuse policy in effect.
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Current number of significant digits for floats.
    pub fn float_precision(&self) -> usize {
        self.precision
    }

    /// Set the number of significant digits for floats and return the
    /// previous value, so the caller can restore it.
    pub fn set_float_precision(&mut self, precision: usize) -> usize {
        std::mem::replace(&mut self.precision, precision)
    }

    /// Run `f` with a temporary float precision, restoring the old one after.
    pub fn with_float_precision<F>(&mut self, precision: usize, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let old = self.set_float_precision(precision);
        f(self);
        self.precision = old;
        self
    }

    /// Open a full tag: `<name`, pushed on the stack.
    ///
    /// A pending start-tag of the parent is closed with `>` first.
    pub fn open_tag(&mut self, name: &str) -> &mut Self {
        if self.state == TagState::LightOpen {
            self.report(Misuse::TagInsideLightTag(name.to_string()));
            self.end_light_tag();
        }
        self.close_pending_start_tag();
        self.put(b"<");
        self.put(name.as_bytes());
        self.tags.push(name.to_string());
        self.state = TagState::FullOpen;
        self
    }

    /// Open a light tag: `<name`, not pushed on the stack.
    ///
    /// Must be followed by attributes only and then
    /// [`close_light_tag`](Self::close_light_tag).
    pub fn open_light_tag(&mut self, name: &str) -> &mut Self {
        if self.state == TagState::LightOpen {
            self.report(Misuse::NestedLightTag);
            self.end_light_tag();
        }
        self.close_pending_start_tag();
        self.put(b"<");
        self.put(name.as_bytes());
        self.state = TagState::LightOpen;
        self
    }

    /// Close the pending light tag with `/>`.
    pub fn close_light_tag(&mut self) -> &mut Self {
        if self.state == TagState::LightOpen {
            self.end_light_tag();
        } else {
            self.report(Misuse::NoLightTagOpen);
        }
        self
    }

    /// Write ` name="value"` into the pending start-tag (full or light).
    pub fn attribute<V: XmlValue>(&mut self, name: &str, value: V) -> &mut Self {
        match self.state {
            TagState::FullOpen | TagState::LightOpen => {
                self.put(b" ");
                self.put(name.as_bytes());
                self.put(b"=\"");
                self.put_value(&value);
                self.put(b"\"");
            },
            TagState::Idle | TagState::FullWithContent => {
                self.report(Misuse::AttributeOutsideStartTag(name.to_string()));
            },
        }
        self
    }

    /// Write escaped text inside the current element.
    ///
    /// Closes the pending start-tag; the element can no longer self-close.
    pub fn content<V: XmlValue>(&mut self, value: V) -> &mut Self {
        if self.state == TagState::LightOpen {
            self.report(Misuse::ContentInsideLightTag);
            self.end_light_tag();
        }
        self.close_pending_start_tag();
        self.put_value(&value);
        self
    }

    /// Write `<name>value</name>` as one leaf element, bypassing the stack.
    pub fn tag_only_content<V: XmlValue>(&mut self, name: &str, value: V) -> &mut Self {
        if self.state == TagState::LightOpen {
            self.report(Misuse::TagInsideLightTag(name.to_string()));
            self.end_light_tag();
        }
        self.close_pending_start_tag();
        self.put(b"<");
        self.put(name.as_bytes());
        self.put(b">");
        self.put_value(&value);
        self.put(b"</");
        self.put(name.as_bytes());
        self.put(b">");
        self.state = self.state_after_child();
        self
    }

    /// Close the innermost full tag.
    ///
    /// Emits `/>` if nothing was written inside it, `</name>` otherwise.
    pub fn close_tag(&mut self) -> &mut Self {
        self.pop_tag();
        self
    }

    /// Close the innermost full tag, checking that it is `expected`.
    ///
    /// On a mismatch the actual innermost tag is still closed; the mismatch
    /// is reported afterwards. The document stays well-formed, but the caller
    /// has a bug to fix.
    pub fn close_tag_named(&mut self, expected: &str) -> &mut Self {
        if let Some(closed) = self.pop_tag() {
            if closed != expected {
                self.report(Misuse::MismatchedClose {
                    open: closed,
                    requested: expected.to_string(),
                });
            }
        }
        self
    }

    /// Close every open full tag, innermost first.
    pub fn close_all(&mut self) -> &mut Self {
        while !self.tags.is_empty() {
            self.pop_tag();
        }
        self
    }

    /// Close all tags, flush, and hand back the sink.
    ///
    /// Fails with the recorded I/O error, including the error from opening
    /// the file if that failed.
    pub fn finish(mut self) -> Result<W> {
        self.finalize();
        let sink = self.sink.take();
        if let Some(err) = self.error.take() {
            return Err(Error::Io(err));
        }
        sink.ok_or_else(|| Error::WriterUnusable("output sink already released".to_string()))
    }

    fn finalize(&mut self) {
        if self.state == TagState::LightOpen {
            self.report(Misuse::UnclosedLightTag);
            self.end_light_tag();
        }
        self.close_all();
        if self.error.is_some() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.flush() {
                self.error = Some(err);
            }
        }
    }

    fn pop_tag(&mut self) -> Option<String> {
        if self.state == TagState::LightOpen {
            self.report(Misuse::CloseInsideLightTag);
            self.end_light_tag();
        }
        let Some(name) = self.tags.pop() else {
            self.report(Misuse::CloseWithoutOpenTag);
            return None;
        };
        if self.state == TagState::FullOpen {
            self.put(b"/>");
        } else {
            self.put(b"</");
            self.put(name.as_bytes());
            self.put(b">");
        }
        self.state = self.state_after_child();
        Some(name)
    }

    fn end_light_tag(&mut self) {
        self.put(b"/>");
        self.state = self.state_after_child();
    }

    fn close_pending_start_tag(&mut self) {
        if self.state == TagState::FullOpen {
            self.put(b">");
            self.state = TagState::FullWithContent;
        }
    }

    /// State once an element has been completed inside the current one.
    #[inline]
    fn state_after_child(&self) -> TagState {
        if self.tags.is_empty() {
            TagState::Idle
        } else {
            TagState::FullWithContent
        }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = sink.write_all(bytes) {
                self.error = Some(err);
            }
        }
    }

    #[inline]
    fn put_value<V: XmlValue + ?Sized>(&mut self, value: &V) {
        if self.error.is_some() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(err) = value.write_xml(sink, self.precision) {
                self.error = Some(err);
            }
        }
    }

    fn report(&mut self, misuse: Misuse) {
        self.misuses += 1;
        match self.strictness {
            Strictness::Strict => {
                log::error!("XML writer misuse: {misuse}");
                if !std::thread::panicking() {
                    panic!("XML writer misuse: {misuse}");
                }
            },
            Strictness::Lenient => log::warn!("XML writer misuse: {misuse}"),
        }
    }
}

impl<W: Write> Drop for XmlWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() {
            self.finalize();
        }
    }
}

impl<W: Write> std::fmt::Debug for XmlWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter")
            .field("ok", &self.is_ok())
            .field("tags", &self.tags)
            .field("state", &self.state)
            .field("precision", &self.precision)
            .field("strictness", &self.strictness)
            .finish()
    }
}
