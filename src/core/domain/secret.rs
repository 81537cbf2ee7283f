//! DecodedSecret type.
//!
//! An ordered key/value view of a stored payload that remembers enough of
//! the original text to reproduce it.

use std::fmt;

use crate::core::domain::FormatKind;

/// Quoting style of a single dotenv value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quote {
    /// `KEY=value`
    #[default]
    None,
    /// `KEY="value"`, with `\n`, `\r`, `\"` and `\\` escapes.
    Double,
    /// `KEY='value'`, literal.
    Single,
}

/// One key/value pair and its per-line syntax.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: String,
    quote: Quote,
    exported: bool,
    raw: Option<String>,
    comment: Option<String>,
    crlf: bool,
}

impl Entry {
    /// A bare pair with no line syntax, as found in structured payloads.
    pub fn new(key: String, value: String) -> Self {
        Self {
            key,
            value,
            quote: Quote::None,
            exported: false,
            raw: None,
            comment: None,
            crlf: false,
        }
    }

    /// A pair as it was read from a payload.
    ///
    /// `raw` is the original line without its `\n`; it is emitted
    /// unchanged until the value is replaced.
    pub fn parsed(
        key: String,
        value: String,
        quote: Quote,
        exported: bool,
        raw: String,
        crlf: bool,
    ) -> Self {
        Self {
            key,
            value,
            quote,
            exported,
            raw: Some(raw),
            comment: None,
            crlf,
        }
    }

    /// Attach the inline comment that followed the value, leading
    /// whitespace included.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// A pair with no source text, framed the canonical way for `format`.
    pub fn inserted(format: FormatKind, key: String, value: String) -> Self {
        let mut entry = Self::new(key, value);
        if format == FormatKind::DotenvExport {
            entry.quote = Quote::Double;
            entry.exported = true;
        }
        entry
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    /// Whether the line carries an `export` prefix.
    pub fn exported(&self) -> bool {
        self.exported
    }

    /// Original text, if the entry is untouched since decoding.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Inline comment after the value, e.g. `  # rotated monthly`.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether the original line ended with `\r\n`.
    pub fn crlf(&self) -> bool {
        self.crlf
    }

    /// Replace the value, dropping the original text.
    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.raw = None;
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("key", &self.key)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .field("quote", &self.quote)
            .field("exported", &self.exported)
            .field("touched", &self.raw.is_none())
            .finish()
    }
}

/// One line of a decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank or comment line, kept byte-for-byte.
    Verbatim(String),
    /// A key/value pair.
    Pair(Entry),
}

/// Payload-wide layout details needed to re-encode faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    /// Payload ended with a newline.
    pub trailing_newline: bool,
    /// JSON payload spanned multiple lines.
    pub pretty: bool,
}

/// A decoded secret payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSecret {
    format: FormatKind,
    lines: Vec<Line>,
    layout: Layout,
}

impl DecodedSecret {
    /// An empty secret.
    pub fn new(format: FormatKind, layout: Layout) -> Self {
        Self {
            format,
            lines: Vec::new(),
            layout,
        }
    }

    /// Format tag.
    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Layout recorded at decode time.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// All lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Append a line at the end.
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// All pairs in order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.lines.iter().filter_map(|line| match line {
            Line::Pair(entry) => Some(entry),
            Line::Verbatim(_) => None,
        })
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for entry in self.entries() {
            if !keys.contains(&entry.key()) {
                keys.push(entry.key());
            }
        }
        keys
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries().any(|e| e.key() == key)
    }

    /// Effective value of `key`.
    ///
    /// When a dotenv payload repeats a key, the last occurrence wins, as it
    /// would when the file is sourced.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries()
            .filter(|e| e.key() == key)
            .last()
            .map(Entry::value)
    }

    /// Replace the value of every occurrence of `key`.
    ///
    /// Returns the number of lines changed.
    pub fn set(&mut self, key: &str, value: &str) -> usize {
        let mut changed = 0;
        for line in &mut self.lines {
            if let Line::Pair(entry) = line {
                if entry.key() == key {
                    entry.set_value(value.to_string());
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Append a new pair after all existing content.
    pub fn append(&mut self, key: &str, value: &str) {
        let entry = Entry::inserted(self.format, key.to_string(), value.to_string());
        self.lines.push(Line::Pair(entry));
    }

    /// Key/value pairs with their effective values, in key order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.keys()
            .into_iter()
            .filter_map(|k| self.get(k).map(|v| (k, v)))
            .collect()
    }
}
