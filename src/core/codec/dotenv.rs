//! Dotenv codecs.
//!
//! `KEY=VALUE` and `export KEY="VALUE"` payloads. Both codecs read the same
//! line grammar; quoting and the `export` prefix are recorded per line so a
//! payload that mixes styles survives rotation line by line.
//!
//! The value is everything after the first `=`, so base64 padding and
//! connection strings with embedded `=` are kept verbatim. Keys that are not
//! variable names (`spring.datasource.password`, `MY-KEY`) are still read as
//! pairs; only keys written by an insertion must be valid names.
//!
//! An inline comment after a value (`A="x" # note`) is kept with the line
//! and written back when the value changes.

use super::Codec;
use crate::core::domain::{DecodedSecret, Entry, FormatKind, Layout, Line, Quote};
use crate::error::{FormatError, Result};

/// Codec for `dotenv_plain` and `dotenv_export` payloads.
#[derive(Debug, Clone, Copy)]
pub struct Dotenv {
    kind: FormatKind,
}

impl Dotenv {
    /// `KEY=VALUE` codec.
    pub const fn plain() -> Self {
        Self {
            kind: FormatKind::DotenvPlain,
        }
    }

    /// `export KEY="VALUE"` codec.
    pub const fn export() -> Self {
        Self {
            kind: FormatKind::DotenvExport,
        }
    }
}

impl Codec for Dotenv {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn decode(&self, payload: &str) -> Result<DecodedSecret> {
        let (body, trailing_newline) = match payload.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (payload, false),
        };

        let layout = Layout {
            trailing_newline,
            pretty: false,
        };
        let mut secret = DecodedSecret::new(self.kind, layout);

        if payload.is_empty() {
            return Ok(secret);
        }

        for (i, text) in body.split('\n').enumerate() {
            secret.push(parse_line(text, i + 1)?);
        }

        Ok(secret)
    }

    fn encode(&self, secret: &DecodedSecret) -> Result<String> {
        if !secret.format().is_dotenv() {
            return Err(FormatError::UnsupportedShape(format!(
                "cannot encode a {} secret as {}",
                secret.format(),
                self.kind
            ))
            .into());
        }

        let mut out = secret
            .lines()
            .iter()
            .map(render_line)
            .collect::<Vec<_>>()
            .join("\n");

        if secret.layout().trailing_newline {
            out.push('\n');
        }

        Ok(out)
    }
}

/// Parse one line (without its `\n`).
fn parse_line(text: &str, number: usize) -> Result<Line> {
    let (body, crlf) = match text.strip_suffix('\r') {
        Some(body) => (body, true),
        None => (text, false),
    };

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Verbatim(text.to_string()));
    }

    let (exported, rest) = strip_export(trimmed);

    let (key, value) = rest.split_once('=').ok_or_else(|| FormatError::Parse {
        line: number,
        reason: "expected KEY=VALUE".to_string(),
    })?;

    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Ok(Line::Verbatim(text.to_string()));
    }

    let (value, quote, comment) = unquote(value.trim());

    Ok(Line::Pair(Entry::parsed(
        key.to_string(),
        value,
        quote,
        exported,
        text.to_string(),
        crlf,
    )
    .with_comment(comment)))
}

/// Split off a leading `export` keyword followed by whitespace.
fn strip_export(line: &str) -> (bool, &str) {
    match line.strip_prefix("export") {
        Some(rest) if rest.starts_with([' ', '\t']) => (true, rest.trim_start()),
        _ => (false, line),
    }
}

/// Split a raw value into its text, quoting and trailing inline comment.
fn unquote(raw: &str) -> (String, Quote, Option<String>) {
    for quote in [Quote::Double, Quote::Single] {
        if let Some(parsed) = quoted(raw, quote) {
            return parsed;
        }
    }

    // Unquoted: ` #` starts a comment
    match raw.find(" #").or_else(|| raw.find("\t#")) {
        Some(i) => {
            let value = raw[..i].trim_end();
            (
                value.to_string(),
                Quote::None,
                Some(raw[value.len()..].to_string()),
            )
        }
        None => (raw.to_string(), Quote::None, None),
    }
}

/// A value in `quote` marks, optionally followed by a `#` comment.
fn quoted(raw: &str, quote: Quote) -> Option<(String, Quote, Option<String>)> {
    let mark = match quote {
        Quote::Double => '"',
        Quote::Single => '\'',
        Quote::None => return None,
    };
    let body = raw.strip_prefix(mark)?;

    let inner = |end: usize| match quote {
        Quote::Double => unescape_double_quoted(&body[..end]),
        _ => body[..end].to_string(),
    };

    if let Some(end) = closing_quote(body, quote) {
        let tail = &body[end + 1..];
        let rest = tail.trim_start();
        if rest.is_empty() {
            return Some((inner(end), quote, None));
        }
        if rest.starts_with('#') {
            return Some((inner(end), quote, Some(tail.to_string())));
        }
    }

    // Unescaped quotes inside the value: the outer pair still delimits it
    if raw.len() >= 2 && raw.ends_with(mark) {
        return Some((inner(body.len() - 1), quote, None));
    }

    None
}

/// Byte offset of the closing quote in `body`.
fn closing_quote(body: &str, quote: Quote) -> Option<usize> {
    if quote == Quote::Single {
        return body.find('\'');
    }

    let mut escaped = false;
    for (i, ch) in body.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn render_line(line: &Line) -> String {
    match line {
        Line::Verbatim(text) => text.clone(),
        Line::Pair(entry) => render_entry(entry),
    }
}

fn render_entry(entry: &Entry) -> String {
    if let Some(raw) = entry.raw() {
        return raw.to_string();
    }

    let value = entry.value();
    let rendered = match effective_quote(entry.quote(), value) {
        Quote::None => value.to_string(),
        Quote::Single => format!("'{}'", value),
        Quote::Double => format!("\"{}\"", escape_env_value(value)),
    };

    let mut line = String::new();
    if entry.exported() {
        line.push_str("export ");
    }
    line.push_str(entry.key());
    line.push('=');
    line.push_str(&rendered);
    if let Some(comment) = entry.comment() {
        line.push_str(comment);
    }
    if entry.crlf() {
        line.push('\r');
    }
    line
}

/// Keep the line's own style unless the value cannot be written in it.
fn effective_quote(quote: Quote, value: &str) -> Quote {
    match quote {
        Quote::None if needs_quotes(value) => Quote::Double,
        Quote::Single if value.contains(['\'', '\n', '\r']) => Quote::Double,
        other => other,
    }
}

fn needs_quotes(value: &str) -> bool {
    value.chars().any(|ch| ch.is_whitespace())
        || value.contains('#')
        || value.contains('"')
        || value.contains('\'')
        || value.contains('\\')
}

fn unescape_double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

fn escape_env_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(ch),
        }
    }

    escaped
}
