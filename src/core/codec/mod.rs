//! Secret payload codecs.
//!
//! One codec per [`FormatKind`]. Every codec satisfies
//! `encode(decode(payload)) == payload` for payloads it accepts; for JSON
//! the guarantee is on keys, values and order rather than whitespace.
//!
//! ## Adding a Format
//!
//! 1. Add a variant to `FormatKind`
//! 2. Implement `Codec` in a new file
//! 3. Return it from `for_kind`

mod dotenv;
mod json;

pub use dotenv::Dotenv;
pub use json::Json;

use crate::core::domain::{DecodedSecret, FormatKind};
use crate::error::Result;

/// Decode and encode one payload format.
pub trait Codec: Send + Sync {
    /// Format handled by this codec.
    fn kind(&self) -> FormatKind;

    /// Parse a payload into an ordered key/value view.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Parse` or `FormatError::UnsupportedShape` when
    /// the payload does not follow the format.
    fn decode(&self, payload: &str) -> Result<DecodedSecret>;

    /// Render a decoded secret back to text.
    fn encode(&self, secret: &DecodedSecret) -> Result<String>;
}

static JSON: Json = Json;
static DOTENV_PLAIN: Dotenv = Dotenv::plain();
static DOTENV_EXPORT: Dotenv = Dotenv::export();

/// The codec for a format.
pub fn for_kind(kind: FormatKind) -> &'static dyn Codec {
    match kind {
        FormatKind::Json => &JSON,
        FormatKind::DotenvPlain => &DOTENV_PLAIN,
        FormatKind::DotenvExport => &DOTENV_EXPORT,
    }
}

/// Decode `payload` as `kind`.
pub fn decode(kind: FormatKind, payload: &str) -> Result<DecodedSecret> {
    for_kind(kind).decode(payload)
}

/// Encode a secret with the codec of its own format.
pub fn encode(secret: &DecodedSecret) -> Result<String> {
    for_kind(secret.format()).encode(secret)
}

/// Classify a dotenv payload by its pair lines.
///
/// Returns `Some(DotenvExport)` when every pair is `export`-prefixed,
/// `Some(DotenvPlain)` when none is, and `None` for mixed, empty or
/// unparseable payloads.
pub fn sniff_dotenv(payload: &str) -> Option<FormatKind> {
    let secret = DOTENV_PLAIN.decode(payload).ok()?;
    let mut entries = secret.entries().peekable();
    entries.peek()?;

    let (exported, plain): (Vec<_>, Vec<_>) = entries.partition(|e| e.exported());
    match (exported.is_empty(), plain.is_empty()) {
        (false, true) => Some(FormatKind::DotenvExport),
        (true, false) => Some(FormatKind::DotenvPlain),
        _ => None,
    }
}
