//! JSON codec.
//!
//! Flat objects of string values. Key order is kept through `IndexMap`.

use indexmap::IndexMap;
use serde_json::Value;

use super::Codec;
use crate::core::domain::{DecodedSecret, Entry, FormatKind, Layout, Line};
use crate::error::{FormatError, Result};

/// Codec for `json` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Codec for Json {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    fn decode(&self, payload: &str) -> Result<DecodedSecret> {
        let object: IndexMap<String, Value> = match serde_json::from_str(payload) {
            Ok(object) => object,
            Err(err) => return Err(classify(payload, err)),
        };

        let layout = Layout {
            trailing_newline: payload.ends_with('\n'),
            pretty: payload.trim().contains('\n'),
        };
        let mut secret = DecodedSecret::new(FormatKind::Json, layout);

        for (key, value) in object {
            match value {
                Value::String(value) => secret.push(Line::Pair(Entry::new(key, value))),
                other => {
                    return Err(FormatError::UnsupportedShape(format!(
                        "value of '{}' is {}, expected a string",
                        key,
                        describe(&other)
                    ))
                    .into())
                }
            }
        }

        Ok(secret)
    }

    fn encode(&self, secret: &DecodedSecret) -> Result<String> {
        if secret.format() != FormatKind::Json {
            return Err(FormatError::UnsupportedShape(format!(
                "cannot encode a {} secret as json",
                secret.format()
            ))
            .into());
        }

        let object: IndexMap<&str, &str> = secret.pairs().into_iter().collect();
        let encoded = if secret.layout().pretty {
            serde_json::to_string_pretty(&object)
        } else {
            serde_json::to_string(&object)
        };

        let mut out = encoded.map_err(|e| FormatError::UnsupportedShape(e.to_string()))?;
        if secret.layout().trailing_newline {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Tell invalid JSON apart from valid JSON that is not an object.
fn classify(payload: &str, err: serde_json::Error) -> crate::error::Error {
    match serde_json::from_str::<Value>(payload) {
        Ok(other) => FormatError::UnsupportedShape(format!(
            "expected a JSON object, found {}",
            describe(&other)
        ))
        .into(),
        Err(_) => FormatError::Parse {
            line: err.line(),
            reason: err.to_string(),
        }
        .into(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
