//! FormatKind type.
//!
//! The closed set of payload conventions a secret can be stored in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Serialization format of a stored secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// A flat JSON object of string values.
    Json,
    /// `KEY=VALUE` lines.
    DotenvPlain,
    /// `export KEY="VALUE"` lines.
    DotenvExport,
}

impl FormatKind {
    /// All formats, in declaration order.
    pub const ALL: [FormatKind; 3] = [
        FormatKind::Json,
        FormatKind::DotenvPlain,
        FormatKind::DotenvExport,
    ];

    /// Name used in configuration files and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::DotenvPlain => "dotenv_plain",
            Self::DotenvExport => "dotenv_export",
        }
    }

    /// Whether this is one of the line-based dotenv formats.
    pub fn is_dotenv(&self) -> bool {
        matches!(self, Self::DotenvPlain | Self::DotenvExport)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFormat(s.to_string()))
    }
}
