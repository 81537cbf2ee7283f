//! Constants used throughout kvrotate.
//!
//! Centralizes file names, environment variables and baseline field names.

/// Configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = ".kvrotate.toml";

/// Directory under the user config dir holding the fallback configuration.
pub const CONFIG_DIR: &str = "kvrotate";

/// File name of the fallback configuration under [`CONFIG_DIR`].
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "KVROTATE_CONFIG";

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "KVROTATE_LOG";

/// Default store root, relative to the configuration file.
pub const DEFAULT_STORE_ROOT: &str = ".kvrotate/store";

/// Logical field for the access key half of a credential pair.
pub const ACCESS_KEY: &str = "access_key";

/// Logical field for the secret key half of a credential pair.
pub const SECRET_KEY: &str = "secret_key";

/// Baseline stored names for `json` and `dotenv_plain` payloads.
pub const PLAIN_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const PLAIN_SECRET_KEY: &str = "AWS_SECRET_KEY";

/// Baseline stored names for `dotenv_export` payloads.
pub const EXPORT_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";
pub const EXPORT_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// Length of generated secret values.
pub const GENERATED_LENGTH: usize = 32;

/// Alphabet for generated secret values.
pub const GENERATED_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

/// Default number of paths rotated concurrently.
pub const DEFAULT_JOBS: usize = 4;
