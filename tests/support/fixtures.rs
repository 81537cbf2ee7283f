//! Test fixtures.

pub const HELIOS_PATH: &str = "kv/engineering/v1/airflow/helios";
pub const HELIOS_SECRETS_PATH: &str = "kv/engineering/v1/airflow/helios/secrets";
pub const PRICING_PATH: &str = "kv/engineering/v1/pricing";

/// dotenv_export payload with a comment and an unquoted line.
pub const HELIOS_DOTENV: &str = "# helios credentials\n\
export AWS_ACCESS_KEY_ID=\"AKIAOLD\"\n\
export AWS_SECRET_ACCESS_KEY=\"old/secret+key==\"\n\
export REGION=us-east-1\n";

/// json payload with an unrelated key ahead of the credentials.
pub const HELIOS_JSON: &str =
    r#"{"bucket":"helios-data","AWS_ACCESS_KEY":"AKIAOLD","AWS_SECRET_KEY":"oldsecret"}"#;

/// dotenv_plain payload with application-specific key names.
pub const PRICING_ENV: &str = "PRICING_KEY_ID=AKIAOLD\nPRICING_SECRET=oldsecret\n\nDEBUG=false\n";

pub const STANDARD_CONFIG: &str = r#"
[formats.json]
path_patterns = ["/secrets"]

[formats.dotenv_plain]
fields = { access_key = "PRICING_KEY_ID" }

[[environments.prod.helios]]
path = "kv/engineering/v1/airflow/helios"
storage_key = "dotenv"
format = "dotenv_export"
description = "Airflow helios"

[[environments.prod.helios]]
path = "kv/engineering/v1/airflow/helios/secrets"
storage_key = "config"

[[environments.prod.pricing]]
path = "kv/engineering/v1/pricing"
storage_key = "env"
fields = { secret_key = "PRICING_SECRET" }

[environments.staging]
empty = []
"#;
