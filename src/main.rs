//! kvrotate - Format-preserving credential rotation.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kvrotate::cli::output;
use kvrotate::cli::{execute, Cli};
use kvrotate::core::constants::LOG_ENV;
use kvrotate::error::{ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kvrotate=debug")
        } else {
            EnvFilter::new("kvrotate=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match e.root() {
            Error::Config(ConfigError::NotFound(_)) => {
                Some("create .kvrotate.toml or pass --config <FILE>")
            }
            Error::Config(ConfigError::UnknownEnvironment(_))
            | Error::Config(ConfigError::UnknownApplication { .. })
            | Error::Config(ConfigError::PathNotFound { .. }) => Some("run: kvrotate paths"),
            Error::Config(ConfigError::AmbiguousPath { .. }) => Some("pass --key to pick one entry"),
            Error::Config(ConfigError::AmbiguousFormat { .. }) => {
                Some("set `format` on the entry in the configuration")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
