//! Command-line interface.

pub mod check;
pub mod output;
pub mod paths;
pub mod plan;
pub mod rotate;

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::core::config::Config;
use crate::core::constants::{DEFAULT_JOBS, GENERATED_LENGTH};
use crate::core::domain::{FieldUpdate, RotationRequest};
use crate::core::engine::Engine;
use crate::core::store::FileStore;
use crate::error::Result;

/// kvrotate - Format-preserving credential rotation.
#[derive(Parser)]
#[command(
    name = "kvrotate",
    about = "Rotate credentials in versioned key-value secret stores without disturbing the rest of the payload",
    version
)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "KVROTATE_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store root directory, overriding the configuration
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// List configured environments, applications and paths
    Paths {
        /// Only this environment
        #[arg(long)]
        env: Option<String>,
        /// Only this application
        #[arg(long)]
        app: Option<String>,
    },

    /// Show what a rotation would change, without writing
    Plan(Target),

    /// Rotate credentials
    Rotate {
        #[command(flatten)]
        target: Target,
        /// Compute and print the plan only
        #[arg(long)]
        dry_run: bool,
        /// Number of paths rotated concurrently
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,
    },

    /// Fetch and decode every path of an application, read-only
    Check {
        #[arg(long)]
        env: String,
        #[arg(long)]
        app: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which paths to rotate, and with what.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Environment name
    #[arg(long)]
    pub env: String,

    /// Application name
    #[arg(long)]
    pub app: String,

    /// A single secret path (default: every path of the application)
    #[arg(long)]
    pub path: Option<String>,

    /// Storage key, when several entries share the path
    #[arg(long, requires = "path")]
    pub key: Option<String>,

    /// New value for a field
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<FieldUpdate>,

    /// Generate a random value for a field
    #[arg(long = "generate", value_name = "FIELD")]
    pub generate: Vec<String>,
}

impl Target {
    /// Explicit and generated updates, in that order.
    pub fn updates(&self) -> Result<Vec<FieldUpdate>> {
        let mut updates = self.set.clone();
        for field in &self.generate {
            updates.push(FieldUpdate::generate(field.as_str(), GENERATED_LENGTH)?);
        }
        Ok(updates)
    }

    /// One request per targeted path.
    pub fn requests(&self, engine: &Engine<FileStore>, dry_run: bool) -> Result<Vec<RotationRequest>> {
        let updates = self.updates()?;

        match &self.path {
            Some(path) => {
                let mut request = RotationRequest::new(&self.env, &self.app, path)
                    .with_updates(updates)
                    .dry_run(dry_run);
                if let Some(key) = &self.key {
                    request = request.with_storage_key(key);
                }
                Ok(vec![request])
            }
            None => engine.requests_for(&self.env, &self.app, &updates, dry_run),
        }
    }
}

/// Build the engine from the discovered configuration.
fn engine(config: Option<PathBuf>, store: Option<PathBuf>) -> Result<Engine<FileStore>> {
    let config = Config::discover(config.as_deref())?;
    let root = store.unwrap_or_else(|| config.store_root());
    tracing::debug!(root = %root.display(), "using file store");

    Ok(Engine::new(
        config.registry()?,
        config.catalog()?,
        FileStore::new(root),
    ))
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    let Cli {
        config,
        store,
        command,
        ..
    } = cli;

    match command {
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kvrotate", &mut std::io::stdout());
            Ok(())
        }
        Command::Paths { env, app } => paths::execute(&engine(config, store)?, env, app),
        Command::Plan(target) => plan::execute(&engine(config, store)?, &target),
        Command::Rotate {
            target,
            dry_run,
            jobs,
        } => rotate::execute(&engine(config, store)?, &target, dry_run, jobs),
        Command::Check { env, app } => check::execute(&engine(config, store)?, &env, &app),
    }
}
