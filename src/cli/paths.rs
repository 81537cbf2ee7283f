//! Paths command.
//!
//! Lists environments, applications and their entries with the format each
//! entry resolves to before any payload is fetched.

use crate::cli::output;
use crate::core::domain::PathEntry;
use crate::core::engine::Engine;
use crate::core::store::SecretStore;
use crate::error::Result;

/// List configured paths, optionally narrowed to one environment or app.
pub fn execute<S: SecretStore>(
    engine: &Engine<S>,
    env: Option<String>,
    app: Option<String>,
) -> Result<()> {
    let registry = engine.registry();

    let environments: Vec<&str> = match env.as_deref() {
        Some(env) => {
            registry.applications(env)?;
            vec![env]
        }
        None => registry.environments(),
    };

    if environments.is_empty() {
        output::warn("no environments configured");
        return Ok(());
    }

    for environment in environments {
        output::header(environment);

        let applications: Vec<&str> = match app.as_deref() {
            Some(app) => {
                registry.lookup(environment, app)?;
                vec![app]
            }
            None => registry.applications(environment)?,
        };

        for application in applications {
            output::item(2, application);
            let entries = registry.lookup(environment, application)?;
            if entries.is_empty() {
                output::item(4, output::dim("no paths"));
            }
            for entry in entries {
                output::item(4, describe(engine, entry));
            }
        }
    }

    Ok(())
}

fn describe<S: SecretStore>(engine: &Engine<S>, entry: &PathEntry) -> String {
    let format = match engine.resolver().declared(entry, engine.catalog()) {
        Ok(Some((format, by))) => format!("{} ({})", format, by),
        Ok(None) => "detected from content".to_string(),
        Err(e) => format!("{}", e),
    };

    let mut line = format!(
        "{} [{}]  {}",
        output::path(entry.path()),
        entry.storage_key(),
        output::dim(&format)
    );
    if !entry.description().is_empty() {
        line.push_str(&format!("  {}", output::dim(entry.description())));
    }
    line
}
