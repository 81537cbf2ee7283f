//! Check command.

use crate::cli::output;
use crate::core::engine::{Checked, Engine};
use crate::core::store::SecretStore;
use crate::error::{Result, RotationError};

/// Fetch, resolve and decode every path of an application.
pub fn execute<S: SecretStore>(engine: &Engine<S>, env: &str, app: &str) -> Result<()> {
    let reports = engine.check(env, app)?;
    let total = reports.len();
    let mut failed = 0;

    output::header(&format!("{}/{}", env, app));

    for report in &reports {
        match &report.result {
            Ok(checked) => {
                output::success(&format!(
                    "{} [{}]",
                    output::path(report.entry.path()),
                    report.entry.storage_key()
                ));
                print_checked(checked);
            }
            Err(e) => {
                output::error(&e.to_string());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(RotationError::Failed { failed, total }.into());
    }
    Ok(())
}

fn print_checked(checked: &Checked) {
    output::kv(
        "format",
        format!("{} ({})", checked.format, checked.resolved_by),
    );
    output::kv("version", checked.version);
    output::kv("keys", checked.keys);

    for field in &checked.fields {
        output::item(
            4,
            format!(
                "{} {} {} {}",
                output::mark(field.present),
                field.logical,
                output::dim("→"),
                output::key(&field.stored)
            ),
        );
    }
}
