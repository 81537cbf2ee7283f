//! Rotate command.
//!
//! Rotates one path, or every path of an application, and prints one line
//! per path. Values are never printed.

use crate::cli::{output, Target};
use crate::core::domain::RotationOutcome;
use crate::core::engine::Engine;
use crate::core::store::FileStore;
use crate::error::{Result, RotationError};

/// Rotate the targeted paths.
pub fn execute(engine: &Engine<FileStore>, target: &Target, dry_run: bool, jobs: usize) -> Result<()> {
    let requests = target.requests(engine, dry_run)?;
    if requests.is_empty() {
        output::warn(&format!("no paths configured for {}/{}", target.env, target.app));
        return Ok(());
    }

    let summary = engine.execute_all(&requests, jobs);
    let total = summary.reports().len();
    let failed = summary.failed();

    for report in summary.into_reports() {
        match report.result {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) if total == 1 => return Err(e),
            Err(e) => output::error(&e.to_string()),
        }
    }

    if dry_run {
        output::hint("dry run, nothing written");
    }

    if failed > 0 {
        return Err(RotationError::Failed { failed, total }.into());
    }

    Ok(())
}

fn print_outcome(outcome: &RotationOutcome) {
    let plan = outcome.plan();
    if outcome.is_dry_run() {
        println!("{}", plan);
        return;
    }

    match outcome.new_version() {
        Some(version) => output::success(&format!(
            "{} ({}) v{}: {} updated, {} inserted, {} unchanged",
            output::path(plan.path()),
            plan.format(),
            version,
            plan.updated(),
            plan.inserted(),
            plan.unchanged()
        )),
        None => output::success(&format!(
            "{} ({}): already current",
            output::path(plan.path()),
            plan.format()
        )),
    }
}
