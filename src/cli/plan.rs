//! Plan command.

use crate::cli::{output, Target};
use crate::core::engine::Engine;
use crate::core::store::FileStore;
use crate::error::{Result, RotationError};

/// Print the plan for every targeted path. Nothing is written.
pub fn execute(engine: &Engine<FileStore>, target: &Target) -> Result<()> {
    let requests = target.requests(engine, true)?;
    let total = requests.len();
    let mut failed = 0;

    for request in &requests {
        match engine.plan(request) {
            Ok(plan) => {
                println!("{}", plan);
                if plan.is_empty() {
                    output::item(2, output::dim("nothing to change"));
                }
            }
            Err(e) if total == 1 => return Err(e),
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
