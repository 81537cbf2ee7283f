//! Domain types.

mod entry;
mod format;
mod plan;
mod request;
mod secret;
mod update;

pub use entry::PathEntry;
pub use format::FormatKind;
pub use plan::{Change, ChangeKind, RotationPlan};
pub use request::{RotationOutcome, RotationRequest};
pub use secret::{DecodedSecret, Entry, Layout, Line, Quote};
pub use update::FieldUpdate;
