//! RotationRequest and RotationOutcome types.
//!
//! What the command layer asks for, and what it gets back.

use crate::core::domain::{Change, FieldUpdate, RotationPlan};
use crate::core::types::Version;

/// A rotation of one configured path.
#[derive(Debug, Clone)]
pub struct RotationRequest {
    environment: String,
    application: String,
    path: String,
    storage_key: Option<String>,
    updates: Vec<FieldUpdate>,
    dry_run: bool,
}

impl RotationRequest {
    pub fn new(
        environment: impl Into<String>,
        application: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            application: application.into(),
            path: path.into(),
            storage_key: None,
            updates: Vec::new(),
            dry_run: false,
        }
    }

    /// Pick one entry when several share the path.
    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = Some(storage_key.into());
        self
    }

    pub fn with_update(mut self, update: FieldUpdate) -> Self {
        self.updates.push(update);
        self
    }

    pub fn with_updates(mut self, updates: impl IntoIterator<Item = FieldUpdate>) -> Self {
        self.updates.extend(updates);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    pub fn updates(&self) -> &[FieldUpdate] {
        &self.updates
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Result of executing a rotation request.
#[derive(Debug, Clone)]
pub struct RotationOutcome {
    plan: RotationPlan,
    version: Option<Version>,
    dry_run: bool,
}

impl RotationOutcome {
    pub fn new(plan: RotationPlan, version: Option<Version>, dry_run: bool) -> Self {
        Self {
            plan,
            version,
            dry_run,
        }
    }

    /// The computed plan, applied or not.
    pub fn plan(&self) -> &RotationPlan {
        &self.plan
    }

    /// Changes that were written. Empty for dry runs.
    pub fn applied_changes(&self) -> &[Change] {
        if self.dry_run {
            &[]
        } else {
            self.plan.changes()
        }
    }

    /// Store version after the write, if one happened.
    pub fn new_version(&self) -> Option<Version> {
        self.version
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
