//! Dry-run planning and apply.
//!
//! Runs resolve, decode, merge and encode for one entry. [`Planner::plan`]
//! stops there; [`Planner::apply`] hands the encoded payload to a store.

use tracing::{debug, info};

use crate::core::catalog::FormatCatalog;
use crate::core::codec;
use crate::core::domain::{FieldUpdate, PathEntry, RotationPlan};
use crate::core::merge;
use crate::core::resolve::{Resolution, Resolver};
use crate::core::store::{Fetched, SecretStore};
use crate::core::types::Version;
use crate::error::{Result, Stage};

/// A computed plan and the payload it would write.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub plan: RotationPlan,
    pub resolution: Resolution,
    /// Encoded payload after the merge.
    pub payload: String,
}

/// A plan and the version it was written at.
#[derive(Debug, Clone)]
pub struct Applied {
    pub plan: RotationPlan,
    /// `None` when the plan was empty and nothing was written.
    pub version: Option<Version>,
}

/// Plans and applies rotations against one catalog.
#[derive(Debug)]
pub struct Planner<'a> {
    catalog: &'a FormatCatalog,
    resolver: &'a Resolver,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a FormatCatalog, resolver: &'a Resolver) -> Self {
        Self { catalog, resolver }
    }

    /// Compute the plan for `updates` without writing anything.
    ///
    /// Encoding runs too, so a payload that cannot be written back fails
    /// here rather than at apply time.
    pub fn plan(
        &self,
        entry: &PathEntry,
        payload: &str,
        updates: &[FieldUpdate],
    ) -> Result<RotationPlan> {
        self.prepare(entry, payload, updates).map(|p| p.plan)
    }

    /// Plan plus the encoded payload.
    pub fn prepare(
        &self,
        entry: &PathEntry,
        payload: &str,
        updates: &[FieldUpdate],
    ) -> Result<Prepared> {
        let resolution = self
            .resolver
            .resolve(entry, self.catalog, Some(payload))
            .map_err(|e| e.at(Stage::Resolve))?;
        let format = resolution.format();

        let decoded = codec::decode(format, payload).map_err(|e| e.at(Stage::Decode))?;
        let merged =
            merge::apply(decoded, updates, resolution.fields()).map_err(|e| e.at(Stage::Merge))?;
        let encoded = codec::encode(&merged.secret).map_err(|e| e.at(Stage::Encode))?;

        debug!(
            path = entry.path(),
            %format,
            resolved_by = resolution.resolved_by(),
            changes = merged.changes.len(),
            unchanged = merged.unchanged,
            "planned rotation"
        );

        Ok(Prepared {
            plan: RotationPlan::new(entry.path(), format, merged.changes, merged.unchanged),
            resolution,
            payload: encoded,
        })
    }

    /// Compute the plan and write it.
    ///
    /// The write is a check-and-set on the fetched version. An empty plan
    /// is not written. Store errors are returned as the store raised them.
    pub fn apply<S: SecretStore + ?Sized>(
        &self,
        entry: &PathEntry,
        fetched: &Fetched,
        updates: &[FieldUpdate],
        writer: &S,
    ) -> Result<Applied> {
        let prepared = self.prepare(entry, &fetched.payload, updates)?;

        if prepared.plan.is_empty() {
            info!(path = entry.path(), "nothing to rotate");
            return Ok(Applied {
                plan: prepared.plan,
                version: None,
            });
        }

        let version = writer.write(
            entry.path(),
            entry.storage_key(),
            &prepared.payload,
            fetched.version,
        )?;

        info!(
            path = entry.path(),
            version,
            changes = prepared.plan.changes().len(),
            "rotated"
        );

        Ok(Applied {
            plan: prepared.plan,
            version: Some(version),
        })
    }
}
