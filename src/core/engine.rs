//! Rotation engine.
//!
//! Ties the registry, catalog, resolver and store together. Every error
//! returned from here names the environment, application and path it
//! belongs to, and the stage that failed.
//!
//! # Parallelism
//!
//! [`Engine::execute_all`] groups requests by normalized path. Requests
//! for one path run in order on a single worker; distinct paths run on up
//! to `workers` scoped threads. A failure is recorded for its request and
//! never stops the others.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, warn};

use crate::core::catalog::FormatCatalog;
use crate::core::codec;
use crate::core::constants::{ACCESS_KEY, SECRET_KEY};
use crate::core::domain::{
    FieldUpdate, FormatKind, PathEntry, RotationOutcome, RotationPlan, RotationRequest,
};
use crate::core::path;
use crate::core::planner::Planner;
use crate::core::registry::Registry;
use crate::core::resolve::{FieldSource, Resolver};
use crate::core::store::{Fetched, SecretStore};
use crate::core::types::Version;
use crate::error::{PathContext, Result, Stage};

/// Result of one request in a batch.
#[derive(Debug)]
pub struct Report {
    pub environment: String,
    pub application: String,
    pub path: String,
    pub result: Result<RotationOutcome>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-request results of a batch, in request order.
#[derive(Debug, Default)]
pub struct Summary {
    reports: Vec<Report>,
}

impl Summary {
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }

    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Whether every request succeeded.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Number of changes written, across all requests.
    pub fn applied(&self) -> usize {
        self.reports
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|o| o.applied_changes().len())
            .sum()
    }
}

/// How one credential field resolves for a checked entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub logical: String,
    pub stored: String,
    pub source: FieldSource,
    /// Whether the stored key exists in the payload.
    pub present: bool,
}

/// What a read-only check found at one path.
#[derive(Debug, Clone)]
pub struct Checked {
    pub format: FormatKind,
    pub resolved_by: &'static str,
    pub version: Version,
    /// Number of distinct keys in the payload.
    pub keys: usize,
    pub fields: Vec<FieldCheck>,
}

/// Check result for one configured entry.
#[derive(Debug)]
pub struct CheckReport {
    pub entry: PathEntry,
    pub result: Result<Checked>,
}

/// The rotation engine.
pub struct Engine<S> {
    registry: Registry,
    catalog: FormatCatalog,
    resolver: Resolver,
    store: S,
}

impl<S: SecretStore> Engine<S> {
    pub fn new(registry: Registry, catalog: FormatCatalog, store: S) -> Self {
        Self {
            registry,
            catalog,
            resolver: Resolver::default(),
            store,
        }
    }

    /// Replace the default strategy list.
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn planner(&self) -> Planner<'_> {
        Planner::new(&self.catalog, &self.resolver)
    }

    /// Compute the plan for a request without writing.
    pub fn plan(&self, request: &RotationRequest) -> Result<RotationPlan> {
        let context = context(request);
        self.plan_inner(request).map_err(|e| e.for_path(context))
    }

    fn plan_inner(&self, request: &RotationRequest) -> Result<RotationPlan> {
        let entry = self.entry(request)?;
        let payload = self.fetch(entry)?.payload;
        self.planner().plan(entry, &payload, request.updates())
    }

    /// Run a request. Dry-run requests stop after planning.
    pub fn execute(&self, request: &RotationRequest) -> Result<RotationOutcome> {
        let context = context(request);
        self.execute_inner(request).map_err(|e| e.for_path(context))
    }

    fn execute_inner(&self, request: &RotationRequest) -> Result<RotationOutcome> {
        let entry = self.entry(request)?;
        let fetched = self.fetch(entry)?;
        let planner = self.planner();

        if request.is_dry_run() {
            let plan = planner.plan(entry, &fetched.payload, request.updates())?;
            return Ok(RotationOutcome::new(plan, None, true));
        }

        let applied = planner
            .apply(entry, &fetched, request.updates(), &self.store)
            .map_err(|e| match e.stage() {
                Some(_) => e,
                None => e.at(Stage::Write),
            })?;

        Ok(RotationOutcome::new(applied.plan, applied.version, false))
    }

    /// Look up the entry and settle what can be resolved before fetching.
    fn entry(&self, request: &RotationRequest) -> Result<&PathEntry> {
        let entry = self
            .registry
            .find_key(
                request.environment(),
                request.application(),
                request.path(),
                request.storage_key(),
            )
            .map_err(|e| e.at(Stage::Lookup))?;

        if let Some((format, by)) = self
            .resolver
            .declared(entry, &self.catalog)
            .map_err(|e| e.at(Stage::Resolve))?
        {
            debug!(path = entry.path(), %format, resolved_by = by, "format known before fetch");
        }

        Ok(entry)
    }

    fn fetch(&self, entry: &PathEntry) -> Result<Fetched> {
        self.store
            .fetch(entry.path(), entry.storage_key())
            .map_err(|e| e.at(Stage::Fetch))
    }

    /// Run many requests, at most `workers` at a time.
    pub fn execute_all(&self, requests: &[RotationRequest], workers: usize) -> Summary {
        let units = group_by_path(requests);
        let workers = workers.max(1).min(units.len().max(1));
        let next = AtomicUsize::new(0);

        debug!(requests = requests.len(), units = units.len(), workers, "executing batch");

        let mut results: Vec<(usize, Result<RotationOutcome>)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        loop {
                            let i = next.fetch_add(1, Ordering::Relaxed);
                            let Some(unit) = units.get(i) else {
                                break;
                            };
                            for &index in unit {
                                done.push((index, self.execute(&requests[index])));
                            }
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        });

        results.sort_by_key(|(index, _)| *index);

        let reports = results
            .into_iter()
            .map(|(index, result)| {
                let request = &requests[index];
                if let Err(e) = &result {
                    warn!(path = request.path(), error = %e, "rotation failed");
                }
                Report {
                    environment: request.environment().to_string(),
                    application: request.application().to_string(),
                    path: request.path().to_string(),
                    result,
                }
            })
            .collect();

        Summary { reports }
    }

    /// One request per configured entry of an application.
    pub fn requests_for(
        &self,
        environment: &str,
        application: &str,
        updates: &[FieldUpdate],
        dry_run: bool,
    ) -> Result<Vec<RotationRequest>> {
        Ok(self
            .registry
            .lookup(environment, application)?
            .iter()
            .map(|entry| {
                RotationRequest::new(environment, application, entry.path())
                    .with_storage_key(entry.storage_key())
                    .with_updates(updates.iter().cloned())
                    .dry_run(dry_run)
            })
            .collect())
    }

    /// Fetch, resolve and decode every entry of an application, read-only.
    ///
    /// # Errors
    ///
    /// Only lookup failures are returned here; per-entry failures are
    /// recorded in the reports.
    pub fn check(&self, environment: &str, application: &str) -> Result<Vec<CheckReport>> {
        let entries = self.registry.lookup(environment, application)?;

        Ok(entries
            .iter()
            .map(|entry| {
                let context = PathContext {
                    environment: environment.to_string(),
                    application: application.to_string(),
                    path: entry.path().to_string(),
                };
                CheckReport {
                    entry: entry.clone(),
                    result: self.check_entry(entry).map_err(|e| e.for_path(context)),
                }
            })
            .collect())
    }

    fn check_entry(&self, entry: &PathEntry) -> Result<Checked> {
        let fetched = self.fetch(entry)?;
        let resolution = self
            .resolver
            .resolve(entry, &self.catalog, Some(&fetched.payload))
            .map_err(|e| e.at(Stage::Resolve))?;
        let decoded = codec::decode(resolution.format(), &fetched.payload)
            .map_err(|e| e.at(Stage::Decode))?;

        let mut logical: BTreeSet<&str> = BTreeSet::from([ACCESS_KEY, SECRET_KEY]);
        logical.extend(entry.fields().keys().map(String::as_str));
        if let Some(spec) = self.catalog.spec(resolution.format()) {
            logical.extend(spec.fields().keys().map(String::as_str));
        }

        let fields = logical
            .into_iter()
            .map(|name| {
                let (stored, source) = resolution.fields().lookup(name);
                FieldCheck {
                    logical: name.to_string(),
                    stored: stored.to_string(),
                    source,
                    present: decoded.contains(stored),
                }
            })
            .collect();

        Ok(Checked {
            format: resolution.format(),
            resolved_by: resolution.resolved_by(),
            version: fetched.version,
            keys: decoded.len(),
            fields,
        })
    }
}

fn context(request: &RotationRequest) -> PathContext {
    PathContext {
        environment: request.environment().to_string(),
        application: request.application().to_string(),
        path: request.path().to_string(),
    }
}

/// Request indices grouped by normalized path, in first-seen order.
fn group_by_path(requests: &[RotationRequest]) -> Vec<Vec<usize>> {
    let mut units: Vec<Vec<usize>> = Vec::new();
    let mut by_path: HashMap<String, usize> = HashMap::new();

    for (index, request) in requests.iter().enumerate() {
        match path::normalize(request.path()) {
            Ok(normalized) => {
                let unit = *by_path.entry(normalized).or_insert_with(|| {
                    units.push(Vec::new());
                    units.len() - 1
                });
                units[unit].push(index);
            }
            // Fails again at lookup and is reported there
            Err(_) => units.push(vec![index]),
        }
    }

    units
}

impl<S> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("entries", &self.registry.len())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::FormatSpec;
    use crate::core::store::MemoryStore;
    use crate::error::{ConfigError, Error, StoreError};

    fn engine() -> Engine<MemoryStore> {
        let mut registry = Registry::new();
        registry
            .insert(
                "prod",
                "helios",
                PathEntry::new("kv/helios", "dotenv")
                    .unwrap()
                    .with_format(FormatKind::DotenvExport),
            )
            .unwrap();
        registry
            .insert(
                "prod",
                "helios",
                PathEntry::new("kv/helios/secrets", "config").unwrap(),
            )
            .unwrap();

        let catalog = FormatCatalog::new()
            .with(FormatKind::Json, FormatSpec::new().with_pattern("/secrets"))
            .unwrap();

        let store = MemoryStore::new()
            .with_secret(
                "kv/helios",
                "dotenv",
                "export AWS_ACCESS_KEY_ID=\"a\"\nexport AWS_SECRET_ACCESS_KEY=\"b\"\n",
            )
            .with_secret(
                "kv/helios/secrets",
                "config",
                r#"{"AWS_ACCESS_KEY":"a","AWS_SECRET_KEY":"b"}"#,
            );

        Engine::new(registry, catalog, store)
    }

    fn rotate_access(path: &str) -> RotationRequest {
        RotationRequest::new("prod", "helios", path)
            .with_update(FieldUpdate::new("access_key", "NEW").unwrap())
    }

    #[test]
    fn test_execute_writes() {
        let engine = engine();
        let outcome = engine.execute(&rotate_access("/kv/helios/")).unwrap();

        assert_eq!(outcome.new_version(), Some(2));
        assert_eq!(outcome.applied_changes().len(), 1);
        assert_eq!(
            engine.store().get("kv/helios", "dotenv").as_deref(),
            Some("export AWS_ACCESS_KEY_ID=\"NEW\"\nexport AWS_SECRET_ACCESS_KEY=\"b\"\n")
        );
    }

    #[test]
    fn test_dry_run_never_writes() {
        let engine = engine();
        let outcome = engine
            .execute(&rotate_access("kv/helios").dry_run(true))
            .unwrap();

        assert!(outcome.is_dry_run());
        assert!(outcome.applied_changes().is_empty());
        assert_eq!(outcome.plan().changes().len(), 1);
        assert_eq!(outcome.new_version(), None);
        assert_eq!(engine.store().writes(), 0);
    }

    #[test]
    fn test_plan_matches_execute() {
        let engine = engine();
        let plan = engine.plan(&rotate_access("kv/helios/secrets")).unwrap();
        let outcome = engine.execute(&rotate_access("kv/helios/secrets")).unwrap();

        assert_eq!(&plan, outcome.plan());
        assert_eq!(plan.format(), FormatKind::Json);
    }

    #[test]
    fn test_errors_carry_context() {
        let engine = engine();
        engine.store().deny("kv/helios");

        let err = engine.execute(&rotate_access("kv/helios")).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Fetch));
        assert!(matches!(err.root(), Error::Store(StoreError::AccessDenied(_))));
        assert!(err.to_string().starts_with("prod/helios kv/helios: fetch:"));

        let err = engine.execute(&rotate_access("kv/missing")).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Lookup));
        assert!(err.is_config());
        assert!(matches!(
            err.root(),
            Error::Config(ConfigError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_stale_write_is_write_stage() {
        struct Racing(MemoryStore);

        impl SecretStore for Racing {
            fn fetch(&self, path: &str, key: &str) -> Result<Fetched> {
                let fetched = self.0.fetch(path, key)?;
                self.0.insert(path, "other", "x");
                Ok(fetched)
            }

            fn write(&self, path: &str, key: &str, payload: &str, cas: Version) -> Result<Version> {
                self.0.write(path, key, payload, cas)
            }
        }

        let engine = engine();
        let Engine {
            registry,
            catalog,
            store,
            ..
        } = engine;
        let engine = Engine::new(registry, catalog, Racing(store));

        let err = engine.execute(&rotate_access("kv/helios")).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Write));
        assert!(matches!(err.root(), Error::Store(StoreError::Conflict { .. })));
    }

    #[test]
    fn test_execute_all_isolates_failures() {
        let engine = engine();
        engine.store().deny("kv/helios/secrets");

        let requests = vec![
            rotate_access("kv/helios"),
            rotate_access("kv/helios/secrets"),
            rotate_access("kv/nowhere"),
        ];
        let summary = engine.execute_all(&requests, 4);

        assert_eq!(summary.reports().len(), 3);
        assert!(summary.reports()[0].is_ok());
        assert!(!summary.reports()[1].is_ok());
        assert!(!summary.reports()[2].is_ok());
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.applied(), 1);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_execute_all_same_path_runs_in_order() {
        let engine = engine();
        let requests = vec![
            RotationRequest::new("prod", "helios", "kv/helios")
                .with_update(FieldUpdate::new("access_key", "one").unwrap()),
            RotationRequest::new("prod", "helios", "/kv/helios")
                .with_update(FieldUpdate::new("secret_key", "two").unwrap()),
        ];

        let summary = engine.execute_all(&requests, 8);

        assert!(summary.is_success());
        assert_eq!(engine.store().version("kv/helios"), Some(3));
        assert_eq!(
            engine.store().get("kv/helios", "dotenv").as_deref(),
            Some("export AWS_ACCESS_KEY_ID=\"one\"\nexport AWS_SECRET_ACCESS_KEY=\"two\"\n")
        );
    }

    #[test]
    fn test_requests_for_application() {
        let engine = engine();
        let updates = [FieldUpdate::new("access_key", "x").unwrap()];
        let requests = engine
            .requests_for("prod", "helios", &updates, true)
            .unwrap();

        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.is_dry_run()));
        assert_eq!(requests[1].storage_key(), Some("config"));
    }

    #[test]
    fn test_check_reports_each_entry() {
        let engine = engine();
        engine.store().deny("kv/helios/secrets");

        let reports = engine.check("prod", "helios").unwrap();
        assert_eq!(reports.len(), 2);

        let checked = reports[0].result.as_ref().unwrap();
        assert_eq!(checked.format, FormatKind::DotenvExport);
        assert_eq!(checked.resolved_by, "declared");
        assert_eq!(checked.keys, 2);
        assert!(checked.fields.iter().all(|f| f.present));

        assert!(reports[1].result.is_err());
        assert_eq!(engine.store().writes(), 0);
    }

    #[test]
    fn test_group_by_path() {
        let requests = vec![
            rotate_access("kv/a"),
            rotate_access("kv/b"),
            rotate_access("/kv/a/"),
            rotate_access(""),
        ];
        assert_eq!(group_by_path(&requests), vec![vec![0, 2], vec![1], vec![3]]);
    }
}
