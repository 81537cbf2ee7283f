//! Test support utilities for kvrotate integration tests.
//!
//! Provides an isolated project directory with a config file and a file
//! store, plus helpers to run the binary against it.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Child processes run with `.current_dir()` set to `dir`, so tests can run
/// in parallel without touching process-global state.
pub struct Test {
    /// Project directory holding `.kvrotate.toml` and the store
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
}

impl Test {
    /// An empty project with no configuration.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");

        Self { dir, home }
    }

    /// A project with the given `.kvrotate.toml`.
    pub fn with_config(config: &str) -> Self {
        let t = Self::new();
        t.write_config(config);
        t
    }

    /// The standard fixture: config plus seeded store documents.
    pub fn standard() -> Self {
        let t = Self::with_config(STANDARD_CONFIG);
        t.seed(HELIOS_PATH, &[("dotenv", HELIOS_DOTENV)]);
        t.seed(HELIOS_SECRETS_PATH, &[("config", HELIOS_JSON)]);
        t.seed(PRICING_PATH, &[("env", PRICING_ENV)]);
        t
    }

    pub fn write_config(&self, config: &str) {
        fs::write(self.dir.path().join(".kvrotate.toml"), config)
            .expect("failed to write config");
    }

    /// Store document file for a secret path.
    pub fn document(&self, path: &str) -> PathBuf {
        self.dir
            .path()
            .join(".kvrotate/store")
            .join(format!("{}.json", path.trim_matches('/')))
    }

    /// Write a store document at version 1.
    pub fn seed(&self, path: &str, data: &[(&str, &str)]) {
        let data: serde_json::Map<String, Value> = data
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        let doc = json!({
            "version": 1,
            "updated_at": "2026-01-01T00:00:00Z",
            "data": data,
        });

        let file = self.document(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    }

    /// Raw store document.
    pub fn read_document(&self, path: &str) -> Value {
        let contents = fs::read_to_string(self.document(path)).expect("missing store document");
        serde_json::from_str(&contents).expect("invalid store document")
    }

    /// Stored payload under one storage key.
    pub fn payload(&self, path: &str, storage_key: &str) -> String {
        self.read_document(path)["data"][storage_key]
            .as_str()
            .expect("payload is not a string")
            .to_string()
    }

    /// Document version.
    pub fn version(&self, path: &str) -> u64 {
        self.read_document(path)["version"]
            .as_u64()
            .expect("version is not a number")
    }
}
