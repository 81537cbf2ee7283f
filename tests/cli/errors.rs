//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("rotate"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.run(&["unknown-command"]));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kvrotate "));
}

#[test]
fn test_missing_config_hint() {
    let t = Test::new();

    let output = t.run(&["paths"]);
    assert_failure(&output);

    let err = stderr(&output);
    assert!(err.contains("no configuration found"));
    assert!(err.contains("--config"));
}

#[test]
fn test_config_flag_and_env() {
    let t = Test::new();
    let file = t.dir.path().join("custom.toml");
    std::fs::write(&file, STANDARD_CONFIG).unwrap();

    let output = t.run(&["paths", "--config", file.to_str().unwrap()]);
    assert_success(&output);
    assert!(stdout(&output).contains("helios"));

    let output = t
        .cmd()
        .env("KVROTATE_CONFIG", &file)
        .arg("paths")
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_invalid_config_fails_before_store() {
    let t = Test::with_config("[formats.yaml]\npath_patterns = [\"x\"]\n");

    let output = t.run(&["paths"]);
    assert_failure(&output);
    assert!(stderr(&output).contains("unknown format: yaml"));
}

#[test]
fn test_unknown_path_hint() {
    let t = Test::standard();

    let output = t.rotate("prod", "helios", &["--path", "kv/nope", "--set", "A=1"]);
    assert_failure(&output);

    let err = stderr(&output);
    assert!(err.contains("no entry for path 'kv/nope'"));
    assert!(err.contains("kvrotate paths"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::standard();

    let output = t.run(&["--verbose", "paths"]);
    assert_success(&output);
    assert!(stderr(&output).contains("config loaded"));
}

#[test]
fn test_completions() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_kvrotate"));

    assert_success(&t.run(&["completions", "zsh"]));
    assert_success(&t.run(&["completions", "fish"]));
}

#[test]
fn test_shared_path_needs_key() {
    let t = Test::with_config(
        r#"
[[environments.prod.app]]
path = "kv/app"
storage_key = "env"

[[environments.prod.app]]
path = "kv/app"
storage_key = "extra"
"#,
    );
    t.seed("kv/app", &[("env", "A=1\n"), ("extra", "B=1\n")]);

    let output = t.rotate("prod", "app", &["--path", "kv/app", "--set", "A=2"]);
    assert_failure(&output);
    assert!(stderr(&output).contains("--key"));

    let output = t.rotate(
        "prod",
        "app",
        &["--path", "kv/app", "--key", "env", "--set", "A=2"],
    );
    assert_success(&output);
    assert_eq!(t.payload("kv/app", "env"), "A=2\n");
    assert_eq!(t.payload("kv/app", "extra"), "B=1\n");
}
