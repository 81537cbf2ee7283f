//! Tests for `kvrotate paths`.

use crate::support::*;

#[test]
fn test_lists_everything() {
    let t = Test::standard();

    let output = t.run(&["paths"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("prod"));
    assert!(out.contains("staging"));
    assert!(out.contains("helios"));
    assert!(out.contains("pricing"));
    assert!(out.contains("dotenv_export (declared)"));
    assert!(out.contains("json (path pattern)"));
    assert!(out.contains("detected from content"));
    assert!(out.contains("Airflow helios"));
    assert!(out.contains("no paths"));
}

#[test]
fn test_filters_by_environment_and_app() {
    let t = Test::standard();

    let output = t.run(&["paths", "--env", "prod", "--app", "pricing"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains(PRICING_PATH));
    assert!(!out.contains(HELIOS_PATH));
    assert!(!out.contains("staging"));
}

#[test]
fn test_unknown_environment_fails() {
    let t = Test::standard();

    let output = t.run(&["paths", "--env", "qa"]);
    assert_failure(&output);
    assert!(stderr(&output).contains("unknown environment: qa"));
}

#[test]
fn test_ambiguous_pattern_shown_per_entry() {
    let t = Test::with_config(
        r#"
[formats.json]
path_patterns = ["/conf"]

[formats.dotenv_plain]
path_patterns = ["/env/"]

[[environments.prod.app]]
path = "kv/env/conf"
storage_key = "data"
"#,
    );

    let output = t.run(&["paths"]);
    assert_success(&output);
    assert!(stdout(&output).contains("ambiguous format"));
}
