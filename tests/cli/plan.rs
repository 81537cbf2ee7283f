//! Tests for `kvrotate plan`.

use crate::support::*;

#[test]
fn test_plan_single_path() {
    let t = Test::standard();

    let output = t.plan(
        "prod",
        "helios",
        &["--path", HELIOS_PATH, "--set", "access_key=AKIANEW"],
    );
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("(dotenv_export)"));
    assert!(out.contains("~ AWS_ACCESS_KEY_ID (access_key)"));
    assert!(out.contains("2 unchanged"));
    assert_not_printed(&output, "AKIANEW");
    assert_not_printed(&output, "AKIAOLD");

    assert_eq!(t.payload(HELIOS_PATH, "dotenv"), HELIOS_DOTENV);
    assert_eq!(t.version(HELIOS_PATH), 1);
}

#[test]
fn test_plan_whole_application() {
    let t = Test::standard();

    let output = t.plan("prod", "helios", &["--set", "secret_key=s3cret"]);
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("~ AWS_SECRET_ACCESS_KEY (secret_key)"));
    assert!(out.contains("~ AWS_SECRET_KEY (secret_key)"));
    assert_eq!(t.version(HELIOS_SECRETS_PATH), 1);
}

#[test]
fn test_plan_insertion() {
    let t = Test::standard();

    let output = t.plan("prod", "pricing", &["--set", "NEW_TOKEN=abc"]);
    assert_success(&output);
    assert!(stdout(&output).contains("+ NEW_TOKEN"));
}

#[test]
fn test_plan_conflict_fails() {
    let t = Test::standard();

    let output = t.plan(
        "prod",
        "pricing",
        &[
            "--path",
            PRICING_PATH,
            "--set",
            "access_key=a",
            "--set",
            "PRICING_KEY_ID=b",
        ],
    );
    assert_failure(&output);

    let err = stderr(&output);
    assert!(err.contains("merge"));
    assert!(err.contains("PRICING_KEY_ID"));
}

#[test]
fn test_plan_requires_updates() {
    let t = Test::standard();

    let output = t.plan("prod", "pricing", &["--path", PRICING_PATH]);
    assert_failure(&output);
    assert!(stderr(&output).contains("no updates requested"));
}

#[test]
fn test_malformed_set_rejected() {
    let t = Test::standard();

    let output = t.plan("prod", "pricing", &["--set", "novalue"]);
    assert_failure(&output);
    assert!(stderr(&output).contains("FIELD=VALUE"));
}
