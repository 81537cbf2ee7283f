//! Tests for `kvrotate rotate`.

use crate::support::*;

#[test]
fn test_rotate_export_preserves_layout() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "helios",
        &["--path", HELIOS_PATH, "--set", "access_key=AKIANEW"],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("v2: 1 updated, 0 inserted, 2 unchanged"));
    assert_not_printed(&output, "AKIANEW");

    assert_eq!(
        t.payload(HELIOS_PATH, "dotenv"),
        HELIOS_DOTENV.replace("AKIAOLD", "AKIANEW")
    );
    assert_eq!(t.version(HELIOS_PATH), 2);
}

#[test]
fn test_rotate_whole_application() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "helios",
        &["--set", "access_key=AKIANEW", "--set", "secret_key=newsecret"],
    );
    assert_success(&output);

    assert_eq!(
        t.payload(HELIOS_SECRETS_PATH, "config"),
        r#"{"bucket":"helios-data","AWS_ACCESS_KEY":"AKIANEW","AWS_SECRET_KEY":"newsecret"}"#
    );
    assert!(t
        .payload(HELIOS_PATH, "dotenv")
        .contains("export AWS_SECRET_ACCESS_KEY=\"newsecret\"\n"));
}

#[test]
fn test_rotate_uses_configured_field_names() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "pricing",
        &["--set", "access_key=AKIANEW", "--set", "secret_key=newsecret"],
    );
    assert_success(&output);

    assert_eq!(
        t.payload(PRICING_PATH, "env"),
        "PRICING_KEY_ID=AKIANEW\nPRICING_SECRET=newsecret\n\nDEBUG=false\n"
    );
}

#[test]
fn test_dry_run_writes_nothing() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "helios",
        &["--set", "access_key=AKIANEW", "--dry-run"],
    );
    assert_success(&output);
    assert!(stderr(&output).contains("dry run"));
    assert!(stdout(&output).contains("~ AWS_ACCESS_KEY_ID"));

    assert_eq!(t.version(HELIOS_PATH), 1);
    assert_eq!(t.version(HELIOS_SECRETS_PATH), 1);
}

#[test]
fn test_generate_value() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "pricing",
        &["--path", PRICING_PATH, "--generate", "secret_key"],
    );
    assert_success(&output);

    let payload = t.payload(PRICING_PATH, "env");
    let line = payload
        .lines()
        .find(|l| l.starts_with("PRICING_SECRET="))
        .unwrap();
    assert_ne!(line, "PRICING_SECRET=oldsecret");
    assert!(payload.starts_with("PRICING_KEY_ID=AKIAOLD\n"));
}

#[test]
fn test_same_value_skips_write() {
    let t = Test::standard();

    let output = t.rotate(
        "prod",
        "pricing",
        &["--path", PRICING_PATH, "--set", "DEBUG=false"],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("already current"));
    assert_eq!(t.version(PRICING_PATH), 1);
}

#[test]
fn test_failure_on_one_path_does_not_stop_others() {
    let t = Test::standard();
    std::fs::write(t.document(HELIOS_SECRETS_PATH), "not json").unwrap();

    let output = t.rotate("prod", "helios", &["--set", "access_key=AKIANEW"]);
    assert_failure(&output);

    let err = stderr(&output);
    assert!(err.contains("prod/helios kv/engineering/v1/airflow/helios/secrets: fetch:"));
    assert!(err.contains("1 of 2 paths failed"));

    assert_eq!(t.version(HELIOS_PATH), 2);
}

#[test]
fn test_undetectable_payload_fails() {
    let t = Test::standard();
    t.seed(PRICING_PATH, &[("env", "A=1\nexport B=2\n")]);

    let output = t.rotate("prod", "pricing", &["--set", "A=2"]);
    assert_failure(&output);
    assert!(stderr(&output).contains("cannot detect format"));
    assert_eq!(t.version(PRICING_PATH), 1);
}

#[test]
fn test_jobs_flag() {
    let t = Test::standard();

    let output = t.rotate("prod", "helios", &["--set", "access_key=X1", "--jobs", "1"]);
    assert_success(&output);
    assert_eq!(t.version(HELIOS_PATH), 2);
    assert_eq!(t.version(HELIOS_SECRETS_PATH), 2);
}

#[test]
fn test_store_flag_overrides_config() {
    let t = Test::standard();
    let other = tempfile::TempDir::new().unwrap();

    let output = t.run(&[
        "rotate",
        "--env",
        "prod",
        "--app",
        "pricing",
        "--set",
        "access_key=x",
        "--store",
        other.path().to_str().unwrap(),
    ]);
    assert_failure(&output);
    assert!(stderr(&output).contains("secret not found"));
}
