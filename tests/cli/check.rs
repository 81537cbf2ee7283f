//! Tests for `kvrotate check`.

use crate::support::*;

#[test]
fn test_check_reports_formats_and_fields() {
    let t = Test::standard();

    let output = t.check("prod", "helios");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("dotenv_export (declared)"));
    assert!(out.contains("json (path pattern)"));
    assert!(out.contains("access_key → AWS_ACCESS_KEY_ID"));
    assert!(out.contains("secret_key → AWS_SECRET_KEY"));
    assert_not_printed(&output, "AKIAOLD");
    assert_not_printed(&output, "oldsecret");
}

#[test]
fn test_check_content_detection() {
    let t = Test::standard();

    let output = t.check("prod", "pricing");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("dotenv_plain (content)"));
    assert!(out.contains("access_key → PRICING_KEY_ID"));
    assert!(out.contains("secret_key → PRICING_SECRET"));
}

#[test]
fn test_check_missing_secret_fails() {
    let t = Test::with_config(STANDARD_CONFIG);

    let output = t.check("prod", "pricing");
    assert_failure(&output);
    assert!(stderr(&output).contains("secret not found"));
}

#[test]
fn test_check_never_writes() {
    let t = Test::standard();

    assert_success(&t.check("prod", "helios"));
    assert_eq!(t.version(HELIOS_PATH), 1);
    assert_eq!(t.payload(HELIOS_PATH, "dotenv"), HELIOS_DOTENV);
}
