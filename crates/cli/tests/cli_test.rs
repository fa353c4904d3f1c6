//! # `slotql` CLI Tests
//!
//! Library-level checks of engine construction and output formatting, plus a
//! few end-to-end runs of the binary.

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use slotql_cli::{build_engine, format_answer, format_ranking, format_templates, EngineArgs};
use slotql_test_utils::{write_fixture_catalog, FIXTURE_TABLE_REF};
use tempfile::tempdir;

fn fixture_args(dir: &std::path::Path) -> Result<EngineArgs> {
    Ok(EngineArgs {
        catalog: Some(write_fixture_catalog(dir)?),
        table_ref: Some(FIXTURE_TABLE_REF.to_string()),
        ..Default::default()
    })
}

fn slotql() -> Command {
    let mut cmd = Command::cargo_bin("slotql").unwrap();
    cmd.env_remove("SLOTQL_CATALOG")
        .env_remove("SLOTQL_TABLE_REF")
        .env_remove("SLOTQL_THRESHOLD");
    cmd
}

#[test]
fn test_build_engine_applies_overrides() -> Result<()> {
    // Arrange
    let dir = tempdir()?;
    let mut args = fixture_args(dir.path())?;
    args.threshold = Some(0.5);
    args.alternatives = Some(1);

    // Act
    let engine = build_engine(&args)?;

    // Assert
    assert_eq!(engine.catalog().len(), 4);
    assert_eq!(engine.config().table_ref, FIXTURE_TABLE_REF);
    assert_eq!(engine.config().acceptance_threshold, 0.5);
    assert_eq!(engine.config().alternatives, 1);
    Ok(())
}

#[test]
fn test_build_engine_rejects_invalid_threshold() -> Result<()> {
    let dir = tempdir()?;
    let mut args = fixture_args(dir.path())?;
    args.threshold = Some(1.5);

    let err = build_engine(&args).unwrap_err();

    assert!(
        err.to_string().contains("Failed to build the resolution engine"),
        "Unexpected error message: {err}"
    );
    Ok(())
}

#[test]
fn test_format_answer_for_success_and_failure() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(&fixture_args(dir.path())?)?;

    let answer = format_answer(&engine.resolve("how many orders"));
    assert_eq!(
        answer,
        "-- count_orders (confidence 1.00)\nSELECT COUNT(*) AS orders FROM `fixture-project.shop.orders`"
    );

    let answer = format_answer(&engine.resolve("orders from tier"));
    assert!(answer.starts_with("Please specify a plan type"), "{answer}");
    Ok(())
}

#[test]
fn test_format_ranking_marks_accepted_templates() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(&fixture_args(dir.path())?)?;

    let ranking = format_ranking(&engine, "recent orders", 2);
    let lines: Vec<&str> = ranking.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("* 1.0000  recent_orders"), "{ranking}");
    Ok(())
}

#[test]
fn test_format_templates_lists_required_params() -> Result<()> {
    let dir = tempdir()?;
    let engine = build_engine(&fixture_args(dir.path())?)?;

    let listing = format_templates(engine.catalog());

    assert!(listing.contains("count_orders: Count all orders\n"));
    assert!(listing.contains("orders_by_total: Orders above or below a total [requires amount]"));
    Ok(())
}

#[test]
fn test_binary_ask_prints_sql() {
    slotql()
        .args(["ask", "How many customers do we have?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-- count_customers"))
        .stdout(predicate::str::contains("COUNT(DISTINCT account_id)"));
}

#[test]
fn test_binary_ask_json_with_custom_catalog() -> Result<()> {
    let dir = tempdir()?;
    let catalog = write_fixture_catalog(dir.path())?;

    slotql()
        .arg("--catalog")
        .arg(&catalog)
        .args(["ask", "--json", "orders with total above 250"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""matched_template_id": "orders_by_total""#))
        .stdout(predicate::str::contains("WHERE total > 250"));
    Ok(())
}

#[test]
fn test_binary_reports_missing_catalog() {
    slotql()
        .args(["--catalog", "/no/such/catalog.yml", "examples"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read catalog file"));
}
