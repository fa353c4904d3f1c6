//! # Resolution Tests
//!
//! End-to-end behaviour of `QueryEngine::resolve` over the built-in catalog:
//! the canonical question types, failure reasons, determinism and the
//! acceptance threshold boundary.

mod common;

use crate::common::setup_tracing;
use anyhow::Result;
use slotql::{
    Catalog, Comparison, EngineConfig, FailureReason, ParamName, QueryEngine, TimeWindow,
};
use std::io::Write;
use std::sync::Arc;

fn engine() -> QueryEngine {
    QueryEngine::with_defaults().expect("built-in engine must build")
}

fn engine_with(config: EngineConfig) -> QueryEngine {
    QueryEngine::new(Catalog::load().unwrap(), config).unwrap()
}

#[test]
fn test_count_query_resolves_without_entities() {
    setup_tracing();
    let result = engine().resolve("How many customers do we have?");

    assert!(result.is_success());
    assert_eq!(result.matched_template_id.as_deref(), Some("count_customers"));
    assert!(result.entities.is_empty());
    let sql = result.resolved_sql.unwrap();
    assert!(sql.contains("COUNT"));
    assert!(sql.contains("`hackathon-475722.saas.ravenstack_subscriptions`"));
    assert!(result.confidence >= 0.30);
}

#[test]
fn test_filtered_query_binds_amount_and_operator() {
    setup_tracing();
    let result = engine().resolve("Show me customers spending more than $1000");

    assert_eq!(result.matched_template_id.as_deref(), Some("mrr_threshold"));
    assert_eq!(result.entities.amounts, vec![1000.0]);
    assert_eq!(result.entities.comparison, Some(Comparison::Greater));
    assert_eq!(result.entities.category, None);
    let sql = result.resolved_sql.unwrap();
    assert!(sql.contains("WHERE mrr_amount > 1000 "), "unexpected SQL: {sql}");
}

#[test]
fn test_less_than_overrides_default_comparison() {
    let result = engine().resolve("customers with mrr below 50");

    assert_eq!(result.matched_template_id.as_deref(), Some("mrr_threshold"));
    assert!(result.resolved_sql.unwrap().contains("mrr_amount < 50 "));
}

#[test]
fn test_unmatched_query_is_low_confidence() {
    setup_tracing();
    let engine = engine();
    let result = engine.resolve("What's the weather today?");

    assert_eq!(result.failure_reason, Some(FailureReason::LowConfidence));
    assert!(result.matched_template_id.is_none());
    assert!(result.resolved_sql.is_none());
    assert!(engine
        .rank("What's the weather today?")
        .iter()
        .all(|s| s.score < 0.30));
    // Extraction still ran.
    assert_eq!(result.entities.time_window, Some(TimeWindow::Today));
}

#[test]
fn test_missing_amount_is_reported() {
    setup_tracing();
    let result = engine().resolve("show me customers spending a lot");

    assert_eq!(result.failure_reason, Some(FailureReason::MissingParameter));
    assert_eq!(result.missing_parameter, Some(ParamName::Amount));
    assert_eq!(result.matched_template_id.as_deref(), Some("mrr_threshold"));
    assert!(result.resolved_sql.is_none());
}

#[test]
fn test_unrepresentable_amount_is_treated_as_missing() {
    let utterance = format!("customers spending more than {}", "9".repeat(400));

    let result = engine().resolve(&utterance);

    assert_eq!(result.failure_reason, Some(FailureReason::MissingParameter));
    assert_eq!(result.missing_parameter, Some(ParamName::Amount));
    assert_eq!(result.matched_template_id.as_deref(), Some("mrr_threshold"));
    assert!(result.entities.amounts.is_empty());
    assert!(result.resolved_sql.is_none());
}

#[test]
fn test_negative_amount_keeps_its_sign() {
    let result = engine().resolve("customers with mrr below -50");

    assert_eq!(result.matched_template_id.as_deref(), Some("mrr_threshold"));
    assert_eq!(result.entities.amount(), Some(-50.0));
    let sql = result.resolved_sql.unwrap();
    assert!(sql.contains("WHERE mrr_amount < -50 "));
}

#[test]
fn test_plan_filter_quotes_category() {
    let result = engine().resolve("Get customers in premium plan");

    assert_eq!(result.matched_template_id.as_deref(), Some("plan_filter"));
    assert_eq!(result.entities.category.as_deref(), Some("premium"));
    assert!(result
        .resolved_sql
        .unwrap()
        .ends_with("LIKE CONCAT('%', 'premium', '%')"));
}

#[test]
fn test_plan_filter_without_category_is_missing_parameter() {
    let result = engine().resolve("customers on plan");

    assert_eq!(result.failure_reason, Some(FailureReason::MissingParameter));
    assert_eq!(result.missing_parameter, Some(ParamName::Category));
}

#[test]
fn test_time_window_and_default() {
    let engine = engine();

    let explicit = engine.resolve("new customers this month");
    assert_eq!(explicit.matched_template_id.as_deref(), Some("new_customers"));
    assert_eq!(explicit.entities.time_window, Some(TimeWindow::ThisMonth));
    assert!(explicit.resolved_sql.unwrap().contains("INTERVAL 30 DAY"));

    let defaulted = engine.resolve("new customers");
    assert!(defaulted.entities.time_window.is_none());
    assert!(defaulted.resolved_sql.unwrap().contains("INTERVAL 30 DAY"));
}

#[test]
fn test_empty_input() {
    let engine = engine();
    for utterance in ["", "   ", "?!..."] {
        let result = engine.resolve(utterance);
        assert_eq!(result.failure_reason, Some(FailureReason::EmptyInput));
        assert!(result.alternatives.is_empty());
    }
}

#[test]
fn test_every_example_matches_its_own_template() {
    let engine = engine();
    for template in engine.catalog().templates() {
        for example in &template.examples {
            let top = &engine.rank(example)[0];
            assert_eq!(top.template_id, template.id, "example '{example}'");
            assert!((top.score - 1.0).abs() < 1e-9, "example '{example}'");
        }
    }
}

#[test]
fn test_resolution_is_deterministic() {
    let first = engine();
    let second = engine();
    for utterance in [
        "How many customers do we have?",
        "show me customers spending a lot",
        "churned customers last month",
    ] {
        assert_eq!(first.resolve(utterance), first.resolve(utterance));
        assert_eq!(first.resolve(utterance), second.resolve(utterance));
    }
}

#[test]
fn test_alternatives_are_bounded_and_ranked() {
    let result = engine().resolve("total revenue by month");

    assert!(result.is_success());
    assert!(result.alternatives.len() <= 2);
    let matched = result.matched_template_id.unwrap();
    assert!(result.alternatives.iter().all(|a| a.template_id != matched));
    assert!(result
        .alternatives
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));
    assert!(result
        .alternatives
        .iter()
        .all(|a| a.confidence <= result.confidence));
}

#[test]
fn test_threshold_is_inclusive() {
    let utterance = "how many customers churned";
    let score = engine().rank(utterance)[0].score;
    assert!(score > 0.0 && score < 1.0);

    let at = engine_with(EngineConfig {
        acceptance_threshold: score,
        ..Default::default()
    });
    assert!(at.resolve(utterance).failure_reason.is_none());

    let above = engine_with(EngineConfig {
        acceptance_threshold: score + f64::EPSILON,
        ..Default::default()
    });
    let result = above.resolve(utterance);
    assert_eq!(result.failure_reason, Some(FailureReason::LowConfidence));
    assert_eq!(result.confidence, score);
}

#[test]
fn test_quotes_in_category_cannot_break_out() {
    let engine = engine_with(EngineConfig {
        categories: vec!["o'brien".to_string()],
        ..Default::default()
    });
    let result = engine.resolve("customers in o'brien plan");

    assert_eq!(result.matched_template_id.as_deref(), Some("plan_filter"));
    let sql = result.resolved_sql.unwrap();
    assert!(sql.ends_with(r"CONCAT('%', 'o\'brien', '%')"), "unexpected SQL: {sql}");
}

#[test]
fn test_configured_table_ref_is_bound() {
    let engine = engine_with(EngineConfig {
        table_ref: "acme-prod.billing.accounts".to_string(),
        ..Default::default()
    });
    let sql = engine.resolve("total revenue").resolved_sql.unwrap();
    assert_eq!(
        sql,
        "SELECT SUM(mrr_amount) AS total_mrr FROM `acme-prod.billing.accounts`"
    );
}

#[test]
fn test_concurrent_callers_share_one_engine() {
    let engine = Arc::new(engine());
    let expected = engine.resolve("top customers");

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let engine = Arc::clone(&engine);
            let expected = expected.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    assert_eq!(engine.resolve("top customers"), expected);
                }
            });
        }
    });
}

#[test]
fn test_custom_catalog_from_file() -> Result<()> {
    // Arrange
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
templates:
  - id: open_tickets
    description: Count open support tickets
    examples: [open tickets, how many tickets are open]
    sql_skeleton: "SELECT COUNT(*) FROM `{{table_ref}}` WHERE status = 'open'"
"#
    )?;

    // Act
    let catalog = Catalog::from_path(file.path())?;
    let engine = QueryEngine::new(
        catalog,
        EngineConfig {
            table_ref: "support.tickets".to_string(),
            ..Default::default()
        },
    )?;
    let result = engine.resolve("How many tickets are open right now?");

    // Assert
    assert_eq!(result.matched_template_id.as_deref(), Some("open_tickets"));
    assert_eq!(
        result.resolved_sql.as_deref(),
        Some("SELECT COUNT(*) FROM `support.tickets` WHERE status = 'open'")
    );
    Ok(())
}
