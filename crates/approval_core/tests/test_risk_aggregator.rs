//! Risk aggregation and acknowledgement tests.

mod common;

use approval_core::rules::{AcknowledgeError, ProcessedRuleSet, RuleOutcome, Severity, aggregate};
use common::outcome;

#[test]
fn test_unprocessed_warning_offset_by_safe_does_not_block() {
    let outcomes = vec![outcome("W", Severity::Warning), outcome("S", Severity::Safe)];
    let risk = aggregate(&outcomes, &ProcessedRuleSet::new());
    assert_eq!(risk.needs_processing, vec!["W".to_string()]);
    assert!(!risk.blocks_submit);
    assert_eq!(risk.overall_severity, Some(Severity::Warning));
}

#[test]
fn test_unprocessed_forbidden_blocks_even_with_safe() {
    let outcomes = vec![outcome("F", Severity::Forbidden), outcome("S", Severity::Safe)];
    let risk = aggregate(&outcomes, &ProcessedRuleSet::new());
    assert!(risk.blocks_submit);
    assert_eq!(risk.unresolved_level, Some(Severity::Forbidden));
}

#[test]
fn test_unprocessed_warning_without_safe_blocks_until_acknowledged() {
    let outcomes = vec![outcome("W", Severity::Warning), outcome("D", Severity::Danger)];
    let mut processed = ProcessedRuleSet::new();
    assert!(aggregate(&outcomes, &processed).blocks_submit);

    assert_eq!(processed.acknowledge("W", &outcomes, false), Ok(true));
    let risk = aggregate(&outcomes, &processed);
    assert!(risk.blocks_submit);
    assert_eq!(risk.unresolved_level, Some(Severity::Danger));

    assert_eq!(processed.acknowledge("D", &outcomes, true), Ok(true));
    let risk = aggregate(&outcomes, &processed);
    assert!(!risk.blocks_submit);
    assert!(risk.needs_processing.is_empty());
    // Acknowledged outcomes still count towards the overall severity.
    assert_eq!(risk.overall_severity, Some(Severity::Danger));
}

#[test]
fn test_acknowledging_forbidden_is_rejected_and_set_unchanged() {
    let outcomes = vec![outcome("F", Severity::Forbidden), outcome("W", Severity::Warning)];
    let mut processed = ProcessedRuleSet::new();
    processed.acknowledge("W", &outcomes, false).unwrap();
    let before = processed.clone();

    match processed.acknowledge("F", &outcomes, true) {
        Err(AcknowledgeError::ForbiddenRule { rule_id }) => assert_eq!(rule_id, "F"),
        other => panic!("expected ForbiddenRule, got {other:?}"),
    }
    assert_eq!(processed, before);
    assert!(!processed.contains("F"));
}

#[test]
fn test_danger_requires_confirmation() {
    let outcomes = vec![outcome("D", Severity::Danger)];
    let mut processed = ProcessedRuleSet::new();
    match processed.acknowledge("D", &outcomes, false) {
        Err(AcknowledgeError::DangerNotConfirmed { .. }) => {}
        other => panic!("expected DangerNotConfirmed, got {other:?}"),
    }
    assert!(processed.is_empty());
}

#[test]
fn test_unknown_rule_acknowledge_is_rejected() {
    let mut processed = ProcessedRuleSet::new();
    match processed.acknowledge("nope", &[], false) {
        Err(AcknowledgeError::UnknownRule { rule_id }) => assert_eq!(rule_id, "nope"),
        other => panic!("expected UnknownRule, got {other:?}"),
    }
}

#[test]
fn test_undo_restores_blocking() {
    let outcomes = vec![outcome("W", Severity::Warning)];
    let mut processed = ProcessedRuleSet::new();
    processed.acknowledge("W", &outcomes, false).unwrap();
    assert!(!aggregate(&outcomes, &processed).blocks_submit);
    assert!(processed.undo("W"));
    assert!(!processed.undo("W"));
    assert!(aggregate(&outcomes, &processed).blocks_submit);
}

#[test]
fn test_acknowledge_all_skips_forbidden() {
    let outcomes = vec![
        outcome("W", Severity::Warning),
        outcome("D", Severity::Danger),
        outcome("F", Severity::Forbidden),
        outcome("E", Severity::Error),
    ];
    let mut processed = ProcessedRuleSet::new();
    let added = processed.acknowledge_all(&outcomes);
    assert_eq!(added, vec!["W".to_string(), "D".to_string()]);
    let risk = aggregate(&outcomes, &processed);
    assert_eq!(risk.needs_processing, vec!["F".to_string()]);
    assert!(risk.blocks_submit);

    processed.reset();
    assert!(processed.is_empty());
}

#[test]
fn test_error_outcomes_never_escalate_or_block() {
    let outcomes = vec![outcome("E", Severity::Error)];
    let risk = aggregate(&outcomes, &ProcessedRuleSet::new());
    assert_eq!(risk.overall_severity, None);
    assert!(risk.has_unknown_results);
    assert!(!risk.blocks_submit);

    let outcomes = vec![outcome("E", Severity::Error), outcome("S", Severity::Safe)];
    let risk = aggregate(&outcomes, &ProcessedRuleSet::new());
    assert_eq!(risk.overall_severity, Some(Severity::Safe));
}

#[test]
fn test_disabled_outcomes_are_ignored() {
    let disabled = RuleOutcome {
        enabled: false,
        ..outcome("F", Severity::Forbidden)
    };
    let risk = aggregate(&[disabled], &ProcessedRuleSet::new());
    assert!(!risk.blocks_submit);
    assert_eq!(risk.overall_severity, None);
    assert!(risk.needs_processing.is_empty());
}
