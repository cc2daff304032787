//! Rule evaluation tests.
//!
//! Covers determinism, most-severe-wins on overlapping thresholds, missing and
//! mistyped facts, rules that do not fire, disabled rules and enum rules.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use approval_core::rules::{
    FactValue, NumberRange, RuleCatalog, RuleConfig, RuleConfigError, Severity, Threshold,
    ValueKind, evaluate,
};
use common::{facts, flag_rule, float_rule};

#[test]
fn test_value_in_warning_and_danger_ranges_is_danger() {
    // R1: Warning >= 0.1, Danger >= 0.5, value 0.6 satisfies both.
    let catalog = RuleCatalog::new(vec![float_rule(
        "R1",
        &[(Severity::Warning, 0.1), (Severity::Danger, 0.5)],
    )])
    .unwrap();
    let out = evaluate(&catalog, &facts(&[("R1", FactValue::Float(0.6))]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].rule_id, "R1");
    assert_eq!(out[0].severity, Severity::Danger);
    assert_eq!(out[0].raw_value, Some(FactValue::Float(0.6)));

    let out = evaluate(&catalog, &facts(&[("R1", FactValue::Float(0.2))]));
    assert_eq!(out[0].severity, Severity::Warning);
}

#[test]
fn test_evaluation_is_deterministic() {
    let catalog = RuleCatalog::new(vec![
        float_rule("R1", &[(Severity::Warning, 0.1), (Severity::Danger, 0.5)]),
        flag_rule("R2", Severity::Forbidden),
        float_rule("R3", &[(Severity::Danger, 10.0)]),
    ])
    .unwrap();
    let context = facts(&[
        ("R1", FactValue::Float(0.3)),
        ("R2", FactValue::Bool(true)),
    ]);
    let first = evaluate(&catalog, &context);
    let second = evaluate(&catalog, &context);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_missing_fact_yields_error_without_aborting_batch() {
    let catalog = RuleCatalog::new(vec![
        float_rule("needs_fact", &[(Severity::Warning, 0.1)]),
        flag_rule("has_fact", Severity::Danger),
    ])
    .unwrap();
    let out = evaluate(&catalog, &facts(&[("has_fact", FactValue::Bool(true))]));
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].severity, Severity::Error);
    assert_eq!(out[0].raw_value, None);
    assert_eq!(out[1].severity, Severity::Danger);
}

#[test]
fn test_wrong_fact_type_yields_error() {
    let catalog = RuleCatalog::new(vec![flag_rule("is_contract", Severity::Warning)]).unwrap();
    let out = evaluate(
        &catalog,
        &facts(&[("is_contract", FactValue::Text("yes".to_string()))]),
    );
    assert_eq!(out[0].severity, Severity::Error);
    assert_eq!(out[0].raw_value, Some(FactValue::Text("yes".to_string())));
}

#[test]
fn test_no_match_without_safe_threshold_does_not_fire() {
    let catalog = RuleCatalog::new(vec![float_rule(
        "R1",
        &[(Severity::Warning, 0.1), (Severity::Danger, 0.5)],
    )])
    .unwrap();
    let out = evaluate(&catalog, &facts(&[("R1", FactValue::Float(0.05))]));
    assert!(out.is_empty(), "expected no outcome, got {out:?}");
}

#[test]
fn test_no_match_with_safe_threshold_is_safe() {
    let mut defaults = BTreeMap::new();
    defaults.insert(Severity::Danger, Threshold::Range(NumberRange::at_least(0.5)));
    defaults.insert(
        Severity::Safe,
        Threshold::Range(NumberRange {
            min: Some(0.0),
            max: Some(0.01),
            min_included: true,
            max_included: true,
        }),
    );
    let rule = RuleConfig::new(
        "approval_ratio",
        None,
        true,
        ValueKind::Float {
            min: None,
            max: None,
        },
        defaults,
        BTreeMap::new(),
    )
    .unwrap();
    let catalog = RuleCatalog::new(vec![rule]).unwrap();

    // 0.2 matches neither range; a Safe threshold exists so the rule is Safe.
    let out = evaluate(&catalog, &facts(&[("approval_ratio", FactValue::Float(0.2))]));
    assert_eq!(out[0].severity, Severity::Safe);
}

#[test]
fn test_disabled_rule_still_reports_outcome() {
    let catalog = RuleCatalog::new(vec![flag_rule("R1", Severity::Danger)])
        .unwrap()
        .with_rule_enabled("R1", false)
        .unwrap();
    let out = evaluate(&catalog, &facts(&[("R1", FactValue::Bool(true))]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].severity, Severity::Danger);
    assert!(!out[0].enabled);
    assert!(!out[0].is_blocking_candidate());
}

#[test]
fn test_enum_rule_first_severity_by_order_wins() {
    let members: BTreeSet<String> = ["phishing", "unverified", "verified"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let set = |items: &[&str]| -> BTreeSet<String> { items.iter().map(|s| s.to_string()).collect() };

    let mut defaults = BTreeMap::new();
    defaults.insert(Severity::Forbidden, Threshold::Members(set(&["phishing"])));
    // Overlaps Forbidden on purpose.
    defaults.insert(Severity::Warning, Threshold::Members(set(&["phishing", "unverified"])));
    defaults.insert(Severity::Safe, Threshold::Members(set(&["verified"])));
    let rule = RuleConfig::new(
        "site_reputation",
        Some("origin_status".to_string()),
        true,
        ValueKind::Enum { members },
        defaults,
        BTreeMap::new(),
    )
    .unwrap();
    let catalog = RuleCatalog::new(vec![rule]).unwrap();

    let text = |s: &str| FactValue::Text(s.to_string());
    let sev = |s: &str| evaluate(&catalog, &facts(&[("origin_status", text(s))]))[0].severity;
    assert_eq!(sev("phishing"), Severity::Forbidden);
    assert_eq!(sev("unverified"), Severity::Warning);
    assert_eq!(sev("verified"), Severity::Safe);
}

#[test]
fn test_custom_threshold_changes_outcome() {
    let rule = float_rule("R1", &[(Severity::Warning, 0.1), (Severity::Danger, 0.5)])
        .with_custom_threshold(Severity::Danger, Threshold::Range(NumberRange::at_least(0.9)))
        .unwrap();
    let catalog = RuleCatalog::new(vec![rule]).unwrap();
    let out = evaluate(&catalog, &facts(&[("R1", FactValue::Float(0.6))]));
    assert_eq!(out[0].severity, Severity::Warning);
}

#[test]
fn test_threshold_shape_must_match_value_kind() {
    let mut defaults = BTreeMap::new();
    defaults.insert(Severity::Warning, Threshold::Flag(true));
    let err = RuleConfig::new(
        "R1",
        None,
        true,
        ValueKind::Float {
            min: None,
            max: None,
        },
        defaults,
        BTreeMap::new(),
    );
    match err {
        Err(RuleConfigError::ThresholdShapeMismatch { severity, .. }) => {
            assert_eq!(severity, Severity::Warning)
        }
        other => panic!("expected shape mismatch, got {other:?}"),
    }
}
