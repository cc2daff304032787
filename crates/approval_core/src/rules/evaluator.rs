//! Rule evaluation against a fact context.
//!
//! **Algorithm (deterministic):**
//! 1. Look up the rule's fact by its fact key. Missing or wrongly typed
//!    facts yield an `Error` outcome for that rule only; the batch continues.
//! 2. Walk the merged threshold table Forbidden -> Danger -> Warning -> Safe
//!    and take the first severity whose threshold the value satisfies, so
//!    overlapping thresholds resolve to the more severe one.
//! 3. No match: `Safe` if the rule defines a Safe threshold, otherwise the
//!    rule does not fire and is left out of the result.
//!
//! Disabled rules are evaluated the same way and reported with
//! `enabled = false`; aggregation ignores them.

use super::catalog::{
    EVALUATION_ORDER, FactMap, FactValue, RuleCatalog, RuleConfig, Severity, Threshold, ValueKind,
};

/// Result of evaluating one rule. Produced fresh on every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub severity: Severity,
    pub enabled: bool,
    /// Fact value the severity was computed from, when one was present.
    pub raw_value: Option<FactValue>,
}

impl RuleOutcome {
    /// Whether this outcome can take part in blocking decisions.
    pub fn is_blocking_candidate(&self) -> bool {
        self.enabled && self.severity.needs_processing()
    }
}

/// Evaluate every rule in `catalog` against `facts`.
///
/// Output order follows catalog order. Pure: identical inputs give identical
/// outputs.
pub fn evaluate(catalog: &RuleCatalog, facts: &FactMap) -> Vec<RuleOutcome> {
    catalog
        .rules()
        .iter()
        .filter_map(|rule| evaluate_rule(rule, facts))
        .collect()
}

/// Evaluate a single rule. `None` means the rule did not fire.
pub fn evaluate_rule(rule: &RuleConfig, facts: &FactMap) -> Option<RuleOutcome> {
    let Some(value) = facts.get(rule.fact_key()) else {
        tracing::debug!(
            rule_id = rule.id(),
            fact_key = rule.fact_key(),
            "rule fact missing; reporting unknown result"
        );
        return Some(outcome(rule, Severity::Error, None));
    };

    let matched = match rule.value_kind() {
        ValueKind::Int { .. } | ValueKind::Float { .. } | ValueKind::Percent { .. } => {
            let Some(number) = numeric_fact(rule.value_kind(), value) else {
                return Some(type_mismatch(rule, value));
            };
            first_match(rule, |threshold| match threshold {
                Threshold::Range(range) => range.contains(number),
                _ => false,
            })
        }
        ValueKind::Boolean => {
            let FactValue::Bool(flag) = value else {
                return Some(type_mismatch(rule, value));
            };
            first_match(rule, |threshold| matches!(threshold, Threshold::Flag(f) if f == flag))
        }
        ValueKind::Enum { .. } => {
            let FactValue::Text(text) = value else {
                return Some(type_mismatch(rule, value));
            };
            first_match(rule, |threshold| match threshold {
                Threshold::Members(members) => members.contains(text),
                _ => false,
            })
        }
    };

    let severity = match matched {
        Some(severity) => severity,
        None if rule.threshold(Severity::Safe).is_some() => Severity::Safe,
        None => {
            tracing::debug!(rule_id = rule.id(), "no threshold matched; rule does not fire");
            return None;
        }
    };

    Some(outcome(rule, severity, Some(value.clone())))
}

fn first_match(rule: &RuleConfig, hit: impl Fn(&Threshold) -> bool) -> Option<Severity> {
    EVALUATION_ORDER
        .into_iter()
        .find(|severity| rule.threshold(*severity).is_some_and(&hit))
}

fn numeric_fact(kind: &ValueKind, value: &FactValue) -> Option<f64> {
    match (kind, value) {
        // Int rules only accept integral facts.
        (ValueKind::Int { .. }, FactValue::Float(v)) if v.fract() != 0.0 => None,
        _ => value.as_number(),
    }
}

fn type_mismatch(rule: &RuleConfig, value: &FactValue) -> RuleOutcome {
    tracing::debug!(
        rule_id = rule.id(),
        kind = rule.value_kind().as_str(),
        ?value,
        "rule fact has wrong type; reporting unknown result"
    );
    outcome(rule, Severity::Error, Some(value.clone()))
}

fn outcome(rule: &RuleConfig, severity: Severity, raw_value: Option<FactValue>) -> RuleOutcome {
    RuleOutcome {
        rule_id: rule.id().to_string(),
        severity,
        enabled: rule.enabled(),
        raw_value,
    }
}
