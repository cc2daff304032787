//! Risk aggregation over rule outcomes.
//!
//! Only enabled outcomes take part.
//!
//! - `overall_severity`: the strongest severity present, ordered
//!   Forbidden > Danger > Warning > Safe. `Error` never escalates it and is
//!   reported through `has_unknown_results` instead.
//! - `needs_processing`: enabled Warning/Danger/Forbidden outcomes whose rule
//!   id is not acknowledged.
//! - `blocks_submit`: when `needs_processing` is non-empty, true unless some
//!   enabled outcome is Safe. That Safe offset applies to Warning and Danger
//!   only: an unresolved Forbidden outcome always blocks, and Forbidden can
//!   never be acknowledged.

use super::catalog::Severity;
use super::evaluator::RuleOutcome;
use super::processed::ProcessedRuleSet;

/// Aggregated risk picture for the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAggregate {
    pub overall_severity: Option<Severity>,
    /// Strongest severity among unacknowledged outcomes that need processing.
    pub unresolved_level: Option<Severity>,
    /// Rule ids the user still has to acknowledge, in outcome order.
    pub needs_processing: Vec<String>,
    pub blocks_submit: bool,
    /// At least one enabled rule could not be evaluated.
    pub has_unknown_results: bool,
}

/// Combine rule outcomes and acknowledgements into one risk verdict.
pub fn aggregate(outcomes: &[RuleOutcome], processed: &ProcessedRuleSet) -> RiskAggregate {
    let enabled: Vec<&RuleOutcome> = outcomes.iter().filter(|o| o.enabled).collect();

    let overall_severity = strongest(enabled.iter().map(|o| o.severity));
    let has_unknown_results = enabled.iter().any(|o| o.severity == Severity::Error);
    let has_safe = enabled.iter().any(|o| o.severity == Severity::Safe);

    // A Forbidden outcome stays unresolved even if its id was acknowledged
    // while the rule still evaluated to a lower severity.
    let unresolved: Vec<&RuleOutcome> = enabled
        .iter()
        .copied()
        .filter(|o| o.severity.needs_processing())
        .filter(|o| o.severity == Severity::Forbidden || !processed.contains(&o.rule_id))
        .collect();
    let unresolved_level = strongest(unresolved.iter().map(|o| o.severity));
    let needs_processing: Vec<String> = unresolved.iter().map(|o| o.rule_id.clone()).collect();

    let has_forbidden = unresolved.iter().any(|o| o.severity == Severity::Forbidden);
    let blocks_submit = has_forbidden || (!needs_processing.is_empty() && !has_safe);

    tracing::debug!(
        overall = ?overall_severity,
        unresolved = ?unresolved_level,
        pending = needs_processing.len(),
        blocks_submit,
        "risk aggregated"
    );

    RiskAggregate {
        overall_severity,
        unresolved_level,
        needs_processing,
        blocks_submit,
        has_unknown_results,
    }
}

fn strongest(severities: impl Iterator<Item = Severity>) -> Option<Severity> {
    severities
        .filter_map(|s| s.blocking_rank().map(|rank| (rank, s)))
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, s)| s)
}
