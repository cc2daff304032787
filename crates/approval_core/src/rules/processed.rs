//! Per-draft set of rule outcomes the user explicitly acknowledged.
//!
//! Transitions:
//! - `acknowledge`: adds a rule id. Forbidden outcomes are rejected, Danger
//!   outcomes require an explicit confirmation.
//! - `acknowledge_all`: the "ignore all" action over Warning/Danger outcomes.
//! - `undo`: removes a rule id.
//! - `reset`: clears the set when the draft is replaced or finalized.

use std::collections::BTreeSet;

use super::catalog::Severity;
use super::evaluator::RuleOutcome;

/// Rejected acknowledge attempt. The set is unchanged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcknowledgeError {
    #[error("rule {rule_id} has Forbidden severity and cannot be acknowledged")]
    ForbiddenRule { rule_id: String },
    #[error("rule {rule_id} has Danger severity and needs explicit confirmation")]
    DangerNotConfirmed { rule_id: String },
    #[error("rule {rule_id} has no outcome for the current draft")]
    UnknownRule { rule_id: String },
}

/// Rule ids acknowledged ("ignored") for the current draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedRuleSet {
    rule_ids: BTreeSet<String>,
}

impl ProcessedRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rule_ids.contains(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rule_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rule_ids.iter().map(String::as_str)
    }

    /// Acknowledge `rule_id` against the outcomes of the current evaluation.
    ///
    /// Returns `Ok(true)` when the id was added, `Ok(false)` when it was
    /// already present.
    pub fn acknowledge(
        &mut self,
        rule_id: &str,
        outcomes: &[RuleOutcome],
        danger_confirmed: bool,
    ) -> Result<bool, AcknowledgeError> {
        let Some(outcome) = outcomes.iter().find(|o| o.rule_id == rule_id) else {
            return Err(reject(AcknowledgeError::UnknownRule {
                rule_id: rule_id.to_string(),
            }));
        };
        match outcome.severity {
            Severity::Forbidden => {
                return Err(reject(AcknowledgeError::ForbiddenRule {
                    rule_id: rule_id.to_string(),
                }));
            }
            Severity::Danger if !danger_confirmed => {
                return Err(reject(AcknowledgeError::DangerNotConfirmed {
                    rule_id: rule_id.to_string(),
                }));
            }
            _ => {}
        }
        Ok(self.rule_ids.insert(rule_id.to_string()))
    }

    /// Acknowledge every Warning and Danger outcome at once.
    ///
    /// Forbidden, Safe and Error outcomes are skipped. Returns the ids that
    /// were newly added.
    pub fn acknowledge_all(&mut self, outcomes: &[RuleOutcome]) -> Vec<String> {
        let mut added = Vec::new();
        for outcome in outcomes {
            if !matches!(outcome.severity, Severity::Warning | Severity::Danger) {
                continue;
            }
            if self.rule_ids.insert(outcome.rule_id.clone()) {
                added.push(outcome.rule_id.clone());
            }
        }
        added
    }

    /// Remove an acknowledgement. Returns true when one existed.
    pub fn undo(&mut self, rule_id: &str) -> bool {
        self.rule_ids.remove(rule_id)
    }

    pub fn reset(&mut self) {
        self.rule_ids.clear();
    }
}

fn reject(err: AcknowledgeError) -> AcknowledgeError {
    tracing::warn!(error = %err, "acknowledge rejected");
    err
}
