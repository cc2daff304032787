//! Security rule evaluation and risk aggregation.

pub mod aggregator;
pub mod catalog;
pub mod evaluator;
pub mod processed;

pub use aggregator::{RiskAggregate, aggregate};
pub use catalog::{
    EVALUATION_ORDER, FactMap, FactValue, NumberRange, RuleCatalog, RuleConfig, RuleConfigError,
    Severity, Threshold, ValueKind,
};
pub use evaluator::{RuleOutcome, evaluate, evaluate_rule};
pub use processed::{AcknowledgeError, ProcessedRuleSet};
