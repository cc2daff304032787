//! Risk rule catalog types.
//!
//! A rule maps one fact from the evaluation context to a severity through a
//! per-severity threshold table. The value kind is a closed set; every
//! threshold must have the shape its rule's value kind expects, which is
//! checked once at construction instead of at evaluation time.
//!
//! - Custom thresholds fully replace the default for the same severity.
//! - At most one threshold per severity (the tables are keyed by severity).

use std::collections::{BTreeMap, BTreeSet};

// ─── Severity ───────────────────────────────────────────────────────────

/// Rule outcome severity.
///
/// The derived ordering is only used to key threshold tables. Blocking
/// strength comparisons go through [`Severity::blocking_rank`], which
/// excludes `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Required fact was missing or unusable ("unknown result").
    Error,
    Safe,
    Warning,
    Danger,
    Forbidden,
}

/// Threshold walk order: most severe first.
pub const EVALUATION_ORDER: [Severity; 4] = [
    Severity::Forbidden,
    Severity::Danger,
    Severity::Warning,
    Severity::Safe,
];

impl Severity {
    /// Blocking strength, `None` for `Error`.
    pub fn blocking_rank(self) -> Option<u8> {
        match self {
            Severity::Error => None,
            Severity::Safe => Some(0),
            Severity::Warning => Some(1),
            Severity::Danger => Some(2),
            Severity::Forbidden => Some(3),
        }
    }

    /// Severities the user has to resolve before signing.
    pub fn needs_processing(self) -> bool {
        matches!(
            self,
            Severity::Warning | Severity::Danger | Severity::Forbidden
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Safe => "safe",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Forbidden => "forbidden",
        }
    }
}

// ─── Facts ──────────────────────────────────────────────────────────────

/// A single fact value from the evaluation context.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FactValue {
    pub(crate) fn as_number(&self) -> Option<f64> {
        match self {
            FactValue::Int(v) => Some(*v as f64),
            FactValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

/// Evaluation context keyed by fact name.
pub type FactMap = BTreeMap<String, FactValue>;

// ─── Value kinds and thresholds ─────────────────────────────────────────

/// Declared value domain of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Boolean,
    Int { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
    /// Percentage expressed in percent units (0-100).
    Percent { min: Option<f64>, max: Option<f64> },
    Enum { members: BTreeSet<String> },
}

impl ValueKind {
    fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueKind::Int { .. } | ValueKind::Float { .. } | ValueKind::Percent { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Int { .. } => "int",
            ValueKind::Float { .. } => "float",
            ValueKind::Percent { .. } => "percent",
            ValueKind::Enum { .. } => "enum",
        }
    }
}

/// Numeric interval. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_included: bool,
    pub max_included: bool,
}

impl NumberRange {
    /// `value >= min` (or `>` when excluded), unbounded above.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
            min_included: true,
            max_included: false,
        }
    }

    /// `value < max` (or `<=` when included), unbounded below.
    pub fn below(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
            min_included: false,
            max_included: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_min = match self.min {
            Some(min) if self.min_included => value >= min,
            Some(min) => value > min,
            None => true,
        };
        let below_max = match self.max {
            Some(max) if self.max_included => value <= max,
            Some(max) => value < max,
            None => true,
        };
        above_min && below_max
    }

    fn is_valid(&self) -> bool {
        let finite = self.min.is_none_or(f64::is_finite)
            && self.max.is_none_or(f64::is_finite);
        let ordered = match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        finite && ordered
    }
}

/// Per-severity threshold. The variant must agree with the rule's value kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    /// Numeric kinds (int, float, percent).
    Range(NumberRange),
    /// Boolean kind: fires when the fact equals this flag.
    Flag(bool),
    /// Enum kind: fires when the fact is one of these members.
    Members(BTreeSet<String>),
}

impl Threshold {
    fn shape(&self) -> &'static str {
        match self {
            Threshold::Range(_) => "range",
            Threshold::Flag(_) => "flag",
            Threshold::Members(_) => "members",
        }
    }
}

// ─── Rule config ────────────────────────────────────────────────────────

/// Rejection raised when a rule definition is internally inconsistent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleConfigError {
    #[error("rule id must not be empty")]
    EmptyId,
    #[error("rule {rule_id}: {shape} threshold does not fit {kind} value kind ({severity:?})")]
    ThresholdShapeMismatch {
        rule_id: String,
        severity: Severity,
        kind: &'static str,
        shape: &'static str,
    },
    #[error("rule {rule_id}: invalid numeric range for {severity:?}")]
    InvalidRange { rule_id: String, severity: Severity },
    #[error("rule {rule_id}: enum threshold member {member:?} is not declared ({severity:?})")]
    UnknownEnumMember {
        rule_id: String,
        severity: Severity,
        member: String,
    },
    #[error("rule {rule_id}: thresholds cannot be keyed by Error severity")]
    ErrorSeverityThreshold { rule_id: String },
    #[error("duplicate rule id {rule_id}")]
    DuplicateRule { rule_id: String },
}

/// Immutable description of one risk rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    id: String,
    fact_key: String,
    enabled: bool,
    value_kind: ValueKind,
    default_thresholds: BTreeMap<Severity, Threshold>,
    custom_thresholds: BTreeMap<Severity, Threshold>,
}

impl RuleConfig {
    /// Build a validated rule. `fact_key` defaults to the rule id when `None`.
    pub fn new(
        id: impl Into<String>,
        fact_key: Option<String>,
        enabled: bool,
        value_kind: ValueKind,
        default_thresholds: BTreeMap<Severity, Threshold>,
        custom_thresholds: BTreeMap<Severity, Threshold>,
    ) -> Result<Self, RuleConfigError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RuleConfigError::EmptyId);
        }
        for (severity, threshold) in default_thresholds.iter().chain(custom_thresholds.iter()) {
            validate_threshold(&id, &value_kind, *severity, threshold)?;
        }
        let fact_key = fact_key.unwrap_or_else(|| id.clone());
        Ok(Self {
            id,
            fact_key,
            enabled,
            value_kind,
            default_thresholds,
            custom_thresholds,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fact_key(&self) -> &str {
        &self.fact_key
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn value_kind(&self) -> &ValueKind {
        &self.value_kind
    }

    pub fn default_thresholds(&self) -> &BTreeMap<Severity, Threshold> {
        &self.default_thresholds
    }

    pub fn custom_thresholds(&self) -> &BTreeMap<Severity, Threshold> {
        &self.custom_thresholds
    }

    /// Threshold in effect for `severity`: custom over default.
    pub fn threshold(&self, severity: Severity) -> Option<&Threshold> {
        self.custom_thresholds
            .get(&severity)
            .or_else(|| self.default_thresholds.get(&severity))
    }

    /// Merged threshold table (custom entries replace defaults per severity).
    pub fn merged_thresholds(&self) -> BTreeMap<Severity, &Threshold> {
        let mut merged: BTreeMap<Severity, &Threshold> = self
            .default_thresholds
            .iter()
            .map(|(severity, threshold)| (*severity, threshold))
            .collect();
        for (severity, threshold) in &self.custom_thresholds {
            merged.insert(*severity, threshold);
        }
        merged
    }

    /// Copy of this rule with a different enabled flag.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    /// Copy of this rule with a user-chosen threshold for one severity.
    pub fn with_custom_threshold(
        &self,
        severity: Severity,
        threshold: Threshold,
    ) -> Result<Self, RuleConfigError> {
        validate_threshold(&self.id, &self.value_kind, severity, &threshold)?;
        let mut next = self.clone();
        next.custom_thresholds.insert(severity, threshold);
        Ok(next)
    }
}

fn validate_threshold(
    rule_id: &str,
    kind: &ValueKind,
    severity: Severity,
    threshold: &Threshold,
) -> Result<(), RuleConfigError> {
    if severity == Severity::Error {
        return Err(RuleConfigError::ErrorSeverityThreshold {
            rule_id: rule_id.to_string(),
        });
    }
    let mismatch = || RuleConfigError::ThresholdShapeMismatch {
        rule_id: rule_id.to_string(),
        severity,
        kind: kind.as_str(),
        shape: threshold.shape(),
    };
    match (kind, threshold) {
        (ValueKind::Boolean, Threshold::Flag(_)) => Ok(()),
        (ValueKind::Enum { members }, Threshold::Members(selected)) => {
            match selected.iter().find(|m| !members.contains(*m)) {
                Some(member) => Err(RuleConfigError::UnknownEnumMember {
                    rule_id: rule_id.to_string(),
                    severity,
                    member: member.clone(),
                }),
                None => Ok(()),
            }
        }
        (kind, Threshold::Range(range)) if kind.is_numeric() => {
            if range.is_valid() {
                Ok(())
            } else {
                Err(RuleConfigError::InvalidRange {
                    rule_id: rule_id.to_string(),
                    severity,
                })
            }
        }
        _ => Err(mismatch()),
    }
}

// ─── Catalog ────────────────────────────────────────────────────────────

/// Ordered set of rules with unique ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<RuleConfig>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<RuleConfig>) -> Result<Self, RuleConfigError> {
        let mut seen = BTreeSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(RuleConfigError::DuplicateRule {
                    rule_id: rule.id().to_string(),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[RuleConfig] {
        &self.rules
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleConfig> {
        self.rules.iter().find(|r| r.id() == rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// New catalog with one rule's enabled flag replaced.
    ///
    /// Returns `None` when the rule id is unknown.
    pub fn with_rule_enabled(&self, rule_id: &str, enabled: bool) -> Option<Self> {
        let index = self.rules.iter().position(|r| r.id() == rule_id)?;
        let mut rules = self.rules.clone();
        rules[index] = rules[index].with_enabled(enabled);
        Some(Self { rules })
    }
}
