//! Rule catalog JSON format.
//!
//! ```json
//! {"rules": [{
//!   "id": "spender_is_new",
//!   "fact_key": "spender_age_days",
//!   "enabled": true,
//!   "value_kind": {"type": "int", "min": 0},
//!   "default_thresholds": {"warning": {"range": {"max": 7, "max_included": false}}},
//!   "custom_thresholds": {}
//! }]}
//! ```
//!
//! Every rule is validated through the core constructors; a single invalid
//! rule rejects the whole file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use approval_core::providers::{ProviderError, RuleCatalogSource};
use approval_core::rules::{
    NumberRange, RuleCatalog, RuleConfig, RuleConfigError, Severity, Threshold, ValueKind,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read rule catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse rule catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid rule: {0}")]
    Invalid(#[from] RuleConfigError),
}

// ─── DTOs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityDto {
    Safe,
    Warning,
    Danger,
    Forbidden,
}

impl From<SeverityDto> for Severity {
    fn from(dto: SeverityDto) -> Self {
        match dto {
            SeverityDto::Safe => Severity::Safe,
            SeverityDto::Warning => Severity::Warning,
            SeverityDto::Danger => Severity::Danger,
            SeverityDto::Forbidden => Severity::Forbidden,
        }
    }
}

fn severity_dto(severity: Severity) -> Option<SeverityDto> {
    match severity {
        Severity::Safe => Some(SeverityDto::Safe),
        Severity::Warning => Some(SeverityDto::Warning),
        Severity::Danger => Some(SeverityDto::Danger),
        Severity::Forbidden => Some(SeverityDto::Forbidden),
        Severity::Error => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueKindDto {
    Boolean,
    Int {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
    Float {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Percent {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Enum { members: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDto {
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default = "included_default")]
        min_included: bool,
        #[serde(default)]
        max_included: bool,
    },
    Flag(bool),
    Members(Vec<String>),
}

fn included_default() -> bool {
    true
}

fn enabled_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfigDto {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact_key: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    pub value_kind: ValueKindDto,
    #[serde(default)]
    pub default_thresholds: BTreeMap<SeverityDto, ThresholdDto>,
    #[serde(default)]
    pub custom_thresholds: BTreeMap<SeverityDto, ThresholdDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCatalogDto {
    pub rules: Vec<RuleConfigDto>,
}

// ─── Conversions ────────────────────────────────────────────────────────

impl From<ValueKindDto> for ValueKind {
    fn from(dto: ValueKindDto) -> Self {
        match dto {
            ValueKindDto::Boolean => ValueKind::Boolean,
            ValueKindDto::Int { min, max } => ValueKind::Int { min, max },
            ValueKindDto::Float { min, max } => ValueKind::Float { min, max },
            ValueKindDto::Percent { min, max } => ValueKind::Percent { min, max },
            ValueKindDto::Enum { members } => ValueKind::Enum {
                members: members.into_iter().collect(),
            },
        }
    }
}

impl From<&ValueKind> for ValueKindDto {
    fn from(kind: &ValueKind) -> Self {
        match kind {
            ValueKind::Boolean => ValueKindDto::Boolean,
            ValueKind::Int { min, max } => ValueKindDto::Int { min: *min, max: *max },
            ValueKind::Float { min, max } => ValueKindDto::Float { min: *min, max: *max },
            ValueKind::Percent { min, max } => ValueKindDto::Percent { min: *min, max: *max },
            ValueKind::Enum { members } => ValueKindDto::Enum {
                members: members.iter().cloned().collect(),
            },
        }
    }
}

impl From<ThresholdDto> for Threshold {
    fn from(dto: ThresholdDto) -> Self {
        match dto {
            ThresholdDto::Range {
                min,
                max,
                min_included,
                max_included,
            } => Threshold::Range(NumberRange {
                min,
                max,
                min_included,
                max_included,
            }),
            ThresholdDto::Flag(flag) => Threshold::Flag(flag),
            ThresholdDto::Members(members) => {
                Threshold::Members(members.into_iter().collect::<BTreeSet<_>>())
            }
        }
    }
}

impl From<&Threshold> for ThresholdDto {
    fn from(threshold: &Threshold) -> Self {
        match threshold {
            Threshold::Range(range) => ThresholdDto::Range {
                min: range.min,
                max: range.max,
                min_included: range.min_included,
                max_included: range.max_included,
            },
            Threshold::Flag(flag) => ThresholdDto::Flag(*flag),
            Threshold::Members(members) => ThresholdDto::Members(members.iter().cloned().collect()),
        }
    }
}

fn thresholds_from_dto(
    dto: BTreeMap<SeverityDto, ThresholdDto>,
) -> BTreeMap<Severity, Threshold> {
    dto.into_iter()
        .map(|(severity, threshold)| (severity.into(), threshold.into()))
        .collect()
}

fn thresholds_to_dto(
    thresholds: &BTreeMap<Severity, Threshold>,
) -> BTreeMap<SeverityDto, ThresholdDto> {
    thresholds
        .iter()
        .filter_map(|(severity, threshold)| Some((severity_dto(*severity)?, threshold.into())))
        .collect()
}

impl RuleConfigDto {
    pub fn into_rule(self) -> Result<RuleConfig, RuleConfigError> {
        RuleConfig::new(
            self.id,
            self.fact_key,
            self.enabled,
            self.value_kind.into(),
            thresholds_from_dto(self.default_thresholds),
            thresholds_from_dto(self.custom_thresholds),
        )
    }
}

impl From<&RuleConfig> for RuleConfigDto {
    fn from(rule: &RuleConfig) -> Self {
        let fact_key = (rule.fact_key() != rule.id()).then(|| rule.fact_key().to_string());
        Self {
            id: rule.id().to_string(),
            fact_key,
            enabled: rule.enabled(),
            value_kind: rule.value_kind().into(),
            default_thresholds: thresholds_to_dto(rule.default_thresholds()),
            custom_thresholds: thresholds_to_dto(rule.custom_thresholds()),
        }
    }
}

impl RuleCatalogDto {
    pub fn into_catalog(self) -> Result<RuleCatalog, RuleConfigError> {
        let rules = self
            .rules
            .into_iter()
            .map(RuleConfigDto::into_rule)
            .collect::<Result<Vec<_>, _>>()?;
        RuleCatalog::new(rules)
    }
}

impl From<&RuleCatalog> for RuleCatalogDto {
    fn from(catalog: &RuleCatalog) -> Self {
        Self {
            rules: catalog.rules().iter().map(RuleConfigDto::from).collect(),
        }
    }
}

// ─── Load / save ────────────────────────────────────────────────────────

pub fn parse_rule_catalog(raw: &str) -> Result<RuleCatalog, CatalogLoadError> {
    let dto: RuleCatalogDto = serde_json::from_str(raw)?;
    Ok(dto.into_catalog()?)
}

pub fn load_rule_catalog(path: impl AsRef<Path>) -> Result<RuleCatalog, CatalogLoadError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_rule_catalog(&raw)?;
    tracing::debug!(path = %path.display(), rules = catalog.len(), "rule catalog loaded");
    Ok(catalog)
}

pub fn rule_catalog_to_json(catalog: &RuleCatalog) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&RuleCatalogDto::from(catalog))
}

/// Rule catalog read from a JSON file on every request.
#[derive(Debug, Clone)]
pub struct FileRuleCatalog {
    path: PathBuf,
}

impl FileRuleCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleCatalogSource for FileRuleCatalog {
    fn rule_catalog(&self) -> Result<RuleCatalog, ProviderError> {
        load_rule_catalog(&self.path).map_err(|e| match e {
            CatalogLoadError::Read { .. } => ProviderError::Unavailable {
                provider: "rule_catalog",
                reason: e.to_string(),
            },
            other => ProviderError::Malformed {
                provider: "rule_catalog",
                reason: other.to_string(),
            },
        })
    }
}
