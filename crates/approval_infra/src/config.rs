//! Engine configuration defaults and settings file.
//!
//! Every gas policy parameter has a default. A parameter set explicitly in the
//! settings file takes precedence; a non-finite or negative value fails closed
//! instead of silently falling back.
//!
//! Defaults:
//! - `default_gas_limit_ratio` = 1.5
//! - `minimum_gas_limit` = 21000
//! - `fallback_gas_limit` = 1000000
//! - `insufficient_balance_ratio_cap` = 1.5
//! - `block_gas_limit_headroom` = 0.95
//! - `safe_chain_gas_limit_ratio` = 2.0 (chains 1284, 1285, 1287)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use approval_core::gas::GasLimitRatio;
use approval_core::gas::GasPolicy;
use approval_core::gas::policy::SAFE_RATIO_CHAIN_IDS;
use serde::{Deserialize, Serialize};

/// Numeric gas policy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigParam {
    DefaultGasLimitRatio,
    MinimumGasLimit,
    FallbackGasLimit,
    InsufficientBalanceRatioCap,
    BlockGasLimitHeadroom,
    SafeChainGasLimitRatio,
}

/// A parameter resolved to no usable value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("config fail-closed: '{param_name}' {reason}")]
pub struct MissingConfigError {
    pub param_name: &'static str,
    pub reason: &'static str,
}

/// Default for a parameter, or `None` if it has none.
pub fn config_default(param: ConfigParam) -> Option<f64> {
    match param {
        ConfigParam::DefaultGasLimitRatio => Some(1.5),
        ConfigParam::MinimumGasLimit => Some(21_000.0),
        ConfigParam::FallbackGasLimit => Some(1_000_000.0),
        ConfigParam::InsufficientBalanceRatioCap => Some(1.5),
        ConfigParam::BlockGasLimitHeadroom => Some(0.95),
        ConfigParam::SafeChainGasLimitRatio => Some(2.0),
    }
}

pub fn param_name(param: ConfigParam) -> &'static str {
    match param {
        ConfigParam::DefaultGasLimitRatio => "default_gas_limit_ratio",
        ConfigParam::MinimumGasLimit => "minimum_gas_limit",
        ConfigParam::FallbackGasLimit => "fallback_gas_limit",
        ConfigParam::InsufficientBalanceRatioCap => "insufficient_balance_ratio_cap",
        ConfigParam::BlockGasLimitHeadroom => "block_gas_limit_headroom",
        ConfigParam::SafeChainGasLimitRatio => "safe_chain_gas_limit_ratio",
    }
}

/// Expected number of `ConfigParam` variants. Bump together with `ALL_PARAMS`.
pub const EXPECTED_PARAM_COUNT: usize = 6;

pub const ALL_PARAMS: &[ConfigParam] = &[
    ConfigParam::DefaultGasLimitRatio,
    ConfigParam::MinimumGasLimit,
    ConfigParam::FallbackGasLimit,
    ConfigParam::InsufficientBalanceRatioCap,
    ConfigParam::BlockGasLimitHeadroom,
    ConfigParam::SafeChainGasLimitRatio,
];

/// Resolve a parameter value.
///
/// - `Some(v)` wins when finite and non-negative, otherwise fails closed.
/// - `None` resolves to the default, or fails closed without one.
pub fn resolve_config_value(
    param: ConfigParam,
    value: Option<f64>,
) -> Result<f64, MissingConfigError> {
    if let Some(v) = value {
        if !v.is_finite() {
            return Err(MissingConfigError {
                param_name: param_name(param),
                reason: "is non-finite (NaN or Infinity)",
            });
        }
        if v < 0.0 {
            return Err(MissingConfigError {
                param_name: param_name(param),
                reason: "is negative",
            });
        }
        return Ok(v);
    }
    config_default(param).ok_or(MissingConfigError {
        param_name: param_name(param),
        reason: "is missing and has no default",
    })
}

// ─── Settings file ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Missing(#[from] MissingConfigError),
    #[error("'{param_name}' = {value} is out of range")]
    OutOfRange { param_name: &'static str, value: f64 },
}

/// On-disk engine settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub default_gas_limit_ratio: Option<f64>,
    pub minimum_gas_limit: Option<f64>,
    pub fallback_gas_limit: Option<f64>,
    pub insufficient_balance_ratio_cap: Option<f64>,
    pub block_gas_limit_headroom: Option<f64>,
    pub safe_chain_gas_limit_ratio: Option<f64>,
    /// Chains that use `safe_chain_gas_limit_ratio`. Defaults to 1284, 1285, 1287.
    pub safe_ratio_chain_ids: Option<Vec<u64>>,
    /// Per-chain ratio overrides, applied after the safe-ratio chains.
    pub chain_gas_limit_ratios: BTreeMap<u64, f64>,
}

impl EngineSettings {
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "engine settings loaded");
        Ok(settings)
    }

    fn value(&self, param: ConfigParam) -> Option<f64> {
        match param {
            ConfigParam::DefaultGasLimitRatio => self.default_gas_limit_ratio,
            ConfigParam::MinimumGasLimit => self.minimum_gas_limit,
            ConfigParam::FallbackGasLimit => self.fallback_gas_limit,
            ConfigParam::InsufficientBalanceRatioCap => self.insufficient_balance_ratio_cap,
            ConfigParam::BlockGasLimitHeadroom => self.block_gas_limit_headroom,
            ConfigParam::SafeChainGasLimitRatio => self.safe_chain_gas_limit_ratio,
        }
    }

    fn resolve(&self, param: ConfigParam) -> Result<f64, MissingConfigError> {
        resolve_config_value(param, self.value(param))
    }

    /// Build the core gas policy, failing closed on any unusable value.
    pub fn gas_policy(&self) -> Result<GasPolicy, SettingsError> {
        let default_ratio = self.ratio(ConfigParam::DefaultGasLimitRatio)?;
        let safe_ratio = self.ratio(ConfigParam::SafeChainGasLimitRatio)?;

        let safe_chains = self
            .safe_ratio_chain_ids
            .as_deref()
            .unwrap_or(&SAFE_RATIO_CHAIN_IDS[..]);
        let mut chain_ratios: BTreeMap<u64, GasLimitRatio> =
            safe_chains.iter().map(|id| (*id, safe_ratio)).collect();
        for (chain_id, raw) in &self.chain_gas_limit_ratios {
            let ratio = GasLimitRatio::from_f64(*raw).ok_or(SettingsError::OutOfRange {
                param_name: "chain_gas_limit_ratios",
                value: *raw,
            })?;
            chain_ratios.insert(*chain_id, ratio);
        }

        let headroom = self.resolve(ConfigParam::BlockGasLimitHeadroom)?;
        if headroom <= 0.0 || headroom > 1.0 {
            return Err(SettingsError::OutOfRange {
                param_name: param_name(ConfigParam::BlockGasLimitHeadroom),
                value: headroom,
            });
        }

        Ok(GasPolicy {
            default_ratio,
            chain_ratios,
            minimum_gas_limit: self.gas(ConfigParam::MinimumGasLimit)?,
            fallback_gas_limit: self.gas(ConfigParam::FallbackGasLimit)?,
            insufficient_balance_ratio_cap: self.ratio(ConfigParam::InsufficientBalanceRatioCap)?,
            block_gas_limit_headroom_pct: (headroom * 100.0).round() as u64,
        })
    }

    fn ratio(&self, param: ConfigParam) -> Result<GasLimitRatio, SettingsError> {
        let value = self.resolve(param)?;
        GasLimitRatio::from_f64(value).ok_or(SettingsError::OutOfRange {
            param_name: param_name(param),
            value,
        })
    }

    fn gas(&self, param: ConfigParam) -> Result<u64, SettingsError> {
        let value = self.resolve(param)?;
        if value.fract() != 0.0 || value >= u64::MAX as f64 {
            return Err(SettingsError::OutOfRange {
                param_name: param_name(param),
                value,
            });
        }
        Ok(value as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_params_have_defaults() {
        for &param in ALL_PARAMS {
            assert!(
                config_default(param).is_some(),
                "ConfigParam::{:?} ({}) missing from config_default()",
                param,
                param_name(param),
            );
        }
    }

    #[test]
    fn all_params_listed_in_constant() {
        assert_eq!(ALL_PARAMS.len(), EXPECTED_PARAM_COUNT);
        let mut names: Vec<&str> = ALL_PARAMS.iter().map(|&p| param_name(p)).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ALL_PARAMS.len(), "ALL_PARAMS has duplicate entries");
    }

    #[test]
    fn empty_settings_build_default_policy() {
        let policy = EngineSettings::default().gas_policy().unwrap();
        assert_eq!(policy, GasPolicy::default());
    }
}
