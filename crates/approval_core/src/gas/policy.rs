//! Gas policy constants and per-chain ratio overrides.
//!
//! Defaults:
//! - default gas limit ratio = 1.5
//! - minimum gas limit = 21000
//! - fallback gas limit = 1_000_000
//! - insufficient-balance ratio cap = 1.5
//! - block gas limit headroom = 95%
//! - chains 1284, 1285, 1287 use ratio 2.0

use std::collections::BTreeMap;

use super::ratio::GasLimitRatio;

pub const MINIMUM_GAS_LIMIT: u64 = 21_000;
pub const FALLBACK_GAS_LIMIT: u64 = 1_000_000;
pub const BLOCK_GAS_LIMIT_HEADROOM_PCT: u64 = 95;
pub const SAFE_CHAIN_GAS_LIMIT_RATIO: GasLimitRatio = GasLimitRatio::from_milli(2_000);

/// Chains whose gas estimates are known to undershoot.
pub const SAFE_RATIO_CHAIN_IDS: [u64; 3] = [1284, 1285, 1287];

/// Numeric policy shared by the recommender, solver and tx check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    pub default_ratio: GasLimitRatio,
    pub chain_ratios: BTreeMap<u64, GasLimitRatio>,
    pub minimum_gas_limit: u64,
    pub fallback_gas_limit: u64,
    pub insufficient_balance_ratio_cap: GasLimitRatio,
    /// Percentage of the block gas limit a clamped figure is reduced to.
    pub block_gas_limit_headroom_pct: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            default_ratio: GasLimitRatio::DEFAULT,
            chain_ratios: SAFE_RATIO_CHAIN_IDS
                .iter()
                .map(|id| (*id, SAFE_CHAIN_GAS_LIMIT_RATIO))
                .collect(),
            minimum_gas_limit: MINIMUM_GAS_LIMIT,
            fallback_gas_limit: FALLBACK_GAS_LIMIT,
            insufficient_balance_ratio_cap: GasLimitRatio::INSUFFICIENT_BALANCE_CAP,
            block_gas_limit_headroom_pct: BLOCK_GAS_LIMIT_HEADROOM_PCT,
        }
    }
}

impl GasPolicy {
    /// Ratio applied to a recommended figure on `chain_id`.
    pub fn ratio_for_chain(&self, chain_id: u64) -> GasLimitRatio {
        self.chain_ratios
            .get(&chain_id)
            .copied()
            .unwrap_or(self.default_ratio)
    }

    /// `floor(block_gas_limit * headroom)`.
    pub fn block_clamp(&self, block_gas_limit: u64) -> u64 {
        let clamped = u128::from(block_gas_limit) * u128::from(self.block_gas_limit_headroom_pct) / 100;
        u64::try_from(clamped).unwrap_or(u64::MAX)
    }
}
