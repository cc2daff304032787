//! Gas, balance and nonce checks on the draft as it will be signed.
//!
//! Checks, each evaluated independently:
//! - 3006 Forbidden: `gas_limit < minimum_gas_limit`.
//! - 3004 Warn / 3005 Danger: `21000 <= gas_limit < recommended * ratio`.
//!   The lower bound is the protocol floor, not the configured minimum, so
//!   a raised minimum can fire 3006 and a shortfall together.
//!   With the default ratio, `1 < gas_limit / recommended` warns and
//!   `gas_limit / recommended < 1` is Danger. With any other ratio only
//!   `gas_limit < recommended` warns.
//! - 3001 Forbidden: `max_gas_cost + send_value > native_balance`.
//! - 3003 unleveled: `nonce < recommended_nonce`, skipped for cancel and
//!   speed-up drafts.
//!
//! Multisig accounts do not pay gas from the signing account and skip the
//! three gas checks. The nonce check still applies.

use alloy_primitives::U256;

use super::codes::{CheckCode, CheckError};
use crate::gas::policy::{GasPolicy, MINIMUM_GAS_LIMIT};
use crate::gas::ratio::GasLimitRatio;

#[derive(Debug, Clone)]
pub struct TxCheckInput {
    pub recommended_gas: u64,
    pub ratio: GasLimitRatio,
    pub recommended_nonce: u64,
    pub gas_limit: u64,
    pub nonce: u64,
    pub max_gas_cost: U256,
    pub send_value: U256,
    pub native_balance: U256,
    pub is_cancel_or_speed_up: bool,
    pub is_multisig_account: bool,
}

/// Counters for fired checks.
#[derive(Debug, Default)]
pub struct TxCheckMetrics {
    runs_total: u64,
    forbidden_total: u64,
    fired_total: u64,
}

impl TxCheckMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs_total(&self) -> u64 {
        self.runs_total
    }

    pub fn forbidden_total(&self) -> u64 {
        self.forbidden_total
    }

    pub fn fired_total(&self) -> u64 {
        self.fired_total
    }

    fn record_run(&mut self, errors: &[CheckError]) {
        self.runs_total += 1;
        self.fired_total += errors.len() as u64;
        self.forbidden_total += errors.iter().filter(|e| e.is_forbidden()).count() as u64;
    }
}

/// Run all checks. The list is rebuilt on every call.
pub fn check_transaction(
    input: &TxCheckInput,
    policy: &GasPolicy,
    metrics: &mut TxCheckMetrics,
) -> Vec<CheckError> {
    let mut errors = Vec::new();

    if !input.is_multisig_account {
        if input.gas_limit < policy.minimum_gas_limit {
            errors.push(CheckError::new(CheckCode::GasLimitNotEnough));
        }
        if let Some(code) = shortfall(input, policy) {
            errors.push(CheckError::new(code));
        }

        let required = input.max_gas_cost.saturating_add(input.send_value);
        if required > input.native_balance {
            errors.push(CheckError::new(CheckCode::NativeTokenNotEnough));
        }
    }

    if input.nonce < input.recommended_nonce && !input.is_cancel_or_speed_up {
        errors.push(CheckError::new(CheckCode::NonceLowerThanExpected));
    }

    for error in &errors {
        tracing::debug!(
            code = error.code.as_u16(),
            level = error.level.map(|l| l.as_str()),
            gas_limit = input.gas_limit,
            nonce = input.nonce,
            "tx check fired"
        );
    }
    metrics.record_run(&errors);
    errors
}

/// Gas limit under the recommended figure times ratio, at or above the
/// protocol floor.
fn shortfall(input: &TxCheckInput, policy: &GasPolicy) -> Option<CheckCode> {
    if input.gas_limit < MINIMUM_GAS_LIMIT {
        return None;
    }
    let gas_limit = u128::from(input.gas_limit);
    let recommended = u128::from(input.recommended_gas);
    let scale = u128::from(GasLimitRatio::ONE.milli());

    // gas_limit < recommended * ratio, cross-multiplied.
    if gas_limit * scale >= recommended * u128::from(input.ratio.milli()) {
        return None;
    }
    if input.ratio != policy.default_ratio {
        return (gas_limit < recommended).then_some(CheckCode::GasLimitLessThanExpected);
    }
    if gas_limit > recommended {
        Some(CheckCode::GasLimitLessThanExpected)
    } else if gas_limit < recommended {
        Some(CheckCode::GasLimitLessThanGasUsed)
    } else {
        None
    }
}
