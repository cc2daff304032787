//! Gas plan assembly.
//!
//! The plan is always built as one value from a single set of inputs and
//! replaces the previous plan whole.

use alloy_primitives::U256;

use super::policy::GasPolicy;
use super::ratio::GasLimitRatio;
use super::recommend::GasRecommendation;
use super::solver::{GasLimitSolution, GasLimitSolveInput, PendingTxCost, solve_gas_limit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPlan {
    pub recommended_gas_limit: u64,
    pub recommended_gas_limit_ratio: GasLimitRatio,
    pub recommended_nonce: u64,
    pub affordable_gas_limit: u64,
    pub solution: GasLimitSolution,
}

#[derive(Debug, Clone)]
pub struct GasPlanInput<'a> {
    pub chain_id: u64,
    pub recommendation: GasRecommendation,
    pub recommended_nonce: u64,
    /// Nonce the draft will actually be signed with.
    pub nonce: u64,
    pub gas_price: U256,
    pub pending: &'a [PendingTxCost],
    pub native_balance: U256,
    pub send_value: U256,
    pub block_gas_limit: Option<u64>,
}

/// Ratio for a recommendation: chain ratio when it needs one, else 1.
pub fn plan_ratio(recommendation: &GasRecommendation, chain_id: u64, policy: &GasPolicy) -> GasLimitRatio {
    if recommendation.needs_ratio {
        policy.ratio_for_chain(chain_id)
    } else {
        GasLimitRatio::ONE
    }
}

pub fn build_gas_plan(input: &GasPlanInput<'_>, policy: &GasPolicy) -> GasPlan {
    let ratio = plan_ratio(&input.recommendation, input.chain_id, policy);
    let solution = solve_gas_limit(
        &GasLimitSolveInput {
            gas_price: input.gas_price,
            nonce: input.nonce,
            pending: input.pending,
            native_balance: input.native_balance,
            send_value: input.send_value,
            recommended_gas: input.recommendation.gas,
            ratio,
            block_gas_limit: input.block_gas_limit,
        },
        policy,
    );
    GasPlan {
        recommended_gas_limit: input.recommendation.gas,
        recommended_gas_limit_ratio: ratio,
        recommended_nonce: input.recommended_nonce,
        affordable_gas_limit: solution.gas_limit,
        solution,
    }
}
