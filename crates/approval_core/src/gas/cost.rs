//! Gas cost shown to the user and used by the balance check.

use alloy_primitives::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasCost {
    /// `gas_used * gas_price + l1_fee`
    pub gas_cost: U256,
    /// `gas_limit * gas_price + l1_fee`
    pub max_gas_cost: U256,
}

/// Expected and worst-case fee for the draft.
///
/// `l1_fee` is the L1 data fee on rollups that report one.
pub fn explain_gas(gas_used: u64, gas_limit: u64, gas_price: U256, l1_fee: Option<U256>) -> GasCost {
    let l1_fee = l1_fee.unwrap_or(U256::ZERO);
    GasCost {
        gas_cost: U256::from(gas_used)
            .saturating_mul(gas_price)
            .saturating_add(l1_fee),
        max_gas_cost: U256::from(gas_limit)
            .saturating_mul(gas_price)
            .saturating_add(l1_fee),
    }
}
