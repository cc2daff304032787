//! Balance-constrained gas limit solver.
//!
//! Algorithm (`g` = recommended gas, `r` = ratio, `p` = gas price):
//! 1. `reserved = send_value`
//! 2. `pending_cost = Σ (value + gas_used * entry_price)` over pending entries
//!    with `nonce < this.nonce`
//! 3. `available = balance - reserved - pending_cost`
//! 4. `available <= 0` ⇒ `floor(g * min(r, cap))`
//! 5. `available >= p * g * r` ⇒ `ceil(g * r)`
//! 6. otherwise `adapt = available / p`; `adapt < g * min(r, cap)` ⇒ the
//!    floor of step 4, else `floor(adapt)`
//! 7. result above a known block gas limit ⇒ `floor(block * headroom)`
//!
//! All comparisons are exact: ratios are cross-multiplied by their scale so
//! no division happens before a comparison.

use alloy_primitives::U256;

use super::policy::GasPolicy;
use super::ratio::GasLimitRatio;

/// Cost of one not-yet-confirmed transaction from the same account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTxCost {
    pub nonce: u64,
    pub native_value: U256,
    pub gas_price: U256,
    pub gas_used_or_limit: u64,
}

impl PendingTxCost {
    /// `native_value + gas_used_or_limit * gas_price`, saturating.
    pub fn total_cost(&self) -> U256 {
        self.native_value
            .saturating_add(U256::from(self.gas_used_or_limit).saturating_mul(self.gas_price))
    }
}

#[derive(Debug, Clone)]
pub struct GasLimitSolveInput<'a> {
    pub gas_price: U256,
    pub nonce: u64,
    pub pending: &'a [PendingTxCost],
    pub native_balance: U256,
    pub send_value: U256,
    pub recommended_gas: u64,
    pub ratio: GasLimitRatio,
    pub block_gas_limit: Option<u64>,
}

/// Which step of the algorithm produced the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBranch {
    /// Nothing left after reserved value and pending costs.
    NoAvailableBalance,
    /// The full `ceil(g * r)` figure is affordable.
    FullyAffordable,
    /// Balance-adapted figure between the floor and the full figure.
    BalanceAdapted,
    /// Adapted figure fell under the floor; the floor is returned.
    AdaptedBelowFloor,
}

impl SolverBranch {
    pub fn as_str(self) -> &'static str {
        match self {
            SolverBranch::NoAvailableBalance => "no_available_balance",
            SolverBranch::FullyAffordable => "fully_affordable",
            SolverBranch::BalanceAdapted => "balance_adapted",
            SolverBranch::AdaptedBelowFloor => "adapted_below_floor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimitSolution {
    pub gas_limit: u64,
    pub branch: SolverBranch,
    pub clamped_to_block: bool,
}

// ─── Balance ────────────────────────────────────────────────────────────

/// Sum of pending costs for entries ahead of `nonce`.
pub fn pending_cost(pending: &[PendingTxCost], nonce: u64) -> U256 {
    pending
        .iter()
        .filter(|entry| entry.nonce < nonce)
        .fold(U256::ZERO, |acc, entry| acc.saturating_add(entry.total_cost()))
}

/// Balance left for this transaction's gas, `None` when nothing is left.
pub fn available_balance(input: &GasLimitSolveInput<'_>) -> Option<U256> {
    let reserved = input
        .send_value
        .saturating_add(pending_cost(input.pending, input.nonce));
    input
        .native_balance
        .checked_sub(reserved)
        .filter(|available| !available.is_zero())
}

// ─── Solver ─────────────────────────────────────────────────────────────

/// Derive the largest affordable gas limit for the draft.
pub fn solve_gas_limit(input: &GasLimitSolveInput<'_>, policy: &GasPolicy) -> GasLimitSolution {
    let floor_ratio = input.ratio.min(policy.insufficient_balance_ratio_cap);
    let floor_gas = floor_ratio.scale_floor(input.recommended_gas);

    let (gas_limit, branch) = match available_balance(input) {
        None => (floor_gas, SolverBranch::NoAvailableBalance),
        Some(available) => affordable_gas(input, available, floor_ratio, floor_gas),
    };

    let (gas_limit, clamped_to_block) = match input.block_gas_limit {
        Some(block) if gas_limit > block => (policy.block_clamp(block), true),
        _ => (gas_limit, false),
    };

    tracing::debug!(
        gas_limit,
        branch = branch.as_str(),
        clamped_to_block,
        recommended_gas = input.recommended_gas,
        ratio = %input.ratio,
        "gas limit solved"
    );

    GasLimitSolution {
        gas_limit,
        branch,
        clamped_to_block,
    }
}

fn affordable_gas(
    input: &GasLimitSolveInput<'_>,
    available: U256,
    floor_ratio: GasLimitRatio,
    floor_gas: u64,
) -> (u64, SolverBranch) {
    let scale = U256::from(GasLimitRatio::scale());
    let scaled_available = available.saturating_mul(scale);
    let gas_cost = input
        .gas_price
        .saturating_mul(U256::from(input.recommended_gas));

    let full_cost = gas_cost.saturating_mul(U256::from(input.ratio.milli()));
    if scaled_available >= full_cost {
        return (
            input.ratio.scale_ceil(input.recommended_gas),
            SolverBranch::FullyAffordable,
        );
    }

    // p > 0 here: a zero price makes `full_cost` zero and step 5 always wins.
    let floor_cost = gas_cost.saturating_mul(U256::from(floor_ratio.milli()));
    if scaled_available < floor_cost {
        return (floor_gas, SolverBranch::AdaptedBelowFloor);
    }
    let adapt = available / input.gas_price;
    let adapt = u64::try_from(adapt).unwrap_or(u64::MAX);
    (adapt, SolverBranch::BalanceAdapted)
}
