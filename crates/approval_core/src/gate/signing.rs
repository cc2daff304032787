//! Signing gate.
//!
//! `can_submit = data_ready && gas price selected && no Forbidden check &&
//! account can sign && !risk.blocks_submit`.
//!
//! A Forbidden check is an absolute veto: acknowledging rules cannot clear it.
//! When several inputs block, the first in this order is reported:
//! NotReady, GasPriceUnavailable, ForbiddenCheck, AccountCannotSign,
//! UnresolvedRisk.

use crate::check::{CheckCode, CheckError};

#[derive(Debug, Clone)]
pub struct SigningGateInput<'a> {
    pub risk_blocks_submit: bool,
    pub checks: &'a [CheckError],
    /// Simulation, chain state and rule outcomes are loaded for this draft.
    pub data_ready: bool,
    pub gas_price_selected: bool,
    /// False for watch-only accounts.
    pub account_can_sign: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingReason {
    NotReady,
    GasPriceUnavailable,
    ForbiddenCheck(CheckCode),
    AccountCannotSign,
    UnresolvedRisk,
}

impl BlockingReason {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockingReason::NotReady => "NotReady",
            BlockingReason::GasPriceUnavailable => "GasPriceUnavailable",
            BlockingReason::ForbiddenCheck(_) => "ForbiddenCheck",
            BlockingReason::AccountCannotSign => "AccountCannotSign",
            BlockingReason::UnresolvedRisk => "UnresolvedRisk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningDecision {
    pub can_submit: bool,
    pub blocking_reason: Option<BlockingReason>,
    /// The balance check fired; the UI offers a top-up instead of signing.
    pub native_token_short: bool,
}

#[derive(Debug, Default)]
pub struct SigningGateMetrics {
    allowed_total: u64,
    blocked_total: u64,
}

impl SigningGateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allowed_total(&self) -> u64 {
        self.allowed_total
    }

    pub fn blocked_total(&self) -> u64 {
        self.blocked_total
    }

    fn record_allowed(&mut self) {
        self.allowed_total += 1;
    }

    fn record_blocked(&mut self) {
        self.blocked_total += 1;
    }
}

pub fn decide(input: &SigningGateInput<'_>, metrics: &mut SigningGateMetrics) -> SigningDecision {
    let native_token_short = input
        .checks
        .iter()
        .any(|c| c.code == CheckCode::NativeTokenNotEnough);

    let blocking_reason = blocking_reason(input);
    match blocking_reason {
        Some(reason) => {
            metrics.record_blocked();
            tracing::debug!(reason = reason.as_str(), "signing blocked");
        }
        None => metrics.record_allowed(),
    }

    SigningDecision {
        can_submit: blocking_reason.is_none(),
        blocking_reason,
        native_token_short,
    }
}

fn blocking_reason(input: &SigningGateInput<'_>) -> Option<BlockingReason> {
    if !input.data_ready {
        return Some(BlockingReason::NotReady);
    }
    if !input.gas_price_selected {
        return Some(BlockingReason::GasPriceUnavailable);
    }
    if let Some(check) = input.checks.iter().find(|c| c.is_forbidden()) {
        return Some(BlockingReason::ForbiddenCheck(check.code));
    }
    if !input.account_can_sign {
        return Some(BlockingReason::AccountCannotSign);
    }
    if input.risk_blocks_submit {
        return Some(BlockingReason::UnresolvedRisk);
    }
    None
}
