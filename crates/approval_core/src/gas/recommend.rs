//! Gas and nonce recommendation.
//!
//! Gas tiers, first match wins:
//! 1. `declared_gas` from simulation, used verbatim, the safety ratio applies.
//! 2. the draft's own `gas`/`gasLimit` field, the ratio applies.
//! 3. historical gas used for the same (chain, from, to, data), ratio applies.
//! 4. `fallback_gas_limit`, ratio does not apply.
//!
//! The history lookup is only performed when tiers 1 and 2 are absent.
//!
//! Nonce: `max(on_chain, local_queued)` unless the draft keeps its own nonce
//! (speed-up, cancel, self-transfer with an explicit nonce, manual edit).
//! Multisig (Safe) accounts follow the Safe's own counter instead: one past
//! the highest proposed Safe transaction, or the Safe nonce when none is queued.

use crate::draft::{NonceKeepReason, TxDraft};

use super::policy::GasPolicy;

/// Which tier produced the recommended gas figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasSource {
    Declared,
    TxField,
    History,
    Fallback,
}

impl GasSource {
    pub fn as_str(self) -> &'static str {
        match self {
            GasSource::Declared => "declared",
            GasSource::TxField => "tx_field",
            GasSource::History => "history",
            GasSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasRecommendInput {
    /// Gas figure declared by the simulation (`gas_limit || gas_used`).
    pub declared_gas: Option<u64>,
    /// Gas used reported by the simulation, for display.
    pub simulated_gas_used: u64,
    /// `gas` / `gasLimit` supplied on the draft.
    pub tx_gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasRecommendation {
    pub gas: u64,
    pub gas_used: u64,
    pub needs_ratio: bool,
    pub source: GasSource,
}

/// Pick the recommended gas figure.
///
/// `historical_gas_used` is invoked at most once and only if tiers 1 and 2
/// produced nothing. A zero figure is treated as absent in every tier.
pub fn recommend_gas<F>(
    input: &GasRecommendInput,
    policy: &GasPolicy,
    historical_gas_used: F,
) -> GasRecommendation
where
    F: FnOnce() -> Option<u64>,
{
    let recommendation = if let Some(gas) = input.declared_gas.filter(|g| *g > 0) {
        GasRecommendation {
            gas,
            gas_used: input.simulated_gas_used,
            needs_ratio: true,
            source: GasSource::Declared,
        }
    } else if let Some(gas) = input.tx_gas_limit.filter(|g| *g > 0) {
        GasRecommendation {
            gas,
            gas_used: gas,
            needs_ratio: true,
            source: GasSource::TxField,
        }
    } else if let Some(gas) = historical_gas_used().filter(|g| *g > 0) {
        GasRecommendation {
            gas,
            gas_used: gas,
            needs_ratio: true,
            source: GasSource::History,
        }
    } else {
        GasRecommendation {
            gas: policy.fallback_gas_limit,
            gas_used: policy.fallback_gas_limit,
            needs_ratio: false,
            source: GasSource::Fallback,
        }
    };

    tracing::debug!(
        gas = recommendation.gas,
        source = recommendation.source.as_str(),
        needs_ratio = recommendation.needs_ratio,
        "gas recommended"
    );
    recommendation
}

/// The draft keeps its own nonce; nothing is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NonceRecommendError {
    #[error("draft keeps its existing nonce ({reason:?})")]
    KeepExistingNonce { reason: NonceKeepReason },
}

/// `max(on_chain, local_queued)`. A missing local queue counts as empty.
pub fn next_nonce(on_chain_nonce: u64, local_queued_nonce: Option<u64>) -> u64 {
    local_queued_nonce.map_or(on_chain_nonce, |local| local.max(on_chain_nonce))
}

/// Recommend the next nonce for `draft`.
///
/// Rejected for drafts that keep their nonce.
pub fn recommend_nonce(
    draft: &TxDraft,
    on_chain_nonce: u64,
    local_queued_nonce: Option<u64>,
) -> Result<u64, NonceRecommendError> {
    if let Some(reason) = draft.nonce_keep_reason() {
        tracing::debug!(?reason, "nonce kept");
        return Err(NonceRecommendError::KeepExistingNonce { reason });
    }
    Ok(next_nonce(on_chain_nonce, local_queued_nonce))
}

/// Next Safe nonce: `max(pending) + 1`, or `safe_nonce` when nothing is
/// queued. Stale proposals below `safe_nonce` are ignored.
pub fn next_safe_nonce(safe_nonce: u64, pending_safe_nonces: &[u64]) -> u64 {
    pending_safe_nonces
        .iter()
        .copied()
        .filter(|n| *n >= safe_nonce)
        .max()
        .map_or(safe_nonce, |highest| highest.saturating_add(1))
}

/// Nonce a multisig draft is signed with.
///
/// A draft nonce at or above the Safe nonce is kept, so a proposal can
/// replace a queued one. Anything lower, or no nonce, takes the recommendation.
pub fn resolve_safe_nonce(draft_nonce: Option<u64>, safe_nonce: u64, recommended: u64) -> u64 {
    draft_nonce.filter(|n| *n >= safe_nonce).unwrap_or(recommended)
}
