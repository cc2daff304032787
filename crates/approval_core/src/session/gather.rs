//! Pull every provider once for a draft.
//!
//! Historical gas is only requested when neither the simulation nor the
//! draft supplies a gas figure. History and L1 fee failures degrade to
//! "absent"; every other provider failure propagates. The Safe nonce is
//! fetched only when a Safe provider is supplied, i.e. for multisig accounts.

use crate::draft::{DraftFingerprint, TxDraft};
use crate::gas::policy::GasPolicy;
use crate::gas::recommend::{GasRecommendInput, recommend_gas};
use crate::providers::{
    ChainStateProvider, GasMarketProvider, HistoricalGasProvider, L1FeeProvider,
    PendingTxSource, ProviderError, RuleCatalogSource, SafeNonceProvider, SimulationProvider,
    SimulationResult,
};
use crate::rules::RuleCatalog;

use super::ChainSnapshot;

/// Borrowed provider set for one gather pass.
#[derive(Clone, Copy)]
pub struct Providers<'a> {
    pub simulation: &'a dyn SimulationProvider,
    pub gas_market: &'a dyn GasMarketProvider,
    pub chain: &'a dyn ChainStateProvider,
    pub history: &'a dyn HistoricalGasProvider,
    pub pending: &'a dyn PendingTxSource,
    pub l1_fee: &'a dyn L1FeeProvider,
    pub rules: &'a dyn RuleCatalogSource,
    /// Set for multisig accounts.
    pub safe: Option<&'a dyn SafeNonceProvider>,
}

#[derive(Debug, Clone)]
pub struct GatheredInputs {
    pub fingerprint: DraftFingerprint,
    pub simulation: SimulationResult,
    pub snapshot: ChainSnapshot,
    pub catalog: RuleCatalog,
}

pub fn gather_inputs(
    draft: &TxDraft,
    providers: Providers<'_>,
    policy: &GasPolicy,
) -> Result<GatheredInputs, ProviderError> {
    let fingerprint = draft.fingerprint();
    let simulation = providers.simulation.simulate(draft)?;

    let gas = recommend_gas(
        &GasRecommendInput {
            declared_gas: simulation.declared_gas(),
            simulated_gas_used: simulation.gas_used,
            tx_gas_limit: draft.gas_limit,
        },
        policy,
        || match providers.history.historical_gas_used(draft) {
            Ok(gas_used) => Some(gas_used),
            Err(err) => {
                tracing::warn!(error = %err, "historical gas lookup failed");
                None
            }
        },
    );

    let on_chain_nonce = providers.chain.nonce(draft.chain_id, draft.from)?;
    let native_balance = providers.chain.native_balance(draft.chain_id, draft.from)?;
    let block_gas_limit = providers.chain.block_gas_limit(draft.chain_id)?;
    let local_nonce = providers.pending.local_nonce(draft.chain_id, draft.from)?;
    let pending = providers.pending.pending_costs(draft.chain_id, draft.from)?;
    let gas_levels = providers.gas_market.gas_market(draft.chain_id, draft.gas_price)?;
    let l1_fee = providers.l1_fee.l1_fee(draft).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "l1 fee estimate failed");
        None
    });
    let safe_nonce = providers
        .safe
        .map(|safe| safe.safe_nonce(draft.chain_id, draft.from))
        .transpose()?;
    let catalog = providers.rules.rule_catalog()?;

    tracing::debug!(
        %fingerprint,
        gas_source = gas.source.as_str(),
        on_chain_nonce,
        safe_nonce = safe_nonce.as_ref().map(|s| s.nonce),
        pending = pending.len(),
        levels = gas_levels.len(),
        "inputs gathered"
    );

    Ok(GatheredInputs {
        fingerprint,
        simulation,
        snapshot: ChainSnapshot {
            fingerprint,
            gas,
            on_chain_nonce,
            local_nonce,
            native_balance,
            pending,
            block_gas_limit,
            l1_fee,
            gas_levels,
            safe_nonce,
        },
        catalog,
    })
}
