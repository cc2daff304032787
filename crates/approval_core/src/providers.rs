//! External data providers consumed by an approval session.
//!
//! All providers are synchronous from the engine's point of view; callers
//! that fetch asynchronously resolve the data first and hand it over through
//! an implementation of these traits. The engine never retries.

use alloy_primitives::{Address, I256, U256};

use crate::draft::TxDraft;
use crate::gas::market::GasLevel;
use crate::gas::solver::PendingTxCost;
use crate::rules::RuleCatalog;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {reason}")]
    Unavailable {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} returned malformed data: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },
}

/// Result of pre-executing the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    pub gas_used: u64,
    /// Gas figure the simulator declares for the draft, if any.
    pub gas_limit: Option<u64>,
    pub success: bool,
    pub native_balance_change: I256,
}

impl SimulationResult {
    /// `gas_limit || gas_used`, zero meaning absent. A failed run declares nothing.
    pub fn declared_gas(&self) -> Option<u64> {
        if !self.success {
            return None;
        }
        self.gas_limit
            .filter(|g| *g > 0)
            .or(Some(self.gas_used).filter(|g| *g > 0))
    }
}

pub trait SimulationProvider {
    fn simulate(&self, draft: &TxDraft) -> Result<SimulationResult, ProviderError>;
}

pub trait GasMarketProvider {
    /// Gas levels for `chain_id`. `custom_price` seeds the custom level.
    fn gas_market(
        &self,
        chain_id: u64,
        custom_price: Option<U256>,
    ) -> Result<Vec<GasLevel>, ProviderError>;
}

pub trait ChainStateProvider {
    fn nonce(&self, chain_id: u64, address: Address) -> Result<u64, ProviderError>;
    fn native_balance(&self, chain_id: u64, address: Address) -> Result<U256, ProviderError>;
    /// Gas limit of the latest block, when the chain reports one.
    fn block_gas_limit(&self, chain_id: u64) -> Result<Option<u64>, ProviderError>;
}

pub trait HistoricalGasProvider {
    /// Gas used by earlier transactions of the same shape. Zero means none.
    fn historical_gas_used(&self, draft: &TxDraft) -> Result<u64, ProviderError>;
}

pub trait RuleCatalogSource {
    fn rule_catalog(&self) -> Result<RuleCatalog, ProviderError>;
}

pub trait PendingTxSource {
    /// Next nonce after the locally queued transactions, if any are queued.
    fn local_nonce(&self, chain_id: u64, address: Address) -> Result<Option<u64>, ProviderError>;
    fn pending_costs(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Vec<PendingTxCost>, ProviderError>;
}

pub trait L1FeeProvider {
    /// L1 data fee for rollups that expose one, `None` elsewhere.
    fn l1_fee(&self, draft: &TxDraft) -> Result<Option<U256>, ProviderError>;
}

/// Nonce state of a multisig (Safe) account, kept by the Safe itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeNonceState {
    /// Nonce the Safe contract will execute next.
    pub nonce: u64,
    /// Nonces of proposed Safe transactions not yet executed.
    pub pending_nonces: Vec<u64>,
}

pub trait SafeNonceProvider {
    fn safe_nonce(&self, chain_id: u64, safe: Address) -> Result<SafeNonceState, ProviderError>;
}
