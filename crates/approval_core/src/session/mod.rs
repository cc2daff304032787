//! Caller-owned approval session for one transaction draft.
//!
//! The session owns everything derived for the current draft: rule outcomes,
//! acknowledged rules, the chain snapshot, the gas plan and the check list.
//! Every derived value is recomputed from scratch on each input change and
//! replaced whole.
//!
//! Results are applied together with the fingerprint of the draft they were
//! computed for. A result for any other draft is rejected with
//! `SessionError::StaleDraft` and leaves the session untouched.

mod gather;

pub use gather::{GatheredInputs, Providers, gather_inputs};

use alloy_primitives::U256;

use crate::check::{CheckError, TxCheckInput, TxCheckMetrics, check_transaction};
use crate::draft::{DraftFingerprint, TxDraft};
use crate::gas::cost::{GasCost, explain_gas};
use crate::gas::market::{GasLevel, LastGasSelection, select_gas_level};
use crate::gas::plan::{GasPlan, GasPlanInput, build_gas_plan};
use crate::gas::policy::GasPolicy;
use crate::gas::recommend::{
    GasRecommendation, NonceRecommendError, next_nonce, next_safe_nonce, recommend_nonce,
    resolve_safe_nonce,
};
use crate::gas::solver::PendingTxCost;
use crate::gate::{SigningDecision, SigningGateInput, SigningGateMetrics, decide};
use crate::providers::SafeNonceState;
use crate::rules::{
    AcknowledgeError, FactMap, ProcessedRuleSet, RiskAggregate, RuleCatalog, RuleOutcome,
    aggregate, evaluate,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("result computed for draft {got}, current draft is {expected}")]
    StaleDraft {
        expected: DraftFingerprint,
        got: DraftFingerprint,
    },
    #[error(transparent)]
    Acknowledge(#[from] AcknowledgeError),
    #[error("rule {rule_id} is not in the catalog")]
    UnknownRule { rule_id: String },
    #[error("rule results have not been applied for this draft")]
    RulesNotLoaded,
}

/// Properties of the signing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountProfile {
    /// False for watch-only accounts.
    pub can_sign: bool,
    /// Multisig accounts pay gas through the executing signer.
    pub is_multisig: bool,
}

impl Default for AccountProfile {
    fn default() -> Self {
        Self {
            can_sign: true,
            is_multisig: false,
        }
    }
}

/// Chain-side inputs for one draft, fetched together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSnapshot {
    pub fingerprint: DraftFingerprint,
    pub gas: GasRecommendation,
    pub on_chain_nonce: u64,
    pub local_nonce: Option<u64>,
    pub native_balance: U256,
    pub pending: Vec<PendingTxCost>,
    pub block_gas_limit: Option<u64>,
    pub l1_fee: Option<U256>,
    pub gas_levels: Vec<GasLevel>,
    /// Safe nonce state, fetched for multisig accounts only.
    pub safe_nonce: Option<SafeNonceState>,
}

/// Nonce figures for one recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NonceResolution {
    recommended: u64,
    signed: u64,
    /// Lowest nonce that does not fire 3003.
    floor: u64,
}

#[derive(Debug)]
pub struct ApprovalSession {
    draft: TxDraft,
    fingerprint: DraftFingerprint,
    account: AccountProfile,
    policy: GasPolicy,
    catalog: Option<RuleCatalog>,
    facts: FactMap,
    outcomes: Vec<RuleOutcome>,
    processed: ProcessedRuleSet,
    snapshot: Option<ChainSnapshot>,
    selected_gas: Option<GasLevel>,
    gas_limit_override: Option<u64>,
    nonce: Option<u64>,
    plan: Option<GasPlan>,
    checks: Vec<CheckError>,
    check_metrics: TxCheckMetrics,
}

impl ApprovalSession {
    pub fn new(draft: TxDraft, account: AccountProfile, policy: GasPolicy) -> Self {
        let fingerprint = draft.fingerprint();
        let gas_limit_override = draft.exact_gas_limit();
        tracing::debug!(%fingerprint, chain_id = draft.chain_id, "approval session started");
        Self {
            draft,
            fingerprint,
            account,
            policy,
            catalog: None,
            facts: FactMap::new(),
            outcomes: Vec::new(),
            processed: ProcessedRuleSet::new(),
            snapshot: None,
            selected_gas: None,
            gas_limit_override,
            nonce: None,
            plan: None,
            checks: Vec::new(),
            check_metrics: TxCheckMetrics::new(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn draft(&self) -> &TxDraft {
        &self.draft
    }

    pub fn fingerprint(&self) -> DraftFingerprint {
        self.fingerprint
    }

    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    pub fn processed(&self) -> &ProcessedRuleSet {
        &self.processed
    }

    pub fn gas_plan(&self) -> Option<&GasPlan> {
        self.plan.as_ref()
    }

    pub fn checks(&self) -> &[CheckError] {
        &self.checks
    }

    pub fn selected_gas(&self) -> Option<&GasLevel> {
        self.selected_gas.as_ref()
    }

    /// Nonce the draft will be signed with, once chain state is known.
    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    /// Gas limit the draft will be signed with.
    pub fn gas_limit(&self) -> Option<u64> {
        self.gas_limit_override
            .or_else(|| self.plan.map(|p| p.affordable_gas_limit))
    }

    pub fn check_metrics(&self) -> &TxCheckMetrics {
        &self.check_metrics
    }

    pub fn risk(&self) -> RiskAggregate {
        aggregate(&self.outcomes, &self.processed)
    }

    pub fn gas_cost(&self) -> Option<GasCost> {
        let snapshot = self.snapshot.as_ref()?;
        let level = self.selected_gas.as_ref()?;
        let gas_limit = self.gas_limit()?;
        Some(explain_gas(snapshot.gas.gas_used, gas_limit, level.price, snapshot.l1_fee))
    }

    // ─── Draft lifecycle ────────────────────────────────────────────────

    /// Swap in a new draft and discard everything derived for the old one.
    pub fn replace_draft(&mut self, draft: TxDraft) {
        let previous = self.fingerprint;
        *self = Self::new(draft, self.account, self.policy.clone());
        tracing::debug!(%previous, current = %self.fingerprint, "draft replaced");
    }

    /// Clear acknowledgements once the draft is signed or rejected.
    pub fn finalize(&mut self) {
        self.processed.reset();
    }

    fn ensure_current(&self, fingerprint: DraftFingerprint) -> Result<(), SessionError> {
        if fingerprint == self.fingerprint {
            return Ok(());
        }
        tracing::warn!(
            expected = %self.fingerprint,
            got = %fingerprint,
            "stale draft result rejected"
        );
        Err(SessionError::StaleDraft {
            expected: self.fingerprint,
            got: fingerprint,
        })
    }

    // ─── Rules ──────────────────────────────────────────────────────────

    /// Evaluate `catalog` against `facts` gathered for the draft `fingerprint`.
    pub fn apply_rule_results(
        &mut self,
        fingerprint: DraftFingerprint,
        catalog: RuleCatalog,
        facts: FactMap,
    ) -> Result<(), SessionError> {
        self.ensure_current(fingerprint)?;
        self.outcomes = evaluate(&catalog, &facts);
        self.catalog = Some(catalog);
        self.facts = facts;
        Ok(())
    }

    pub fn acknowledge(&mut self, rule_id: &str, danger_confirmed: bool) -> Result<bool, SessionError> {
        let enabled = self.enabled_outcomes();
        Ok(self.processed.acknowledge(rule_id, &enabled, danger_confirmed)?)
    }

    pub fn acknowledge_all(&mut self) -> Vec<String> {
        let enabled = self.enabled_outcomes();
        self.processed.acknowledge_all(&enabled)
    }

    pub fn undo(&mut self, rule_id: &str) -> bool {
        self.processed.undo(rule_id)
    }

    /// Enable or disable a rule for this draft and re-evaluate.
    ///
    /// Any acknowledgement of the rule is dropped first.
    pub fn set_rule_enabled(&mut self, rule_id: &str, enabled: bool) -> Result<(), SessionError> {
        let catalog = self.catalog.as_ref().ok_or(SessionError::RulesNotLoaded)?;
        let updated =
            catalog
                .with_rule_enabled(rule_id, enabled)
                .ok_or_else(|| SessionError::UnknownRule {
                    rule_id: rule_id.to_string(),
                })?;
        self.processed.undo(rule_id);
        self.outcomes = evaluate(&updated, &self.facts);
        self.catalog = Some(updated);
        Ok(())
    }

    fn enabled_outcomes(&self) -> Vec<RuleOutcome> {
        self.outcomes.iter().filter(|o| o.enabled).cloned().collect()
    }

    // ─── Gas and nonce ──────────────────────────────────────────────────

    /// Apply chain-side inputs and pick the initial gas level.
    pub fn apply_chain_snapshot(
        &mut self,
        snapshot: ChainSnapshot,
        last_selection: Option<LastGasSelection>,
    ) -> Result<(), SessionError> {
        self.ensure_current(snapshot.fingerprint)?;
        self.selected_gas = select_gas_level(
            &snapshot.gas_levels,
            last_selection,
            self.draft.prefers_custom_gas(),
        )
        .cloned();
        self.snapshot = Some(snapshot);
        self.recompute();
        Ok(())
    }

    pub fn select_gas(&mut self, level: GasLevel) {
        self.selected_gas = Some(level);
        self.recompute();
    }

    /// Pin the gas limit. Checks are re-run against the pinned value.
    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit_override = Some(gas_limit);
        self.recompute();
    }

    /// Pin the nonce. A pinned nonce is never replaced by a recommendation.
    pub fn set_nonce(&mut self, nonce: u64) {
        self.draft.nonce = Some(nonce);
        self.draft.nonce_edited = true;
        self.recompute();
    }

    fn recompute(&mut self) {
        let (Some(snapshot), Some(level)) = (self.snapshot.as_ref(), self.selected_gas.as_ref())
        else {
            self.plan = None;
            self.checks.clear();
            return;
        };

        let NonceResolution {
            recommended: recommended_nonce,
            signed: nonce,
            floor: nonce_floor,
        } = self.resolve_nonce(snapshot);

        let plan = build_gas_plan(
            &GasPlanInput {
                chain_id: self.draft.chain_id,
                recommendation: snapshot.gas,
                recommended_nonce,
                nonce,
                gas_price: level.price,
                pending: &snapshot.pending,
                native_balance: snapshot.native_balance,
                send_value: self.draft.value,
                block_gas_limit: snapshot.block_gas_limit,
            },
            &self.policy,
        );
        let gas_limit = self.gas_limit_override.unwrap_or(plan.affordable_gas_limit);
        let cost = explain_gas(snapshot.gas.gas_used, gas_limit, level.price, snapshot.l1_fee);

        let checks = check_transaction(
            &TxCheckInput {
                recommended_gas: plan.recommended_gas_limit,
                ratio: plan.recommended_gas_limit_ratio,
                recommended_nonce: nonce_floor,
                gas_limit,
                nonce,
                max_gas_cost: cost.max_gas_cost,
                send_value: self.draft.value,
                native_balance: snapshot.native_balance,
                is_cancel_or_speed_up: self.draft.kind.is_cancel_or_speed_up(),
                is_multisig_account: self.account.is_multisig,
            },
            &self.policy,
            &mut self.check_metrics,
        );

        self.nonce = Some(nonce);
        self.plan = Some(plan);
        self.checks = checks;
    }

    fn resolve_nonce(&self, snapshot: &ChainSnapshot) -> NonceResolution {
        let safe = snapshot
            .safe_nonce
            .as_ref()
            .filter(|_| self.account.is_multisig);
        if let Some(safe) = safe {
            let recommended = next_safe_nonce(safe.nonce, &safe.pending_nonces);
            let signed = match self.draft.nonce {
                Some(nonce) if self.draft.nonce_edited => nonce,
                draft_nonce => resolve_safe_nonce(draft_nonce, safe.nonce, recommended),
            };
            return NonceResolution {
                recommended,
                signed,
                floor: safe.nonce,
            };
        }

        let recommended = next_nonce(snapshot.on_chain_nonce, snapshot.local_nonce);
        let signed = match recommend_nonce(&self.draft, snapshot.on_chain_nonce, snapshot.local_nonce)
        {
            Ok(nonce) => nonce,
            Err(NonceRecommendError::KeepExistingNonce { .. }) => {
                self.draft.nonce.unwrap_or(recommended)
            }
        };
        NonceResolution {
            recommended,
            signed,
            floor: recommended,
        }
    }

    /// Chain state is complete: multisig accounts also need the Safe nonce.
    fn chain_ready(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| !self.account.is_multisig || s.safe_nonce.is_some())
    }

    // ─── Signing ────────────────────────────────────────────────────────

    pub fn decide(&self, metrics: &mut SigningGateMetrics) -> SigningDecision {
        let risk = self.risk();
        decide(
            &SigningGateInput {
                risk_blocks_submit: risk.blocks_submit,
                checks: &self.checks,
                data_ready: self.catalog.is_some() && self.chain_ready(),
                gas_price_selected: self.selected_gas.is_some(),
                account_can_sign: self.account.can_sign,
            },
            metrics,
        )
    }
}
