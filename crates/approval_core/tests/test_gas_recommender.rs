//! Gas and nonce recommendation tests.

mod common;

use approval_core::draft::{DraftKind, NonceKeepReason};
use approval_core::gas::plan::plan_ratio;
use approval_core::gas::{
    GasLimitRatio, GasPlanInput, GasPolicy, GasRecommendInput, GasSource, NonceRecommendError,
    build_gas_plan, next_nonce, recommend_gas, recommend_nonce,
};
use common::{ether, gwei, transfer_draft};

fn input(declared: Option<u64>, used: u64, tx_gas: Option<u64>) -> GasRecommendInput {
    GasRecommendInput {
        declared_gas: declared,
        simulated_gas_used: used,
        tx_gas_limit: tx_gas,
    }
}

// ─── Gas tiers ──────────────────────────────────────────────────────────

#[test]
fn test_declared_gas_wins_without_consulting_history() {
    let rec = recommend_gas(
        &input(Some(60_000), 45_000, Some(90_000)),
        &GasPolicy::default(),
        || -> Option<u64> { panic!("history must not be consulted") },
    );
    assert_eq!(rec.gas, 60_000);
    assert_eq!(rec.gas_used, 45_000);
    assert_eq!(rec.source, GasSource::Declared);
    assert!(rec.needs_ratio);
}

#[test]
fn test_tx_gas_field_used_when_nothing_declared() {
    let rec = recommend_gas(
        &input(None, 0, Some(90_000)),
        &GasPolicy::default(),
        || -> Option<u64> { panic!("history must not be consulted") },
    );
    assert_eq!(rec.gas, 90_000);
    assert_eq!(rec.source, GasSource::TxField);
    assert!(rec.needs_ratio);
}

#[test]
fn test_history_used_when_declared_and_tx_gas_absent() {
    let rec = recommend_gas(&input(None, 0, None), &GasPolicy::default(), || Some(33_000));
    assert_eq!(rec.gas, 33_000);
    assert_eq!(rec.gas_used, 33_000);
    assert_eq!(rec.source, GasSource::History);
    assert!(rec.needs_ratio);
}

#[test]
fn test_fallback_is_fixed_and_skips_ratio() {
    let rec = recommend_gas(&input(None, 0, None), &GasPolicy::default(), || Some(0));
    assert_eq!(rec.gas, 1_000_000);
    assert_eq!(rec.source, GasSource::Fallback);
    assert!(!rec.needs_ratio);

    let policy = GasPolicy::default();
    assert_eq!(plan_ratio(&rec, 1, &policy), GasLimitRatio::ONE);
}

#[test]
fn test_plan_ratio_uses_chain_override() {
    let rec = recommend_gas(&input(Some(100_000), 80_000, None), &GasPolicy::default(), || None);
    let policy = GasPolicy::default();
    assert_eq!(plan_ratio(&rec, 1, &policy), GasLimitRatio::DEFAULT);
    assert_eq!(plan_ratio(&rec, 1284, &policy).milli(), 2_000);
}

#[test]
fn test_build_gas_plan_carries_recommendation() {
    let policy = GasPolicy::default();
    let rec = recommend_gas(&input(Some(21_000), 21_000, None), &policy, || None);
    let plan = build_gas_plan(
        &GasPlanInput {
            chain_id: 1,
            recommendation: rec,
            recommended_nonce: 4,
            nonce: 4,
            gas_price: gwei(1),
            pending: &[],
            native_balance: ether(1),
            send_value: ether(0),
            block_gas_limit: Some(30_000_000),
        },
        &policy,
    );
    assert_eq!(plan.recommended_gas_limit, 21_000);
    assert_eq!(plan.recommended_gas_limit_ratio, GasLimitRatio::DEFAULT);
    assert_eq!(plan.recommended_nonce, 4);
    assert_eq!(plan.affordable_gas_limit, 31_500);
}

// ─── Nonce ──────────────────────────────────────────────────────────────

#[test]
fn test_nonce_is_max_of_chain_and_local_queue() {
    assert_eq!(next_nonce(5, Some(7)), 7);
    assert_eq!(next_nonce(9, Some(2)), 9);
    assert_eq!(next_nonce(3, None), 3);
    assert_eq!(recommend_nonce(&transfer_draft(), 5, Some(7)), Ok(7));
}

#[test]
fn test_replacement_drafts_keep_their_nonce() {
    for (kind, reason) in [
        (DraftKind::SpeedUp, NonceKeepReason::SpeedUp),
        (DraftKind::Cancel, NonceKeepReason::Cancel),
    ] {
        let draft = transfer_draft().with_nonce(3).with_kind(kind);
        match recommend_nonce(&draft, 5, None) {
            Err(NonceRecommendError::KeepExistingNonce { reason: got }) => assert_eq!(got, reason),
            other => panic!("expected KeepExistingNonce, got {other:?}"),
        }
    }
}

#[test]
fn test_self_transfer_with_nonce_keeps_it() {
    let mut draft = transfer_draft().with_nonce(2);
    draft.to = Some(draft.from);
    assert_eq!(
        recommend_nonce(&draft, 5, None),
        Err(NonceRecommendError::KeepExistingNonce {
            reason: NonceKeepReason::SelfTransfer
        })
    );

    // Without a nonce there is nothing to keep.
    draft.nonce = None;
    assert_eq!(recommend_nonce(&draft, 5, None), Ok(5));
}

#[test]
fn test_manually_edited_nonce_is_kept() {
    let mut draft = transfer_draft().with_nonce(11);
    draft.nonce_edited = true;
    assert_eq!(
        recommend_nonce(&draft, 5, Some(6)),
        Err(NonceRecommendError::KeepExistingNonce {
            reason: NonceKeepReason::ManualEdit
        })
    );
}
