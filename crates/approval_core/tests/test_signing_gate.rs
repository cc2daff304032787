//! Signing gate tests.

use approval_core::check::{CheckCode, CheckError};
use approval_core::gate::{BlockingReason, SigningGateInput, SigningGateMetrics, decide};

fn ready(checks: &[CheckError]) -> SigningGateInput<'_> {
    SigningGateInput {
        risk_blocks_submit: false,
        checks,
        data_ready: true,
        gas_price_selected: true,
        account_can_sign: true,
    }
}

#[test]
fn test_all_clear_can_submit() {
    let mut metrics = SigningGateMetrics::new();
    let decision = decide(&ready(&[]), &mut metrics);
    assert!(decision.can_submit);
    assert_eq!(decision.blocking_reason, None);
    assert!(!decision.native_token_short);
    assert_eq!(metrics.allowed_total(), 1);
    assert_eq!(metrics.blocked_total(), 0);
}

#[test]
fn test_non_forbidden_checks_do_not_block() {
    let checks = [
        CheckError::new(CheckCode::GasLimitLessThanGasUsed),
        CheckError::new(CheckCode::NonceLowerThanExpected),
    ];
    let decision = decide(&ready(&checks), &mut SigningGateMetrics::new());
    assert!(decision.can_submit);
}

#[test]
fn test_unresolved_risk_blocks() {
    let input = SigningGateInput {
        risk_blocks_submit: true,
        ..ready(&[])
    };
    let decision = decide(&input, &mut SigningGateMetrics::new());
    assert!(!decision.can_submit);
    assert_eq!(decision.blocking_reason, Some(BlockingReason::UnresolvedRisk));
}

#[test]
fn test_blocking_reasons_reported_in_order() {
    let checks = [CheckError::new(CheckCode::GasLimitNotEnough)];
    let mut input = SigningGateInput {
        risk_blocks_submit: true,
        checks: &checks,
        data_ready: false,
        gas_price_selected: false,
        account_can_sign: false,
    };
    let mut metrics = SigningGateMetrics::new();

    let mut reasons = Vec::new();
    reasons.push(decide(&input, &mut metrics).blocking_reason);
    input.data_ready = true;
    reasons.push(decide(&input, &mut metrics).blocking_reason);
    input.gas_price_selected = true;
    reasons.push(decide(&input, &mut metrics).blocking_reason);
    input.checks = &[];
    reasons.push(decide(&input, &mut metrics).blocking_reason);
    input.account_can_sign = true;
    reasons.push(decide(&input, &mut metrics).blocking_reason);
    input.risk_blocks_submit = false;
    reasons.push(decide(&input, &mut metrics).blocking_reason);

    assert_eq!(
        reasons,
        vec![
            Some(BlockingReason::NotReady),
            Some(BlockingReason::GasPriceUnavailable),
            Some(BlockingReason::ForbiddenCheck(CheckCode::GasLimitNotEnough)),
            Some(BlockingReason::AccountCannotSign),
            Some(BlockingReason::UnresolvedRisk),
            None,
        ]
    );
    assert_eq!(metrics.blocked_total(), 5);
    assert_eq!(metrics.allowed_total(), 1);
}
