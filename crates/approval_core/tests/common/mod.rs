#![allow(dead_code)]

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use approval_core::draft::TxDraft;
use approval_core::rules::{
    FactMap, FactValue, NumberRange, RuleConfig, RuleOutcome, Severity, Threshold, ValueKind,
};

pub fn gwei(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000_000u64)
}

pub fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000_000_000_000_000u64)
}

pub fn from_addr() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn to_addr() -> Address {
    Address::repeat_byte(0xbb)
}

/// Plain transfer on mainnet from `from_addr()` to `to_addr()`.
pub fn transfer_draft() -> TxDraft {
    TxDraft::new(1, from_addr(), Some(to_addr()))
}

/// Float rule with `value >= min` thresholds per severity.
pub fn float_rule(id: &str, thresholds: &[(Severity, f64)]) -> RuleConfig {
    let defaults: BTreeMap<Severity, Threshold> = thresholds
        .iter()
        .map(|(sev, min)| (*sev, Threshold::Range(NumberRange::at_least(*min))))
        .collect();
    RuleConfig::new(
        id,
        None,
        true,
        ValueKind::Float {
            min: None,
            max: None,
        },
        defaults,
        BTreeMap::new(),
    )
    .expect("valid float rule")
}

/// Boolean rule firing at `severity` when the fact is true.
pub fn flag_rule(id: &str, severity: Severity) -> RuleConfig {
    let mut defaults = BTreeMap::new();
    defaults.insert(severity, Threshold::Flag(true));
    defaults.insert(Severity::Safe, Threshold::Flag(false));
    RuleConfig::new(id, None, true, ValueKind::Boolean, defaults, BTreeMap::new())
        .expect("valid flag rule")
}

pub fn facts(entries: &[(&str, FactValue)]) -> FactMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn outcome(rule_id: &str, severity: Severity) -> RuleOutcome {
    RuleOutcome {
        rule_id: rule_id.to_string(),
        severity,
        enabled: true,
        raw_value: None,
    }
}
