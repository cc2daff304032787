//! Pending transaction store tests.

use alloy_primitives::{Address, U256};
use approval_core::providers::PendingTxSource;
use approval_infra::store::{PendingStoreError, PendingTxRecord, PendingTxStore};

fn account() -> Address {
    Address::repeat_byte(0xaa)
}

fn record(nonce: u64, gas_price: &str) -> PendingTxRecord {
    PendingTxRecord {
        value: Some("0x0".to_string()),
        gas_limit: Some("0x5208".to_string()),
        gas_price: Some(gas_price.to_string()),
        ..PendingTxRecord::new(1, account(), nonce)
    }
}

fn store() -> (tempfile::TempDir, PendingTxStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = PendingTxStore::new(dir.path().join("pending").join("queue.jsonl"));
    (dir, store)
}

#[test]
fn test_missing_file_is_empty_queue() {
    let (_dir, store) = store();
    assert!(store.load().unwrap().is_empty());
    assert_eq!(store.next_local_nonce(1, account()).unwrap(), None);
}

#[test]
fn test_appended_records_load_in_order() {
    let (_dir, store) = store();
    store.append(&record(3, "1000000000")).unwrap();
    store.append(&record(4, "1000000000")).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.iter().map(|r| r.nonce).collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(store.next_local_nonce(1, account()).unwrap(), Some(5));
}

#[test]
fn test_replacement_supersedes_and_completed_drops() {
    let (_dir, store) = store();
    store.append(&record(3, "1000000000")).unwrap();
    store.append(&record(4, "1000000000")).unwrap();
    // Speed-up of nonce 3 at a higher price.
    store.append(&record(3, "2000000000")).unwrap();
    store
        .append(&PendingTxRecord {
            completed: true,
            ..record(4, "1000000000")
        })
        .unwrap();
    // Other account and other chain.
    store
        .append(&PendingTxRecord::new(1, Address::repeat_byte(0xbb), 9))
        .unwrap();
    store.append(&PendingTxRecord::new(5, account(), 9)).unwrap();

    let pending = store.pending_for(1, account()).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].nonce, 3);
    assert_eq!(pending[0].effective_gas_price(), U256::from(2_000_000_000u64));
    assert_eq!(store.next_local_nonce(1, account()).unwrap(), Some(4));
}

#[test]
fn test_cost_fallbacks() {
    let mut rec = PendingTxRecord::new(1, account(), 0);
    assert_eq!(rec.gas_used_or_limit(), 0);
    rec.gas = Some("30000".to_string());
    assert_eq!(rec.gas_used_or_limit(), 30_000);
    rec.gas_limit = Some("0x5208".to_string());
    assert_eq!(rec.gas_used_or_limit(), 21_000);
    rec.gas_used = Some(19_000);
    assert_eq!(rec.gas_used_or_limit(), 19_000);

    rec.max_fee_per_gas = Some("0x3b9aca00".to_string());
    assert_eq!(rec.effective_gas_price(), U256::from(1_000_000_000u64));
    rec.gas_price = Some("garbage".to_string());
    assert_eq!(rec.effective_gas_price(), U256::from(1_000_000_000u64));

    rec.value = Some("100".to_string());
    let cost = rec.cost();
    assert_eq!(
        cost.total_cost(),
        U256::from(100u64) + U256::from(19_000u64) * U256::from(1_000_000_000u64)
    );
}

#[test]
fn test_records_use_camel_case_fields() {
    let json = serde_json::to_string(&record(7, "0x1")).unwrap();
    assert!(json.contains("\"chainId\":1"), "got {json}");
    assert!(json.contains("\"gasLimit\":\"0x5208\""), "got {json}");
    assert!(!json.contains("maxFeePerGas"), "got {json}");
}

#[test]
fn test_corrupt_line_reports_line_number() {
    let (_dir, store) = store();
    store.append(&record(1, "1")).unwrap();
    std::fs::OpenOptions::new()
        .append(true)
        .open(store.path())
        .and_then(|mut f| std::io::Write::write_all(&mut f, b"{broken\n"))
        .unwrap();
    match store.load() {
        Err(PendingStoreError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Parse error, got {other:?}"),
    }
}

#[test]
fn test_store_serves_as_pending_source() {
    let (_dir, store) = store();
    store.append(&record(3, "1000000000")).unwrap();
    store.append(&record(5, "1000000000")).unwrap();

    assert_eq!(store.local_nonce(1, account()).unwrap(), Some(6));
    let costs = store.pending_costs(1, account()).unwrap();
    assert_eq!(costs.iter().map(|c| c.nonce).collect::<Vec<_>>(), vec![3, 5]);
    assert_eq!(costs[0].gas_used_or_limit, 21_000);
    assert_eq!(costs[0].gas_price, U256::from(1_000_000_000u64));
}
