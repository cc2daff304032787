//! Local pending-transaction queue (JSONL, append-only).
//!
//! One record per submitted transaction. A later record for the same
//! (chain, from, nonce) supersedes earlier ones, which is how speed-up and
//! cancel replacements land. Records flagged `completed` are no longer
//! pending.
//!
//! Cost fallbacks per record:
//! - gas used: `gasUsed`, then `gasLimit`, then `gas`, else 0
//! - gas price: `gasPrice`, then `maxFeePerGas`, else 0
//! - malformed quantities count as 0

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, U256};
use approval_core::gas::PendingTxCost;
use approval_core::gas::quantity::{parse_u64_quantity, quantity_or_zero};
use approval_core::providers::{PendingTxSource, ProviderError};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PendingStoreError {
    #[error("pending store io {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid pending record at line {line} in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
    #[error("failed to encode pending record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A transaction submitted from this wallet and not yet known to be mined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTxRecord {
    pub chain_id: u64,
    pub from: Address,
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl PendingTxRecord {
    pub fn new(chain_id: u64, from: Address, nonce: u64) -> Self {
        Self {
            chain_id,
            from,
            nonce,
            value: None,
            gas_used: None,
            gas_limit: None,
            gas: None,
            gas_price: None,
            max_fee_per_gas: None,
            completed: false,
        }
    }

    pub fn gas_used_or_limit(&self) -> u64 {
        self.gas_used
            .filter(|g| *g > 0)
            .or_else(|| self.gas_limit.as_deref().and_then(parse_u64_quantity))
            .filter(|g| *g > 0)
            .or_else(|| self.gas.as_deref().and_then(parse_u64_quantity))
            .unwrap_or(0)
    }

    pub fn effective_gas_price(&self) -> U256 {
        let price = quantity_or_zero(self.gas_price.as_deref());
        if price.is_zero() {
            quantity_or_zero(self.max_fee_per_gas.as_deref())
        } else {
            price
        }
    }

    pub fn cost(&self) -> PendingTxCost {
        PendingTxCost {
            nonce: self.nonce,
            native_value: quantity_or_zero(self.value.as_deref()),
            gas_price: self.effective_gas_price(),
            gas_used_or_limit: self.gas_used_or_limit(),
        }
    }
}

/// JSONL-backed pending queue.
#[derive(Debug, Clone)]
pub struct PendingTxStore {
    path: PathBuf,
}

impl PendingTxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &PendingTxRecord) -> Result<(), PendingStoreError> {
        let io_err = |source| PendingStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.flush().map_err(io_err)
    }

    /// Every record in file order. A missing file is an empty queue.
    pub fn load(&self) -> Result<Vec<PendingTxRecord>, PendingStoreError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PendingStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| PendingStoreError::Io {
                path: self.path.clone(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record = serde_json::from_str(trimmed).map_err(|source| PendingStoreError::Parse {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Latest still-pending record per nonce for one account, nonce ascending.
    pub fn pending_for(
        &self,
        chain_id: u64,
        from: Address,
    ) -> Result<Vec<PendingTxRecord>, PendingStoreError> {
        let mut latest: BTreeMap<u64, PendingTxRecord> = BTreeMap::new();
        for record in self.load()? {
            if record.chain_id == chain_id && record.from == from {
                latest.insert(record.nonce, record);
            }
        }
        Ok(latest.into_values().filter(|r| !r.completed).collect())
    }

    /// Nonce after the highest pending one, `None` when nothing is queued.
    pub fn next_local_nonce(
        &self,
        chain_id: u64,
        from: Address,
    ) -> Result<Option<u64>, PendingStoreError> {
        Ok(self
            .pending_for(chain_id, from)?
            .last()
            .map(|r| r.nonce.saturating_add(1)))
    }
}

fn unavailable(err: PendingStoreError) -> ProviderError {
    ProviderError::Unavailable {
        provider: "pending_tx_store",
        reason: err.to_string(),
    }
}

impl PendingTxSource for PendingTxStore {
    fn local_nonce(&self, chain_id: u64, address: Address) -> Result<Option<u64>, ProviderError> {
        self.next_local_nonce(chain_id, address).map_err(unavailable)
    }

    fn pending_costs(
        &self,
        chain_id: u64,
        address: Address,
    ) -> Result<Vec<PendingTxCost>, ProviderError> {
        let records = self.pending_for(chain_id, address).map_err(unavailable)?;
        tracing::debug!(chain_id, pending = records.len(), "pending costs loaded");
        Ok(records.iter().map(PendingTxRecord::cost).collect())
    }
}
