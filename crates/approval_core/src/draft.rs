//! Transaction draft under approval and its fingerprint.
//!
//! `fingerprint = xxhash64(chain_id + from + to + value + data + kind)`
//!
//! Gas fields and user edits made during approval (gas limit, gas price,
//! nonce) do not enter the fingerprint. Replacing the dapp-supplied transaction does.

use std::fmt;

use alloy_primitives::{Address, Bytes, U256};
use xxhash_rust::xxh64::xxh64;

use crate::gas::quantity::quantity_or_zero;

/// What the draft does to an already-submitted transaction, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftKind {
    #[default]
    Standard,
    SpeedUp,
    Cancel,
}

impl DraftKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftKind::Standard => "standard",
            DraftKind::SpeedUp => "speed_up",
            DraftKind::Cancel => "cancel",
        }
    }

    pub fn is_cancel_or_speed_up(self) -> bool {
        matches!(self, DraftKind::SpeedUp | DraftKind::Cancel)
    }
}

/// Why a draft keeps its nonce instead of taking a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceKeepReason {
    SpeedUp,
    Cancel,
    SelfTransfer,
    ManualEdit,
}

/// A transaction as submitted for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDraft {
    pub chain_id: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub nonce: Option<u64>,
    /// `gas` / `gasLimit` supplied with the request.
    pub gas_limit: Option<u64>,
    /// `gasPrice` supplied with the request.
    pub gas_price: Option<U256>,
    pub kind: DraftKind,
    /// Set once the user changes the nonce by hand.
    pub nonce_edited: bool,
    /// Built by the wallet itself (send-max, internal transfers). Its
    /// `gas_limit` is signed as is, without the safety ratio.
    pub internal_origin: bool,
}

impl TxDraft {
    pub fn new(chain_id: u64, from: Address, to: Option<Address>) -> Self {
        Self {
            chain_id,
            from,
            to,
            value: U256::ZERO,
            data: Bytes::new(),
            nonce: None,
            gas_limit: None,
            gas_price: None,
            kind: DraftKind::Standard,
            nonce_edited: false,
            internal_origin: false,
        }
    }

    /// Set the value from a raw hex/decimal string. Malformed input is zero.
    pub fn with_raw_value(mut self, raw: Option<&str>) -> Self {
        self.value = quantity_or_zero(raw);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_kind(mut self, kind: DraftKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_internal_origin(mut self) -> Self {
        self.internal_origin = true;
        self
    }

    /// Gas limit to sign with verbatim: the supplied limit of a wallet-built draft.
    pub fn exact_gas_limit(&self) -> Option<u64> {
        self.gas_limit.filter(|g| self.internal_origin && *g > 0)
    }

    /// Start on the custom gas level instead of a market level.
    pub fn prefers_custom_gas(&self) -> bool {
        self.kind.is_cancel_or_speed_up() || self.gas_price.is_some()
    }

    pub fn is_self_transfer(&self) -> bool {
        self.to == Some(self.from)
    }

    /// `Some` when the nonce on this draft must not be replaced.
    pub fn nonce_keep_reason(&self) -> Option<NonceKeepReason> {
        match self.kind {
            DraftKind::SpeedUp => return Some(NonceKeepReason::SpeedUp),
            DraftKind::Cancel => return Some(NonceKeepReason::Cancel),
            DraftKind::Standard => {}
        }
        if self.nonce.is_some() && self.is_self_transfer() {
            return Some(NonceKeepReason::SelfTransfer);
        }
        if self.nonce_edited {
            return Some(NonceKeepReason::ManualEdit);
        }
        None
    }

    pub fn fingerprint(&self) -> DraftFingerprint {
        DraftFingerprint::of(self)
    }
}

/// Identity of a draft, used to reject results computed for a replaced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftFingerprint(u64);

impl DraftFingerprint {
    pub fn of(draft: &TxDraft) -> Self {
        // 0xFF separates fields; `to` is absent for contract creation.
        let mut buf = Vec::with_capacity(96 + draft.data.len());
        buf.extend_from_slice(&draft.chain_id.to_le_bytes());
        buf.push(0xFF);
        buf.extend_from_slice(draft.from.as_slice());
        buf.push(0xFF);
        if let Some(to) = draft.to {
            buf.extend_from_slice(to.as_slice());
        }
        buf.push(0xFF);
        buf.extend_from_slice(&draft.value.to_le_bytes::<32>());
        buf.push(0xFF);
        buf.extend_from_slice(&draft.data);
        buf.push(0xFF);
        buf.extend_from_slice(draft.kind.as_str().as_bytes());
        Self(xxh64(&buf, 0))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DraftFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
