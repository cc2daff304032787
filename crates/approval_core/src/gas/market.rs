//! Gas market levels: initial selection and EIP-1559 priority fee.

use alloy_primitives::U256;

/// Ethereum mainnet, the only chain with an automatic priority fee.
pub const MAINNET_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GasLevelKind {
    Slow,
    Normal,
    Fast,
    Custom,
}

impl GasLevelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GasLevelKind::Slow => "slow",
            GasLevelKind::Normal => "normal",
            GasLevelKind::Fast => "fast",
            GasLevelKind::Custom => "custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "slow" => Some(GasLevelKind::Slow),
            "normal" => Some(GasLevelKind::Normal),
            "fast" => Some(GasLevelKind::Fast),
            "custom" => Some(GasLevelKind::Custom),
            _ => None,
        }
    }
}

/// One gas price tier offered by the market provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasLevel {
    pub kind: GasLevelKind,
    pub price: U256,
    pub priority_price: Option<U256>,
    pub estimated_seconds: u64,
}

/// What the user picked the last time they signed on this chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastGasSelection {
    Level(GasLevelKind),
    CustomPrice(U256),
}

/// Pick the initially selected level.
///
/// Speed-up, cancel and drafts that bring their own gas price start on the
/// custom level, as does a remembered custom price. A remembered level is
/// reused when the market still offers it. Otherwise `Normal`.
pub fn select_gas_level<'a>(
    levels: &'a [GasLevel],
    last: Option<LastGasSelection>,
    prefers_custom: bool,
) -> Option<&'a GasLevel> {
    let find = |kind: GasLevelKind| levels.iter().find(|l| l.kind == kind);

    if prefers_custom || matches!(last, Some(LastGasSelection::CustomPrice(_))) {
        if let Some(custom) = find(GasLevelKind::Custom) {
            return Some(custom);
        }
    }
    if let Some(LastGasSelection::Level(kind)) = last {
        if let Some(level) = find(kind) {
            return Some(level);
        }
    }
    find(GasLevelKind::Normal)
}

/// Max priority fee for `target`.
///
/// Outside mainnet, or when the user opted into paying the max fee, the full
/// level price is used. An explicit non-zero priority price wins next. Otherwise the
/// fee is a tenth of the price, plus 80% of the gap to the cheapest
/// non-custom level.
pub fn max_priority_fee(
    levels: &[GasLevel],
    target: &GasLevel,
    chain_id: u64,
    use_max_fee: bool,
) -> U256 {
    if chain_id != MAINNET_CHAIN_ID || use_max_fee {
        return target.price;
    }
    if let Some(priority) = target.priority_price.filter(|p| !p.is_zero()) {
        return priority;
    }
    let Some(cheapest) = levels
        .iter()
        .filter(|l| l.kind != GasLevelKind::Custom)
        .min_by_key(|l| l.price)
    else {
        return target.price;
    };

    let base = target.price / U256::from(10u64);
    if target.price < cheapest.price || cheapest.kind == target.kind {
        return base;
    }
    let gap = target.price - cheapest.price;
    gap.saturating_mul(U256::from(8u64)) / U256::from(10u64) + base
}
