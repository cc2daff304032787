//! Fixed-point gas limit ratio.
//!
//! Ratios are stored in thousandths so that `gas * ratio` can be computed
//! exactly and truncated in an explicit direction (`floor` or `ceil`).

use std::fmt;

const SCALE: u32 = 1_000;

/// Safety multiplier applied to a recommended gas figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GasLimitRatio {
    milli: u32,
}

impl GasLimitRatio {
    /// No scaling.
    pub const ONE: Self = Self::from_milli(1_000);
    /// Default safety ratio (1.5x).
    pub const DEFAULT: Self = Self::from_milli(1_500);
    /// Cap applied to the ratio when the balance cannot cover the full figure.
    pub const INSUFFICIENT_BALANCE_CAP: Self = Self::from_milli(1_500);

    pub const fn from_milli(milli: u32) -> Self {
        Self { milli }
    }

    /// Convert a configured decimal ratio, rounding to the nearest thousandth.
    ///
    /// Returns `None` for non-finite, non-positive or out-of-range values.
    pub fn from_f64(ratio: f64) -> Option<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return None;
        }
        let milli = (ratio * f64::from(SCALE)).round();
        if milli < 1.0 || milli > f64::from(u32::MAX) {
            return None;
        }
        Some(Self::from_milli(milli as u32))
    }

    pub const fn milli(self) -> u32 {
        self.milli
    }

    pub fn min(self, other: Self) -> Self {
        if other.milli < self.milli { other } else { self }
    }

    /// `floor(gas * ratio)`, saturating at `u64::MAX`.
    pub fn scale_floor(self, gas: u64) -> u64 {
        let scaled = u128::from(gas) * u128::from(self.milli) / u128::from(SCALE);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    /// `ceil(gas * ratio)`, saturating at `u64::MAX`.
    pub fn scale_ceil(self, gas: u64) -> u64 {
        let scaled = (u128::from(gas) * u128::from(self.milli)).div_ceil(u128::from(SCALE));
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    pub(crate) const fn scale() -> u32 {
        SCALE
    }
}

impl Default for GasLimitRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for GasLimitRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.milli / SCALE;
        let frac = self.milli % SCALE;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:03}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}
