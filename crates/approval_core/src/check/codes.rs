//! Check error registry.

/// Stable numeric codes surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckCode {
    NativeTokenNotEnough,
    NonceLowerThanExpected,
    GasLimitLessThanExpected,
    GasLimitLessThanGasUsed,
    GasLimitNotEnough,
}

/// Severity of a fired check. The nonce check carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckSeverity {
    Warn,
    Danger,
    Forbidden,
}

impl CheckSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckSeverity::Warn => "warn",
            CheckSeverity::Danger => "danger",
            CheckSeverity::Forbidden => "forbidden",
        }
    }
}

impl CheckCode {
    pub fn as_u16(self) -> u16 {
        match self {
            CheckCode::NativeTokenNotEnough => 3001,
            CheckCode::NonceLowerThanExpected => 3003,
            CheckCode::GasLimitLessThanExpected => 3004,
            CheckCode::GasLimitLessThanGasUsed => 3005,
            CheckCode::GasLimitNotEnough => 3006,
        }
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        REGISTRY.iter().copied().find(|c| c.as_u16() == code)
    }

    pub fn message_key(self) -> &'static str {
        match self {
            CheckCode::NativeTokenNotEnough => "check.native_token_not_enough",
            CheckCode::NonceLowerThanExpected => "check.nonce_lower_than_expected",
            CheckCode::GasLimitLessThanExpected => "check.gas_limit_less_than_expected",
            CheckCode::GasLimitLessThanGasUsed => "check.gas_limit_less_than_gas_used",
            CheckCode::GasLimitNotEnough => "check.gas_limit_not_enough",
        }
    }

    /// Level this code is always reported with.
    pub fn severity(self) -> Option<CheckSeverity> {
        match self {
            CheckCode::NativeTokenNotEnough | CheckCode::GasLimitNotEnough => {
                Some(CheckSeverity::Forbidden)
            }
            CheckCode::GasLimitLessThanGasUsed => Some(CheckSeverity::Danger),
            CheckCode::GasLimitLessThanExpected => Some(CheckSeverity::Warn),
            CheckCode::NonceLowerThanExpected => None,
        }
    }
}

const REGISTRY: &[CheckCode] = &[
    CheckCode::NativeTokenNotEnough,
    CheckCode::NonceLowerThanExpected,
    CheckCode::GasLimitLessThanExpected,
    CheckCode::GasLimitLessThanGasUsed,
    CheckCode::GasLimitNotEnough,
];

pub fn check_code_registry() -> &'static [CheckCode] {
    REGISTRY
}

/// One fired check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckError {
    pub code: CheckCode,
    pub level: Option<CheckSeverity>,
    pub message_key: &'static str,
}

impl CheckError {
    pub fn new(code: CheckCode) -> Self {
        Self {
            code,
            level: code.severity(),
            message_key: code.message_key(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.level == Some(CheckSeverity::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_codes_are_unique_and_round_trip() {
        let mut seen = std::collections::BTreeSet::new();
        for code in check_code_registry() {
            assert!(seen.insert(code.as_u16()), "duplicate {}", code.as_u16());
            assert_eq!(CheckCode::from_u16(code.as_u16()), Some(*code));
        }
        assert_eq!(CheckCode::from_u16(3002), None);
    }
}
