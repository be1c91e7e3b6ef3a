//! Minor-unit amount type.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are integer minor currency units (cents); the ledger is
//! single-currency, so the type carries no currency code.

use serde::{Deserialize, Serialize};

/// An amount in minor currency units (e.g., cents).
///
/// Wraps an `i64` so arithmetic stays exact. Entry amounts are always
/// positive; balances may conceptually be any sign, so the type itself
/// does not forbid negatives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MinorUnits(pub i64);

impl MinorUnits {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw minor-unit value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction; `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The additive inverse.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(-self.0)
    }
}

impl From<i64> for MinorUnits {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}

impl std::fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_predicates() {
        assert!(MinorUnits::new(1).is_positive());
        assert!(!MinorUnits::ZERO.is_positive());
        assert!(MinorUnits::new(-1).is_negative());
        assert!(!MinorUnits::ZERO.is_negative());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = MinorUnits::new(1000);
        let b = MinorUnits::new(400);
        assert_eq!(a.checked_sub(b), Some(MinorUnits::new(600)));
        assert_eq!(a.checked_add(b), Some(MinorUnits::new(1400)));
        assert_eq!(MinorUnits::new(i64::MAX).checked_add(MinorUnits::new(1)), None);
    }

    #[test]
    fn test_serde_transparent() {
        let amount = MinorUnits::new(2500);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "2500");
        let back: MinorUnits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
