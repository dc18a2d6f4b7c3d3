//! Type-safe price representation using decimal arithmetic.
//!
//! The marketplace trades in Vietnamese dong, which has no minor unit, so
//! prices are whole numbers formatted with `.` thousands separators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in Vietnamese dong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., `"450.000.000 ₫"`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round();
        let digits = rounded.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{grouped} ₫")
        } else {
            format!("{grouped} ₫")
        }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(Decimal::from(450_000_000)).display(), "450.000.000 ₫");
        assert_eq!(Price::new(Decimal::from(1_000)).display(), "1.000 ₫");
        assert_eq!(Price::new(Decimal::from(999)).display(), "999 ₫");
        assert_eq!(Price::new(Decimal::ZERO).display(), "0 ₫");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Price::new(Decimal::from(-25_000)).display(), "-25.000 ₫");
    }
}
