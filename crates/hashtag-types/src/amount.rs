use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOKEN_DECIMALS: u32 = 18;
pub const TOKEN_BASE_UNIT: u128 = 1_000_000_000_000_000_000; // 10^18

/// A token amount in base units (10^-18 of a whole token).
///
/// All arithmetic that could leave the numeric domain is exposed through
/// `checked_*` methods; callers decide whether overflow is an error or a
/// saturation case.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn from_whole(tokens: u64) -> Self {
        Self(tokens as u128 * TOKEN_BASE_UNIT)
    }

    pub fn to_base_units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `2 * self`, used for the escrow pool of a matched deal.
    pub fn checked_double(&self) -> Option<Self> {
        self.0.checked_mul(2).map(Self)
    }

    /// Floor half, the per-party share of an even split.
    ///
    /// Both parties compute the same floored half, so an odd amount loses
    /// exactly one base unit across the pair.
    pub fn half(&self) -> Self {
        Self(self.0 / 2)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / TOKEN_BASE_UNIT;
        let frac = self.0 % TOKEN_BASE_UNIT;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac = format!("{:018}", frac);
            write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_arithmetic() {
        let a = TokenAmount::from_whole(3);
        let b = TokenAmount::from_whole(2);

        assert_eq!(a.checked_add(b), Some(TokenAmount::from_whole(5)));
        assert_eq!(a.checked_sub(b), Some(TokenAmount::from_whole(1)));
        assert_eq!(b.checked_sub(a), None);
        assert_eq!(TokenAmount::MAX.checked_add(TokenAmount::from_base_units(1)), None);
        assert_eq!(TokenAmount::MAX.checked_double(), None);
    }

    #[test]
    fn test_half_floors() {
        assert_eq!(
            TokenAmount::from_base_units(7).half(),
            TokenAmount::from_base_units(3)
        );
        assert_eq!(
            TokenAmount::from_base_units(6).half(),
            TokenAmount::from_base_units(3)
        );
        // Both halves together lose one unit on odd amounts.
        let fee = TokenAmount::from_base_units(9);
        let collected = fee.half().checked_double().unwrap();
        assert_eq!(collected, TokenAmount::from_base_units(8));
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenAmount::from_whole(2).to_string(), "2");
        assert_eq!(
            TokenAmount::from_base_units(1_300_000_000_000_000_000).to_string(),
            "1.3"
        );
        assert_eq!(TokenAmount::ZERO.to_string(), "0");
    }
}
