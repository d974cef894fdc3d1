//! Fixed-point currency amounts.
//!
//! ## Overview
//!
//! Amounts are integer counts of base units. Every symbol known to the
//! ledger has 9 decimal places, so `1.000000000 SCR` is stored as
//! `1_000_000_000`. Strings are parsed and printed through `rust_decimal`,
//! never through floats.
//!
//! ## Examples
//!
//! ```
//! use hyperbet::types::{Asset, Symbol};
//!
//! let stake: Asset = "1.5 SCR".parse().unwrap();
//! assert_eq!(stake.amount, 1_500_000_000);
//! assert_eq!(stake.symbol, Symbol::Scr);
//! assert_eq!(stake.to_string(), "1.500000000 SCR");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{InvariantError, ValidationError};
use crate::types::fraction::Fraction;

/// Number of decimal places for every symbol.
pub const PRECISION: u32 = 9;

/// Base units per whole coin: 10^9.
pub const SCALE: u64 = 1_000_000_000;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to base units.
///
/// Returns `None` for negative, malformed or out-of-range input, and for
/// input carrying more than [`PRECISION`] decimal places.
///
/// # Example
///
/// ```
/// use hyperbet::types::asset::to_fixed;
///
/// assert_eq!(to_fixed("1"), Some(1_000_000_000));
/// assert_eq!(to_fixed("0.000000001"), Some(1));
/// assert_eq!(to_fixed("0.0000000001"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    if decimal.is_sign_negative() || decimal.normalize().scale() > PRECISION {
        return None;
    }
    decimal.checked_mul(Decimal::from(SCALE))?.to_u64()
}

/// Format base units with exactly [`PRECISION`] decimal places.
///
/// # Example
///
/// ```
/// use hyperbet::types::asset::from_fixed;
///
/// assert_eq!(from_fixed(1_000_000_000), "1.000000000");
/// assert_eq!(from_fixed(222_222_222), "0.222222222");
/// ```
pub fn from_fixed(value: u64) -> String {
    let decimal = Decimal::from(value) / Decimal::from(SCALE);
    format!("{:.9}", decimal)
}

// ============================================================================
// Symbol
// ============================================================================

/// Currency symbols known to the ledger.
///
/// Represented as u8 for SSZ records:
/// - Scr = 0 (native, the only one bets accept)
/// - Sp = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Symbol {
    #[default]
    Scr,
    Sp,
}

/// The symbol every stake and payout is denominated in.
pub const NATIVE_SYMBOL: Symbol = Symbol::Scr;

impl Symbol {
    pub fn to_u8(self) -> u8 {
        match self {
            Symbol::Scr => 0,
            Symbol::Sp => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Symbol::Scr),
            1 => Some(Symbol::Sp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::Scr => "SCR",
            Symbol::Sp => "SP",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCR" => Ok(Symbol::Scr),
            "SP" => Ok(Symbol::Sp),
            _ => Err(ValidationError::Malformed {
                what: "asset symbol",
                input: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Asset
// ============================================================================

/// An amount of a given currency, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Asset {
    pub amount: u64,
    pub symbol: Symbol,
}

impl Asset {
    pub const fn new(amount: u64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    /// Amount of the native currency.
    pub const fn native(amount: u64) -> Self {
        Self::new(amount, NATIVE_SYMBOL)
    }

    pub const fn zero(symbol: Symbol) -> Self {
        Self::new(0, symbol)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.symbol == NATIVE_SYMBOL
    }

    fn same_symbol(&self, other: &Asset) -> Result<(), InvariantError> {
        if self.symbol != other.symbol {
            return Err(InvariantError::SymbolMismatch(self.symbol, other.symbol));
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Asset) -> Result<Asset, InvariantError> {
        self.same_symbol(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(InvariantError::Overflow("asset addition"))?;
        Ok(Asset::new(amount, self.symbol))
    }

    pub fn checked_sub(&self, other: &Asset) -> Result<Asset, InvariantError> {
        self.same_symbol(other)?;
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(InvariantError::Underflow("asset subtraction"))?;
        Ok(Asset::new(amount, self.symbol))
    }

    /// `amount * n / d`, truncated toward zero.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperbet::types::{Asset, Fraction};
    ///
    /// let stake = Asset::native(1_000_000_000);
    /// let third = Fraction::new(1, 3).unwrap();
    /// assert_eq!(stake.checked_mul(&third).unwrap().amount, 333_333_333);
    /// ```
    pub fn checked_mul(&self, fraction: &Fraction) -> Result<Asset, InvariantError> {
        let amount = fraction
            .apply(self.amount)
            .ok_or(InvariantError::Overflow("asset multiplication"))?;
        Ok(Asset::new(amount, self.symbol))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", from_fixed(self.amount), self.symbol)
    }
}

impl FromStr for Asset {
    type Err = ValidationError;

    /// Parse `"<decimal> <SYMBOL>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::Malformed {
            what: "asset",
            input: s.to_string(),
        };
        let (amount, symbol) = s.trim().split_once(' ').ok_or_else(malformed)?;
        let amount = to_fixed(amount.trim()).ok_or_else(malformed)?;
        let symbol = symbol.trim().parse()?;
        Ok(Asset::new(amount, symbol))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_constant() {
        assert_eq!(SCALE, 10u64.pow(PRECISION));
    }

    #[test]
    fn test_to_fixed_edge_cases() {
        assert_eq!(to_fixed("0"), Some(0));
        assert_eq!(to_fixed("0.100000000"), Some(100_000_000));
        assert_eq!(to_fixed("-1"), None);
        assert_eq!(to_fixed("abc"), None);
        assert_eq!(to_fixed(""), None);
        assert_eq!(to_fixed("99999999999999999999"), None);
    }

    #[test]
    fn test_from_fixed() {
        assert_eq!(from_fixed(0), "0.000000000");
        assert_eq!(from_fixed(1), "0.000000001");
        assert_eq!(from_fixed(9_000_000_000), "9.000000000");
    }

    #[test]
    fn test_symbol_conversion() {
        assert_eq!(Symbol::from_u8(Symbol::Sp.to_u8()), Some(Symbol::Sp));
        assert_eq!(Symbol::from_u8(7), None);
        assert_eq!("SCR".parse::<Symbol>().unwrap(), Symbol::Scr);
        assert!("BTC".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_asset_parse_and_display() {
        let a: Asset = "2 SP".parse().unwrap();
        assert_eq!(a, Asset::new(2_000_000_000, Symbol::Sp));
        assert_eq!(a.to_string(), "2.000000000 SP");

        assert!("2".parse::<Asset>().is_err());
        assert!("2 XYZ".parse::<Asset>().is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Asset::native(5);
        let b = Asset::native(3);
        assert_eq!(a.checked_add(&b).unwrap(), Asset::native(8));
        assert_eq!(a.checked_sub(&b).unwrap(), Asset::native(2));
        assert_eq!(
            b.checked_sub(&a),
            Err(InvariantError::Underflow("asset subtraction"))
        );
        assert_eq!(
            Asset::native(u64::MAX).checked_add(&b),
            Err(InvariantError::Overflow("asset addition"))
        );
    }

    #[test]
    fn test_symbol_mismatch() {
        let scr = Asset::native(1);
        let sp = Asset::new(1, Symbol::Sp);
        assert_eq!(
            scr.checked_add(&sp),
            Err(InvariantError::SymbolMismatch(Symbol::Scr, Symbol::Sp))
        );
    }

    #[test]
    fn test_checked_mul() {
        let stake = Asset::native(1_000_000_000);
        let ten = Fraction::new(10, 1).unwrap();
        assert_eq!(stake.checked_mul(&ten).unwrap().amount, 10_000_000_000);

        let huge = Asset::native(u64::MAX);
        assert!(huge.checked_mul(&ten).is_err());
    }
}
