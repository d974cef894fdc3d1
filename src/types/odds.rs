//! Decimal betting odds expressed as an exact fraction greater than one.
//!
//! ## Overview
//!
//! Odds of `n/d` mean a stake `s` returns `s * n / d` in total if the bet
//! wins, so the potential gain is `s * (n - d) / d`.
//!
//! Two odds are **complementary** when they describe the two sides of the
//! same fair bet: the implied probabilities `d1/n1` and `d2/n2` sum to one.
//! For `n/d` the complementary value is `n/(n - d)`, so `10/1` pairs with
//! `10/9` and `2/1` pairs with itself.
//!
//! ## Examples
//!
//! ```
//! use hyperbet::types::Odds;
//!
//! let back = Odds::new(10, 1).unwrap();
//! let lay: Odds = "10/9".parse().unwrap();
//! assert!(back.is_complementary_to(&lay));
//! assert_eq!(back.inverted().to_string(), "10/9");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::fraction::Fraction;

/// Validated odds value.
///
/// Holds the odds as given plus the reduced and complementary forms, both
/// computed once at construction.
#[derive(Debug, Clone, Copy)]
pub struct Odds {
    base: Fraction,
    simplified: Fraction,
    inverted: Fraction,
}

impl Odds {
    /// Build odds from `numerator/denominator`.
    ///
    /// Both parts must be positive and the value must be strictly greater
    /// than one.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperbet::types::Odds;
    ///
    /// assert!(Odds::new(3, 2).is_ok());
    /// assert!(Odds::new(2, 2).is_err());
    /// assert!(Odds::new(1, 0).is_err());
    /// ```
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, ValidationError> {
        let reject = |reason| ValidationError::InvalidOdds {
            numerator,
            denominator,
            reason,
        };
        if numerator == 0 || denominator == 0 {
            return Err(reject("numerator and denominator must be positive"));
        }
        if numerator <= denominator {
            return Err(reject("odds must be greater than one"));
        }

        let base = Fraction::new(numerator as u64, denominator as u64)?;
        let simplified = base.simplify();
        // n/d -> probability d/n -> complement (n-d)/n -> odds n/(n-d)
        let inverted = simplified.invert()?.complement()?.invert()?.simplify();

        Ok(Self {
            base,
            simplified,
            inverted,
        })
    }

    /// Numerator as given.
    #[inline]
    pub fn numerator(&self) -> u32 {
        self.base.numerator() as u32
    }

    /// Denominator as given.
    #[inline]
    pub fn denominator(&self) -> u32 {
        self.base.denominator() as u32
    }

    #[inline]
    pub fn base(&self) -> Fraction {
        self.base
    }

    /// Reduced form of the odds.
    #[inline]
    pub fn simplified(&self) -> Fraction {
        self.simplified
    }

    /// Complementary odds, already reduced.
    pub fn inverted(&self) -> Odds {
        Odds {
            base: self.inverted,
            simplified: self.inverted,
            inverted: self.simplified,
        }
    }

    /// True when a bet at `other` is the fair counterpart of a bet at `self`.
    pub fn is_complementary_to(&self, other: &Odds) -> bool {
        self.inverted == other.simplified
    }

    /// Ordering on the value of the odds, independent of representation.
    pub fn cmp_value(&self, other: &Odds) -> std::cmp::Ordering {
        let lhs = self.base.numerator() as u128 * other.base.denominator() as u128;
        let rhs = other.base.numerator() as u128 * self.base.denominator() as u128;
        lhs.cmp(&rhs)
    }
}

impl PartialEq for Odds {
    fn eq(&self, other: &Self) -> bool {
        self.simplified == other.simplified
    }
}

impl Eq for Odds {}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

impl FromStr for Odds {
    type Err = ValidationError;

    /// Parse `"n/d"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::Malformed {
            what: "odds",
            input: s.to_string(),
        };
        let (n, d) = s.trim().split_once('/').ok_or_else(malformed)?;
        let n: u32 = n.trim().parse().map_err(|_| malformed())?;
        let d: u32 = d.trim().parse().map_err(|_| malformed())?;
        Odds::new(n, d)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
