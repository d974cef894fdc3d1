//! Exact rational numbers used for odds and payout arithmetic.
//!
//! ## Overview
//!
//! A [`Fraction`] is a pair of unsigned integers with a non-zero
//! denominator. Nothing here touches floating point: odds are compared on
//! their reduced form and applied to stakes with integer multiplication
//! followed by truncating division.
//!
//! ## Examples
//!
//! ```
//! use hyperbet::types::Fraction;
//!
//! let f = Fraction::new(10, 4).unwrap();
//! assert_eq!(f.simplify(), Fraction::new(5, 2).unwrap());
//! assert_eq!(f.invert().unwrap(), Fraction::new(4, 10).unwrap());
//! ```

use std::fmt;

use crate::error::ValidationError;

/// Greatest common divisor (Euclid).
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Shorthand for [`Fraction::new`].
pub fn make_fraction(numerator: u64, denominator: u64) -> Result<Fraction, ValidationError> {
    Fraction::new(numerator, denominator)
}

// ============================================================================
// Fraction
// ============================================================================

/// A rational number `numerator / denominator` with `denominator > 0`.
///
/// Equality is structural: `2/4 != 1/2`. Compare reduced forms with
/// [`Fraction::same_ratio`] when the ratio is what matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: u64,
    denominator: u64,
}

impl Fraction {
    /// Build a fraction, rejecting a zero denominator.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperbet::types::Fraction;
    ///
    /// assert!(Fraction::new(1, 0).is_err());
    /// assert_eq!(Fraction::new(3, 4).unwrap().numerator(), 3);
    /// ```
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ValidationError> {
        if denominator == 0 {
            return Err(ValidationError::InvalidFraction {
                numerator,
                denominator,
                reason: "denominator must be positive",
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    #[inline]
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    #[inline]
    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Divide both parts by their gcd.
    pub fn simplify(&self) -> Self {
        let g = gcd(self.numerator, self.denominator);
        if g <= 1 {
            return *self;
        }
        Self {
            numerator: self.numerator / g,
            denominator: self.denominator / g,
        }
    }

    /// Swap numerator and denominator. Fails for a zero numerator.
    pub fn invert(&self) -> Result<Self, ValidationError> {
        Self::new(self.denominator, self.numerator)
    }

    /// `1 - self`, i.e. `(d - n) / d`. Only defined for fractions `<= 1`.
    pub fn complement(&self) -> Result<Self, ValidationError> {
        let numerator = self.denominator.checked_sub(self.numerator).ok_or(
            ValidationError::InvalidFraction {
                numerator: self.numerator,
                denominator: self.denominator,
                reason: "complement of a fraction greater than one",
            },
        )?;
        Self::new(numerator, self.denominator)
    }

    /// True when both fractions reduce to the same ratio.
    pub fn same_ratio(&self, other: &Fraction) -> bool {
        self.simplify() == other.simplify()
    }

    /// `value * n / d`, truncated toward zero. `None` on overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use hyperbet::types::Fraction;
    ///
    /// let f = Fraction::new(10, 9).unwrap();
    /// assert_eq!(f.apply(1_000), Some(1_111));
    /// ```
    pub fn apply(&self, value: u64) -> Option<u64> {
        let product = (value as u128).checked_mul(self.numerator as u128)?;
        u64::try_from(product / self.denominator as u128).ok()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: u64, d: u64) -> Fraction {
        Fraction::new(n, d).unwrap()
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(7, 0), 7);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(matches!(
            Fraction::new(1, 0),
            Err(ValidationError::InvalidFraction { .. })
        ));
        assert_eq!(make_fraction(3, 4).unwrap(), frac(3, 4));
    }

    #[test]
    fn test_simplify() {
        assert_eq!(frac(10, 4).simplify(), frac(5, 2));
        assert_eq!(frac(20_000, 2).simplify(), frac(10_000, 1));
        assert_eq!(frac(7, 3).simplify(), frac(7, 3));
        assert_eq!(frac(0, 5).simplify(), frac(0, 1));
    }

    #[test]
    fn test_structural_equality() {
        assert_ne!(frac(2, 4), frac(1, 2));
        assert!(frac(2, 4).same_ratio(&frac(1, 2)));
    }

    #[test]
    fn test_invert() {
        assert_eq!(frac(10, 1).invert().unwrap(), frac(1, 10));
        assert!(frac(0, 3).invert().is_err());
    }

    #[test]
    fn test_complement() {
        assert_eq!(frac(1, 10).complement().unwrap(), frac(9, 10));
        assert_eq!(frac(3, 3).complement().unwrap(), frac(0, 3));
        assert!(frac(10, 9).complement().is_err());
    }

    #[test]
    fn test_apply_truncates() {
        assert_eq!(frac(10, 1).apply(1_000_000_000), Some(10_000_000_000));
        assert_eq!(frac(10, 9).apply(100), Some(111));
        assert_eq!(frac(10_000, 9_999).apply(90_000_000), Some(90_009_000));
    }

    #[test]
    fn test_apply_overflow() {
        assert_eq!(frac(2, 1).apply(u64::MAX), None);
        assert_eq!(frac(1, 2).apply(u64::MAX), Some(u64::MAX / 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(frac(10, 9).to_string(), "10/9");
    }
}
