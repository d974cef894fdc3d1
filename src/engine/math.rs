//! Stake arithmetic for pairing two opposite bets.
//!
//! ## Matched Stake
//!
//! Two bets on opposite wincases at complementary odds back the same fair
//! wager. Each side's potential result is `stake * odds`. The side with the
//! larger potential result only commits as much as the other side stands to
//! win; the other side commits its whole stake:
//!
//! ```text
//! r1 = s1 * o1, r2 = s2 * o2
//! r1 > r2  =>  bet1 commits r2 - s2, bet2 commits s2
//! r1 < r2  =>  bet1 commits s1,      bet2 commits r1 - s1
//! r1 = r2  =>  both commit their whole stake
//! ```
//!
//! All products are truncated to base units.
//!
//! ## Example
//!
//! ```
//! use hyperbet::engine::math::calculate_matched_stake;
//! use hyperbet::types::{Asset, Odds};
//!
//! let matched = calculate_matched_stake(
//!     &Asset::native(1_000_000_000),
//!     &Asset::native(2_000_000_000),
//!     &Odds::new(10, 1).unwrap(),
//!     &Odds::new(10, 9).unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(matched.bet1_matched.amount, 222_222_222);
//! assert_eq!(matched.bet2_matched.amount, 2_000_000_000);
//! ```

use std::cmp::Ordering;

use crate::error::{BettingError, InvariantError, ValidationError};
use crate::types::{Asset, Odds, NATIVE_SYMBOL};

/// Stake each side commits to a new matched bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedStake {
    pub bet1_matched: Asset,
    pub bet2_matched: Asset,
}

/// Total returned to a winning bet: `stake * odds`, truncated.
pub fn calculate_potential_result(stake: &Asset, odds: &Odds) -> Result<Asset, InvariantError> {
    stake.checked_mul(&odds.base())
}

/// Net gain of a winning bet: `stake * odds - stake`.
///
/// Fails with a validation error when the stake is not in the native
/// currency.
///
/// # Example
///
/// ```
/// use hyperbet::engine::math::calculate_gain;
/// use hyperbet::types::{Asset, Odds};
///
/// let gain = calculate_gain(&Asset::native(1_000_000_000), &Odds::new(10, 1).unwrap()).unwrap();
/// assert_eq!(gain.amount, 9_000_000_000);
/// ```
pub fn calculate_gain(stake: &Asset, odds: &Odds) -> Result<Asset, BettingError> {
    if stake.symbol != NATIVE_SYMBOL {
        return Err(ValidationError::SymbolMismatch {
            expected: NATIVE_SYMBOL,
            actual: stake.symbol,
        }
        .into());
    }
    let result = calculate_potential_result(stake, odds)?;
    Ok(result.checked_sub(stake)?)
}

/// True when a bet with this rest stake could still win something.
///
/// A rest so small that `rest * odds` truncates back to `rest` can never be
/// matched; it waits on the book until it is refunded.
pub fn is_matchable(rest: &Asset, odds: &Odds) -> Result<bool, BettingError> {
    Ok(!calculate_gain(rest, odds)?.is_zero())
}

/// Split two opposite stakes into the amounts committed to a matched bet.
///
/// Any symbol other than the native one, odds that are not complementary,
/// or a side whose potential gain is not positive, are invariant violations:
/// the matcher filters all of them out before calling this.
pub fn calculate_matched_stake(
    bet1_stake: &Asset,
    bet2_stake: &Asset,
    bet1_odds: &Odds,
    bet2_odds: &Odds,
) -> Result<MatchedStake, BettingError> {
    for stake in [bet1_stake, bet2_stake] {
        if stake.symbol != NATIVE_SYMBOL {
            return Err(InvariantError::SymbolMismatch(NATIVE_SYMBOL, stake.symbol).into());
        }
    }
    if !bet1_odds.is_complementary_to(bet2_odds) {
        return Err(InvariantError::NonComplementaryOdds(*bet1_odds, *bet2_odds).into());
    }

    let r1 = calculate_potential_result(bet1_stake, bet1_odds)?;
    let r2 = calculate_potential_result(bet2_stake, bet2_odds)?;
    let gain1 = r1.checked_sub(bet1_stake)?;
    let gain2 = r2.checked_sub(bet2_stake)?;
    if gain1.is_zero() || gain2.is_zero() {
        return Err(InvariantError::NonPositiveGain { gain1, gain2 }.into());
    }

    let matched = match r1.amount.cmp(&r2.amount) {
        Ordering::Greater => MatchedStake {
            bet1_matched: gain2,
            bet2_matched: *bet2_stake,
        },
        Ordering::Less => MatchedStake {
            bet1_matched: *bet1_stake,
            bet2_matched: gain1,
        },
        Ordering::Equal => MatchedStake {
            bet1_matched: *bet1_stake,
            bet2_matched: *bet2_stake,
        },
    };

    if matched.bet1_matched.amount > bet1_stake.amount {
        return Err(InvariantError::Overfill {
            bet: 1,
            amount: matched.bet1_matched,
            rest: *bet1_stake,
        }
        .into());
    }
    if matched.bet2_matched.amount > bet2_stake.amount {
        return Err(InvariantError::Overfill {
            bet: 2,
            amount: matched.bet2_matched,
            rest: *bet2_stake,
        }
        .into());
    }
    Ok(matched)
}

// ============================================================================
// Unit Tests
// ============================================================================
