//! Pending and matched bets.
//!
//! ## Lifecycle
//!
//! A posted bet becomes a [`PendingBet`] holding its whole stake. Matching
//! moves part or all of that stake into [`MatchedBet`]s, decreasing
//! `rest_stake`; a pending bet disappears once its rest reaches zero, is
//! cancelled, or its game is closed. Matched bets live until their game is
//! resolved or refunded.

use std::fmt;

use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::asset::Asset;
use crate::types::odds::Odds;
use crate::types::wincase::{Market, Wincase};

/// Engine-assigned pending bet identifier. Ascending ids give FIFO order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BetId(pub u64);

/// Engine-assigned matched bet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MatchedBetId(pub u64);

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bet#{}", self.0)
    }
}

impl fmt::Display for MatchedBetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matched#{}", self.0)
    }
}

// ============================================================================
// PendingBetKind
// ============================================================================

/// Whether a bet stays open once its game has started.
///
/// Represented as u8 for SSZ records:
/// - Live = 0
/// - NonLive = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PendingBetKind {
    #[default]
    Live,
    NonLive,
}

impl PendingBetKind {
    pub fn to_u8(self) -> u8 {
        match self {
            PendingBetKind::Live => 0,
            PendingBetKind::NonLive => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PendingBetKind::Live),
            1 => Some(PendingBetKind::NonLive),
            _ => None,
        }
    }
}

// ============================================================================
// PendingBet
// ============================================================================

/// An unmatched (or partially matched) bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBet {
    pub id: BetId,
    pub uuid: Uuid,
    pub game_uuid: Uuid,
    pub better: String,
    pub wincase: Wincase,
    pub odds: Odds,
    /// Stake as originally posted.
    pub stake: Asset,
    /// Stake still waiting for a counterparty.
    pub rest_stake: Asset,
    pub kind: PendingBetKind,
    pub created: u64,
}

impl PendingBet {
    /// Create a pending bet with its whole stake unmatched.
    ///
    /// The id is left at zero and assigned by the store on insert.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        game_uuid: Uuid,
        better: String,
        wincase: Wincase,
        odds: Odds,
        stake: Asset,
        kind: PendingBetKind,
        created: u64,
    ) -> Self {
        Self {
            id: BetId::default(),
            uuid,
            game_uuid,
            better,
            wincase,
            odds,
            stake,
            rest_stake: stake,
            kind,
            created,
        }
    }

    #[inline]
    pub fn market(&self) -> Market {
        self.wincase.market()
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.rest_stake.is_zero()
    }

    /// Part of the stake already moved into matched bets.
    pub fn matched_stake(&self) -> Result<Asset, InvariantError> {
        self.stake.checked_sub(&self.rest_stake)
    }

    /// Move `amount` out of the rest stake.
    ///
    /// Unlike a best-effort fill, asking for more than the rest is an
    /// invariant violation: the matcher must never over-commit a bet.
    pub fn fill(&mut self, amount: &Asset) -> Result<(), InvariantError> {
        self.rest_stake = self
            .rest_stake
            .checked_sub(amount)
            .map_err(|_| InvariantError::Overfill {
                bet: self.id.0,
                amount: *amount,
                rest: self.rest_stake,
            })?;
        Ok(())
    }
}

// ============================================================================
// MatchedBet
// ============================================================================

/// One side of a matched bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSide {
    pub better: String,
    pub bet_uuid: Uuid,
    pub wincase: Wincase,
    pub odds: Odds,
    /// Stake committed by this side to the pot.
    pub stake: Asset,
    /// Time the originating pending bet was posted.
    pub created: u64,
}

impl MatchedSide {
    /// Snapshot of a pending bet with a given committed stake.
    pub fn from_pending(bet: &PendingBet, stake: Asset) -> Self {
        Self {
            better: bet.better.clone(),
            bet_uuid: bet.uuid,
            wincase: bet.wincase,
            odds: bet.odds,
            stake,
            created: bet.created,
        }
    }
}

/// Two opposite bets locked together.
///
/// `bet1` is the bet that triggered the match, `bet2` the resting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedBet {
    pub id: MatchedBetId,
    pub game_uuid: Uuid,
    pub market: Market,
    pub created: u64,
    pub bet1: MatchedSide,
    pub bet2: MatchedSide,
}

impl MatchedBet {
    /// Sum of both committed stakes; the winner takes all of it.
    pub fn pot(&self) -> Result<Asset, InvariantError> {
        self.bet1.stake.checked_add(&self.bet2.stake)
    }

    /// The side that backed `wincase`, if any.
    pub fn side_for(&self, wincase: &Wincase) -> Option<&MatchedSide> {
        if self.bet1.wincase == *wincase {
            Some(&self.bet1)
        } else if self.bet2.wincase == *wincase {
            Some(&self.bet2)
        } else {
            None
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
