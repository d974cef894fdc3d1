//! Matcher: pairs a freshly posted bet with resting opposite bets.
//!
//! ## Matching Rules
//!
//! - Candidates rest on the **opposite wincase** of the same game
//! - Candidates are visited in **ascending id** (oldest first)
//! - A better never matches their own bet
//! - Odds must be **complementary**; everything else is skipped
//! - Bets whose rest can no longer produce a gain are skipped (dust)
//! - Partial fills are supported; an unfilled rest stays on the book
//!
//! Every pairing creates one [`MatchedBet`] and emits
//! [`BettingEvent::BetsMatched`]. Pending bets whose rest reaches zero are
//! removed from the book.

use tracing::debug;

use crate::engine::math::{calculate_matched_stake, is_matchable};
use crate::error::{BettingError, InvariantError};
use crate::ledger::EventSink;
use crate::store::{MatchedBetStore, PendingBetStore};
use crate::types::{Asset, BetId, BettingEvent, MatchedBet, MatchedBetId, MatchedSide};

/// Result of matching one bet against the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Matched bets created, in creation order.
    pub matched: Vec<MatchedBetId>,
    /// Stake still unmatched on the incoming bet.
    pub rest_stake: Asset,
    /// True if the incoming bet left the pending book.
    pub fully_matched: bool,
}

/// Matcher over the pending and matched books of a ledger.
///
/// Borrows exactly what it mutates; the caller owns the stores.
pub struct BettingMatcher<'a> {
    pending: &'a mut PendingBetStore,
    matched: &'a mut MatchedBetStore,
    events: &'a mut dyn EventSink,
}

impl<'a> BettingMatcher<'a> {
    pub fn new(
        pending: &'a mut PendingBetStore,
        matched: &'a mut MatchedBetStore,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            pending,
            matched,
            events,
        }
    }

    /// Match the pending bet `bet_id` against the opposite side of its game.
    ///
    /// # Arguments
    ///
    /// * `bet_id` - A bet already inserted into the pending book
    /// * `now` - Head block time, stamped on created matched bets
    pub fn match_bet(&mut self, bet_id: BetId, now: u64) -> Result<MatchResult, BettingError> {
        let bet = self
            .pending
            .get(bet_id)
            .cloned()
            .ok_or(InvariantError::MissingRecord {
                kind: "pending bet",
                id: bet_id.0,
            })?;

        let mut created = Vec::new();
        let mut rest = bet.rest_stake;

        if is_matchable(&rest, &bet.odds)? {
            for candidate_id in self.pending.candidates(&bet.game_uuid, &bet.wincase.opposite()) {
                let candidate = match self.pending.get(candidate_id) {
                    Some(candidate) => candidate.clone(),
                    None => continue,
                };
                if candidate.better == bet.better {
                    continue;
                }
                if !bet.odds.is_complementary_to(&candidate.odds) {
                    continue;
                }
                if !is_matchable(&candidate.rest_stake, &candidate.odds)? {
                    continue;
                }

                let stake =
                    calculate_matched_stake(&rest, &candidate.rest_stake, &bet.odds, &candidate.odds)?;
                if stake.bet1_matched.is_zero() || stake.bet2_matched.is_zero() {
                    return Err(InvariantError::EmptyMatch {
                        bet1: bet_id.0,
                        bet2: candidate_id.0,
                    }
                    .into());
                }

                rest = self.pending.fill(bet_id, &stake.bet1_matched)?;
                let candidate_rest = self.pending.fill(candidate_id, &stake.bet2_matched)?;

                let matched_id = self.matched.insert(MatchedBet {
                    id: MatchedBetId::default(),
                    game_uuid: bet.game_uuid,
                    market: bet.market(),
                    created: now,
                    bet1: MatchedSide::from_pending(&bet, stake.bet1_matched),
                    bet2: MatchedSide::from_pending(&candidate, stake.bet2_matched),
                });
                created.push(matched_id);

                debug!(
                    game = %bet.game_uuid,
                    bet1 = %bet.uuid,
                    bet2 = %candidate.uuid,
                    bet1_matched = %stake.bet1_matched,
                    bet2_matched = %stake.bet2_matched,
                    "bets matched"
                );
                self.events.push(BettingEvent::BetsMatched {
                    game_uuid: bet.game_uuid,
                    market: bet.market(),
                    bet1_uuid: bet.uuid,
                    bet2_uuid: candidate.uuid,
                    bet1_matched: stake.bet1_matched,
                    bet2_matched: stake.bet2_matched,
                    matched_bet_id: matched_id.0,
                });

                if candidate_rest.is_zero() {
                    self.pending.remove(candidate_id);
                }
                if !is_matchable(&rest, &bet.odds)? {
                    break;
                }
            }
        }

        let fully_matched = rest.is_zero();
        if fully_matched {
            self.pending.remove(bet_id);
        }

        Ok(MatchResult {
            matched: created,
            rest_stake: rest,
            fully_matched,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
