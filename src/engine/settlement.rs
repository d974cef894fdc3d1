//! Resolution and cancellation: every path that moves stake back out of
//! the books.
//!
//! ## Rules
//!
//! - Refunds return a pending bet's **rest stake**, or each side's committed
//!   stake of a matched bet, to its owner.
//! - Resolution pays the whole pot of a matched bet to the side whose
//!   wincase is among the winners. The pot always covers `stake * odds` of
//!   the winning side; any truncation dust goes to the winner too, so stake
//!   is conserved exactly.
//! - A matched bet on a draw-capable market with no winner is refunded.
//! - Every record leaves the store once settled, so nothing is paid twice.

use std::collections::BTreeSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::math::calculate_potential_result;
use crate::error::{BettingError, InvariantError};
use crate::ledger::{AccountService, EventSink};
use crate::store::{MatchedBetStore, PendingBetStore};
use crate::types::{
    Asset, BetCancelledKind, BetId, BettingEvent, Market, MatchedBetId, PendingBetKind, Wincase,
    NATIVE_SYMBOL,
};

/// Totals moved by a settlement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementSummary {
    /// Stake returned to its owners.
    pub refunded: Asset,
    /// Pots paid to winners.
    pub paid: Asset,
    /// Records removed from the books.
    pub records: usize,
}

impl Default for SettlementSummary {
    fn default() -> Self {
        Self {
            refunded: Asset::zero(NATIVE_SYMBOL),
            paid: Asset::zero(NATIVE_SYMBOL),
            records: 0,
        }
    }
}

impl SettlementSummary {
    fn absorb(&mut self, other: SettlementSummary) -> Result<(), InvariantError> {
        self.refunded = self.refunded.checked_add(&other.refunded)?;
        self.paid = self.paid.checked_add(&other.paid)?;
        self.records += other.records;
        Ok(())
    }
}

pub struct SettlementEngine<'a> {
    pending: &'a mut PendingBetStore,
    matched: &'a mut MatchedBetStore,
    accounts: &'a mut dyn AccountService,
    events: &'a mut dyn EventSink,
}

impl<'a> SettlementEngine<'a> {
    pub fn new(
        pending: &'a mut PendingBetStore,
        matched: &'a mut MatchedBetStore,
        accounts: &'a mut dyn AccountService,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            pending,
            matched,
            accounts,
            events,
        }
    }

    // ========================================================================
    // Pending bets
    // ========================================================================

    /// Refund the rest stake of one pending bet and drop it.
    pub fn cancel_pending_bet(&mut self, id: BetId) -> Result<SettlementSummary, BettingError> {
        let bet = self.pending.remove(id).ok_or(InvariantError::MissingRecord {
            kind: "pending bet",
            id: id.0,
        })?;

        self.accounts.increase_balance(&bet.better, &bet.rest_stake)?;
        debug!(game = %bet.game_uuid, bet = %bet.uuid, stake = %bet.rest_stake, "pending bet refunded");
        self.events.push(BettingEvent::BetCancelled {
            game_uuid: bet.game_uuid,
            better: bet.better,
            bet_uuid: bet.uuid,
            stake: bet.rest_stake,
            kind: BetCancelledKind::Pending,
        });

        Ok(SettlementSummary {
            refunded: bet.rest_stake,
            records: 1,
            ..SettlementSummary::default()
        })
    }

    fn cancel_pending_where<F>(&mut self, game: &Uuid, filter: F) -> Result<SettlementSummary, BettingError>
    where
        F: Fn(PendingBetKind, &Wincase) -> bool,
    {
        let mut summary = SettlementSummary::default();
        for id in self.pending.ids_for_game(game) {
            let selected = self
                .pending
                .get(id)
                .map(|bet| filter(bet.kind, &bet.wincase))
                .unwrap_or(false);
            if selected {
                summary.absorb(self.cancel_pending_bet(id)?)?;
            }
        }
        Ok(summary)
    }

    /// Refund every pending bet of `game`.
    pub fn return_pending_bets(&mut self, game: &Uuid) -> Result<SettlementSummary, BettingError> {
        self.cancel_pending_where(game, |_, _| true)
    }

    /// Refund the pending bets of `game` that are of `kind`.
    pub fn return_pending_bets_of_kind(
        &mut self,
        game: &Uuid,
        kind: PendingBetKind,
    ) -> Result<SettlementSummary, BettingError> {
        self.cancel_pending_where(game, |bet_kind, _| bet_kind == kind)
    }

    // ========================================================================
    // Matched bets
    // ========================================================================

    fn refund_matched_bet(&mut self, id: MatchedBetId) -> Result<SettlementSummary, BettingError> {
        let bet = self.matched.remove(id)?;
        let mut refunded = Asset::zero(NATIVE_SYMBOL);

        for side in [&bet.bet1, &bet.bet2] {
            self.accounts.increase_balance(&side.better, &side.stake)?;
            refunded = refunded.checked_add(&side.stake)?;
            self.events.push(BettingEvent::BetCancelled {
                game_uuid: bet.game_uuid,
                better: side.better.clone(),
                bet_uuid: side.bet_uuid,
                stake: side.stake,
                kind: BetCancelledKind::Matched,
            });
        }
        debug!(game = %bet.game_uuid, matched = %id, stake = %refunded, "matched bet refunded");

        Ok(SettlementSummary {
            refunded,
            records: 1,
            ..SettlementSummary::default()
        })
    }

    /// Refund every matched bet of `game`.
    pub fn return_matched_bets(&mut self, game: &Uuid) -> Result<SettlementSummary, BettingError> {
        let mut summary = SettlementSummary::default();
        for id in self.matched.ids_for_game(game) {
            summary.absorb(self.refund_matched_bet(id)?)?;
        }
        Ok(summary)
    }

    /// Refund everything, pending and matched, staked on `game`.
    pub fn return_bets(&mut self, game: &Uuid) -> Result<SettlementSummary, BettingError> {
        let mut summary = self.return_pending_bets(game)?;
        summary.absorb(self.return_matched_bets(game)?)?;
        Ok(summary)
    }

    /// Refund every bet of `game` placed on one of `markets`.
    pub fn return_bets_on_markets(
        &mut self,
        game: &Uuid,
        markets: &BTreeSet<Market>,
    ) -> Result<SettlementSummary, BettingError> {
        let mut summary =
            self.cancel_pending_where(game, |_, wincase| markets.contains(&wincase.market()))?;
        for id in self.matched.ids_for_markets(game, markets) {
            summary.absorb(self.refund_matched_bet(id)?)?;
        }
        Ok(summary)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Pay out every matched bet of `game` against the posted `winners`.
    ///
    /// # Errors
    ///
    /// Invariant errors only: both sides winning, no winner on a market that
    /// cannot end in a draw, or a pot that does not cover the payout.
    pub fn resolve_matched_bets(
        &mut self,
        game: &Uuid,
        winners: &BTreeSet<Wincase>,
    ) -> Result<SettlementSummary, BettingError> {
        let mut summary = SettlementSummary::default();

        for id in self.matched.ids_for_game(game) {
            let bet = self.matched.get(id).cloned().ok_or(InvariantError::MissingRecord {
                kind: "matched bet",
                id: id.0,
            })?;
            let bet1_won = winners.contains(&bet.bet1.wincase);
            let bet2_won = winners.contains(&bet.bet2.wincase);

            let winner = match (bet1_won, bet2_won) {
                (true, true) => return Err(InvariantError::DoubleResolution(bet.market).into()),
                (true, false) => &bet.bet1,
                (false, true) => &bet.bet2,
                (false, false) if bet.market.has_draw_state() => {
                    summary.absorb(self.refund_matched_bet(id)?)?;
                    continue;
                }
                (false, false) => return Err(InvariantError::UnresolvedMarket(bet.market).into()),
            };

            let pot = bet.pot()?;
            let owed = calculate_potential_result(&winner.stake, &winner.odds)?;
            if owed.amount > pot.amount {
                return Err(InvariantError::PayoutExceedsPot {
                    bet: id.0,
                    payout: owed,
                    pot,
                }
                .into());
            }

            self.matched.remove(id)?;
            self.accounts.increase_balance(&winner.better, &pot)?;
            self.events.push(BettingEvent::BetResolved {
                game_uuid: bet.game_uuid,
                better: winner.better.clone(),
                bet_uuid: winner.bet_uuid,
                income: pot,
            });
            summary.absorb(SettlementSummary {
                paid: pot,
                records: 1,
                ..SettlementSummary::default()
            })?;
        }

        info!(
            game = %game,
            paid = %summary.paid,
            refunded = %summary.refunded,
            records = summary.records,
            "matched bets resolved"
        );
        Ok(summary)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
