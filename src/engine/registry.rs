//! Game registry: creation, validation and status transitions of games.
//!
//! The registry only touches game records. Moving stake in or out of the
//! books is the settlement engine's job; the evaluator sequences the two.

use std::collections::BTreeSet;

use tracing::info;
use uuid::Uuid;

use crate::config::BettingRules;
use crate::error::{BettingError, InvariantError, ValidationError};
use crate::ledger::EventSink;
use crate::store::GameStore;
use crate::types::{BettingEvent, Game, GameId, GameKind, GameStatus, Market, Wincase};

// ============================================================================
// Stateless validation
// ============================================================================

/// Check a market list for a game kind and return it as a set.
pub fn validate_markets(kind: GameKind, markets: &[Market]) -> Result<BTreeSet<Market>, ValidationError> {
    if markets.is_empty() {
        return Err(ValidationError::EmptyMarkets);
    }
    let mut set = BTreeSet::new();
    for market in markets {
        if !kind.allows(market) {
            return Err(ValidationError::MarketNotAllowed {
                market: *market,
                kind,
            });
        }
        if !set.insert(*market) {
            return Err(ValidationError::DuplicateMarket(*market));
        }
    }
    Ok(set)
}

/// Check posted results against a game's markets.
///
/// Every winner must belong to one of the markets, no market may list both
/// wincases, and every market that cannot end in a draw needs a winner.
/// An empty list is valid when every market of the game drew.
pub fn validate_winners(game: &Game, winners: &[Wincase]) -> Result<BTreeSet<Wincase>, ValidationError> {
    let set: BTreeSet<Wincase> = winners.iter().copied().collect();
    for wincase in &set {
        if !game.has_wincase(wincase) {
            return Err(ValidationError::WincaseNotInGame(*wincase));
        }
        if set.contains(&wincase.opposite()) {
            return Err(ValidationError::OppositeWinners(*wincase));
        }
    }
    for market in &game.markets {
        let (positive, negative) = market.wincases();
        if !market.has_draw_state() && !set.contains(&positive) && !set.contains(&negative) {
            return Err(ValidationError::MissingWinner(positive, negative));
        }
    }
    Ok(set)
}

// ============================================================================
// Registry
// ============================================================================

/// New game parameters after stateless checks.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub uuid: Uuid,
    pub moderator: String,
    pub json_metadata: String,
    pub kind: GameKind,
    pub start_time: u64,
    pub auto_resolve_delay_sec: Option<u64>,
    pub markets: Vec<Market>,
}

pub struct GameRegistry<'a> {
    games: &'a mut GameStore,
    events: &'a mut dyn EventSink,
    rules: &'a BettingRules,
}

impl<'a> GameRegistry<'a> {
    pub fn new(games: &'a mut GameStore, events: &'a mut dyn EventSink, rules: &'a BettingRules) -> Self {
        Self {
            games,
            events,
            rules,
        }
    }

    pub fn require_moderator(&self, account: &str) -> Result<(), ValidationError> {
        if !self.rules.is_moderator(account) {
            return Err(ValidationError::NotModerator {
                account: account.to_string(),
            });
        }
        Ok(())
    }

    pub fn game(&self, uuid: &Uuid) -> Result<&Game, ValidationError> {
        self.games
            .get_by_uuid(uuid)
            .ok_or(ValidationError::UnknownGame(*uuid))
    }

    /// Fetch a game that has not reached a terminal status.
    pub fn open_game(&self, uuid: &Uuid) -> Result<&Game, ValidationError> {
        let game = self.game(uuid)?;
        if game.status.is_terminal() {
            return Err(ValidationError::InvalidGameStatus {
                game: *uuid,
                status: game.status,
                expected: "created or started",
            });
        }
        Ok(game)
    }

    /// Fetch a game that has not started yet.
    pub fn created_game(&self, uuid: &Uuid) -> Result<&Game, ValidationError> {
        let game = self.game(uuid)?;
        if game.status != GameStatus::Created {
            return Err(ValidationError::InvalidGameStatus {
                game: *uuid,
                status: game.status,
                expected: "created",
            });
        }
        Ok(game)
    }

    fn game_mut(&mut self, uuid: &Uuid) -> Result<&mut Game, InvariantError> {
        self.games
            .get_by_uuid_mut(uuid)
            .ok_or(InvariantError::MissingRecord { kind: "game", id: 0 })
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Validate and register a new game.
    pub fn create_game(&mut self, new: NewGame, now: u64) -> Result<GameId, BettingError> {
        self.require_moderator(&new.moderator)?;
        if self.games.contains_uuid(&new.uuid) {
            return Err(ValidationError::DuplicateUuid(new.uuid).into());
        }
        if new.start_time <= now {
            return Err(ValidationError::StartTimeNotInFuture {
                start_time: new.start_time,
                now,
            }
            .into());
        }
        let delay = new
            .auto_resolve_delay_sec
            .unwrap_or(self.rules.auto_resolve_delay_default_sec);
        if delay == 0 || delay > self.rules.auto_resolve_delay_max_sec {
            return Err(ValidationError::AutoResolveDelayOutOfRange {
                delay,
                max: self.rules.auto_resolve_delay_max_sec,
            }
            .into());
        }
        let markets = validate_markets(new.kind, &new.markets)?;

        let game = Game::new(
            new.uuid,
            new.moderator,
            new.json_metadata,
            new.kind,
            new.start_time,
            delay,
            markets,
            now,
        );
        let id = self.games.insert(game)?;
        info!(game = %new.uuid, id = id.0, start_time = new.start_time, "game created");
        Ok(id)
    }

    /// Move a game to `next`, emitting a status change event.
    pub fn set_status(&mut self, uuid: &Uuid, next: GameStatus, now: u64) -> Result<GameStatus, BettingError> {
        let old = self.game_mut(uuid)?.transition(next, now)?;
        info!(game = %uuid, from = %old, to = %next, "game status changed");
        self.events.push(BettingEvent::GameStatusChanged {
            game_uuid: *uuid,
            old_status: old,
            new_status: next,
        });
        Ok(old)
    }

    /// Record results and schedule resolution `resolve_delay_sec` from now.
    pub fn finish_game(
        &mut self,
        uuid: &Uuid,
        winners: BTreeSet<Wincase>,
        now: u64,
    ) -> Result<(), BettingError> {
        let resolve_at = now.saturating_add(self.rules.resolve_delay_sec);
        {
            let game = self.game_mut(uuid)?;
            game.results = winners;
            game.bets_resolve_time = Some(resolve_at);
        }
        self.set_status(uuid, GameStatus::Finished, now)?;
        Ok(())
    }

    /// Move the start time, keeping the auto resolve delay unchanged.
    pub fn update_start_time(&mut self, uuid: &Uuid, start_time: u64, now: u64) -> Result<(), BettingError> {
        let max_shift = self.rules.max_start_time_shift_sec;
        let game = self.created_game(uuid)?;
        if start_time <= now {
            return Err(ValidationError::StartTimeNotInFuture { start_time, now }.into());
        }
        let shift = start_time.abs_diff(game.start_time);
        if shift > max_shift {
            return Err(ValidationError::StartTimeShiftTooLarge {
                shift,
                max: max_shift,
            }
            .into());
        }

        let game = self.game_mut(uuid)?;
        let delay = game.auto_resolve_time.saturating_sub(game.start_time);
        game.start_time = start_time;
        game.auto_resolve_time = start_time.saturating_add(delay);
        game.last_update = now;
        info!(game = %uuid, start_time, "game start time updated");
        Ok(())
    }

    /// Replace the market list.
    ///
    /// # Returns
    ///
    /// Markets that were dropped; bets on them must be refunded.
    pub fn update_markets(
        &mut self,
        uuid: &Uuid,
        markets: BTreeSet<Market>,
        now: u64,
    ) -> Result<BTreeSet<Market>, BettingError> {
        let game = self.game_mut(uuid)?;
        let removed: BTreeSet<Market> = game.markets.difference(&markets).copied().collect();
        game.markets = markets;
        game.last_update = now;
        info!(game = %uuid, removed = removed.len(), "game markets updated");
        Ok(removed)
    }

    pub fn mark_settled(&mut self, uuid: &Uuid) -> Result<(), BettingError> {
        let game = self.game_mut(uuid)?;
        if game.status != GameStatus::Finished || game.settled {
            return Err(InvariantError::IllegalTransition {
                from: game.status,
                to: GameStatus::Finished,
            }
            .into());
        }
        game.settled = true;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
