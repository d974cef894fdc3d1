//! Operation evaluator: stateful checks and effects of user operations.
//!
//! ## Ordering
//!
//! Every operation runs its checks first and mutates afterwards. A
//! [`ValidationError`] therefore never leaves partial effects behind and the
//! block applier can simply skip the offending operation. Anything that goes
//! wrong after the first mutation is an [`InvariantError`] and aborts the
//! block.

use tracing::debug;

use crate::config::BettingRules;
use crate::engine::matcher::BettingMatcher;
use crate::engine::registry::{validate_markets, validate_winners, GameRegistry, NewGame};
use crate::engine::settlement::SettlementEngine;
use crate::error::{BettingError, ValidationError};
use crate::ledger::{AccountService, EventSink};
use crate::protocol::{
    CancelGameOperation, CancelPendingBetsOperation, CreateGameOperation, Operation,
    PostBetOperation, PostGameResultsOperation, UpdateGameMarketsOperation,
    UpdateGameStartTimeOperation,
};
use crate::store::BettingState;
use crate::types::{GameStatus, PendingBet, PendingBetKind};

/// What an applied operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationOutcome {
    /// Matched bets created by the operation.
    pub bets_matched: u64,
}

/// Applies operations to the betting state at a fixed head block time.
pub struct OperationEvaluator<'a> {
    state: &'a mut BettingState,
    accounts: &'a mut dyn AccountService,
    events: &'a mut dyn EventSink,
    rules: &'a BettingRules,
}

impl<'a> OperationEvaluator<'a> {
    pub fn new(
        state: &'a mut BettingState,
        accounts: &'a mut dyn AccountService,
        events: &'a mut dyn EventSink,
        rules: &'a BettingRules,
    ) -> Self {
        Self {
            state,
            accounts,
            events,
            rules,
        }
    }

    fn registry(&mut self) -> GameRegistry<'_> {
        GameRegistry::new(&mut self.state.games, &mut *self.events, self.rules)
    }

    fn settlement(&mut self) -> SettlementEngine<'_> {
        SettlementEngine::new(
            &mut self.state.pending,
            &mut self.state.matched,
            &mut *self.accounts,
            &mut *self.events,
        )
    }

    /// Validate and apply `op` at head block time `now`.
    pub fn apply(&mut self, op: &Operation, now: u64) -> Result<OperationOutcome, BettingError> {
        op.validate()?;
        debug!(operation = op.name(), now, "applying operation");
        match op {
            Operation::CreateGame(op) => self.create_game(op, now),
            Operation::PostBet(op) => self.post_bet(op, now),
            Operation::CancelPendingBets(op) => self.cancel_pending_bets(op),
            Operation::CancelGame(op) => self.cancel_game(op, now),
            Operation::PostGameResults(op) => self.post_game_results(op, now),
            Operation::UpdateGameStartTime(op) => self.update_game_start_time(op, now),
            Operation::UpdateGameMarkets(op) => self.update_game_markets(op, now),
        }
    }

    // ========================================================================
    // Games
    // ========================================================================

    fn create_game(&mut self, op: &CreateGameOperation, now: u64) -> Result<OperationOutcome, BettingError> {
        self.registry().create_game(
            NewGame {
                uuid: op.uuid,
                moderator: op.moderator.clone(),
                json_metadata: op.json_metadata.clone(),
                kind: op.game,
                start_time: op.start_time,
                auto_resolve_delay_sec: op.auto_resolve_delay_sec,
                markets: op.markets.clone(),
            },
            now,
        )?;
        Ok(OperationOutcome::default())
    }

    fn cancel_game(&mut self, op: &CancelGameOperation, now: u64) -> Result<OperationOutcome, BettingError> {
        self.registry().require_moderator(&op.moderator)?;
        let game = self
            .state
            .games
            .get_by_uuid(&op.uuid)
            .ok_or(ValidationError::UnknownGame(op.uuid))?;
        match game.status {
            GameStatus::Created | GameStatus::Started => {}
            GameStatus::Finished if !game.settled => {
                return Err(BettingError::NotImplemented(
                    "cancelling a finished game awaiting settlement",
                ))
            }
            status => {
                return Err(ValidationError::InvalidGameStatus {
                    game: op.uuid,
                    status,
                    expected: "created or started",
                }
                .into())
            }
        }

        self.settlement().return_bets(&op.uuid)?;
        self.registry().set_status(&op.uuid, GameStatus::Cancelled, now)?;
        Ok(OperationOutcome::default())
    }

    fn post_game_results(
        &mut self,
        op: &PostGameResultsOperation,
        now: u64,
    ) -> Result<OperationOutcome, BettingError> {
        self.registry().require_moderator(&op.moderator)?;
        let game = self
            .state
            .games
            .get_by_uuid(&op.uuid)
            .ok_or(ValidationError::UnknownGame(op.uuid))?;
        match game.status {
            GameStatus::Started => {}
            GameStatus::Finished => {
                return Err(BettingError::NotImplemented("re-posting results of a finished game"))
            }
            status => {
                return Err(ValidationError::InvalidGameStatus {
                    game: op.uuid,
                    status,
                    expected: "started",
                }
                .into())
            }
        }
        if now < game.start_time {
            return Err(ValidationError::ResultsBeforeStart {
                game: op.uuid,
                start_time: game.start_time,
            }
            .into());
        }
        if now >= game.auto_resolve_time {
            return Err(ValidationError::ResultsAfterDeadline {
                game: op.uuid,
                auto_resolve_time: game.auto_resolve_time,
            }
            .into());
        }
        let winners = validate_winners(game, &op.wincases)?;

        self.settlement().return_pending_bets(&op.uuid)?;
        self.registry().finish_game(&op.uuid, winners, now)?;
        Ok(OperationOutcome::default())
    }

    fn update_game_start_time(
        &mut self,
        op: &UpdateGameStartTimeOperation,
        now: u64,
    ) -> Result<OperationOutcome, BettingError> {
        let mut registry = self.registry();
        registry.require_moderator(&op.moderator)?;
        registry.update_start_time(&op.uuid, op.start_time, now)?;
        Ok(OperationOutcome::default())
    }

    fn update_game_markets(
        &mut self,
        op: &UpdateGameMarketsOperation,
        now: u64,
    ) -> Result<OperationOutcome, BettingError> {
        let kind = {
            let registry = self.registry();
            registry.require_moderator(&op.moderator)?;
            registry.created_game(&op.uuid)?.kind
        };
        let markets = validate_markets(kind, &op.markets)?;

        let removed = self.registry().update_markets(&op.uuid, markets, now)?;
        if !removed.is_empty() {
            self.settlement().return_bets_on_markets(&op.uuid, &removed)?;
        }
        Ok(OperationOutcome::default())
    }

    // ========================================================================
    // Bets
    // ========================================================================

    fn post_bet(&mut self, op: &PostBetOperation, now: u64) -> Result<OperationOutcome, BettingError> {
        let game = self
            .state
            .games
            .get_by_uuid(&op.game_uuid)
            .ok_or(ValidationError::UnknownGame(op.game_uuid))?;
        if game.status.is_terminal() {
            return Err(ValidationError::InvalidGameStatus {
                game: op.game_uuid,
                status: game.status,
                expected: "created or started",
            }
            .into());
        }
        // the expiry hook runs after the block's operations
        if now >= game.auto_resolve_time {
            return Err(ValidationError::BetAfterDeadline {
                game: op.game_uuid,
                auto_resolve_time: game.auto_resolve_time,
            }
            .into());
        }
        if !op.live && game.status == GameStatus::Started {
            return Err(ValidationError::NonLiveBetAfterStart(op.game_uuid).into());
        }
        if !game.has_wincase(&op.wincase) {
            return Err(ValidationError::WincaseNotInGame(op.wincase).into());
        }

        let rules = self.rules;
        if op.odds.cmp_value(&rules.min_odds).is_lt() || op.odds.cmp_value(&rules.max_odds).is_gt() {
            return Err(ValidationError::OddsOutOfRange {
                odds: op.odds,
                min: rules.min_odds,
                max: rules.max_odds,
            }
            .into());
        }
        if op.stake.amount < rules.min_bet_stake.amount {
            return Err(ValidationError::StakeTooSmall {
                stake: op.stake,
                min: rules.min_bet_stake,
            }
            .into());
        }
        if op.stake.amount > rules.max_bet_stake.amount {
            return Err(ValidationError::StakeTooLarge {
                stake: op.stake,
                max: rules.max_bet_stake,
            }
            .into());
        }
        if self.state.bet_uuids.contains(&op.uuid) {
            return Err(ValidationError::DuplicateUuid(op.uuid).into());
        }

        // The debit is the last check: it either fails untouched or succeeds.
        self.accounts.decrease_balance(&op.better, &op.stake)?;

        let kind = if op.live {
            PendingBetKind::Live
        } else {
            PendingBetKind::NonLive
        };
        let id = self.state.pending.insert(PendingBet::new(
            op.uuid,
            op.game_uuid,
            op.better.clone(),
            op.wincase,
            op.odds,
            op.stake,
            kind,
            now,
        ))?;
        self.state.bet_uuids.insert(op.uuid);

        let result = BettingMatcher::new(
            &mut self.state.pending,
            &mut self.state.matched,
            &mut *self.events,
        )
        .match_bet(id, now)?;

        Ok(OperationOutcome {
            bets_matched: result.matched.len() as u64,
        })
    }

    fn cancel_pending_bets(&mut self, op: &CancelPendingBetsOperation) -> Result<OperationOutcome, BettingError> {
        let mut ids = Vec::with_capacity(op.bet_uuids.len());
        for uuid in &op.bet_uuids {
            let bet = self
                .state
                .pending
                .get_by_uuid(uuid)
                .ok_or(ValidationError::UnknownBet(*uuid))?;
            if bet.better != op.better {
                return Err(ValidationError::NotBetOwner {
                    bet: *uuid,
                    better: op.better.clone(),
                }
                .into());
            }
            ids.push(bet.id);
        }

        let mut settlement = self.settlement();
        for id in ids {
            settlement.cancel_pending_bet(id)?;
        }
        Ok(OperationOutcome::default())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
