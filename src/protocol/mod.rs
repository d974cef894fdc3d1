//! User operations accepted by the betting kernel.
//!
//! Each operation carries a `validate()` that checks everything that can be
//! checked without looking at state. The evaluator runs it first, then the
//! stateful checks, and only then mutates anything.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::error::ValidationError;
use crate::types::{Asset, GameKind, Market, Odds, Wincase, NATIVE_SYMBOL};

fn require_account(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyAccountName);
    }
    Ok(())
}

// ============================================================================
// Operations
// ============================================================================

/// Register a new game. Moderator only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGameOperation {
    pub moderator: String,
    pub uuid: Uuid,
    pub json_metadata: String,
    pub game: GameKind,
    pub start_time: u64,
    /// `None` uses the configured default.
    pub auto_resolve_delay_sec: Option<u64>,
    pub markets: Vec<Market>,
}

impl CreateGameOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.moderator)?;
        if self.markets.is_empty() {
            return Err(ValidationError::EmptyMarkets);
        }
        Ok(())
    }
}

/// Place a bet and match it against the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostBetOperation {
    pub better: String,
    pub game_uuid: Uuid,
    pub uuid: Uuid,
    pub wincase: Wincase,
    pub odds: Odds,
    pub stake: Asset,
    /// Live bets stay open after the game starts.
    pub live: bool,
}

impl PostBetOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.better)?;
        if self.stake.symbol != NATIVE_SYMBOL {
            return Err(ValidationError::SymbolMismatch {
                expected: NATIVE_SYMBOL,
                actual: self.stake.symbol,
            });
        }
        Ok(())
    }
}

/// Withdraw pending bets and refund their rest stakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelPendingBetsOperation {
    pub better: String,
    pub bet_uuids: Vec<Uuid>,
}

impl CancelPendingBetsOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.better)?;
        if self.bet_uuids.is_empty() {
            return Err(ValidationError::EmptyBetList);
        }
        let mut seen = BTreeSet::new();
        for uuid in &self.bet_uuids {
            if !seen.insert(*uuid) {
                return Err(ValidationError::DuplicateUuid(*uuid));
            }
        }
        Ok(())
    }
}

/// Cancel a game and refund every bet on it. Moderator only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelGameOperation {
    pub moderator: String,
    pub uuid: Uuid,
}

impl CancelGameOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.moderator)
    }
}

/// Post the winning wincases of a started game. Moderator only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostGameResultsOperation {
    pub moderator: String,
    pub uuid: Uuid,
    pub wincases: Vec<Wincase>,
}

impl PostGameResultsOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.moderator)
    }
}

/// Move the start time of a game that has not started. Moderator only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGameStartTimeOperation {
    pub moderator: String,
    pub uuid: Uuid,
    pub start_time: u64,
}

impl UpdateGameStartTimeOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.moderator)
    }
}

/// Replace the markets of a game that has not started. Moderator only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGameMarketsOperation {
    pub moderator: String,
    pub uuid: Uuid,
    pub markets: Vec<Market>,
}

impl UpdateGameMarketsOperation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_account(&self.moderator)?;
        if self.markets.is_empty() {
            return Err(ValidationError::EmptyMarkets);
        }
        Ok(())
    }
}

// ============================================================================
// Operation enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateGame(CreateGameOperation),
    PostBet(PostBetOperation),
    CancelPendingBets(CancelPendingBetsOperation),
    CancelGame(CancelGameOperation),
    PostGameResults(PostGameResultsOperation),
    UpdateGameStartTime(UpdateGameStartTimeOperation),
    UpdateGameMarkets(UpdateGameMarketsOperation),
}

impl Operation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateGame(_) => "create_game",
            Operation::PostBet(_) => "post_bet",
            Operation::CancelPendingBets(_) => "cancel_pending_bets",
            Operation::CancelGame(_) => "cancel_game",
            Operation::PostGameResults(_) => "post_game_results",
            Operation::UpdateGameStartTime(_) => "update_game_start_time",
            Operation::UpdateGameMarkets(_) => "update_game_markets",
        }
    }

    /// Stateless checks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Operation::CreateGame(op) => op.validate(),
            Operation::PostBet(op) => op.validate(),
            Operation::CancelPendingBets(op) => op.validate(),
            Operation::CancelGame(op) => op.validate(),
            Operation::PostGameResults(op) => op.validate(),
            Operation::UpdateGameStartTime(op) => op.validate(),
            Operation::UpdateGameMarkets(op) => op.validate(),
        }
    }
}

macro_rules! impl_from_operation {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    Operation::$variant(op)
                }
            }
        )*
    };
}

impl_from_operation! {
    CreateGame => CreateGameOperation,
    PostBet => PostBetOperation,
    CancelPendingBets => CancelPendingBetsOperation,
    CancelGame => CancelGameOperation,
    PostGameResults => PostGameResultsOperation,
    UpdateGameStartTime => UpdateGameStartTimeOperation,
    UpdateGameMarkets => UpdateGameMarketsOperation,
}
