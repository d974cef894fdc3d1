//! Notifications emitted while operations and scheduled tasks run.
//!
//! Events are informational; the authoritative state is the store. They are
//! collected per block and handed back to the caller with the receipt.

use uuid::Uuid;

use crate::types::asset::Asset;
use crate::types::game::GameStatus;
use crate::types::wincase::Market;

/// Which book a cancelled bet was refunded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetCancelledKind {
    Pending,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BettingEvent {
    GameStatusChanged {
        game_uuid: Uuid,
        old_status: GameStatus,
        new_status: GameStatus,
    },
    BetsMatched {
        game_uuid: Uuid,
        market: Market,
        bet1_uuid: Uuid,
        bet2_uuid: Uuid,
        bet1_matched: Asset,
        bet2_matched: Asset,
        matched_bet_id: u64,
    },
    BetCancelled {
        game_uuid: Uuid,
        better: String,
        bet_uuid: Uuid,
        stake: Asset,
        kind: BetCancelledKind,
    },
    BetResolved {
        game_uuid: Uuid,
        better: String,
        bet_uuid: Uuid,
        income: Asset,
    },
}

impl BettingEvent {
    /// Game the event belongs to.
    pub fn game_uuid(&self) -> Uuid {
        match self {
            BettingEvent::GameStatusChanged { game_uuid, .. }
            | BettingEvent::BetsMatched { game_uuid, .. }
            | BettingEvent::BetCancelled { game_uuid, .. }
            | BettingEvent::BetResolved { game_uuid, .. } => *game_uuid,
        }
    }
}
