//! SSZ records for the betting state.
//!
//! ## SSZ Serialization
//!
//! The in-memory types carry strings, sets and uuids. The state root is
//! computed over these flat, fixed-size records instead, so that every node
//! hashes exactly the same bytes:
//!
//! - uuids are split into two u64 halves (`*_hi`, `*_lo`)
//! - account names become their SHA-256 digest
//! - markets and wincases use their `code()`
//! - market/result sets of a game are folded into one digest each
//! - enums are stored as u8

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;
use uuid::Uuid;

use crate::types::bet::{MatchedBet, MatchedSide, PendingBet};
use crate::types::game::Game;

/// SHA-256 of an account name.
pub fn account_digest(name: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.finalize().into()
}

/// `(high, low)` halves of a uuid.
pub fn split_uuid(uuid: &Uuid) -> (u64, u64) {
    let value = uuid.as_u128();
    ((value >> 64) as u64, value as u64)
}

fn codes_digest(codes: impl Iterator<Item = u64>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for code in codes {
        hasher.update(code.to_le_bytes());
    }
    hasher.finalize().into()
}

// ============================================================================
// GameRecord
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct GameRecord {
    pub id: u64,
    pub uuid_hi: u64,
    pub uuid_lo: u64,
    pub moderator: [u8; 32],
    pub kind_raw: u8,
    pub status_raw: u8,
    pub start_time: u64,
    pub auto_resolve_time: u64,
    /// Zero until results are posted.
    pub bets_resolve_time: u64,
    pub settled: bool,
    pub markets_digest: [u8; 32],
    pub results_digest: [u8; 32],
}

impl From<&Game> for GameRecord {
    fn from(game: &Game) -> Self {
        let (uuid_hi, uuid_lo) = split_uuid(&game.uuid);
        Self {
            id: game.id.0,
            uuid_hi,
            uuid_lo,
            moderator: account_digest(&game.moderator),
            kind_raw: game.kind.to_u8(),
            status_raw: game.status.to_u8(),
            start_time: game.start_time,
            auto_resolve_time: game.auto_resolve_time,
            bets_resolve_time: game.bets_resolve_time.unwrap_or(0),
            settled: game.settled,
            markets_digest: codes_digest(game.markets.iter().map(|m| m.code())),
            results_digest: codes_digest(game.results.iter().map(|w| w.code())),
        }
    }
}

// ============================================================================
// PendingBetRecord
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct PendingBetRecord {
    pub id: u64,
    pub uuid_hi: u64,
    pub uuid_lo: u64,
    pub game_uuid_hi: u64,
    pub game_uuid_lo: u64,
    pub better: [u8; 32],
    pub wincase: u64,
    pub odds_numerator: u32,
    pub odds_denominator: u32,
    pub symbol_raw: u8,
    pub stake: u64,
    pub rest_stake: u64,
    pub kind_raw: u8,
    pub created: u64,
}

impl From<&PendingBet> for PendingBetRecord {
    fn from(bet: &PendingBet) -> Self {
        let (uuid_hi, uuid_lo) = split_uuid(&bet.uuid);
        let (game_uuid_hi, game_uuid_lo) = split_uuid(&bet.game_uuid);
        Self {
            id: bet.id.0,
            uuid_hi,
            uuid_lo,
            game_uuid_hi,
            game_uuid_lo,
            better: account_digest(&bet.better),
            wincase: bet.wincase.code(),
            odds_numerator: bet.odds.numerator(),
            odds_denominator: bet.odds.denominator(),
            symbol_raw: bet.stake.symbol.to_u8(),
            stake: bet.stake.amount,
            rest_stake: bet.rest_stake.amount,
            kind_raw: bet.kind.to_u8(),
            created: bet.created,
        }
    }
}

// ============================================================================
// MatchedBetRecord
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MatchedSideRecord {
    pub better: [u8; 32],
    pub bet_uuid_hi: u64,
    pub bet_uuid_lo: u64,
    pub wincase: u64,
    pub odds_numerator: u32,
    pub odds_denominator: u32,
    pub stake: u64,
    pub created: u64,
}

impl From<&MatchedSide> for MatchedSideRecord {
    fn from(side: &MatchedSide) -> Self {
        let (bet_uuid_hi, bet_uuid_lo) = split_uuid(&side.bet_uuid);
        Self {
            better: account_digest(&side.better),
            bet_uuid_hi,
            bet_uuid_lo,
            wincase: side.wincase.code(),
            odds_numerator: side.odds.numerator(),
            odds_denominator: side.odds.denominator(),
            stake: side.stake.amount,
            created: side.created,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct MatchedBetRecord {
    pub id: u64,
    pub game_uuid_hi: u64,
    pub game_uuid_lo: u64,
    pub market: u64,
    pub created: u64,
    pub bet1: MatchedSideRecord,
    pub bet2: MatchedSideRecord,
}

impl From<&MatchedBet> for MatchedBetRecord {
    fn from(bet: &MatchedBet) -> Self {
        let (game_uuid_hi, game_uuid_lo) = split_uuid(&bet.game_uuid);
        Self {
            id: bet.id.0,
            game_uuid_hi,
            game_uuid_lo,
            market: bet.market.code(),
            created: bet.created,
            bet1: (&bet.bet1).into(),
            bet2: (&bet.bet2).into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
