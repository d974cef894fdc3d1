//! Core data types for the betting kernel
//!
//! ## Types
//!
//! - [`Fraction`], [`Odds`]: exact rational arithmetic for prices
//! - [`Asset`], [`Symbol`]: fixed-point currency amounts (9 decimals)
//! - [`Market`], [`Wincase`]: what a bet is about
//! - [`Game`], [`GameStatus`], [`GameKind`]: the events bets are placed on
//! - [`PendingBet`], [`MatchedBet`]: the two books
//! - [`BettingEvent`]: notifications emitted by the engine
//! - [`BlockReceipt`]: per-block summary with the state root
//!
//! The `record` module holds the SSZ encodings hashed into the state root.

pub mod asset;
mod bet;
mod event;
pub mod fraction;
mod game;
mod odds;
mod receipt;
pub mod record;
pub mod wincase;

pub use asset::{Asset, Symbol, NATIVE_SYMBOL};
pub use bet::{BetId, MatchedBet, MatchedBetId, MatchedSide, PendingBet, PendingBetKind};
pub use event::{BetCancelledKind, BettingEvent};
pub use fraction::Fraction;
pub use game::{Game, GameId, GameKind, GameStatus};
pub use odds::Odds;
pub use receipt::BlockReceipt;
pub use wincase::{Market, MarketKind, Wincase};
