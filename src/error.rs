//! Error types for the betting kernel.
//!
//! ## Taxonomy
//!
//! - [`ValidationError`]: bad input from a single operation. The operation is
//!   rejected before any state is touched and the block carries on.
//! - [`InvariantError`]: a broken engine invariant. The whole block is rolled
//!   back; this is a node-level fault, never a user error.
//! - [`BettingError::NotImplemented`]: a business path that is not supported
//!   yet. It fails closed so that stake is never created or destroyed.

use thiserror::Error;
use uuid::Uuid;

use crate::types::{Asset, GameKind, GameStatus, Market, Odds, Symbol, Wincase};

/// Errors raised while validating a user operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("account '{account}' is not the betting moderator")]
    NotModerator { account: String },

    #[error("account name cannot be empty")]
    EmptyAccountName,

    #[error("game {0} does not exist")]
    UnknownGame(Uuid),

    #[error("pending bet {0} does not exist")]
    UnknownBet(Uuid),

    #[error("uuid {0} has already been used")]
    DuplicateUuid(Uuid),

    #[error("bet {bet} is not owned by '{better}'")]
    NotBetOwner { bet: Uuid, better: String },

    #[error("bet list cannot be empty")]
    EmptyBetList,

    #[error("invalid fraction {numerator}/{denominator}: {reason}")]
    InvalidFraction {
        numerator: u64,
        denominator: u64,
        reason: &'static str,
    },

    #[error("invalid odds {numerator}/{denominator}: {reason}")]
    InvalidOdds {
        numerator: u32,
        denominator: u32,
        reason: &'static str,
    },

    #[error("odds {odds} are outside of the allowed range [{min}, {max}]")]
    OddsOutOfRange { odds: Odds, min: Odds, max: Odds },

    #[error("asset symbol mismatch: expected {expected}, got {actual}")]
    SymbolMismatch { expected: Symbol, actual: Symbol },

    #[error("stake {stake} is below the minimum {min}")]
    StakeTooSmall { stake: Asset, min: Asset },

    #[error("stake {stake} is above the maximum {max}")]
    StakeTooLarge { stake: Asset, max: Asset },

    #[error("insufficient funds: '{account}' holds {balance}, needs {required}")]
    InsufficientFunds {
        account: String,
        balance: Asset,
        required: Asset,
    },

    #[error("start time {start_time} must be after head block time {now}")]
    StartTimeNotInFuture { start_time: u64, now: u64 },

    #[error("start time shift of {shift}s exceeds the maximum of {max}s")]
    StartTimeShiftTooLarge { shift: u64, max: u64 },

    #[error("auto resolve delay {delay}s must be within [1, {max}]")]
    AutoResolveDelayOutOfRange { delay: u64, max: u64 },

    #[error("game {game} is {status}, expected {expected}")]
    InvalidGameStatus {
        game: Uuid,
        status: GameStatus,
        expected: &'static str,
    },

    #[error("markets list cannot be empty")]
    EmptyMarkets,

    #[error("market {0} is listed more than once")]
    DuplicateMarket(Market),

    #[error("market {market} cannot be used with {kind} games")]
    MarketNotAllowed { market: Market, kind: GameKind },

    #[error("wincase {0} does not belong to the game markets")]
    WincaseNotInGame(Wincase),

    #[error("winners contain neither {0} nor {1}")]
    MissingWinner(Wincase, Wincase),

    #[error("winners contain both {0} and its opposite")]
    OppositeWinners(Wincase),

    #[error("non-live bets cannot be posted after game {0} has started")]
    NonLiveBetAfterStart(Uuid),

    #[error("results for game {game} cannot be posted before its start time {start_time}")]
    ResultsBeforeStart { game: Uuid, start_time: u64 },

    #[error("results for game {game} cannot be posted after its auto resolve time {auto_resolve_time}")]
    ResultsAfterDeadline { game: Uuid, auto_resolve_time: u64 },

    #[error("bets on game {game} cannot be posted after its auto resolve time {auto_resolve_time}")]
    BetAfterDeadline { game: Uuid, auto_resolve_time: u64 },

    #[error("malformed {what}: '{input}'")]
    Malformed { what: &'static str, input: String },
}

/// Broken engine invariants. Any of these aborts the block being applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("arithmetic underflow in {0}")]
    Underflow(&'static str),

    #[error("asset symbol mismatch: {0} vs {1}")]
    SymbolMismatch(Symbol, Symbol),

    #[error("odds {0} and {1} are not complementary")]
    NonComplementaryOdds(Odds, Odds),

    #[error("non-positive potential gain: {gain1} and {gain2}")]
    NonPositiveGain { gain1: Asset, gain2: Asset },

    #[error("cannot fill {amount} from bet {bet} holding {rest}")]
    Overfill { bet: u64, amount: Asset, rest: Asset },

    #[error("zero matched stake between bets {bet1} and {bet2}")]
    EmptyMatch { bet1: u64, bet2: u64 },

    #[error("bets {bet1} and {bet2} cannot be paired")]
    IncompatibleBets { bet1: u64, bet2: u64 },

    #[error("payout {payout} exceeds the pot {pot} of matched bet {bet}")]
    PayoutExceedsPot { bet: u64, payout: Asset, pot: Asset },

    #[error("market {0} has both wincases among the winners")]
    DoubleResolution(Market),

    #[error("market {0} has no winner and cannot end in a draw")]
    UnresolvedMarket(Market),

    #[error("illegal game status transition {from} -> {to}")]
    IllegalTransition { from: GameStatus, to: GameStatus },

    #[error("{kind} {id} is missing from the store")]
    MissingRecord { kind: &'static str, id: u64 },

    #[error("{kind} {id} already exists in the store")]
    DuplicateRecord { kind: &'static str, id: u64 },

    #[error("state encoding failed: {0}")]
    Encoding(String),
}

/// Top-level error returned by operations and scheduler tasks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BettingError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl BettingError {
    /// Fatal errors abort the whole block instead of a single operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BettingError::Invariant(_))
    }
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, BettingError>;

/// Errors raised by the block applier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    #[error("expected block {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },

    #[error("block timestamp {timestamp} is before head block time {head}")]
    TimeWentBackwards { timestamp: u64, head: u64 },

    #[error("block {number} aborted: {source}")]
    Aborted {
        number: u64,
        #[source]
        source: BettingError,
    },
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invariants_are_fatal() {
        let validation: BettingError = ValidationError::EmptyMarkets.into();
        let invariant: BettingError = InvariantError::Overflow("test").into();
        let unsupported = BettingError::NotImplemented("disputes");

        assert!(!validation.is_fatal());
        assert!(invariant.is_fatal());
        assert!(!unsupported.is_fatal());
    }

    #[test]
    fn test_messages_are_descriptive() {
        let err = ValidationError::NotModerator {
            account: "alice".into(),
        };
        assert_eq!(err.to_string(), "account 'alice' is not the betting moderator");

        let err: BettingError = InvariantError::Underflow("rest stake").into();
        assert_eq!(
            err.to_string(),
            "invariant violated: arithmetic underflow in rest stake"
        );
    }
}
