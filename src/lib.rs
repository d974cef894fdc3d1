//! # hyperbet
//!
//! Peer-to-peer betting exchange embedded in a block-applying ledger.
//!
//! ## Architecture
//!
//! The kernel consists of:
//! - **Types**: odds, stakes, markets, games and bets
//! - **Store**: game registry plus the pending and matched bet books
//! - **Engine**: matching, settlement, game lifecycle and block hooks
//! - **Protocol**: user operations and their stateless checks
//! - **Chain**: block applier with per-block rollback
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical blocks give identical state roots on every node
//! 2. **No Floating Point**: odds are exact fractions, stakes are integers
//! 3. **Conservation**: every unit staked is paid out or refunded exactly once
//! 4. **Fail Closed**: unsupported paths reject instead of guessing

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: odds, assets, markets, games, bets, events
pub mod types;

/// Entity stores and the state root
pub mod store;

/// Matching, settlement, registry, evaluator and scheduler
pub mod engine;

/// User operations
pub mod protocol;

/// Block applier
pub mod chain;

/// Account and event collaborators
pub mod ledger;

/// Configuration and logging setup
pub mod config;

/// Error taxonomy
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use chain::{AppliedBlock, BettingChain, Block, Rejection};
pub use config::{BettingConfig, BettingRules, HyperbetConfig, LoggingConfig};
pub use engine::{BettingMatcher, MatchResult, OperationEvaluator, Scheduler, SettlementEngine};
pub use error::{BettingError, BlockError, ConfigError, InvariantError, ValidationError};
pub use protocol::Operation;
pub use store::BettingState;
pub use types::{Asset, BettingEvent, BlockReceipt, Game, GameStatus, Market, Odds, Wincase};
