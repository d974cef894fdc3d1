//! Betting engine: matching, game lifecycle, settlement and block hooks.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same operations in the same blocks always give the
//!    same state root
//! 2. **Exact Arithmetic**: odds are fractions, stakes are integers, results
//!    truncate toward zero
//! 3. **Serial Execution**: one block at a time, one operation at a time
//! 4. **Oldest First**: resting bets are matched in ascending id order
//!
//! ## Components
//!
//! - [`math`]: payout and matched stake arithmetic
//! - [`matcher`]: pairs an incoming bet with complementary resting bets
//! - [`registry`]: game creation and status transitions
//! - [`settlement`]: refunds and payouts
//! - [`evaluator`]: applies user operations
//! - [`scheduler`]: startup, expiry and resolve hooks run every block
//!
//! ## Example
//!
//! ```
//! use hyperbet::engine::math::calculate_matched_stake;
//! use hyperbet::types::{Asset, Odds};
//!
//! let split = calculate_matched_stake(
//!     &Asset::native(1_000_000_000),
//!     &Asset::native(2_000_000_000),
//!     &Odds::new(10, 1).unwrap(),
//!     &Odds::new(10, 9).unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(split.bet1_matched, Asset::native(222_222_222));
//! assert_eq!(split.bet2_matched, Asset::native(2_000_000_000));
//! ```

pub mod evaluator;
pub mod math;
pub mod matcher;
pub mod registry;
pub mod scheduler;
pub mod settlement;

pub use evaluator::{OperationEvaluator, OperationOutcome};
pub use matcher::{BettingMatcher, MatchResult};
pub use registry::{GameRegistry, NewGame};
pub use scheduler::{BetsResolveTask, BlockTask, Cadence, GameExpiryTask, GameStartupTask, Scheduler, TaskContext};
pub use settlement::{SettlementEngine, SettlementSummary};
