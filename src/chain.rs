//! Block applier: runs operations and scheduler hooks block by block.
//!
//! ## Block Processing
//!
//! 1. Check the block follows the head (next number, no time travel)
//! 2. Snapshot the betting state and the balances
//! 3. Apply each operation in order; validation failures are recorded as
//!    rejections and skipped
//! 4. Run the scheduler hooks
//! 5. Compute the state root and produce a [`BlockReceipt`]
//!
//! An invariant error at any step restores the snapshot: the block leaves
//! no trace and the head does not move.
//!
//! ## Example
//!
//! ```
//! use hyperbet::chain::{Block, BettingChain};
//! use hyperbet::config::BettingConfig;
//!
//! let rules = BettingConfig::default().rules().unwrap();
//! let mut chain = BettingChain::new(rules);
//!
//! let applied = chain.apply_block(Block::new(1, 1_000, vec![])).unwrap();
//! assert_eq!(applied.receipt.block_num, 1);
//! assert_eq!(chain.head_block_num(), 1);
//! ```

use tracing::{error, info, warn};

use crate::config::BettingRules;
use crate::engine::evaluator::OperationEvaluator;
use crate::engine::scheduler::{Scheduler, TaskContext};
use crate::error::{BettingError, BlockError, InvariantError};
use crate::ledger::{AccountService, Accounts};
use crate::protocol::Operation;
use crate::store::BettingState;
use crate::types::{Asset, BettingEvent, BlockReceipt};

/// A block of operations at a given time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub number: u64,
    /// Seconds.
    pub timestamp: u64,
    pub operations: Vec<Operation>,
}

impl Block {
    pub fn new(number: u64, timestamp: u64, operations: Vec<Operation>) -> Self {
        Self {
            number,
            timestamp,
            operations,
        }
    }
}

/// An operation skipped because it failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the operation in its block.
    pub index: usize,
    pub operation: &'static str,
    pub error: BettingError,
}

/// Result of a committed block.
#[derive(Debug, Clone)]
pub struct AppliedBlock {
    pub receipt: BlockReceipt,
    pub events: Vec<BettingEvent>,
    pub rejections: Vec<Rejection>,
}

/// In-memory betting ledger.
pub struct BettingChain {
    state: BettingState,
    accounts: Accounts,
    rules: BettingRules,
    scheduler: Scheduler,
    head_num: u64,
    head_time: u64,
}

impl BettingChain {
    pub fn new(rules: BettingRules) -> Self {
        let scheduler = Scheduler::new(&rules);
        Self::with_scheduler(rules, scheduler)
    }

    pub fn with_scheduler(rules: BettingRules, scheduler: Scheduler) -> Self {
        Self {
            state: BettingState::new(),
            accounts: Accounts::new(),
            rules,
            scheduler,
            head_num: 0,
            head_time: 0,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn state(&self) -> &BettingState {
        &self.state
    }

    #[inline]
    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    #[inline]
    pub fn rules(&self) -> &BettingRules {
        &self.rules
    }

    #[inline]
    pub fn head_block_num(&self) -> u64 {
        self.head_num
    }

    #[inline]
    pub fn head_block_time(&self) -> u64 {
        self.head_time
    }

    pub fn balance(&self, account: &str) -> Asset {
        self.accounts.balance(account)
    }

    /// Credit an account outside of any block, e.g. at genesis.
    pub fn fund(&mut self, account: &str, amount: Asset) -> Result<(), InvariantError> {
        self.accounts.increase_balance(account, &amount)
    }

    pub fn state_root(&self) -> Result<[u8; 32], InvariantError> {
        self.state.compute_state_root()
    }

    // ========================================================================
    // Block application
    // ========================================================================

    /// Apply `block` on top of the head.
    ///
    /// # Errors
    ///
    /// - [`BlockError::OutOfOrder`] / [`BlockError::TimeWentBackwards`] when
    ///   the block does not follow the head; nothing is touched.
    /// - [`BlockError::Aborted`] when an invariant broke; the state is
    ///   restored to what it was before the block.
    pub fn apply_block(&mut self, block: Block) -> Result<AppliedBlock, BlockError> {
        let expected = self.head_num + 1;
        if block.number != expected {
            return Err(BlockError::OutOfOrder {
                expected,
                actual: block.number,
            });
        }
        if block.timestamp < self.head_time {
            return Err(BlockError::TimeWentBackwards {
                timestamp: block.timestamp,
                head: self.head_time,
            });
        }

        let snapshot = (self.state.clone(), self.accounts.clone());
        match self.execute(&block) {
            Ok((applied, ran)) => {
                self.scheduler.commit(block.number, &ran);
                self.head_num = block.number;
                self.head_time = block.timestamp;
                info!(
                    block = block.number,
                    applied = applied.receipt.operations_applied,
                    rejected = applied.receipt.operations_rejected,
                    matched = applied.receipt.bets_matched,
                    state_root = %applied.receipt.state_root_hex(),
                    "block applied"
                );
                Ok(applied)
            }
            Err(source) => {
                (self.state, self.accounts) = snapshot;
                error!(block = block.number, error = %source, "block aborted, state rolled back");
                Err(BlockError::Aborted {
                    number: block.number,
                    source,
                })
            }
        }
    }

    fn execute(&mut self, block: &Block) -> Result<(AppliedBlock, Vec<usize>), BettingError> {
        let now = block.timestamp;
        let mut events: Vec<BettingEvent> = Vec::new();
        let mut rejections = Vec::new();
        let mut applied = 0u64;
        let mut matched = 0u64;

        for (index, op) in block.operations.iter().enumerate() {
            let result =
                OperationEvaluator::new(&mut self.state, &mut self.accounts, &mut events, &self.rules)
                    .apply(op, now);
            match result {
                Ok(outcome) => {
                    applied += 1;
                    matched += outcome.bets_matched;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(block = block.number, index, operation = op.name(), error = %err, "operation rejected");
                    rejections.push(Rejection {
                        index,
                        operation: op.name(),
                        error: err,
                    });
                }
            }
        }

        let ran = {
            let mut ctx = TaskContext {
                state: &mut self.state,
                accounts: &mut self.accounts,
                events: &mut events,
                rules: &self.rules,
                block_num: block.number,
                now,
            };
            self.scheduler.run(&mut ctx)?
        };

        let state_root = self.state.compute_state_root()?;
        let receipt = BlockReceipt::new(
            block.number,
            applied,
            rejections.len() as u64,
            matched,
            state_root,
            now,
        );
        Ok((
            AppliedBlock {
                receipt,
                events,
                rejections,
            },
            ran,
        ))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
