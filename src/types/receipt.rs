//! Per-block receipt carrying the betting state root.

use ssz_rs::prelude::*;

/// What a committed block did to the betting state.
///
/// `state_root` is the SHA-256 root over every game, pending bet and matched
/// bet record after the block, see
/// [`BettingState::compute_state_root`](crate::store::BettingState::compute_state_root).
///
/// # Example
///
/// ```
/// use hyperbet::types::BlockReceipt;
///
/// let receipt = BlockReceipt::new(
///     7,          // block_num
///     3,          // operations_applied
///     1,          // operations_rejected
///     2,          // bets_matched
///     [0u8; 32],  // state_root
///     1_700_000,  // timestamp
/// );
/// assert_eq!(receipt.operations(), 4);
/// assert!(!receipt.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct BlockReceipt {
    pub block_num: u64,
    pub operations_applied: u64,
    /// Skipped with a validation error or a fail-closed path
    pub operations_rejected: u64,
    /// Matched bets created by the block's operations
    pub bets_matched: u64,
    pub state_root: [u8; 32],
    /// Block time in seconds
    pub timestamp: u64,
}

impl BlockReceipt {
    pub fn new(
        block_num: u64,
        operations_applied: u64,
        operations_rejected: u64,
        bets_matched: u64,
        state_root: [u8; 32],
        timestamp: u64,
    ) -> Self {
        Self {
            block_num,
            operations_applied,
            operations_rejected,
            bets_matched,
            state_root,
            timestamp,
        }
    }

    /// Every operation the block carried.
    #[inline]
    pub fn operations(&self) -> u64 {
        self.operations_applied + self.operations_rejected
    }

    /// True for a block with no operations; only scheduler hooks ran.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations() == 0
    }

    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }
}
