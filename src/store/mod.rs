//! Betting state: the game registry plus the two bet books.
//!
//! ## State Root
//!
//! [`BettingState::compute_state_root`] hashes the SSZ record of every game,
//! pending bet and matched bet in ascending id order, each section prefixed
//! with a tag and its length. Identical operation histories always give
//! identical roots.

mod games;
mod matched;
mod pending;

pub use games::GameStore;
pub use matched::MatchedBetStore;
pub use pending::PendingBetStore;

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;
use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::record::{GameRecord, MatchedBetRecord, PendingBetRecord};

/// All betting state owned by the ledger.
///
/// Cloning gives a full snapshot; the block applier uses that to roll back.
#[derive(Debug, Clone, Default)]
pub struct BettingState {
    pub games: GameStore,
    pub pending: PendingBetStore,
    pub matched: MatchedBetStore,
    /// Every bet uuid ever accepted, so a uuid can never be reused.
    pub bet_uuids: BTreeSet<Uuid>,
}

fn hash_record<T: SimpleSerialize>(hasher: &mut Sha256, record: &T) -> Result<(), InvariantError> {
    let bytes =
        ssz_rs::serialize(record).map_err(|e| InvariantError::Encoding(format!("{:?}", e)))?;
    hasher.update(&bytes);
    Ok(())
}

impl BettingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state whose pending book has `capacity` pre-allocated slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: PendingBetStore::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// SHA-256 root over every game and bet record.
    pub fn compute_state_root(&self) -> Result<[u8; 32], InvariantError> {
        let mut hasher = Sha256::new();

        hasher.update(b"games");
        hasher.update((self.games.len() as u64).to_le_bytes());
        for game in self.games.iter() {
            hash_record(&mut hasher, &GameRecord::from(game))?;
        }

        hasher.update(b"pending");
        hasher.update((self.pending.len() as u64).to_le_bytes());
        for bet in self.pending.iter() {
            hash_record(&mut hasher, &PendingBetRecord::from(bet))?;
        }

        hasher.update(b"matched");
        hasher.update((self.matched.len() as u64).to_le_bytes());
        for bet in self.matched.iter() {
            hash_record(&mut hasher, &MatchedBetRecord::from(bet))?;
        }

        Ok(hasher.finalize().into())
    }
}
