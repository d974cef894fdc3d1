//! Pending bet book.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated storage for the bets themselves
//! - **by_id**: ascending bet id to slab key, the iteration order for the
//!   state root
//! - **by_uuid**: external uuid to bet id
//! - **by_game_wincase**: candidate lists for matching, each kept in
//!   ascending id order so the oldest resting bet is always tried first
//!
//! Every index is an ordered map, so nothing about iteration depends on
//! hashing.
//!
//! ## Example
//!
//! ```
//! use hyperbet::store::PendingBetStore;
//! use hyperbet::types::{Asset, Market, Odds, PendingBet, PendingBetKind, Wincase};
//! use uuid::Uuid;
//!
//! let mut book = PendingBetStore::with_capacity(16);
//! let game = Uuid::from_u128(1);
//! let wincase = Wincase::positive(Market::ResultHome);
//! let bet = PendingBet::new(
//!     Uuid::from_u128(10),
//!     game,
//!     "alice".into(),
//!     wincase,
//!     Odds::new(10, 1).unwrap(),
//!     Asset::native(1_000_000),
//!     PendingBetKind::Live,
//!     0,
//! );
//!
//! let id = book.insert(bet).unwrap();
//! assert_eq!(book.candidates(&game, &wincase), vec![id]);
//! assert!(book.candidates(&game, &wincase.opposite()).is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use slab::Slab;
use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::{Asset, BetId, PendingBet, Wincase};

#[derive(Debug, Clone)]
pub struct PendingBetStore {
    bets: Slab<PendingBet>,
    by_id: BTreeMap<BetId, usize>,
    by_uuid: BTreeMap<Uuid, BetId>,
    by_game_wincase: BTreeMap<(Uuid, Wincase), BTreeSet<BetId>>,
    next_id: u64,
}

impl Default for PendingBetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingBetStore {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with `capacity` pre-allocated bet slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bets: Slab::with_capacity(capacity),
            by_id: BTreeMap::new(),
            by_uuid: BTreeMap::new(),
            by_game_wincase: BTreeMap::new(),
            next_id: 1,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bets.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Id the next inserted bet will receive.
    #[inline]
    pub fn peek_next_id(&self) -> BetId {
        BetId(self.next_id)
    }

    // ========================================================================
    // Bet Management
    // ========================================================================

    /// Insert a bet, assigning its id.
    ///
    /// # Returns
    ///
    /// The new bet id, or an invariant error if the uuid is already on the
    /// book.
    pub fn insert(&mut self, mut bet: PendingBet) -> Result<BetId, InvariantError> {
        let id = BetId(self.next_id);
        if self.by_uuid.contains_key(&bet.uuid) {
            return Err(InvariantError::DuplicateRecord {
                kind: "pending bet",
                id: id.0,
            });
        }
        self.next_id += 1;
        bet.id = id;

        let uuid = bet.uuid;
        let book_key = (bet.game_uuid, bet.wincase);
        let key = self.bets.insert(bet);

        self.by_id.insert(id, key);
        self.by_uuid.insert(uuid, id);
        self.by_game_wincase.entry(book_key).or_default().insert(id);
        Ok(id)
    }

    /// Remove a bet from the book and every index.
    pub fn remove(&mut self, id: BetId) -> Option<PendingBet> {
        let key = self.by_id.remove(&id)?;
        let bet = self.bets.remove(key);

        self.by_uuid.remove(&bet.uuid);
        let book_key = (bet.game_uuid, bet.wincase);
        if let Some(ids) = self.by_game_wincase.get_mut(&book_key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_game_wincase.remove(&book_key);
            }
        }
        Some(bet)
    }

    #[inline]
    pub fn get(&self, id: BetId) -> Option<&PendingBet> {
        let key = *self.by_id.get(&id)?;
        self.bets.get(key)
    }

    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<&PendingBet> {
        let id = *self.by_uuid.get(uuid)?;
        self.get(id)
    }

    #[inline]
    pub fn contains(&self, id: BetId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Move `amount` out of a bet's rest stake.
    ///
    /// # Returns
    ///
    /// The rest stake left on the bet.
    pub fn fill(&mut self, id: BetId, amount: &Asset) -> Result<Asset, InvariantError> {
        let key = *self.by_id.get(&id).ok_or(InvariantError::MissingRecord {
            kind: "pending bet",
            id: id.0,
        })?;
        let bet = self.bets.get_mut(key).ok_or(InvariantError::MissingRecord {
            kind: "pending bet",
            id: id.0,
        })?;
        bet.fill(amount)?;
        Ok(bet.rest_stake)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Bets resting on `wincase` of `game`, ascending id.
    pub fn candidates(&self, game: &Uuid, wincase: &Wincase) -> Vec<BetId> {
        self.by_game_wincase
            .get(&(*game, *wincase))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every bet on `game`, ascending id.
    pub fn ids_for_game(&self, game: &Uuid) -> Vec<BetId> {
        let mut ids: Vec<BetId> = self
            .by_game_wincase
            .iter()
            .filter(|((g, _), _)| g == game)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All bets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingBet> + '_ {
        self.by_id.values().filter_map(|key| self.bets.get(*key))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
