//! Matched bet book, indexed by game.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::{Market, MatchedBet, MatchedBetId};

#[derive(Debug, Clone)]
pub struct MatchedBetStore {
    bets: BTreeMap<MatchedBetId, MatchedBet>,
    by_game: BTreeMap<Uuid, BTreeSet<MatchedBetId>>,
    next_id: u64,
}

impl Default for MatchedBetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchedBetStore {
    pub fn new() -> Self {
        Self {
            bets: BTreeMap::new(),
            by_game: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bets.is_empty()
    }

    /// Insert a matched bet, assigning its id.
    pub fn insert(&mut self, mut bet: MatchedBet) -> MatchedBetId {
        let id = MatchedBetId(self.next_id);
        self.next_id += 1;
        bet.id = id;
        self.by_game.entry(bet.game_uuid).or_default().insert(id);
        self.bets.insert(id, bet);
        id
    }

    pub fn remove(&mut self, id: MatchedBetId) -> Result<MatchedBet, InvariantError> {
        let bet = self.bets.remove(&id).ok_or(InvariantError::MissingRecord {
            kind: "matched bet",
            id: id.0,
        })?;
        if let Some(ids) = self.by_game.get_mut(&bet.game_uuid) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_game.remove(&bet.game_uuid);
            }
        }
        Ok(bet)
    }

    #[inline]
    pub fn get(&self, id: MatchedBetId) -> Option<&MatchedBet> {
        self.bets.get(&id)
    }

    /// Matched bets of `game`, ascending id.
    pub fn ids_for_game(&self, game: &Uuid) -> Vec<MatchedBetId> {
        self.by_game
            .get(game)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Matched bets of `game` on any of `markets`, ascending id.
    pub fn ids_for_markets(&self, game: &Uuid, markets: &BTreeSet<Market>) -> Vec<MatchedBetId> {
        self.ids_for_game(game)
            .into_iter()
            .filter(|id| {
                self.bets
                    .get(id)
                    .map(|bet| markets.contains(&bet.market))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All matched bets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchedBet> + '_ {
        self.bets.values()
    }
}
