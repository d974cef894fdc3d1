//! Game registry storage.
//!
//! Games are never deleted: terminal games stay behind as history, and every
//! uuid ever registered is remembered so it can never be reused.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::{Game, GameId, GameStatus};

#[derive(Debug, Clone)]
pub struct GameStore {
    games: BTreeMap<GameId, Game>,
    by_uuid: BTreeMap<Uuid, GameId>,
    next_id: u64,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            games: BTreeMap::new(),
            by_uuid: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// True if `uuid` has ever been registered.
    #[inline]
    pub fn contains_uuid(&self, uuid: &Uuid) -> bool {
        self.by_uuid.contains_key(uuid)
    }

    pub fn insert(&mut self, mut game: Game) -> Result<GameId, InvariantError> {
        let id = GameId(self.next_id);
        if self.by_uuid.contains_key(&game.uuid) {
            return Err(InvariantError::DuplicateRecord { kind: "game", id: id.0 });
        }
        self.next_id += 1;
        game.id = id;
        self.by_uuid.insert(game.uuid, id);
        self.games.insert(id, game);
        Ok(id)
    }

    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<&Game> {
        self.by_uuid.get(uuid).and_then(|id| self.games.get(id))
    }

    pub fn get_by_uuid_mut(&mut self, uuid: &Uuid) -> Option<&mut Game> {
        let id = *self.by_uuid.get(uuid)?;
        self.games.get_mut(&id)
    }

    /// Uuids of games matching `filter`, ascending id.
    pub fn select<F>(&self, filter: F) -> Vec<Uuid>
    where
        F: Fn(&Game) -> bool,
    {
        self.games
            .values()
            .filter(|game| filter(game))
            .map(|game| game.uuid)
            .collect()
    }

    /// Games in `status`, ascending id.
    pub fn with_status(&self, status: GameStatus) -> Vec<Uuid> {
        self.select(|game| game.status == status)
    }

    /// All games in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Game> + '_ {
        self.games.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameKind, Market};

    fn game(uuid: u128, start_time: u64) -> Game {
        Game::new(
            Uuid::from_u128(uuid),
            "moderator".into(),
            String::new(),
            GameKind::Soccer,
            start_time,
            100,
            [Market::ResultHome].into_iter().collect(),
            0,
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut store = GameStore::new();
        let id = store.insert(game(1, 10)).unwrap();
        assert_eq!(id, GameId(1));
        assert_eq!(store.get_by_uuid(&Uuid::from_u128(1)).unwrap().id, id);
        assert!(store.contains_uuid(&Uuid::from_u128(1)));
        assert!(store.get_by_uuid(&Uuid::from_u128(2)).is_none());
    }

    #[test]
    fn test_uuid_never_reused() {
        let mut store = GameStore::new();
        store.insert(game(1, 10)).unwrap();
        store
            .get_by_uuid_mut(&Uuid::from_u128(1))
            .unwrap()
            .transition(GameStatus::Cancelled, 5)
            .unwrap();
        assert!(store.insert(game(1, 20)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_is_ascending() {
        let mut store = GameStore::new();
        store.insert(game(3, 30)).unwrap();
        store.insert(game(1, 10)).unwrap();
        store.insert(game(2, 20)).unwrap();

        let due = store.select(|g| g.start_time <= 20);
        assert_eq!(due, vec![Uuid::from_u128(1), Uuid::from_u128(2)]);
        assert_eq!(store.with_status(GameStatus::Created).len(), 3);
    }
}
