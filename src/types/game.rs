//! Games: the events bets are placed on.
//!
//! A game moves through a small status machine:
//!
//! ```text
//! created -> started -> finished
//!    |          |
//!    +----------+----> cancelled | expired
//! ```
//!
//! Every transition is monotonic. Terminal statuses never change again.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use crate::error::InvariantError;
use crate::types::wincase::{Market, MarketKind, Wincase};

/// Engine-assigned game identifier, ascending in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game#{}", self.0)
    }
}

// ============================================================================
// GameKind
// ============================================================================

/// Sport of a game. Decides which market families are allowed.
///
/// Represented as u8 for SSZ records:
/// - Soccer = 0
/// - Hockey = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameKind {
    #[default]
    Soccer,
    Hockey,
}

impl GameKind {
    pub fn to_u8(self) -> u8 {
        match self {
            GameKind::Soccer => 0,
            GameKind::Hockey => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GameKind::Soccer),
            1 => Some(GameKind::Hockey),
            _ => None,
        }
    }

    /// Market families that may be listed for this sport.
    pub fn allowed_markets(self) -> &'static [MarketKind] {
        const FOOTBALL_LIKE: &[MarketKind] = &[
            MarketKind::Result,
            MarketKind::Round,
            MarketKind::Handicap,
            MarketKind::CorrectScore,
            MarketKind::Goal,
            MarketKind::Total,
        ];
        match self {
            GameKind::Soccer | GameKind::Hockey => FOOTBALL_LIKE,
        }
    }

    pub fn allows(self, market: &Market) -> bool {
        self.allowed_markets().contains(&market.kind())
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Soccer => f.write_str("soccer"),
            GameKind::Hockey => f.write_str("hockey"),
        }
    }
}

// ============================================================================
// GameStatus
// ============================================================================

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Created,
    Started,
    Finished,
    Cancelled,
    Expired,
}

impl GameStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            GameStatus::Created => 0,
            GameStatus::Started => 1,
            GameStatus::Finished => 2,
            GameStatus::Cancelled => 3,
            GameStatus::Expired => 4,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(GameStatus::Created),
            1 => Some(GameStatus::Started),
            2 => Some(GameStatus::Finished),
            3 => Some(GameStatus::Cancelled),
            4 => Some(GameStatus::Expired),
            _ => None,
        }
    }

    /// Finished, cancelled and expired games accept no further changes.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameStatus::Finished | GameStatus::Cancelled | GameStatus::Expired
        )
    }

    /// Whether `self -> next` is a legal forward step.
    pub fn can_transition_to(self, next: GameStatus) -> bool {
        use GameStatus::*;
        matches!(
            (self, next),
            (Created, Started)
                | (Started, Finished)
                | (Created | Started, Cancelled)
                | (Created | Started, Expired)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Created => "created",
            GameStatus::Started => "started",
            GameStatus::Finished => "finished",
            GameStatus::Cancelled => "cancelled",
            GameStatus::Expired => "expired",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Game
// ============================================================================

/// A game registered by the moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub uuid: Uuid,
    pub moderator: String,
    pub json_metadata: String,
    pub kind: GameKind,
    pub start_time: u64,
    /// Deadline after which an unresolved game expires and refunds bets.
    pub auto_resolve_time: u64,
    pub last_update: u64,
    /// Set when results are posted; matched bets settle at this time.
    pub bets_resolve_time: Option<u64>,
    pub status: GameStatus,
    pub markets: BTreeSet<Market>,
    pub results: BTreeSet<Wincase>,
    /// True once matched bets of a finished game have been paid out.
    pub settled: bool,
}

impl Game {
    /// Create a game in the `created` status.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: Uuid,
        moderator: String,
        json_metadata: String,
        kind: GameKind,
        start_time: u64,
        auto_resolve_delay: u64,
        markets: BTreeSet<Market>,
        created: u64,
    ) -> Self {
        Self {
            id: GameId::default(),
            uuid,
            moderator,
            json_metadata,
            kind,
            start_time,
            auto_resolve_time: start_time.saturating_add(auto_resolve_delay),
            last_update: created,
            bets_resolve_time: None,
            status: GameStatus::Created,
            markets,
            results: BTreeSet::new(),
            settled: false,
        }
    }

    #[inline]
    pub fn has_market(&self, market: &Market) -> bool {
        self.markets.contains(market)
    }

    #[inline]
    pub fn has_wincase(&self, wincase: &Wincase) -> bool {
        self.markets.contains(&wincase.market())
    }

    /// Move to `next`, returning the previous status.
    pub fn transition(&mut self, next: GameStatus, now: u64) -> Result<GameStatus, InvariantError> {
        let old = self.status;
        if !old.can_transition_to(next) {
            return Err(InvariantError::IllegalTransition { from: old, to: next });
        }
        self.status = next;
        self.last_update = now;
        Ok(old)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game() -> Game {
        Game::new(
            Uuid::from_u128(1),
            "moderator".into(),
            "{}".into(),
            GameKind::Soccer,
            1_000,
            500,
            [Market::ResultHome, Market::Total { threshold: 2500 }]
                .into_iter()
                .collect(),
            10,
        )
    }

    #[test]
    fn test_status_conversion() {
        for status in [
            GameStatus::Created,
            GameStatus::Started,
            GameStatus::Finished,
            GameStatus::Cancelled,
            GameStatus::Expired,
        ] {
            assert_eq!(GameStatus::from_u8(status.to_u8()), Some(status));
        }
        assert_eq!(GameStatus::from_u8(9), None);
    }

    #[test]
    fn test_transitions_are_monotonic() {
        use GameStatus::*;
        assert!(Created.can_transition_to(Started));
        assert!(Started.can_transition_to(Finished));
        assert!(Created.can_transition_to(Cancelled));
        assert!(Started.can_transition_to(Expired));

        assert!(!Created.can_transition_to(Finished));
        assert!(!Started.can_transition_to(Created));
        assert!(!Created.can_transition_to(Created));
        for terminal in [Finished, Cancelled, Expired] {
            assert!(terminal.is_terminal());
            for next in [Created, Started, Finished, Cancelled, Expired] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_new_game() {
        let game = sample_game();
        assert_eq!(game.status, GameStatus::Created);
        assert_eq!(game.auto_resolve_time, 1_500);
        assert!(game.has_market(&Market::ResultHome));
        assert!(game.has_wincase(&Wincase::negative(Market::Total { threshold: 2500 })));
        assert!(!game.has_wincase(&Wincase::positive(Market::ResultAway)));
    }

    #[test]
    fn test_transition() {
        let mut game = sample_game();
        assert_eq!(game.transition(GameStatus::Started, 1_000), Ok(GameStatus::Created));
        assert_eq!(game.last_update, 1_000);
        assert_eq!(
            game.transition(GameStatus::Created, 1_001),
            Err(InvariantError::IllegalTransition {
                from: GameStatus::Started,
                to: GameStatus::Created
            })
        );
        assert_eq!(game.status, GameStatus::Started);
    }

    #[test]
    fn test_game_kind_markets() {
        assert!(GameKind::Soccer.allows(&Market::Handicap { threshold: 500 }));
        assert!(GameKind::Hockey.allows(&Market::GoalBoth));
        assert!(!GameKind::Soccer.allows(&Market::TotalGoalsHome { threshold: 500 }));
    }
}
