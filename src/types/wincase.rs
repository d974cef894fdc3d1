//! Betting markets and their wincases.
//!
//! ## Overview
//!
//! A [`Market`] is one question asked about a game ("will the home team
//! win?", "will more than 2.5 goals be scored?"). Every market has exactly
//! two wincases, a positive one (yes/over) and a negative one (no/under),
//! and a bet always backs one of them. Bets can only be matched against
//! the opposite wincase of the same market.
//!
//! ## Thresholds
//!
//! Handicap and total markets carry a threshold scaled by
//! [`THRESHOLD_FACTOR`]: `2500` means 2.5 goals. A whole-number threshold
//! (`2000`) can be hit exactly, so such markets may end with no winner;
//! see [`Market::has_draw_state`].
//!
//! ## Codes
//!
//! Markets and wincases map to `u64` codes for SSZ records. The layout is
//! `tag << 40 | a << 24 | b << 8 | side`, where `a`/`b` are the market
//! parameters as raw 16-bit values.

use std::fmt;

/// Scale of handicap and total thresholds.
pub const THRESHOLD_FACTOR: i16 = 1000;

// ============================================================================
// MarketKind
// ============================================================================

/// Market families, used to restrict which markets a game kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarketKind {
    Result,
    Round,
    Handicap,
    CorrectScore,
    Goal,
    Total,
    TotalGoals,
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketKind::Result => "result",
            MarketKind::Round => "round",
            MarketKind::Handicap => "handicap",
            MarketKind::CorrectScore => "correct_score",
            MarketKind::Goal => "goal",
            MarketKind::Total => "total",
            MarketKind::TotalGoals => "total_goals",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Market
// ============================================================================

/// A binary question about a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Market {
    ResultHome,
    ResultDraw,
    ResultAway,
    RoundHome,
    Handicap { threshold: i16 },
    CorrectScoreHome,
    CorrectScoreDraw,
    CorrectScoreAway,
    CorrectScore { home: u16, away: u16 },
    GoalHome,
    GoalBoth,
    GoalAway,
    Total { threshold: i16 },
    /// Reserved: no game kind allows total-goals markets yet, so
    /// `validate_markets` rejects both variants.
    TotalGoalsHome { threshold: i16 },
    TotalGoalsAway { threshold: i16 },
}

impl Market {
    pub fn kind(&self) -> MarketKind {
        match self {
            Market::ResultHome | Market::ResultDraw | Market::ResultAway => MarketKind::Result,
            Market::RoundHome => MarketKind::Round,
            Market::Handicap { .. } => MarketKind::Handicap,
            Market::CorrectScoreHome
            | Market::CorrectScoreDraw
            | Market::CorrectScoreAway
            | Market::CorrectScore { .. } => MarketKind::CorrectScore,
            Market::GoalHome | Market::GoalBoth | Market::GoalAway => MarketKind::Goal,
            Market::Total { .. } => MarketKind::Total,
            Market::TotalGoalsHome { .. } | Market::TotalGoalsAway { .. } => {
                MarketKind::TotalGoals
            }
        }
    }

    /// True when the market may legitimately end with neither wincase
    /// winning (a whole-number threshold hit exactly).
    pub fn has_draw_state(&self) -> bool {
        match self {
            Market::Handicap { threshold }
            | Market::Total { threshold }
            | Market::TotalGoalsHome { threshold }
            | Market::TotalGoalsAway { threshold } => threshold % THRESHOLD_FACTOR == 0,
            _ => false,
        }
    }

    /// The (positive, negative) wincase pair of this market.
    pub fn wincases(&self) -> (Wincase, Wincase) {
        (Wincase::positive(*self), Wincase::negative(*self))
    }

    fn tag(&self) -> u8 {
        match self {
            Market::ResultHome => 0,
            Market::ResultDraw => 1,
            Market::ResultAway => 2,
            Market::RoundHome => 3,
            Market::Handicap { .. } => 4,
            Market::CorrectScoreHome => 5,
            Market::CorrectScoreDraw => 6,
            Market::CorrectScoreAway => 7,
            Market::CorrectScore { .. } => 8,
            Market::GoalHome => 9,
            Market::GoalBoth => 10,
            Market::GoalAway => 11,
            Market::Total { .. } => 12,
            Market::TotalGoalsHome { .. } => 13,
            Market::TotalGoalsAway { .. } => 14,
        }
    }

    fn params(&self) -> (u16, u16) {
        match *self {
            Market::Handicap { threshold }
            | Market::Total { threshold }
            | Market::TotalGoalsHome { threshold }
            | Market::TotalGoalsAway { threshold } => (threshold as u16, 0),
            Market::CorrectScore { home, away } => (home, away),
            _ => (0, 0),
        }
    }

    /// Stable numeric code for SSZ records.
    pub fn code(&self) -> u64 {
        let (a, b) = self.params();
        (self.tag() as u64) << 40 | (a as u64) << 24 | (b as u64) << 8
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::ResultHome => f.write_str("result_home"),
            Market::ResultDraw => f.write_str("result_draw"),
            Market::ResultAway => f.write_str("result_away"),
            Market::RoundHome => f.write_str("round_home"),
            Market::Handicap { threshold } => write!(f, "handicap({})", threshold),
            Market::CorrectScoreHome => f.write_str("correct_score_home"),
            Market::CorrectScoreDraw => f.write_str("correct_score_draw"),
            Market::CorrectScoreAway => f.write_str("correct_score_away"),
            Market::CorrectScore { home, away } => write!(f, "correct_score({}:{})", home, away),
            Market::GoalHome => f.write_str("goal_home"),
            Market::GoalBoth => f.write_str("goal_both"),
            Market::GoalAway => f.write_str("goal_away"),
            Market::Total { threshold } => write!(f, "total({})", threshold),
            Market::TotalGoalsHome { threshold } => write!(f, "total_goals_home({})", threshold),
            Market::TotalGoalsAway { threshold } => write!(f, "total_goals_away({})", threshold),
        }
    }
}

// ============================================================================
// Wincase
// ============================================================================

/// One outcome of a market.
///
/// `positive` is the yes/over side; its opposite is the no/under side of
/// the same market.
///
/// # Example
///
/// ```
/// use hyperbet::types::{Market, Wincase};
///
/// let home = Wincase::positive(Market::ResultHome);
/// assert_eq!(home.opposite(), Wincase::negative(Market::ResultHome));
/// assert_eq!(home.opposite().opposite(), home);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wincase {
    market: Market,
    positive: bool,
}

impl Wincase {
    pub fn positive(market: Market) -> Self {
        Self {
            market,
            positive: true,
        }
    }

    pub fn negative(market: Market) -> Self {
        Self {
            market,
            positive: false,
        }
    }

    #[inline]
    pub fn market(&self) -> Market {
        self.market
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn opposite(&self) -> Self {
        Self {
            market: self.market,
            positive: !self.positive,
        }
    }

    /// Market code with the side in the lowest bit.
    pub fn code(&self) -> u64 {
        self.market.code() | self.positive as u64
    }
}

impl fmt::Display for Wincase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match (self.market.kind(), self.positive) {
            (MarketKind::Handicap | MarketKind::Total | MarketKind::TotalGoals, true) => "over",
            (MarketKind::Handicap | MarketKind::Total | MarketKind::TotalGoals, false) => "under",
            (_, true) => "yes",
            (_, false) => "no",
        };
        write!(f, "{}:{}", self.market, side)
    }
}

/// True when a bet on `a` can be matched against a bet on `b`.
pub fn match_wincases(a: &Wincase, b: &Wincase) -> bool {
    a.opposite() == *b
}

// ============================================================================
// Unit Tests
// ============================================================================
