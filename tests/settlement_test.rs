//! End-to-end settlement scenarios through the block applier.

use hyperbet::config::BettingConfig;
use hyperbet::protocol::{
    CancelGameOperation, CreateGameOperation, PostBetOperation, PostGameResultsOperation,
    UpdateGameMarketsOperation,
};
use hyperbet::types::{Asset, BetCancelledKind, GameKind, GameStatus, Market, Odds, Wincase};
use hyperbet::{AppliedBlock, BettingChain, BettingError, BettingEvent, Block, Operation, ValidationError};

use uuid::Uuid;

const MODERATOR: &str = "moderator";
const FUNDING: u64 = 10_000 * SCR;
const SCR: u64 = 1_000_000_000;
const GAME: u128 = 1;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

struct Harness {
    chain: BettingChain,
    next_block: u64,
}

impl Harness {
    fn new() -> Self {
        let rules = BettingConfig {
            moderator: MODERATOR.into(),
            resolve_delay_sec: 100,
            auto_resolve_delay_default_sec: 1_000,
            ..BettingConfig::default()
        }
        .rules()
        .unwrap();
        let mut chain = BettingChain::new(rules);
        for better in ["alice", "bob", "carol"] {
            chain.fund(better, Asset::native(FUNDING)).unwrap();
        }
        Self {
            chain,
            next_block: 1,
        }
    }

    /// Apply a block at `time` and require every operation to be accepted.
    fn block(&mut self, time: u64, ops: Vec<Operation>) -> AppliedBlock {
        let applied = self.try_block(time, ops);
        assert!(applied.rejections.is_empty(), "rejected: {:?}", applied.rejections);
        applied
    }

    fn try_block(&mut self, time: u64, ops: Vec<Operation>) -> AppliedBlock {
        let applied = self
            .chain
            .apply_block(Block::new(self.next_block, time, ops))
            .unwrap();
        self.next_block += 1;
        applied
    }

    fn balance(&self, who: &str) -> u64 {
        self.chain.balance(who).amount
    }

    fn status(&self) -> GameStatus {
        self.chain
            .state()
            .games
            .get_by_uuid(&Uuid::from_u128(GAME))
            .unwrap()
            .status
    }
}

fn create_game(markets: Vec<Market>) -> Operation {
    CreateGameOperation {
        moderator: MODERATOR.into(),
        uuid: Uuid::from_u128(GAME),
        json_metadata: r#"{"home":"Reds","away":"Blues"}"#.into(),
        game: GameKind::Soccer,
        start_time: 1_000,
        auto_resolve_delay_sec: None,
        markets,
    }
    .into()
}

fn bet(better: &str, uuid: u128, wincase: Wincase, odds: (u32, u32), stake: u64) -> Operation {
    PostBetOperation {
        better: better.into(),
        game_uuid: Uuid::from_u128(GAME),
        uuid: Uuid::from_u128(uuid),
        wincase,
        odds: Odds::new(odds.0, odds.1).unwrap(),
        stake: Asset::native(stake),
        live: true,
    }
    .into()
}

fn results(wincases: Vec<Wincase>) -> Operation {
    PostGameResultsOperation {
        moderator: MODERATOR.into(),
        uuid: Uuid::from_u128(GAME),
        wincases,
    }
    .into()
}

fn cancel_game() -> Operation {
    CancelGameOperation {
        moderator: MODERATOR.into(),
        uuid: Uuid::from_u128(GAME),
    }
    .into()
}

fn home() -> Wincase {
    Wincase::positive(Market::ResultHome)
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_full_match_winner_takes_pot() {
    let mut h = Harness::new();
    let applied = h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            bet("alice", 10, home(), (10, 1), 100 * SCR),
            bet("bob", 11, home().opposite(), (10, 9), 900 * SCR),
        ],
    );
    assert_eq!(applied.receipt.bets_matched, 1);
    assert!(h.chain.state().pending.is_empty());

    h.block(1_000, vec![]);
    assert_eq!(h.status(), GameStatus::Started);

    h.block(1_100, vec![results(vec![home()])]);
    assert_eq!(h.status(), GameStatus::Finished);
    // nothing is paid before the resolve delay has passed
    assert_eq!(h.balance("alice"), FUNDING - 100 * SCR);

    let applied = h.block(1_200, vec![]);
    assert_eq!(h.balance("alice"), FUNDING - 100 * SCR + 1_000 * SCR);
    assert_eq!(h.balance("bob"), FUNDING - 900 * SCR);
    assert!(h.chain.state().matched.is_empty());
    assert!(applied.events.iter().any(|e| matches!(
        e,
        BettingEvent::BetResolved { better, income, .. }
            if better == "alice" && income.amount == 1_000 * SCR
    )));
}

#[test]
fn test_partial_match_rest_refunded_on_results() {
    let mut h = Harness::new();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            bet("alice", 10, home(), (10, 1), 1_000 * SCR),
            bet("bob", 11, home().opposite(), (10, 9), 2_000 * SCR),
        ],
    );

    let state = h.chain.state();
    let matched = state.matched.iter().next().unwrap();
    assert_eq!(matched.bet1.stake, Asset::native(2_000 * SCR));
    assert_eq!(matched.bet2.stake, Asset::native(222_222_222_222));
    let rest = state.pending.iter().next().unwrap();
    assert_eq!(rest.better, "alice");
    assert_eq!(rest.rest_stake, Asset::native(777_777_777_778));

    h.block(1_000, vec![]);
    let applied = h.block(1_100, vec![results(vec![home()])]);
    assert!(applied.events.iter().any(|e| matches!(
        e,
        BettingEvent::BetCancelled { kind: BetCancelledKind::Pending, .. }
    )));
    assert!(h.chain.state().pending.is_empty());

    h.block(1_200, vec![]);
    assert_eq!(h.balance("alice"), FUNDING + 2_000 * SCR);
    assert_eq!(h.balance("bob"), FUNDING - 2_000 * SCR);
}

// ============================================================================
// Refund paths
// ============================================================================

#[test]
fn test_cancel_game_refunds_everyone() {
    let mut h = Harness::new();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            bet("alice", 10, home(), (10, 1), 1_000 * SCR),
            bet("bob", 11, home().opposite(), (10, 9), 2_000 * SCR),
        ],
    );
    h.block(1_000, vec![]);
    h.block(1_050, vec![cancel_game()]);

    assert_eq!(h.status(), GameStatus::Cancelled);
    assert_eq!(h.balance("alice"), FUNDING);
    assert_eq!(h.balance("bob"), FUNDING);
    assert!(h.chain.state().pending.is_empty());
    assert!(h.chain.state().matched.is_empty());
}

#[test]
fn test_expiry_refunds_everyone() {
    let mut h = Harness::new();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            bet("alice", 10, home(), (2, 1), 50 * SCR),
            bet("bob", 11, home().opposite(), (2, 1), 80 * SCR),
        ],
    );
    h.block(1_000, vec![]);
    h.block(1_999, vec![]);
    assert_eq!(h.status(), GameStatus::Started);

    h.block(2_000, vec![]);
    assert_eq!(h.status(), GameStatus::Expired);
    assert_eq!(h.balance("alice"), FUNDING);
    assert_eq!(h.balance("bob"), FUNDING);
}

#[test]
fn test_non_live_bets_refunded_at_start() {
    let mut h = Harness::new();
    let mut non_live = bet("alice", 10, home(), (2, 1), 50 * SCR);
    if let Operation::PostBet(op) = &mut non_live {
        op.live = false;
    }
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            non_live,
            bet("bob", 11, home(), (3, 1), 40 * SCR),
        ],
    );

    h.block(1_000, vec![]);
    let pending: Vec<&str> = h
        .chain
        .state()
        .pending
        .iter()
        .map(|b| b.better.as_str())
        .collect();
    assert_eq!(pending, vec!["bob"]);
    assert_eq!(h.balance("alice"), FUNDING);
}

#[test]
fn test_draw_market_refunded() {
    let mut h = Harness::new();
    let total = Market::Total { threshold: 2000 };
    let (over, under) = total.wincases();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome, total]),
            bet("alice", 10, over, (2, 1), 50 * SCR),
            bet("bob", 11, under, (2, 1), 50 * SCR),
            bet("alice", 12, home(), (2, 1), 10 * SCR),
            bet("bob", 13, home().opposite(), (2, 1), 10 * SCR),
        ],
    );
    h.block(1_000, vec![]);
    // exactly two goals: the total market has no winner
    h.block(1_100, vec![results(vec![home()])]);
    h.block(1_200, vec![]);

    assert_eq!(h.balance("alice"), FUNDING + 10 * SCR);
    assert_eq!(h.balance("bob"), FUNDING - 10 * SCR);
}

#[test]
fn test_all_draw_game_finishes_without_winners() {
    let mut h = Harness::new();
    let total = Market::Total { threshold: 2000 };
    let (over, under) = total.wincases();
    h.block(
        100,
        vec![
            create_game(vec![total]),
            bet("alice", 10, over, (2, 1), 50 * SCR),
            bet("bob", 11, under, (2, 1), 50 * SCR),
        ],
    );
    assert_eq!(h.chain.state().matched.len(), 1);
    h.block(1_000, vec![]);

    // exactly two goals: no market has a winner
    h.block(1_100, vec![results(vec![])]);
    assert_eq!(h.status(), GameStatus::Finished);

    h.block(1_200, vec![]);
    h.block(2_000, vec![]);
    assert_eq!(h.status(), GameStatus::Finished);
    assert_eq!(h.chain.state().matched.len(), 0);
    assert_eq!(h.balance("alice"), FUNDING);
    assert_eq!(h.balance("bob"), FUNDING);
}

#[test]
fn test_market_update_refunds_removed_market() {
    let mut h = Harness::new();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome, Market::GoalBoth]),
            bet("alice", 10, home(), (2, 1), 10 * SCR),
            bet("bob", 11, home().opposite(), (2, 1), 10 * SCR),
            bet("carol", 12, Wincase::positive(Market::GoalBoth), (2, 1), 10 * SCR),
        ],
    );
    h.block(
        200,
        vec![UpdateGameMarketsOperation {
            moderator: MODERATOR.into(),
            uuid: Uuid::from_u128(GAME),
            markets: vec![Market::GoalBoth],
        }
        .into()],
    );

    assert_eq!(h.balance("alice"), FUNDING);
    assert_eq!(h.balance("bob"), FUNDING);
    assert_eq!(h.balance("carol"), FUNDING - 10 * SCR);
    assert!(h.chain.state().matched.is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_lifecycle_is_monotonic() {
    let mut h = Harness::new();
    h.block(100, vec![create_game(vec![Market::ResultHome])]);
    h.block(1_000, vec![]);
    h.block(1_100, vec![results(vec![home()])]);

    // results cannot be posted twice, and a finished game cannot be cancelled
    let applied = h.try_block(1_150, vec![results(vec![home().opposite()]), cancel_game()]);
    assert_eq!(applied.rejections.len(), 2);
    assert!(matches!(applied.rejections[0].error, BettingError::NotImplemented(_)));
    assert!(matches!(applied.rejections[1].error, BettingError::NotImplemented(_)));

    h.block(1_200, vec![]);
    let applied = h.try_block(1_300, vec![cancel_game()]);
    assert!(matches!(
        applied.rejections[0].error,
        BettingError::Validation(ValidationError::InvalidGameStatus { .. })
    ));
    assert_eq!(h.status(), GameStatus::Finished);
}

#[test]
fn test_settlement_is_idempotent() {
    let mut h = Harness::new();
    h.block(
        100,
        vec![
            create_game(vec![Market::ResultHome]),
            bet("alice", 10, home(), (3, 2), 30 * SCR),
            bet("bob", 11, home().opposite(), (3, 1), 15 * SCR),
        ],
    );
    h.block(1_000, vec![]);
    h.block(1_100, vec![results(vec![home().opposite()])]);
    h.block(1_200, vec![]);
    let alice = h.balance("alice");
    let bob = h.balance("bob");
    assert_eq!(bob, FUNDING + 30 * SCR);

    let root = h.chain.state_root().unwrap();
    for time in [1_300, 5_000, 50_000] {
        let applied = h.block(time, vec![]);
        assert!(applied.events.is_empty());
    }
    assert_eq!(h.balance("alice"), alice);
    assert_eq!(h.balance("bob"), bob);
    assert_eq!(h.chain.state_root().unwrap(), root);
}

#[test]
fn test_bet_rejected_at_auto_resolve_time() {
    let mut h = Harness::new();
    h.block(100, vec![create_game(vec![Market::ResultHome])]);
    h.block(1_000, vec![]);

    let applied = h.try_block(
        2_000,
        vec![
            bet("alice", 10, home(), (2, 1), 10 * SCR),
            bet("bob", 11, home().opposite(), (2, 1), 10 * SCR),
        ],
    );
    assert_eq!(applied.receipt.operations_rejected, 2);
    assert_eq!(applied.receipt.bets_matched, 0);
    assert!(matches!(
        applied.rejections[0].error,
        BettingError::Validation(ValidationError::BetAfterDeadline {
            auto_resolve_time: 2_000,
            ..
        })
    ));
    assert_eq!(h.status(), GameStatus::Expired);
    assert_eq!(h.balance("alice"), FUNDING);
    assert_eq!(h.balance("bob"), FUNDING);
}

#[test]
fn test_rejected_bet_changes_nothing() {
    let mut h = Harness::new();
    h.block(100, vec![create_game(vec![Market::ResultHome])]);
    let root = h.chain.state_root().unwrap();

    let applied = h.try_block(
        200,
        vec![
            bet("alice", 10, home(), (2, 1), 20_000 * SCR),
            bet("alice", 11, Wincase::positive(Market::GoalBoth), (2, 1), SCR),
        ],
    );
    assert_eq!(applied.receipt.operations_rejected, 2);
    assert_eq!(h.chain.state_root().unwrap(), root);
    assert_eq!(h.balance("alice"), FUNDING);
}
