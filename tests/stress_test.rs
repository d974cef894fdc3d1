//! Stress tests for the hyperbet block applier.
//!
//! These tests verify:
//! 1. Determinism is preserved across runs (identical state roots)
//! 2. Stake is conserved after every block
//! 3. Every game ends terminal with empty books and all stake returned
//!
//! ## Running Stress Tests
//!
//! ```bash
//! cargo test --release --test stress_test -- --nocapture
//! ```

use std::time::Instant;

use hyperbet::config::BettingConfig;
use hyperbet::protocol::{
    CancelGameOperation, CancelPendingBetsOperation, CreateGameOperation, PostBetOperation,
    PostGameResultsOperation,
};
use hyperbet::types::{Asset, GameKind, Market, Odds, Wincase};
use hyperbet::{BettingChain, BettingRules, Block, Operation};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

const MODERATOR: &str = "moderator";

const GAME_COUNT: u128 = 8;

const BETTERS: [&str; 6] = ["alice", "bob", "carol", "dave", "erin", "frank"];

/// Starting balance of every better: 1,000,000 SCR.
const FUNDING: u64 = 1_000_000_000_000_000;

/// Complementary odds pairs, so that random bets actually match.
const ODDS: [(u32, u32); 8] = [
    (2, 1),
    (3, 2),
    (3, 1),
    (10, 1),
    (10, 9),
    (5, 4),
    (5, 1),
    (7, 3),
];

const MARKETS: [Market; 3] = [
    Market::ResultHome,
    Market::GoalBoth,
    Market::Total { threshold: 2500 },
];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn rules() -> BettingRules {
    BettingConfig {
        moderator: MODERATOR.into(),
        resolve_delay_sec: 100,
        auto_resolve_delay_default_sec: 1_000,
        auto_resolve_delay_max_sec: 10_000,
        ..BettingConfig::default()
    }
    .rules()
    .unwrap()
}

fn game_uuid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn random_wincase(rng: &mut ChaCha8Rng) -> Wincase {
    let market = MARKETS[rng.gen_range(0..MARKETS.len())];
    if rng.gen_bool(0.5) {
        Wincase::positive(market)
    } else {
        Wincase::negative(market)
    }
}

/// Generate deterministic blocks. Same seed = same blocks.
fn generate_blocks(seed: u64, block_count: u64, ops_per_block: usize) -> Vec<Block> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut blocks = Vec::with_capacity(block_count as usize + 1);
    let mut posted: Vec<(String, Uuid)> = Vec::new();
    let mut next_bet: u128 = 1_000;

    let creates: Vec<Operation> = (1..=GAME_COUNT)
        .map(|n| {
            CreateGameOperation {
                moderator: MODERATOR.into(),
                uuid: game_uuid(n),
                json_metadata: "{}".into(),
                game: GameKind::Soccer,
                start_time: 100 + rng.gen_range(0..2_000),
                auto_resolve_delay_sec: None,
                markets: MARKETS.to_vec(),
            }
            .into()
        })
        .collect();
    blocks.push(Block::new(1, 10, creates));

    for number in 2..=block_count {
        let now = number * 30;
        let mut ops: Vec<Operation> = Vec::with_capacity(ops_per_block);
        for _ in 0..ops_per_block {
            if rng.gen_bool(0.9) || posted.is_empty() {
                next_bet += 1;
                let better = BETTERS[rng.gen_range(0..BETTERS.len())].to_string();
                let (n, d) = ODDS[rng.gen_range(0..ODDS.len())];
                let uuid = Uuid::from_u128(next_bet);
                posted.push((better.clone(), uuid));
                ops.push(
                    PostBetOperation {
                        better,
                        game_uuid: game_uuid(rng.gen_range(1..=GAME_COUNT)),
                        uuid,
                        wincase: random_wincase(&mut rng),
                        odds: Odds::new(n, d).unwrap(),
                        stake: Asset::native(rng.gen_range(1..=100u64) * 1_000_000_000),
                        live: rng.gen_bool(0.7),
                    }
                    .into(),
                );
            } else {
                let (better, uuid) = posted[rng.gen_range(0..posted.len())].clone();
                ops.push(
                    CancelPendingBetsOperation {
                        better,
                        bet_uuids: vec![uuid],
                    }
                    .into(),
                );
            }
        }

        // moderator actions are rare; most of them get rejected until the
        // game has started
        if rng.gen_bool(0.1) {
            let wincases = MARKETS
                .iter()
                .map(|market| {
                    let (yes, no) = market.wincases();
                    if rng.gen_bool(0.5) {
                        yes
                    } else {
                        no
                    }
                })
                .collect();
            ops.push(
                PostGameResultsOperation {
                    moderator: MODERATOR.into(),
                    uuid: game_uuid(rng.gen_range(1..=GAME_COUNT)),
                    wincases,
                }
                .into(),
            );
        }
        if rng.gen_bool(0.02) {
            ops.push(
                CancelGameOperation {
                    moderator: MODERATOR.into(),
                    uuid: game_uuid(rng.gen_range(1..=GAME_COUNT)),
                }
                .into(),
            );
        }
        blocks.push(Block::new(number, now, ops));
    }

    // far past every deadline: everything starts, expires or resolves
    blocks.push(Block::new(block_count + 1, 1_000_000, vec![]));
    blocks
}

fn new_chain() -> BettingChain {
    let mut chain = BettingChain::new(rules());
    for better in BETTERS {
        chain.fund(better, Asset::native(FUNDING)).unwrap();
    }
    chain
}

/// Balances plus every stake held by the books.
fn total_value(chain: &BettingChain) -> u64 {
    let balances = chain.accounts().total().unwrap().amount;
    let pending: u64 = chain.state().pending.iter().map(|b| b.rest_stake.amount).sum();
    let matched: u64 = chain
        .state()
        .matched
        .iter()
        .map(|m| m.bet1.stake.amount + m.bet2.stake.amount)
        .sum();
    balances + pending + matched
}

/// Run a block sequence, checking conservation after every block.
///
/// Returns the state root after each block.
fn run_sequence(seed: u64, block_count: u64, ops_per_block: usize) -> (BettingChain, Vec<[u8; 32]>) {
    let funded = FUNDING * BETTERS.len() as u64;
    let mut chain = new_chain();
    let mut roots = Vec::new();

    for block in generate_blocks(seed, block_count, ops_per_block) {
        let number = block.number;
        let applied = chain
            .apply_block(block)
            .unwrap_or_else(|e| panic!("block {} aborted: {}", number, e));
        assert_eq!(
            total_value(&chain),
            funded,
            "stake not conserved after block {}",
            number
        );
        roots.push(applied.receipt.state_root);
    }
    (chain, roots)
}

// ============================================================================
// STRESS TESTS
// ============================================================================

/// Random blocks keep stake conserved and end with every bet settled.
#[test]
fn stress_random_blocks() {
    println!("\n=== STRESS TEST: random betting blocks ===\n");

    let start = Instant::now();
    let (chain, roots) = run_sequence(42, 200, 40);
    let elapsed = start.elapsed();

    let state = chain.state();
    println!("  Blocks applied:    {:>12}", roots.len());
    println!("  Games:             {:>12}", state.games.len());
    println!("  Bets accepted:     {:>12}", state.bet_uuids.len());
    println!("  Elapsed time:      {:>12.2?}", elapsed);
    println!("  State root:        {}", hex::encode(chain.state_root().unwrap()));

    assert!(state.bet_uuids.len() > 100, "expected most bets to be accepted");
    assert!(state.pending.is_empty());
    assert!(state.matched.is_empty());
    assert!(state.games.iter().all(|g| g.status.is_terminal()));
    assert_eq!(
        chain.accounts().total().unwrap(),
        Asset::native(FUNDING * BETTERS.len() as u64)
    );

    println!("\n=== STRESS TEST PASSED ===\n");
}

/// Same blocks produce identical state roots after every block.
///
/// Critical for consensus: every node must reach the same state.
#[test]
fn verify_determinism() {
    println!("\n=== DETERMINISM TEST ===\n");

    const SEED: u64 = 12345;

    let (chain1, roots1) = run_sequence(SEED, 100, 30);
    let (chain2, roots2) = run_sequence(SEED, 100, 30);

    println!("  Run 1 state root: {}", hex::encode(chain1.state_root().unwrap()));
    println!("  Run 2 state root: {}", hex::encode(chain2.state_root().unwrap()));

    assert_eq!(roots1, roots2, "State roots must match for determinism");
    assert_eq!(chain1.accounts(), chain2.accounts());

    let (_, roots3) = run_sequence(SEED + 1, 100, 30);
    assert_ne!(roots1, roots3, "Different seeds should produce different histories");

    println!("\n=== DETERMINISM VERIFIED ===\n");
}

/// Every matched bet pairs complementary odds on opposite wincases.
#[test]
fn stress_matched_bets_are_fair() {
    let mut chain = new_chain();
    // stop before the final sweep so the books are still populated
    let mut blocks = generate_blocks(7, 60, 40);
    blocks.pop();
    for block in blocks {
        chain.apply_block(block).unwrap();
    }

    let state = chain.state();
    assert!(!state.matched.is_empty(), "expected some matched bets");
    for bet in state.matched.iter() {
        assert!(bet.bet1.odds.is_complementary_to(&bet.bet2.odds));
        assert_eq!(bet.bet1.wincase.opposite(), bet.bet2.wincase);
        assert_ne!(bet.bet1.better, bet.bet2.better);
        assert!(!bet.bet1.stake.is_zero() && !bet.bet2.stake.is_zero());
    }
    for bet in state.pending.iter() {
        assert!(bet.rest_stake.amount <= bet.stake.amount);
    }
}
