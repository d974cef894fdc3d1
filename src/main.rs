//! hyperbet - Binary Entry Point
//!
//! Runs a short scripted betting session through the block applier and
//! prints receipts, settlement events, final balances and the state root.

use std::path::PathBuf;

use clap::Parser;
use uuid::Uuid;

use hyperbet::config::HyperbetConfig;
use hyperbet::protocol::{CreateGameOperation, PostBetOperation, PostGameResultsOperation};
use hyperbet::types::{Asset, GameKind, Market, Odds, Wincase};
use hyperbet::{AppliedBlock, BettingChain, Block, Operation};

#[derive(Parser)]
#[command(name = "hyperbet")]
#[command(about = "Deterministic peer-to-peer betting exchange kernel", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(short, long)]
    log_level: Option<String>,
}

fn game_uuid(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("hyperbet/game/{}", name).as_bytes())
}

fn bet_uuid(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("hyperbet/bet/{}", name).as_bytes())
}

fn post_bet(
    better: &str,
    game: Uuid,
    wincase: Wincase,
    odds: Odds,
    stake: &str,
) -> Result<Operation, Box<dyn std::error::Error>> {
    Ok(PostBetOperation {
        better: better.into(),
        game_uuid: game,
        uuid: bet_uuid(&format!("{}/{}", better, game)),
        wincase,
        odds,
        stake: stake.parse()?,
        live: true,
    }
    .into())
}

fn print_block(applied: &AppliedBlock) {
    let receipt = &applied.receipt;
    if receipt.is_empty() {
        println!("Block #{} @ {}s: scheduler hooks only", receipt.block_num, receipt.timestamp);
    } else {
        println!(
            "Block #{} @ {}s: {} applied, {} rejected, {} matched",
            receipt.block_num,
            receipt.timestamp,
            receipt.operations_applied,
            receipt.operations_rejected,
            receipt.bets_matched
        );
    }
    for rejection in &applied.rejections {
        println!("  rejected op {} ({}): {}", rejection.index, rejection.operation, rejection.error);
    }
    for event in &applied.events {
        println!("  {:?}", event);
    }
    println!("  state root: {}", receipt.state_root_hex());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HyperbetConfig::load(path)?,
        None => HyperbetConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.init();

    let rules = config.betting.rules()?;
    let moderator = rules.moderator.clone();
    let resolve_delay = rules.resolve_delay_sec;

    println!("===========================================");
    println!("  hyperbet - betting exchange kernel");
    println!("===========================================");
    println!();

    let mut chain = BettingChain::new(rules);
    for better in ["alice", "bob", "carol", "dave"] {
        chain.fund(better, "10000 SCR".parse::<Asset>()?)?;
    }

    let derby = game_uuid("derby");
    let final_ = game_uuid("final");
    let home = Wincase::positive(Market::ResultHome);
    let create = |uuid: Uuid| -> Operation {
        CreateGameOperation {
            moderator: moderator.clone(),
            uuid,
            json_metadata: "{}".into(),
            game: GameKind::Soccer,
            start_time: 2_000,
            auto_resolve_delay_sec: None,
            markets: vec![Market::ResultHome],
        }
        .into()
    };
    let results = |uuid: Uuid| -> Operation {
        PostGameResultsOperation {
            moderator: moderator.clone(),
            uuid,
            wincases: vec![home],
        }
        .into()
    };

    let ten_to_one = Odds::new(10, 1)?;
    let ten_to_nine = Odds::new(10, 9)?;
    let blocks = vec![
        Block::new(
            1,
            1_000,
            vec![
                create(derby),
                create(final_),
                // both fully matched
                post_bet("alice", derby, home, ten_to_one, "100 SCR")?,
                post_bet("bob", derby, home.opposite(), ten_to_nine, "900 SCR")?,
                // dave fully matched, most of carol's stake stays pending
                post_bet("carol", final_, home, ten_to_one, "1000 SCR")?,
                post_bet("dave", final_, home.opposite(), ten_to_nine, "2000 SCR")?,
            ],
        ),
        Block::new(2, 2_000, vec![]),
        Block::new(3, 2_100, vec![results(derby), results(final_)]),
        Block::new(4, 2_100 + resolve_delay, vec![]),
    ];

    for block in blocks {
        let applied = chain.apply_block(block)?;
        print_block(&applied);
        println!();
    }

    println!("Balances:");
    for (account, balance) in chain.accounts().iter() {
        println!("  {:<8} {}", account, balance);
    }
    println!();
    println!("Final state root: {}", hex::encode(chain.state_root()?));

    Ok(())
}
