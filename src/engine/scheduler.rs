//! Per-block scheduler hooks.
//!
//! ## Tasks
//!
//! Run once per block after the block's operations, in this order:
//!
//! 1. [`GameStartupTask`]: created games whose start time has come move to
//!    `started`; their non-live pending bets are refunded.
//! 2. [`GameExpiryTask`]: open games past their auto resolve time are
//!    refunded in full and move to `expired`.
//! 3. [`BetsResolveTask`]: finished games past their resolve time pay out
//!    matched bets and are marked settled.
//!
//! Each task has its own [`Cadence`]. A cadence only records a run once the
//! whole block has been committed, so a rolled back block is retried in full.

use tracing::info;

use crate::config::BettingRules;
use crate::engine::registry::GameRegistry;
use crate::engine::settlement::SettlementEngine;
use crate::error::{BettingError, InvariantError};
use crate::ledger::{AccountService, EventSink};
use crate::store::BettingState;
use crate::types::{GameStatus, PendingBetKind};

/// Everything a task may touch while it runs.
pub struct TaskContext<'a> {
    pub state: &'a mut BettingState,
    pub accounts: &'a mut dyn AccountService,
    pub events: &'a mut dyn EventSink,
    pub rules: &'a BettingRules,
    pub block_num: u64,
    pub now: u64,
}

impl TaskContext<'_> {
    pub fn registry(&mut self) -> GameRegistry<'_> {
        GameRegistry::new(&mut self.state.games, &mut *self.events, self.rules)
    }

    pub fn settlement(&mut self) -> SettlementEngine<'_> {
        SettlementEngine::new(
            &mut self.state.pending,
            &mut self.state.matched,
            &mut *self.accounts,
            &mut *self.events,
        )
    }
}

/// A hook run by the scheduler.
pub trait BlockTask {
    fn name(&self) -> &'static str;

    /// Process every due game.
    ///
    /// # Returns
    ///
    /// Number of games the task acted on.
    fn run(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize, BettingError>;
}

// ============================================================================
// Cadence
// ============================================================================

/// Run every `every` blocks, starting with the first block seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    every: u64,
    last_run: Option<u64>,
}

impl Cadence {
    pub fn every(blocks: u64) -> Self {
        Self {
            every: blocks.max(1),
            last_run: None,
        }
    }

    pub fn is_due(&self, block_num: u64) -> bool {
        match self.last_run {
            None => true,
            Some(last) => block_num >= last.saturating_add(self.every),
        }
    }

    pub fn mark_run(&mut self, block_num: u64) {
        self.last_run = Some(block_num);
    }

    #[inline]
    pub fn last_run(&self) -> Option<u64> {
        self.last_run
    }
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Default)]
pub struct GameStartupTask;

impl BlockTask for GameStartupTask {
    fn name(&self) -> &'static str {
        "game_startup"
    }

    fn run(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize, BettingError> {
        let now = ctx.now;
        let due = ctx
            .state
            .games
            .select(|game| game.status == GameStatus::Created && game.start_time <= now);

        for uuid in &due {
            ctx.registry().set_status(uuid, GameStatus::Started, now)?;
            ctx.settlement()
                .return_pending_bets_of_kind(uuid, PendingBetKind::NonLive)?;
        }
        Ok(due.len())
    }
}

#[derive(Debug, Default)]
pub struct GameExpiryTask;

impl BlockTask for GameExpiryTask {
    fn name(&self) -> &'static str {
        "game_expiry"
    }

    fn run(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize, BettingError> {
        let now = ctx.now;
        let due = ctx.state.games.select(|game| {
            matches!(game.status, GameStatus::Created | GameStatus::Started)
                && game.auto_resolve_time <= now
        });

        for uuid in &due {
            let refunded = ctx.settlement().return_bets(uuid)?;
            ctx.registry().set_status(uuid, GameStatus::Expired, now)?;
            info!(game = %uuid, refunded = %refunded.refunded, "game expired");
        }
        Ok(due.len())
    }
}

#[derive(Debug, Default)]
pub struct BetsResolveTask;

impl BlockTask for BetsResolveTask {
    fn name(&self) -> &'static str {
        "bets_resolve"
    }

    fn run(&mut self, ctx: &mut TaskContext<'_>) -> Result<usize, BettingError> {
        let now = ctx.now;
        let due = ctx.state.games.select(|game| {
            game.status == GameStatus::Finished
                && !game.settled
                && game.bets_resolve_time.is_some_and(|at| at <= now)
        });

        for uuid in &due {
            let winners = ctx
                .state
                .games
                .get_by_uuid(uuid)
                .map(|game| game.results.clone())
                .ok_or(InvariantError::MissingRecord { kind: "game", id: 0 })?;
            ctx.settlement().resolve_matched_bets(uuid, &winners)?;
            ctx.registry().mark_settled(uuid)?;
        }
        Ok(due.len())
    }
}

// ============================================================================
// Scheduler
// ============================================================================

struct ScheduledTask {
    task: Box<dyn BlockTask>,
    cadence: Cadence,
}

/// Ordered list of block tasks, built once.
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    /// The standard startup, expiry and resolve hooks with the configured
    /// cadences.
    pub fn new(rules: &BettingRules) -> Self {
        let mut scheduler = Self::empty();
        scheduler.push(GameStartupTask, Cadence::every(rules.startup_cadence_blocks));
        scheduler.push(GameExpiryTask, Cadence::every(rules.expiry_cadence_blocks));
        scheduler.push(BetsResolveTask, Cadence::every(rules.resolve_cadence_blocks));
        scheduler
    }

    pub fn empty() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Append a task; tasks run in insertion order.
    pub fn push<T: BlockTask + 'static>(&mut self, task: T, cadence: Cadence) {
        self.tasks.push(ScheduledTask {
            task: Box::new(task),
            cadence,
        });
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|t| t.task.name()).collect()
    }

    /// Run every task due at `ctx.block_num`.
    ///
    /// # Returns
    ///
    /// Indices of the tasks that ran, for [`Scheduler::commit`].
    pub fn run(&mut self, ctx: &mut TaskContext<'_>) -> Result<Vec<usize>, BettingError> {
        let mut ran = Vec::new();
        for (index, scheduled) in self.tasks.iter_mut().enumerate() {
            if !scheduled.cadence.is_due(ctx.block_num) {
                continue;
            }
            let games = scheduled.task.run(ctx)?;
            if games > 0 {
                info!(task = scheduled.task.name(), block = ctx.block_num, games, "block task ran");
            }
            ran.push(index);
        }
        Ok(ran)
    }

    /// Record the runs of a committed block.
    pub fn commit(&mut self, block_num: u64, ran: &[usize]) {
        for index in ran {
            if let Some(scheduled) = self.tasks.get_mut(*index) {
                scheduled.cadence.mark_run(block_num);
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
