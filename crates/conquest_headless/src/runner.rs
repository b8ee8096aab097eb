//! Run a match to completion and summarize it.

use serde::{Deserialize, Serialize};

use conquest_core::events::GameEvent;
use conquest_core::game::{Game, GameConfig, MatchOutcome};
use conquest_core::player::PlayerId;

/// How long and how finely to simulate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunBudget {
    /// Stop after this much simulated time even if the match is undecided.
    pub max_seconds: f64,
    /// Seconds per tick.
    pub delta: f64,
}

impl Default for RunBudget {
    fn default() -> Self {
        Self {
            max_seconds: 3600.0,
            delta: 0.05,
        }
    }
}

/// Per-player figures at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Player id (0 is the human).
    pub id: PlayerId,
    /// Whether this is the human faction.
    pub human: bool,
    /// Whether the player still owned bases at the end.
    pub alive: bool,
    /// Final score.
    pub score: u32,
    /// Bases owned at the end.
    pub bases_owned: usize,
    /// Total garrison across owned bases.
    pub total_garrison: f64,
}

/// JSON summary of one headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Seed the match was created from.
    pub seed: u64,
    /// AI handicap level, 0..=4.
    pub difficulty: u8,
    /// Outcome when the run stopped.
    pub outcome: MatchOutcome,
    /// Simulated seconds.
    pub simulated_seconds: f64,
    /// Ticks processed.
    pub ticks: u64,
    /// Attacks declared by anyone.
    pub attacks_declared: u64,
    /// Bases that changed hands by force.
    pub captures: u64,
    /// Unowned bases colonized.
    pub colonizations: u64,
    /// Players eliminated, in elimination order.
    pub eliminations: Vec<PlayerId>,
    /// Final simulation state hash, for determinism checks.
    pub state_hash: u64,
    /// Per-player figures.
    pub players: Vec<PlayerSummary>,
}

/// Create a match from `config` and simulate until it is decided or the
/// budget runs out.
pub fn run_to_summary(
    config: GameConfig,
    budget: RunBudget,
) -> conquest_core::error::Result<MatchSummary> {
    let seed = config.seed;
    let difficulty = config.difficulty.level();
    let mut game = Game::new(config)?;

    let mut attacks_declared = 0u64;
    let mut captures = 0u64;
    let mut colonizations = 0u64;
    let mut eliminations = Vec::new();

    while game.outcome() == MatchOutcome::Playing && game.elapsed() < budget.max_seconds {
        let events = game.tick(budget.delta);
        for event in &events.events {
            match event {
                GameEvent::AttackDeclared { .. } => attacks_declared += 1,
                GameEvent::BaseCaptured { .. } => captures += 1,
                GameEvent::BaseColonized { .. } => colonizations += 1,
                GameEvent::PlayerEliminated { player } => eliminations.push(*player),
                _ => {}
            }
        }
    }

    tracing::info!(
        seed,
        outcome = ?game.outcome(),
        simulated_seconds = game.elapsed(),
        "run finished"
    );

    let players = game
        .players()
        .iter()
        .map(|player| {
            let owned: Vec<_> = game
                .world()
                .bases()
                .iter()
                .filter(|b| b.owner == Some(player.id))
                .collect();
            PlayerSummary {
                id: player.id,
                human: player.is_human(),
                alive: player.alive,
                score: player.score,
                bases_owned: owned.len(),
                total_garrison: owned.iter().map(|b| b.garrison).sum(),
            }
        })
        .collect();

    Ok(MatchSummary {
        seed,
        difficulty,
        outcome: game.outcome(),
        simulated_seconds: game.elapsed(),
        ticks: game.ticks(),
        attacks_declared,
        captures,
        colonizations,
        eliminations,
        state_hash: game.state_hash(),
        players,
    })
}
