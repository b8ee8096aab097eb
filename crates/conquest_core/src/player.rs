//! Faction state.

use serde::{Deserialize, Serialize};

use crate::ai::AiDriver;
use crate::base::BaseId;

/// Stable index of a player in the match's player list.
pub type PlayerId = usize;

/// Who issues commands for a faction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Controller {
    /// Commands arrive through the orchestrator's request methods.
    #[default]
    Human,
    /// Commands are issued by the heuristic driver each decision interval.
    Ai(AiDriver),
}

/// One faction in a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Arena index, equal to this player's position in the match list.
    pub id: PlayerId,
    /// Command source.
    pub controller: Controller,
    /// False once the player owns zero bases.
    pub alive: bool,
    /// Monotonically non-decreasing score.
    pub score: u32,
    /// The human's currently selected base, cleared when it changes hands.
    pub selected_base: Option<BaseId>,
    /// The human's home base, recomputed when captured.
    pub home_base: Option<BaseId>,
}

impl Player {
    /// Create a human-controlled player.
    #[must_use]
    pub fn human(id: PlayerId) -> Self {
        Self {
            id,
            controller: Controller::Human,
            alive: true,
            score: 0,
            selected_base: None,
            home_base: None,
        }
    }

    /// Create an AI-controlled player.
    #[must_use]
    pub fn ai(id: PlayerId) -> Self {
        Self {
            controller: Controller::Ai(AiDriver::new()),
            ..Self::human(id)
        }
    }

    /// Whether this player is human-controlled.
    #[must_use]
    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human)
    }
}
