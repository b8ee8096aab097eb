//! Events emitted by the simulation each tick.
//!
//! The core never talks to a presentation layer directly; anything a UI
//! would react to (sounds, notifications, end-of-match screens) is
//! reported here and consumed by the caller.

use serde::{Deserialize, Serialize};

use crate::base::BaseId;
use crate::game::MatchOutcome;
use crate::player::PlayerId;

/// A notable state change during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A base opened an attack on another.
    AttackDeclared {
        /// Attacking base.
        attacker: BaseId,
        /// Base under attack.
        target: BaseId,
    },
    /// The human called off an outstanding attack.
    AttackCalledOff {
        /// Attacking base.
        attacker: BaseId,
        /// Base that was under attack.
        target: BaseId,
    },
    /// A defended base fell and changed hands.
    BaseCaptured {
        /// The captured base.
        base: BaseId,
        /// Its new owner.
        new_owner: PlayerId,
        /// The base whose attack resolved.
        attacker: BaseId,
    },
    /// An attack ran the attacker down to the garrison floor and ended.
    AttackAbandoned {
        /// Attacking base that gave up.
        attacker: BaseId,
        /// Base that held.
        target: BaseId,
    },
    /// An unowned base was colonized.
    BaseColonized {
        /// The colonized base.
        base: BaseId,
        /// Its new owner.
        owner: PlayerId,
        /// Base that supplied the colonists.
        source: BaseId,
    },
    /// A player lost their last base.
    PlayerEliminated {
        /// The eliminated player.
        player: PlayerId,
    },
    /// The match ended.
    MatchEnded {
        /// Final outcome from the human player's perspective.
        outcome: MatchOutcome,
    },
}

/// All events produced by one call to `Game::tick`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickEvents {
    /// Events in the order they occurred.
    pub events: Vec<GameEvent>,
}

impl TickEvents {
    /// Whether nothing notable happened this tick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
