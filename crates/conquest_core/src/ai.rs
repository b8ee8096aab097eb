//! Heuristic driver for computer-controlled factions.
//!
//! The driver wakes on a fixed decision interval and walks its player's
//! bases in id order. A base that is fighting (either direction) pulls
//! reinforcement links from its quiet neighbors; an idle base tries to
//! colonize the closest unowned neighbor, rolls for attacks on nearby
//! enemies, and occasionally drops a link it no longer needs. The driver
//! issues the same commands a human would; it gets no extra information
//! and no shortcuts around the relation rules.

use serde::{Deserialize, Serialize};

use crate::base::{BaseId, LINK_RANGE, MIN_ATTACK_GARRISON};
use crate::events::TickEvents;
use crate::game::Game;
use crate::player::PlayerId;

/// Seconds between decision passes.
pub const DECISION_INTERVAL: f64 = 8.0;
/// One-in-N roll to attack a nearby enemy base.
const CHANCE_TO_ATTACK: u64 = 20;
/// Colonization gate: passes unless a draw in 0..4 lands on 0.
const COLONIZE_GATE: u64 = 4;
/// One-in-N roll to reconsider an existing link.
const CHANCE_TO_UNLINK: u64 = 2;

/// Decision state for one AI player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiDriver {
    timer: f64,
}

impl AiDriver {
    /// Create a driver that makes its first decision one interval in.
    #[must_use]
    pub fn new() -> Self {
        Self { timer: 0.0 }
    }

    /// Accumulate elapsed time and run a decision pass at each interval.
    pub(crate) fn tick(
        &mut self,
        game: &mut Game,
        player: PlayerId,
        delta: f64,
        events: &mut TickEvents,
    ) {
        self.timer += delta;
        if self.timer < DECISION_INTERVAL {
            return;
        }
        tracing::debug!(player, "ai decision pass");
        check_bases(game, player, events);
        self.timer = 0.0;
    }
}

fn check_bases(game: &mut Game, player: PlayerId, events: &mut TickEvents) {
    for id in 0..game.world.num_bases() {
        if game.world.base(id).and_then(|b| b.owner) == Some(player) {
            manage_base(game, player, id, events);
        }
    }
}

fn manage_base(game: &mut Game, player: PlayerId, id: BaseId, events: &mut TickEvents) {
    // Too few soldiers to do anything useful.
    if game.world.base(id).unwrap().garrison < MIN_ATTACK_GARRISON {
        return;
    }

    let nearby = game.world.nearby_bases(id, LINK_RANGE);
    if nearby.is_empty() {
        return;
    }

    if game.world.base(id).unwrap().is_attacking() || game.world.is_base_attacked(id) {
        // Fighting: gather strength here and stop feeding anyone else.
        pull_links_toward(game, id, &nearby);
        game.world.set_link(id, None);
    } else {
        check_bases_to_colonize(game, player, id, &nearby, events);
        check_bases_to_attack(game, player, id, &nearby, events);
        maybe_unlink(game, player, id);
    }
}

/// Point every quiet nearby base's link at `id`. Owner validation inside
/// `set_link` silently filters out enemy bases.
fn pull_links_toward(game: &mut Game, id: BaseId, nearby: &[BaseId]) {
    for &other in nearby {
        if !game.world.base(other).unwrap().is_attacking() && !game.world.is_base_attacked(other) {
            game.world.set_link(other, Some(id));
        }
    }
}

fn check_bases_to_colonize(
    game: &mut Game,
    player: PlayerId,
    id: BaseId,
    nearby: &[BaseId],
    events: &mut TickEvents,
) {
    // A linked base is already committed elsewhere.
    if game.world.base(id).unwrap().is_linked() {
        return;
    }

    for _ in 0..nearby.len() {
        // Closest unowned neighbor, scanning from the head of the list.
        let mut closest = nearby[0];
        for &candidate in nearby {
            if game.world.base(candidate).unwrap().owner.is_none()
                && game.world.distance_between(id, candidate)
                    < game.world.distance_between(id, closest)
            {
                closest = candidate;
            }
        }

        // The gate draw happens every round, taken or not.
        if game.rng.next_below(COLONIZE_GATE) != 0
            && game.world.base(closest).unwrap().owner.is_none()
        {
            game.colonize(closest, player, id, events);
            return;
        }
    }
}

fn check_bases_to_attack(
    game: &mut Game,
    player: PlayerId,
    id: BaseId,
    nearby: &[BaseId],
    events: &mut TickEvents,
) {
    for &target in nearby {
        let Some(target_owner) = game.world.base(target).unwrap().owner else {
            continue;
        };
        if target_owner == player {
            continue;
        }

        // Piling onto a contested base is less attractive.
        let chance = if game.world.is_base_attacked(target) {
            CHANCE_TO_ATTACK * 2
        } else {
            CHANCE_TO_ATTACK
        };

        if game.rng.chance(chance) {
            game.declare_attack(id, target, events);
            pull_links_toward(game, id, nearby);
        }
    }
}

fn maybe_unlink(game: &mut Game, player: PlayerId, id: BaseId) {
    if game.world.is_base_attacked(id) {
        game.world.set_link(id, None);
        return;
    }

    let Some(link) = game.world.base(id).unwrap().link_target else {
        return;
    };
    if game.world.is_base_attacked(link) || !game.rng.chance(CHANCE_TO_UNLINK) {
        return;
    }

    // Keep the link only while the whole map is friendly.
    let enemy_exists = game
        .world
        .bases()
        .iter()
        .any(|b| b.owner.is_some() && b.owner != Some(player));
    if enemy_exists {
        game.world.set_link(id, None);
    }
}
