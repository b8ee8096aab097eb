//! Per-tick base systems: growth, reinforcement, and combat.
//!
//! Bases are processed in id order. Each owned base grows its garrison,
//! drains garrison along its supply link, then fights its outstanding
//! attack. All rates scale with the elapsed seconds `delta`, so the
//! simulation is frame-rate independent.

use crate::base::{BaseId, GARRISON_CAP, MIN_ATTACK_GARRISON};
use crate::events::{GameEvent, TickEvents};
use crate::game::{Difficulty, HUMAN_PLAYER};
use crate::player::Player;
use crate::world::World;

/// Garrison fraction moved per second along a link at the given distance.
/// 25% up to distance 6, falling linearly to 5% at distance 24.
#[must_use]
pub fn reinforcement_fraction(distance: u32) -> f64 {
    if distance <= 6 {
        0.25
    } else {
        0.25 - (0.2 / 18.0) * f64::from(distance - 6)
    }
}

/// Garrison fraction committed per second to an attack at the given
/// distance. 100% up to distance 6, falling linearly to 25% at distance 24.
#[must_use]
pub fn attack_fraction(distance: u32) -> f64 {
    if distance <= 6 {
        1.0
    } else {
        1.0 - (0.75 / 18.0) * f64::from(distance - 6)
    }
}

/// Run one tick for every base, in id order.
pub fn run_base_ticks(
    world: &mut World,
    players: &mut [Player],
    difficulty: Difficulty,
    delta: f64,
    events: &mut TickEvents,
) {
    for id in 0..world.num_bases() {
        tick_base(world, players, difficulty, delta, id, events);

        // A base the human had selected may have just changed hands.
        if let Some(selected) = players[HUMAN_PLAYER].selected_base {
            if world.base(selected).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
                players[HUMAN_PLAYER].selected_base = None;
            }
        }
    }
}

fn tick_base(
    world: &mut World,
    players: &mut [Player],
    difficulty: Difficulty,
    delta: f64,
    id: BaseId,
    events: &mut TickEvents,
) {
    let Some(owner) = world.base(id).and_then(|b| b.owner) else {
        return;
    };

    grow(world, players, difficulty, delta, id, owner);
    reinforce(world, delta, id, owner);
    fight(world, players, delta, id, owner, events);
}

fn grow(
    world: &mut World,
    players: &[Player],
    difficulty: Difficulty,
    delta: f64,
    id: BaseId,
    owner: usize,
) {
    let modifier = if players[owner].is_human() {
        1.0
    } else {
        difficulty.ai_growth_modifier()
    };
    let base = world.base_mut(id).unwrap();
    let grown = delta * f64::from(base.size) / 10.0 * modifier;
    if base.garrison + grown > GARRISON_CAP {
        base.garrison = GARRISON_CAP;
    } else {
        base.garrison += grown;
    }
}

fn reinforce(world: &mut World, delta: f64, id: BaseId, owner: usize) {
    let Some(target) = world.base(id).unwrap().link_target else {
        return;
    };

    // Link silently dissolves when the far end changes hands.
    if world.base(target).unwrap().owner != Some(owner) {
        world.base_mut(id).unwrap().link_target = None;
        return;
    }

    let dist = world.distance_between(id, target);
    let available = world.base(id).unwrap().garrison;
    // A long tick can ask for more than 100% of the garrison.
    let moved = (available * reinforcement_fraction(dist) * delta).min(available);
    if world.base(target).unwrap().garrison + moved < GARRISON_CAP {
        world.base_mut(id).unwrap().garrison -= moved;
        world.base_mut(target).unwrap().garrison += moved;
    }
}

fn fight(
    world: &mut World,
    players: &mut [Player],
    delta: f64,
    id: BaseId,
    owner: usize,
    events: &mut TickEvents,
) {
    let Some(target) = world.base(id).unwrap().attack_target else {
        return;
    };

    // The target may have been captured by a friendly base this tick.
    if world.base(target).unwrap().owner == Some(owner) {
        world.base_mut(id).unwrap().clear_attack();
        return;
    }

    let attacker = world.base(id).unwrap();
    let ratio =
        (4.0 + f64::from(attacker.attack_roll)) / (4.0 + f64::from(attacker.defense_roll));
    let dist = world.distance_between(id, target);
    let mut committed = attacker.garrison * attack_fraction(dist) * delta;
    if committed >= attacker.garrison - MIN_ATTACK_GARRISON {
        committed = attacker.garrison - 9.9;
    }

    world.base_mut(id).unwrap().garrison -= committed;
    world.base_mut(target).unwrap().garrison -= committed * ratio;

    if world.base(target).unwrap().garrison <= 0.0 {
        capture(world, players, id, target, owner, events);
    } else if world.base(id).unwrap().garrison <= MIN_ATTACK_GARRISON {
        // Too weak to press on. The defender's owner scores the hold.
        if let Some(defender) = world.base(target).unwrap().owner {
            players[defender].score += 1;
        }
        world.base_mut(id).unwrap().clear_attack();
        events.push(GameEvent::AttackAbandoned {
            attacker: id,
            target,
        });
    }
}

fn capture(
    world: &mut World,
    players: &mut [Player],
    id: BaseId,
    target: BaseId,
    owner: usize,
    events: &mut TickEvents,
) {
    players[owner].score += 3;

    let half = world.base(id).unwrap().garrison * 0.5;
    let captured = world.base_mut(target).unwrap();
    captured.clear_attack();
    captured.owner = Some(owner);
    captured.link_target = None;
    captured.garrison = half;
    world.base_mut(id).unwrap().garrison = half;
    world.base_mut(id).unwrap().clear_attack();

    if players[HUMAN_PLAYER].home_base == Some(target) {
        find_new_home_base(world, &mut players[HUMAN_PLAYER]);
    }

    tracing::debug!(base = target, new_owner = owner, attacker = id, "base captured");
    events.push(GameEvent::BaseCaptured {
        base: target,
        new_owner: owner,
        attacker: id,
    });
}

/// Re-point a player's home base at their largest owned base, or `None`
/// if they own nothing.
pub fn find_new_home_base(world: &World, player: &mut Player) {
    let largest = world
        .bases()
        .iter()
        .filter(|b| b.owner == Some(player.id))
        .max_by_key(|b| b.size)
        .map(|b| b.id);
    player.home_base = largest;
}
