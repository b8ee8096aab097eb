//! Match orchestration: creation, the tick loop, and the command surface.
//!
//! `Game` owns the world, the four players, and the match's single random
//! stream. All outside interaction goes through it: the human's requests
//! (select, link, attack, colonize) and the per-frame `tick`. Requests
//! return `bool` for accepted/rejected; `GameError` is reserved for match
//! creation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::base::{BaseId, LINK_RANGE, MIN_ATTACK_GARRISON};
use crate::error::{GameError, Result};
use crate::events::{GameEvent, TickEvents};
use crate::player::{Controller, Player, PlayerId};
use crate::rng::GameRng;
use crate::systems;
use crate::world::World;

/// Player 0 is always the human.
pub const HUMAN_PLAYER: PlayerId = 0;

/// A match always has one human and three AI factions.
pub const NUM_PLAYERS: usize = 4;

/// Seconds between the last faction's elimination and the match ending.
const END_GRACE_SECONDS: f64 = 3.0;

/// Garrison handed to each faction's starting base.
const STARTING_GARRISON: f64 = 10.0;

/// Starting bases are raised to at least this size.
const MIN_STARTING_SIZE: u32 = 5;

/// Garrison moved from the source when colonizing.
const COLONIZE_COST: f64 = 5.0;

/// AI handicap level. Scales only the AI factions' garrison growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// AI grows at half speed.
    Easiest,
    /// AI grows at three-quarter speed.
    Easy,
    /// AI grows at the human's speed.
    #[default]
    Normal,
    /// AI grows 15% faster.
    Hard,
    /// AI grows 30% faster.
    Brutal,
}

impl Difficulty {
    /// Convert a numeric level `0..=4`.
    ///
    /// # Panics
    /// Panics on an out-of-range level; callers validate their input.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Difficulty::Easiest,
            1 => Difficulty::Easy,
            2 => Difficulty::Normal,
            3 => Difficulty::Hard,
            4 => Difficulty::Brutal,
            _ => panic!("difficulty level out of range: {level}"),
        }
    }

    /// The numeric level, inverse of [`Difficulty::from_level`].
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easiest => 0,
            Difficulty::Easy => 1,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::Brutal => 4,
        }
    }

    /// Growth multiplier applied to AI-owned bases.
    #[must_use]
    pub fn ai_growth_modifier(self) -> f64 {
        match self {
            Difficulty::Easiest => 0.5,
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.15,
            Difficulty::Brutal => 1.3,
        }
    }
}

/// Match configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid width in tiles; even, at least 8.
    pub width: u32,
    /// Grid height in tiles; even, at least 8.
    pub height: u32,
    /// Total bases; a positive multiple of 4.
    pub num_bases: usize,
    /// Terrain displacement budget, split across the four quadrants.
    pub terrain_iterations: u32,
    /// Seed for the match's random stream.
    pub seed: u64,
    /// AI handicap.
    pub difficulty: Difficulty,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 96,
            height: 96,
            num_bases: 64,
            terrain_iterations: 1024,
            seed: 12345,
            difficulty: Difficulty::Normal,
        }
    }
}

impl GameConfig {
    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the AI handicap.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Set the grid dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the total base count.
    #[must_use]
    pub fn with_num_bases(mut self, num_bases: usize) -> Self {
        self.num_bases = num_bases;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.width < 8 || self.height < 8 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must be even and at least 8x8, got {}x{}",
                self.width, self.height
            )));
        }
        if self.num_bases == 0 || self.num_bases % 4 != 0 {
            return Err(GameError::InvalidConfig(format!(
                "base count must be a positive multiple of 4, got {}",
                self.num_bases
            )));
        }
        Ok(())
    }
}

/// End state of a match, from the human player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The match is still running.
    #[default]
    Playing,
    /// All three AI factions were eliminated.
    Victory,
    /// The human faction was eliminated.
    Defeat,
}

/// One running match.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    pub(crate) world: World,
    pub(crate) players: Vec<Player>,
    pub(crate) rng: GameRng,
    outcome: MatchOutcome,
    end_timer: f64,
    elapsed: f64,
    ticks: u64,
    pending_events: TickEvents,
}

impl Game {
    /// Create a match: generate terrain, place bases, and hand each of the
    /// four factions a starting base in its own map quadrant.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = GameRng::new(config.seed);
        let mut world = World::generate(&config, &mut rng)?;

        let mut players = Vec::with_capacity(NUM_PLAYERS);
        players.push(Player::human(HUMAN_PLAYER));
        for id in 1..NUM_PLAYERS {
            players.push(Player::ai(id));
        }

        assign_starting_bases(&mut world, &mut players, config.num_bases, &mut rng);

        tracing::info!(
            seed = config.seed,
            difficulty = config.difficulty.level(),
            num_bases = config.num_bases,
            "match created"
        );

        Ok(Self {
            config,
            world,
            players,
            rng,
            outcome: MatchOutcome::Playing,
            end_timer: 0.0,
            elapsed: 0.0,
            ticks: 0,
            pending_events: TickEvents::default(),
        })
    }

    /// Advance the match by `delta` seconds.
    ///
    /// Fixed order: base systems in id order, then AI drivers, then
    /// elimination checks, then the end-of-match timer. Returns every
    /// event since the previous tick, including those produced by human
    /// requests in between.
    pub fn tick(&mut self, delta: f64) -> TickEvents {
        debug_assert!(delta >= 0.0);

        let mut events = std::mem::take(&mut self.pending_events);

        systems::run_base_ticks(
            &mut self.world,
            &mut self.players,
            self.config.difficulty,
            delta,
            &mut events,
        );

        for id in 0..self.players.len() {
            let mut controller = std::mem::take(&mut self.players[id].controller);
            if let Controller::Ai(ref mut driver) = controller {
                driver.tick(self, id, delta, &mut events);
            }
            self.players[id].controller = controller;
        }

        self.check_alive(&mut events);
        self.check_match_end(delta, &mut events);

        self.ticks += 1;
        self.elapsed += delta;
        events
    }

    // --- Human command surface ---------------------------------------

    /// Select one of the human's bases.
    pub fn select_base(&mut self, id: BaseId) -> bool {
        if self.world.base(id).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
            return false;
        }
        self.players[HUMAN_PLAYER].selected_base = Some(id);
        true
    }

    /// Clear the human's selection.
    pub fn deselect(&mut self) {
        self.players[HUMAN_PLAYER].selected_base = None;
    }

    /// Link `src` to `dst`, toggle an existing link off, or break a link
    /// pointing back from `dst`. A source already linked elsewhere must be
    /// toggled off first; the request never retargets a live link.
    pub fn request_link(&mut self, src: BaseId, dst: BaseId) -> bool {
        if src == dst || self.world.base(dst).is_none() {
            return false;
        }
        if self.world.base(src).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
            return false;
        }

        match self.world.base(src).unwrap().link_target {
            Some(existing) if existing == dst => return self.world.set_link(src, None),
            Some(_) => return false,
            None => {}
        }
        if self.world.base(dst).unwrap().link_target == Some(src) {
            return self.world.set_link(dst, None);
        }
        if self.world.distance_between(src, dst) > LINK_RANGE {
            return false;
        }
        self.world.set_link(src, Some(dst))
    }

    /// Clear `src`'s outgoing link.
    pub fn request_unlink(&mut self, src: BaseId) -> bool {
        if self.world.base(src).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
            return false;
        }
        self.world.set_link(src, None)
    }

    /// Declare an attack from `src` on `dst`, or call off the outstanding
    /// attack when `dst` is already the target (the defender scores the
    /// reprieve). A declaration on a different target while one is
    /// outstanding is rejected.
    pub fn request_attack(&mut self, src: BaseId, dst: BaseId) -> bool {
        if src == dst || self.world.base(dst).is_none() {
            return false;
        }
        if self.world.base(src).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
            return false;
        }
        if self.world.distance_between(src, dst) > LINK_RANGE {
            return false;
        }

        if self.world.base(src).unwrap().attack_target == Some(dst) {
            if let Some(defender) = self.world.base(dst).unwrap().owner {
                self.players[defender].score += 1;
            }
            self.world.base_mut(src).unwrap().clear_attack();
            self.pending_events.push(GameEvent::AttackCalledOff {
                attacker: src,
                target: dst,
            });
            return true;
        }

        let mut events = std::mem::take(&mut self.pending_events);
        let accepted = self.declare_attack(src, dst, &mut events);
        self.pending_events = events;
        accepted
    }

    /// Colonize the unowned base `dst` from the human base `src`.
    pub fn request_colonize(&mut self, src: BaseId, dst: BaseId) -> bool {
        if src == dst || self.world.base(dst).is_none() {
            return false;
        }
        if self.world.base(src).and_then(|b| b.owner) != Some(HUMAN_PLAYER) {
            return false;
        }
        if self.world.base(src).unwrap().garrison <= MIN_ATTACK_GARRISON {
            return false;
        }
        if self.world.distance_between(src, dst) > LINK_RANGE {
            return false;
        }

        let mut events = std::mem::take(&mut self.pending_events);
        let accepted = self.colonize(dst, HUMAN_PLAYER, src, &mut events);
        self.pending_events = events;
        accepted
    }

    // --- Queries ------------------------------------------------------

    /// The world: terrain and bases.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// All players in id order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Player lookup by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// The match configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current end state.
    #[must_use]
    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Ticks processed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Hash of the full simulation state, for determinism testing.
    /// Floats are hashed by their bit patterns.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.ticks.hash(&mut hasher);
        self.elapsed.to_bits().hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        self.end_timer.to_bits().hash(&mut hasher);
        self.rng.state().hash(&mut hasher);

        for base in self.world.bases() {
            base.id.hash(&mut hasher);
            base.position.hash(&mut hasher);
            base.size.hash(&mut hasher);
            base.defense_value.hash(&mut hasher);
            base.garrison.to_bits().hash(&mut hasher);
            base.owner.hash(&mut hasher);
            base.link_target.hash(&mut hasher);
            base.attack_target.hash(&mut hasher);
            base.attack_roll.hash(&mut hasher);
            base.defense_roll.hash(&mut hasher);
        }

        for player in &self.players {
            player.alive.hash(&mut hasher);
            player.score.hash(&mut hasher);
            player.selected_base.hash(&mut hasher);
            player.home_base.hash(&mut hasher);
        }

        hasher.finish()
    }

    // --- Internals shared with the AI driver --------------------------

    /// Declare an attack, fixing both combat rolls. Rejected when the
    /// target shares the source's owner, the source garrison is below the
    /// attack floor, or the source is linked or already attacking.
    pub(crate) fn declare_attack(
        &mut self,
        src: BaseId,
        dst: BaseId,
        events: &mut TickEvents,
    ) -> bool {
        if self.world.base(dst).unwrap().owner == self.world.base(src).unwrap().owner {
            return false;
        }
        let source = self.world.base(src).unwrap();
        if source.garrison < MIN_ATTACK_GARRISON || source.is_linked() || source.is_attacking() {
            return false;
        }

        let attack_roll = self.rng.combat_roll();
        let defense_roll = self.rng.combat_roll() + self.world.base(dst).unwrap().defense_value;

        let source = self.world.base_mut(src).unwrap();
        source.attack_target = Some(dst);
        source.attack_roll = attack_roll;
        source.defense_roll = defense_roll;

        tracing::debug!(attacker = src, target = dst, attack_roll, defense_roll, "attack declared");
        events.push(GameEvent::AttackDeclared {
            attacker: src,
            target: dst,
        });
        true
    }

    /// Take an unowned base for `player`, paying from `source`.
    pub(crate) fn colonize(
        &mut self,
        target: BaseId,
        player: PlayerId,
        source: BaseId,
        events: &mut TickEvents,
    ) -> bool {
        if self.world.base(target).unwrap().owner.is_some() {
            return false;
        }
        if self.world.base(source).unwrap().garrison < MIN_ATTACK_GARRISON {
            return false;
        }

        self.players[player].score += 1;
        let colonized = self.world.base_mut(target).unwrap();
        colonized.owner = Some(player);
        colonized.garrison = COLONIZE_COST;
        self.world.base_mut(source).unwrap().garrison -= COLONIZE_COST;

        tracing::debug!(base = target, owner = player, source, "base colonized");
        events.push(GameEvent::BaseColonized {
            base: target,
            owner: player,
            source,
        });
        true
    }

    // --- Tick phases ---------------------------------------------------

    /// A player with zero bases is out of the match.
    fn check_alive(&mut self, events: &mut TickEvents) {
        for player in &mut self.players {
            if !player.alive {
                continue;
            }
            let owns_any = self
                .world
                .bases()
                .iter()
                .any(|b| b.owner == Some(player.id));
            if !owns_any {
                player.alive = false;
                tracing::info!(player = player.id, "player eliminated");
                events.push(GameEvent::PlayerEliminated { player: player.id });
            }
        }
    }

    /// End the match a grace period after the deciding elimination, so the
    /// final capture is visible before the result.
    fn check_match_end(&mut self, delta: f64, events: &mut TickEvents) {
        if self.outcome != MatchOutcome::Playing {
            return;
        }
        let human_dead = !self.players[HUMAN_PLAYER].alive;
        let ais_dead = self.players[1..].iter().all(|p| !p.alive);
        if !human_dead && !ais_dead {
            return;
        }

        if self.end_timer < END_GRACE_SECONDS {
            self.end_timer += delta;
            return;
        }

        self.outcome = if human_dead {
            MatchOutcome::Defeat
        } else {
            MatchOutcome::Victory
        };
        tracing::info!(outcome = ?self.outcome, elapsed = self.elapsed, "match ended");
        events.push(GameEvent::MatchEnded {
            outcome: self.outcome,
        });
    }
}

/// Hand each quadrant's id range one starting base, owned by a distinct
/// randomly drawn player. Quadrant `q` covers ids
/// `q * (num_bases/4) .. (q+1) * (num_bases/4)`.
fn assign_starting_bases(
    world: &mut World,
    players: &mut [Player],
    num_bases: usize,
    rng: &mut GameRng,
) {
    let mut order: Vec<PlayerId> = Vec::with_capacity(NUM_PLAYERS);
    while order.len() < NUM_PLAYERS {
        let candidate = rng.next_below(NUM_PLAYERS as u64) as usize;
        if !order.contains(&candidate) {
            order.push(candidate);
        }
    }

    let per_quadrant = num_bases / 4;
    for (quadrant, &player) in order.iter().enumerate() {
        let id = quadrant * per_quadrant + rng.next_below(per_quadrant as u64) as usize;
        let base = world.base_mut(id).unwrap();
        base.owner = Some(player);
        base.size = base.size.max(MIN_STARTING_SIZE);
        base.garrison = STARTING_GARRISON;

        if players[player].is_human() {
            players[player].home_base = Some(id);
        }
        tracing::debug!(player, base = id, quadrant, "starting base assigned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::GARRISON_CAP;
    use crate::world::distance;

    fn new_game(seed: u64) -> Game {
        Game::new(GameConfig::default().with_seed(seed)).expect("match creation")
    }

    /// Find a human base and a nearby unowned base within link range.
    fn human_base_with_unowned_neighbor(game: &Game) -> (BaseId, BaseId) {
        for base in game.world().bases() {
            if base.owner != Some(HUMAN_PLAYER) {
                continue;
            }
            for &other in &game.world().nearby_bases(base.id, LINK_RANGE) {
                if game.world().base(other).unwrap().owner.is_none() {
                    return (base.id, other);
                }
            }
        }
        panic!("expected an unowned base near the human start");
    }

    #[test]
    fn new_match_has_four_factions_in_four_quadrants() {
        let game = new_game(42);
        assert_eq!(game.players().len(), NUM_PLAYERS);
        assert!(game.player(HUMAN_PLAYER).unwrap().is_human());
        assert!(game.players()[1..].iter().all(|p| !p.is_human()));

        let owned: Vec<_> = game
            .world()
            .bases()
            .iter()
            .filter(|b| b.owner.is_some())
            .collect();
        assert_eq!(owned.len(), NUM_PLAYERS);

        let per_quadrant = game.config().num_bases / 4;
        let mut owners = Vec::new();
        let mut quadrants = Vec::new();
        for base in &owned {
            assert!(base.size >= MIN_STARTING_SIZE);
            assert!((base.garrison - STARTING_GARRISON).abs() < f64::EPSILON);
            owners.push(base.owner.unwrap());
            quadrants.push(base.id / per_quadrant);
        }
        owners.sort_unstable();
        quadrants.sort_unstable();
        assert_eq!(owners, vec![0, 1, 2, 3], "each player starts once");
        assert_eq!(quadrants, vec![0, 1, 2, 3], "one start per quadrant");

        let home = game.player(HUMAN_PLAYER).unwrap().home_base.unwrap();
        assert_eq!(game.world().base(home).unwrap().owner, Some(HUMAN_PLAYER));
    }

    #[test]
    fn difficulty_levels_round_trip() {
        for level in 0..=4 {
            assert_eq!(Difficulty::from_level(level).level(), level);
        }
        assert!((Difficulty::Easiest.ai_growth_modifier() - 0.5).abs() < f64::EPSILON);
        assert!((Difficulty::Brutal.ai_growth_modifier() - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "difficulty level out of range")]
    fn difficulty_level_out_of_range_panics() {
        let _ = Difficulty::from_level(5);
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        assert!(Game::new(GameConfig::default().with_dimensions(7, 96)).is_err());
        assert!(Game::new(GameConfig::default().with_dimensions(96, 91)).is_err());
        assert!(Game::new(GameConfig::default().with_num_bases(0)).is_err());
        assert!(Game::new(GameConfig::default().with_num_bases(30)).is_err());
    }

    #[test]
    fn selection_only_accepts_own_bases() {
        let mut game = new_game(42);
        let home = game.player(HUMAN_PLAYER).unwrap().home_base.unwrap();
        let enemy = game
            .world()
            .bases()
            .iter()
            .find(|b| b.owner.is_some() && b.owner != Some(HUMAN_PLAYER))
            .unwrap()
            .id;

        assert!(!game.select_base(enemy));
        assert!(game.select_base(home));
        assert_eq!(game.player(HUMAN_PLAYER).unwrap().selected_base, Some(home));
        game.deselect();
        assert_eq!(game.player(HUMAN_PLAYER).unwrap().selected_base, None);
    }

    #[test]
    fn colonize_moves_five_and_scores_one() {
        let mut game = new_game(42);
        let (src, dst) = human_base_with_unowned_neighbor(&game);
        game.world.base_mut(src).unwrap().garrison = 20.0;

        assert!(game.request_colonize(src, dst));
        assert!((game.world().base(src).unwrap().garrison - 15.0).abs() < f64::EPSILON);
        let colonized = game.world().base(dst).unwrap();
        assert_eq!(colonized.owner, Some(HUMAN_PLAYER));
        assert!((colonized.garrison - 5.0).abs() < f64::EPSILON);
        assert_eq!(game.player(HUMAN_PLAYER).unwrap().score, 1);

        // The colony is taken; a second request is rejected.
        assert!(!game.request_colonize(src, dst));
    }

    #[test]
    fn colonize_requires_garrison_above_floor() {
        let mut game = new_game(42);
        let (src, dst) = human_base_with_unowned_neighbor(&game);
        game.world.base_mut(src).unwrap().garrison = 10.0;
        assert!(!game.request_colonize(src, dst));
    }

    #[test]
    fn link_toggles_and_clears_reverse_links() {
        let mut game = new_game(42);
        let (src, dst) = human_base_with_unowned_neighbor(&game);
        game.world.base_mut(dst).unwrap().owner = Some(HUMAN_PLAYER);

        assert!(game.request_link(src, dst));
        assert_eq!(game.world().base(src).unwrap().link_target, Some(dst));

        // Same request again toggles the link off.
        assert!(game.request_link(src, dst));
        assert_eq!(game.world().base(src).unwrap().link_target, None);

        // A link pointing back is cleared rather than mirrored.
        assert!(game.request_link(dst, src));
        assert!(game.request_link(src, dst));
        assert_eq!(game.world().base(dst).unwrap().link_target, None);
        assert_eq!(game.world().base(src).unwrap().link_target, None);
    }

    #[test]
    fn link_request_never_retargets_a_live_link() {
        let mut game = new_game(42);
        let (src, first) = human_base_with_unowned_neighbor(&game);
        let second = game
            .world()
            .nearby_bases(src, LINK_RANGE)
            .into_iter()
            .find(|&b| b != first)
            .unwrap();
        game.world.base_mut(first).unwrap().owner = Some(HUMAN_PLAYER);
        game.world.base_mut(second).unwrap().owner = Some(HUMAN_PLAYER);

        assert!(game.request_link(src, first));
        assert!(
            !game.request_link(src, second),
            "a live link must be toggled off first"
        );
        assert_eq!(game.world().base(src).unwrap().link_target, Some(first));

        assert!(game.request_link(src, first), "toggle off");
        assert!(game.request_link(src, second));
        assert_eq!(game.world().base(src).unwrap().link_target, Some(second));
    }

    #[test]
    fn attack_declaration_fixes_rolls_and_rejects_seconds() {
        let mut game = new_game(42);
        let (src, target) = human_base_with_unowned_neighbor(&game);
        game.world.base_mut(src).unwrap().garrison = 100.0;
        let defense_value = 3;
        game.world.base_mut(target).unwrap().owner = Some(2);
        game.world.base_mut(target).unwrap().defense_value = defense_value;

        assert!(game.request_attack(src, target));
        let attacker = game.world().base(src).unwrap();
        assert_eq!(attacker.attack_target, Some(target));
        assert!((1..=16).contains(&attacker.attack_roll));
        assert!((1 + defense_value..=16 + defense_value).contains(&attacker.defense_roll));

        // Another declaration while this one is outstanding is rejected.
        let other = game
            .world()
            .nearby_bases(src, LINK_RANGE)
            .into_iter()
            .find(|&b| b != target)
            .unwrap();
        game.world.base_mut(other).unwrap().owner = Some(3);
        assert!(!game.request_attack(src, other));

        // Re-requesting the current target calls the attack off and the
        // defender scores.
        assert!(game.request_attack(src, target));
        assert_eq!(game.world().base(src).unwrap().attack_target, None);
        assert_eq!(game.player(2).unwrap().score, 1);
    }

    #[test]
    fn attack_rejected_when_linked_or_weak() {
        let mut game = new_game(42);
        let (src, helper) = human_base_with_unowned_neighbor(&game);
        let target = game
            .world()
            .nearby_bases(src, LINK_RANGE)
            .into_iter()
            .find(|&b| b != helper)
            .unwrap();
        game.world.base_mut(target).unwrap().owner = Some(1);
        game.world.base_mut(helper).unwrap().owner = Some(HUMAN_PLAYER);

        game.world.base_mut(src).unwrap().garrison = 5.0;
        assert!(!game.request_attack(src, target), "below the attack floor");

        game.world.base_mut(src).unwrap().garrison = 100.0;
        assert!(game.request_link(src, helper));
        assert!(!game.request_attack(src, target), "linked bases cannot attack");

        assert!(game.request_unlink(src));
        assert!(game.request_attack(src, target));
    }

    #[test]
    fn events_from_requests_arrive_with_the_next_tick() {
        let mut game = new_game(42);
        let (src, dst) = human_base_with_unowned_neighbor(&game);
        game.world.base_mut(src).unwrap().garrison = 20.0;
        assert!(game.request_colonize(src, dst));

        let events = game.tick(0.01);
        assert!(events
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BaseColonized { base, .. } if *base == dst)));
    }

    #[test]
    fn victory_after_grace_period() {
        let mut game = new_game(42);
        for id in 0..game.world.num_bases() {
            let base = game.world.base_mut(id).unwrap();
            if base.owner.is_some() && base.owner != Some(HUMAN_PLAYER) {
                base.owner = None;
            }
        }

        let events = game.tick(1.0);
        let eliminated = events
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlayerEliminated { .. }))
            .count();
        assert_eq!(eliminated, 3);
        assert_eq!(game.outcome(), MatchOutcome::Playing);

        game.tick(1.0);
        game.tick(1.0);
        assert_eq!(game.outcome(), MatchOutcome::Playing, "grace period holds");

        let events = game.tick(1.0);
        assert_eq!(game.outcome(), MatchOutcome::Victory);
        assert!(events
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::MatchEnded { outcome: MatchOutcome::Victory })));

        // The outcome is latched; further ticks change nothing.
        let events = game.tick(1.0);
        assert!(!events
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::MatchEnded { .. })));
        assert_eq!(game.outcome(), MatchOutcome::Victory);
    }

    #[test]
    fn defeat_when_human_is_eliminated() {
        let mut game = new_game(42);
        for id in 0..game.world.num_bases() {
            let base = game.world.base_mut(id).unwrap();
            if base.owner == Some(HUMAN_PLAYER) {
                base.owner = Some(1);
            }
        }

        for _ in 0..4 {
            game.tick(1.0);
        }
        assert_eq!(game.outcome(), MatchOutcome::Defeat);
        assert!(!game.player(HUMAN_PLAYER).unwrap().alive);
    }

    #[test]
    fn garrisons_stay_bounded_over_a_long_run() {
        let mut game = new_game(7);
        for _ in 0..2000 {
            game.tick(0.25);
            for base in game.world().bases() {
                assert!(
                    base.garrison <= GARRISON_CAP,
                    "garrison above cap at base {}",
                    base.id
                );
                assert!(
                    base.garrison >= 0.0,
                    "garrison below zero at base {}",
                    base.id
                );
            }
        }
    }

    #[test]
    fn same_seed_same_history() {
        let config = GameConfig::default().with_seed(99);
        let mut a = Game::new(config.clone()).unwrap();
        let mut b = Game::new(config).unwrap();
        for _ in 0..200 {
            a.tick(0.1);
            b.tick(0.1);
        }
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn different_seeds_different_worlds() {
        let a = new_game(1);
        let b = new_game(2);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn distance_metric_on_real_bases() {
        let game = new_game(42);
        let bases = game.world().bases();
        for a in bases.iter().take(8) {
            for b in bases.iter().take(8) {
                assert_eq!(
                    distance(a.position, b.position),
                    distance(b.position, a.position)
                );
                if a.id == b.id {
                    assert_eq!(distance(a.position, b.position), 0);
                }
            }
        }
    }
}
