//! World state
//!
//! Everything a run needs to be reproduced lives here: the seed, the RNG
//! stream, the entity arena and the tuning it runs under.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::BotBrain;
use super::arena::{Arena, EntityId};
use super::entity::{
    Entity, EntityKind, FloatingText, Particle, Pilot, PowerUpKind, PropKind, VoidAgent,
};
use super::growth::{Upgrade, apply_upgrade};
use super::pedestrian::Walker;
use super::pursuit::EnforcerBrain;
use crate::tuning::{Tuning, TuningError};
use crate::{hash_jitter, heading};

/// Maximum live particles; bursts beyond this are dropped
pub const MAX_PARTICLES: usize = 256;

/// Debris radius
pub const PARTICLE_RADIUS: f32 = 3.0;

/// Upward drift of floating text (pixels/s)
pub const TEXT_RISE_SPEED: f32 = 40.0;

/// Role shown in standings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Bot,
    Enforcer,
}

/// One row of the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub id: EntityId,
    pub name: String,
    pub role: Role,
    pub score: f32,
    pub radius: f32,
    pub level: u32,
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Gameplay RNG; visuals never draw from it
    pub rng: Pcg32,
    pub arena: Arena,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// The externally steered void, and the enforcers' primary target
    pub player: Option<EntityId>,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// World under custom tuning; rejects values that would break the
    /// simulation (e.g. `max_radius < min_radius`)
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    fn build(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            arena: Arena::new(),
            tuning,
            time_ticks: 0,
            player: None,
        }
    }

    /// Spawn the player-controlled void; replaces any previous player handle
    pub fn spawn_player(&mut self, name: &str, pos: Vec2, radius: f32) -> EntityId {
        let agent = VoidAgent::player(name, &self.tuning);
        let id = self.arena.insert(Entity::void(pos, radius, agent));
        self.player = Some(id);
        id
    }

    pub fn spawn_bot(&mut self, name: &str, pos: Vec2, radius: f32) -> EntityId {
        let brain = BotBrain::new(&mut self.rng);
        let agent = VoidAgent::new(name, Pilot::Bot(brain), &self.tuning);
        self.arena.insert(Entity::void(pos, radius, agent))
    }

    /// Spawn an enforcer with a random patrol heading
    pub fn spawn_enforcer(&mut self, name: &str, pos: Vec2) -> EntityId {
        let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
        let mut agent = VoidAgent::new(
            name,
            Pilot::Enforcer(EnforcerBrain::with_heading(angle)),
            &self.tuning,
        );
        agent.base_speed = self.tuning.enforcer_speed;
        agent.current_speed = self.tuning.enforcer_speed;
        self.arena
            .insert(Entity::void(pos, self.tuning.enforcer_radius, agent))
    }

    /// Spawn a prop; pedestrians get a walker seeded from the world RNG
    pub fn spawn_prop(&mut self, pos: Vec2, kind: PropKind) -> EntityId {
        let mut entity = Entity::prop(pos, kind);
        if kind == PropKind::Human {
            if let Some(prop) = entity.as_prop_mut() {
                prop.walker = Some(Walker::new(&mut self.rng, &self.tuning));
            }
        }
        self.arena.insert(entity)
    }

    pub fn spawn_power_up(&mut self, pos: Vec2, kind: PowerUpKind) -> EntityId {
        self.arena.insert(Entity::power_up(pos, kind, &self.tuning))
    }

    /// Radial debris burst; directions come from a hash so the gameplay
    /// stream is untouched
    pub fn spawn_particles(&mut self, pos: Vec2, count: usize, speed: f32) -> usize {
        let live = self
            .arena
            .iter()
            .filter(|(_, e)| matches!(e.kind, EntityKind::Particle(_)))
            .count();
        let count = count.min(MAX_PARTICLES.saturating_sub(live));

        let salt = (self.time_ticks as u32).wrapping_mul(31);
        for i in 0..count {
            let seed = salt.wrapping_add(i as u32);
            let angle = (i as f32 / count as f32 + hash_jitter(seed) * 0.2) * std::f32::consts::TAU;
            let life = 0.6 + (hash_jitter(seed ^ 0x9e37) + 0.5) * 0.4;
            let mut particle = Entity::new(
                pos,
                PARTICLE_RADIUS,
                EntityKind::Particle(Particle {
                    life,
                    max_life: life,
                }),
            );
            particle.vel = heading(angle) * speed * (0.75 + hash_jitter(seed ^ 0x51ed) * 0.5);
            self.arena.insert(particle);
        }
        count
    }

    /// Floating label that rises for one second
    pub fn spawn_floating_text(&mut self, pos: Vec2, text: impl Into<String>) -> EntityId {
        let mut label = Entity::new(pos, 1.0, EntityKind::FloatingText(FloatingText::new(text)));
        label.vel = Vec2::new(0.0, -TEXT_RISE_SPEED);
        self.arena.insert(label)
    }

    /// The live player entity, if any
    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.arena.live(id))
    }

    /// Check the player's leveling track; returns the new level when one was
    /// gained. The upgrade choice is left to the caller.
    pub fn check_player_level(&mut self) -> Option<u32> {
        let id = self.player?;
        let agent = self.arena.get_mut(id)?.as_void_mut()?;
        let score = agent.score;
        if agent.leveling.check(score) {
            log::info!("{} reached level {}", agent.name, agent.leveling.level);
            Some(agent.leveling.level)
        } else {
            None
        }
    }

    /// Apply an upgrade to a live void; false if the handle is stale
    pub fn upgrade(&mut self, id: EntityId, upgrade: Upgrade) -> bool {
        match self.arena.get_mut(id) {
            Some(entity) if !entity.marked_for_deletion && entity.is_void() => {
                apply_upgrade(entity, upgrade, &self.tuning);
                true
            }
            _ => false,
        }
    }

    /// Live voids ordered by score, highest first
    pub fn standings(&self) -> Vec<Standing> {
        let mut rows: Vec<Standing> = self
            .arena
            .iter()
            .filter(|(_, e)| !e.marked_for_deletion)
            .filter_map(|(id, e)| {
                let agent = e.as_void()?;
                let role = match agent.pilot {
                    Pilot::Player => Role::Player,
                    Pilot::Bot(_) => Role::Bot,
                    Pilot::Enforcer(_) => Role::Enforcer,
                };
                Some(Standing {
                    id,
                    name: agent.name.clone(),
                    role,
                    score: agent.score,
                    radius: e.radius,
                    level: agent.leveling.level,
                })
            })
            .collect();
        // Stable sort keeps arena order for ties
        rows.sort_by(|a, b| b.score.total_cmp(&a.score));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world() {
        let world = World::new(12345);
        assert_eq!(world.seed, 12345);
        assert_eq!(world.time_ticks, 0);
        assert!(world.arena.is_empty());
        assert!(world.player.is_none());
    }

    #[test]
    fn test_spawn_roles() {
        let mut world = World::new(1);
        let player = world.spawn_player("you", Vec2::ZERO, 20.0);
        world.spawn_bot("bot", Vec2::new(100.0, 0.0), 20.0);
        let cop = world.spawn_enforcer("cop", Vec2::new(-100.0, 0.0));

        assert_eq!(world.player, Some(player));
        let cop = world.arena.get(cop).unwrap();
        assert_eq!(cop.radius, world.tuning.enforcer_radius);
        assert_eq!(cop.as_void().unwrap().base_speed, world.tuning.enforcer_speed);
        assert!(cop.as_void().unwrap().is_enforcer());
    }

    #[test]
    fn test_standings_sorted_by_score() {
        let mut world = World::new(1);
        let player = world.spawn_player("you", Vec2::ZERO, 20.0);
        let bot = world.spawn_bot("bot", Vec2::new(100.0, 0.0), 20.0);
        let gone = world.spawn_bot("gone", Vec2::new(200.0, 0.0), 20.0);
        world.spawn_prop(Vec2::new(50.0, 50.0), PropKind::Car);

        world.arena.get_mut(bot).unwrap().as_void_mut().unwrap().score = 90.0;
        world.arena.get_mut(player).unwrap().as_void_mut().unwrap().score = 40.0;
        world.arena.get_mut(gone).unwrap().mark_deleted();

        let rows = world.standings();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "bot");
        assert_eq!(rows[0].role, Role::Bot);
        assert_eq!(rows[1].role, Role::Player);
    }

    #[test]
    fn test_particles_capped_and_rng_untouched() {
        let mut world = World::new(8);
        let before = world.rng.clone();
        let spawned = world.spawn_particles(Vec2::ZERO, MAX_PARTICLES + 50, 100.0);
        assert_eq!(spawned, MAX_PARTICLES);
        assert_eq!(world.spawn_particles(Vec2::ZERO, 10, 100.0), 0);
        assert_eq!(world.rng, before);
    }

    #[test]
    fn test_player_leveling_and_upgrade() {
        let mut world = World::new(3);
        let player = world.spawn_player("you", Vec2::ZERO, 20.0);
        assert_eq!(world.check_player_level(), None);

        world.arena.get_mut(player).unwrap().as_void_mut().unwrap().score = 300.0;
        assert_eq!(world.check_player_level(), Some(2));
        assert!(world.upgrade(player, Upgrade::Digest));
        let agent = world.player_entity().unwrap().as_void().unwrap();
        assert!((agent.growth_multiplier - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_with_tuning_validates() {
        let mut tuning = Tuning::default();
        tuning.max_radius = tuning.min_radius - 1.0;
        assert!(matches!(World::with_tuning(1, tuning), Err(TuningError::Invalid(_))));

        let tuning = Tuning {
            eat_margin: 1.3,
            ..Tuning::default()
        };
        let world = World::with_tuning(1, tuning).unwrap();
        assert_eq!(world.tuning.eat_margin, 1.3);
    }

    #[test]
    fn test_only_pedestrians_get_walkers() {
        let mut world = World::new(5);
        let human = world.spawn_prop(Vec2::ZERO, PropKind::Human);
        let bench = world.spawn_prop(Vec2::new(50.0, 0.0), PropKind::Bench);
        assert!(world.arena.get(human).unwrap().as_prop().unwrap().walker.is_some());
        assert!(world.arena.get(bench).unwrap().as_prop().unwrap().walker.is_none());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut world = World::new(77);
        world.spawn_player("you", Vec2::ZERO, 20.0);
        world.spawn_prop(Vec2::new(40.0, 0.0), PropKind::Bench);
        let json = serde_json::to_string(&world).unwrap();
        let restored: World = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.arena.len(), 2);
        assert_eq!(restored.rng, world.rng);
    }
}
