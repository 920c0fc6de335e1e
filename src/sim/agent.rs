//! Bot decision layer
//!
//! A bot re-thinks on a short jittered cadence (WANDER / CHASE / FLEE) and
//! steers every tick from its last decision. Targets are held as arena
//! handles and re-validated before each use; a vanished target just sends the
//! bot back to wandering and forces a fresh decision on the next tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, EntityId};
use super::entity::{Entity, EntityKind};
use super::growth::{Upgrade, apply_upgrade};
use crate::tuning::Tuning;
use crate::{direction_or_x, heading};

/// High-level bot intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotState {
    Wander,
    /// Seeking food (props, power-ups or smaller voids)
    Chase,
    Flee,
}

/// What a brain knows about its own body this tick
#[derive(Debug, Clone, Copy)]
pub struct SelfView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
    /// Effective movement speed (pixels/s)
    pub speed: f32,
}

impl SelfView {
    /// View of a void entity; `None` for anything else
    pub fn of(id: EntityId, entity: &Entity) -> Option<Self> {
        let agent = entity.as_void()?;
        Some(Self {
            id,
            pos: entity.pos,
            radius: entity.radius,
            speed: agent.current_speed,
        })
    }
}

/// Per-tick output of a bot brain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotIntent {
    pub velocity: Vec2,
    /// Passive growth earned while nothing is around
    pub forage: f32,
}

/// Result of a perception scan
#[derive(Debug, Clone, Copy, Default)]
pub struct Perception {
    /// Nearest bigger void: (id, distance, radius)
    pub threat: Option<(EntityId, f32, f32)>,
    /// Best food by value / distance: (id, score)
    pub opportunity: Option<(EntityId, f32)>,
    /// Relevant entities inside the scan radius
    pub seen: usize,
}

/// Ordinary bot brain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotBrain {
    pub state: BotState,
    pub target: Option<EntityId>,
    pub decision_timer: f32,
    pub wander_angle: f32,
    /// Appetite for hunting other voids (0.5..1.0)
    pub aggression: f32,
    /// Nothing was in range at the last decision
    pub alone: bool,
}

impl BotBrain {
    /// Fresh brain with randomized heading and temperament
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_traits(
            rng.random::<f32>() * std::f32::consts::TAU,
            rng.random_range(0.5..1.0),
        )
    }

    pub fn with_traits(wander_angle: f32, aggression: f32) -> Self {
        Self {
            state: BotState::Wander,
            target: None,
            decision_timer: 0.0,
            wander_angle,
            aggression,
            alone: false,
        }
    }

    /// Advance timers, re-think if due, and produce this tick's steering
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        me: &SelfView,
        arena: &Arena,
        dt: f32,
        rng: &mut R,
        tuning: &Tuning,
    ) -> BotIntent {
        self.decision_timer -= dt;
        if self.decision_timer <= 0.0 {
            self.think(me, arena, rng, tuning);
            self.decision_timer = tuning.decision_interval + rng.random::<f32>() * tuning.decision_jitter;
        }

        if let Some(target) = self.target {
            if !target_valid(arena, target) {
                self.target = None;
                self.state = BotState::Wander;
                self.decision_timer = 0.0;
            }
        }

        let forage = if self.alone && rng.random::<f32>() < tuning.forage_chance {
            tuning.forage_amount
        } else {
            0.0
        };

        BotIntent {
            velocity: self.steer(me, arena, tuning),
            forage,
        }
    }

    /// Pick a state and target from a fresh scan
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        me: &SelfView,
        arena: &Arena,
        rng: &mut R,
        tuning: &Tuning,
    ) {
        let seen = perceive(me, arena, self.aggression, tuning);
        self.alone = seen.seen == 0;

        let previous = self.state;
        match (seen.threat, seen.opportunity) {
            (Some((threat, dist, threat_radius)), _)
                if dist < tuning.panic_base + me.radius + threat_radius =>
            {
                self.state = BotState::Flee;
                self.target = Some(threat);
            }
            (_, Some((food, _))) => {
                self.state = BotState::Chase;
                self.target = Some(food);
            }
            _ => {
                self.state = BotState::Wander;
                self.target = None;
                self.wander_angle += (rng.random::<f32>() - 0.5) * tuning.wander_turn;
            }
        }

        if previous != self.state {
            log::debug!("bot {:?}: {:?} -> {:?}", me.id, previous, self.state);
        }
    }

    fn steer(&mut self, me: &SelfView, arena: &Arena, tuning: &Tuning) -> Vec2 {
        let target = self.target.and_then(|t| arena.live(t));
        match (self.state, target) {
            (BotState::Flee, Some(threat)) => {
                direction_or_x(threat.pos, me.pos) * me.speed * tuning.flee_speed
            }
            (BotState::Chase, Some(food)) => {
                let aim = food.pos + food.vel * tuning.lookahead;
                let delta = aim - me.pos;
                if delta.length() > f32::EPSILON {
                    delta.normalize() * me.speed * tuning.hunt_speed
                } else {
                    // Sitting on it already
                    self.target = None;
                    self.state = BotState::Wander;
                    self.wander(me, tuning)
                }
            }
            _ => self.wander(me, tuning),
        }
    }

    fn wander(&self, me: &SelfView, tuning: &Tuning) -> Vec2 {
        heading(self.wander_angle) * me.speed * tuning.wander_speed
    }
}

/// Live and, for props, not already being swallowed
fn target_valid(arena: &Arena, id: EntityId) -> bool {
    match arena.live(id) {
        Some(entity) => !entity.as_prop().is_some_and(|p| p.is_dying()),
        None => false,
    }
}

/// Scan everything within range of `me`, classifying threats and food
pub fn perceive(me: &SelfView, arena: &Arena, aggression: f32, tuning: &Tuning) -> Perception {
    let scan = tuning.scan_base + me.radius * tuning.scan_per_radius;
    let scan_sq = scan * scan;

    let mut out = Perception::default();
    let mut best_score = f32::NEG_INFINITY;
    let mut nearest_threat = f32::INFINITY;

    for (id, entity) in arena.iter() {
        if id == me.id || entity.marked_for_deletion {
            continue;
        }
        let dist_sq = entity.pos.distance_squared(me.pos);
        if dist_sq > scan_sq {
            continue;
        }
        let dist = dist_sq.sqrt();

        let value = match &entity.kind {
            EntityKind::Void(other) => {
                out.seen += 1;
                if tuning.dominates(entity.radius, me.radius) {
                    if dist < nearest_threat {
                        nearest_threat = dist;
                        out.threat = Some((id, dist, entity.radius));
                    }
                    continue;
                }
                // Similar sizes and enforcers are not worth the risk
                if !tuning.dominates(me.radius, entity.radius) || other.invulnerable || other.is_enforcer() {
                    continue;
                }
                let score = if other.score > 0.0 {
                    other.score
                } else {
                    tuning.void_value_floor
                };
                score * tuning.void_value_scale * aggression
            }
            EntityKind::Prop(prop) => {
                if prop.is_dying() {
                    continue;
                }
                out.seen += 1;
                if !tuning.dominates(me.radius, entity.radius) || prop.enforcer {
                    continue;
                }
                prop.value
            }
            EntityKind::PowerUp(_) => {
                out.seen += 1;
                tuning.power_up_appeal
            }
            EntityKind::Particle(_) | EntityKind::FloatingText(_) => continue,
        };

        let score = value / (dist + tuning.opportunity_epsilon);
        if score > best_score {
            best_score = score;
            out.opportunity = Some((id, score));
        }
    }

    out
}

/// Bot leveling: on crossing the next threshold, take a random upgrade
pub fn level_up<R: Rng + ?Sized>(entity: &mut Entity, rng: &mut R, tuning: &Tuning) -> Option<Upgrade> {
    let agent = entity.as_void_mut()?;
    let score = agent.score;
    if !agent.leveling.check(score) {
        return None;
    }
    let level = agent.leveling.level;
    let name = agent.name.clone();

    let upgrade = Upgrade::POOL[rng.random_range(0..Upgrade::POOL.len())];
    apply_upgrade(entity, upgrade, tuning);
    log::info!("{} reached level {} and took {:?}", name, level, upgrade);
    Some(upgrade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Pilot, PowerUpKind, PropKind, VoidAgent};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawn_void(arena: &mut Arena, pos: Vec2, radius: f32) -> EntityId {
        let tuning = Tuning::default();
        let brain = BotBrain::with_traits(0.0, 1.0);
        arena.insert(Entity::void(
            pos,
            radius,
            VoidAgent::new("bot", Pilot::Bot(brain), &tuning),
        ))
    }

    fn view(arena: &Arena, id: EntityId) -> SelfView {
        SelfView::of(id, arena.get(id).unwrap()).unwrap()
    }

    #[test]
    fn test_flees_bigger_void() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);
        let threat = spawn_void(&mut arena, Vec2::new(100.0, 0.0), 80.0);
        arena.insert(Entity::prop(Vec2::new(-50.0, 0.0), PropKind::Bottle));

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        let intent = brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(brain.state, BotState::Flee);
        assert_eq!(brain.target, Some(threat));
        assert!(intent.velocity.x < 0.0);
        assert!((intent.velocity.length() - 150.0 * 1.3).abs() < 1e-3);
    }

    #[test]
    fn test_chases_best_value_per_distance() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 30.0);
        // Bottle: 1 / (50 + 10); cone: 2 / (60 + 10) -> cone wins
        arena.insert(Entity::prop(Vec2::new(50.0, 0.0), PropKind::Bottle));
        let cone = arena.insert(Entity::prop(Vec2::new(0.0, 60.0), PropKind::Cone));
        // Too big to eat: ignored
        arena.insert(Entity::prop(Vec2::new(0.0, -30.0), PropKind::Bus));

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        let intent = brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(brain.state, BotState::Chase);
        assert_eq!(brain.target, Some(cone));
        assert!(intent.velocity.y > 0.0);
    }

    #[test]
    fn test_smaller_void_outranks_props() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 60.0);
        arena.insert(Entity::prop(Vec2::new(20.0, 0.0), PropKind::Cone));
        let prey = spawn_void(&mut arena, Vec2::new(400.0, 0.0), 20.0);

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        brain.think(&view(&arena, me), &arena, &mut rng, &tuning);
        assert_eq!(brain.target, Some(prey));
    }

    #[test]
    fn test_far_threat_does_not_panic() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);
        // Panic distance = 300 + 20 + 30 = 350
        spawn_void(&mut arena, Vec2::new(500.0, 0.0), 30.0);
        let bottle = arena.insert(Entity::prop(Vec2::new(0.0, 40.0), PropKind::Bottle));

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        brain.think(&view(&arena, me), &arena, &mut rng, &tuning);
        assert_eq!(brain.state, BotState::Chase);
        assert_eq!(brain.target, Some(bottle));
    }

    #[test]
    fn test_wanders_when_alone() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        let intent = brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(brain.state, BotState::Wander);
        assert!(brain.alone);
        assert!((intent.velocity.length() - 150.0 * 0.8).abs() < 1e-3);
    }

    #[test]
    fn test_foraging_when_alone() {
        let tuning = Tuning {
            forage_chance: 1.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        let intent = brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(intent.forage, tuning.forage_amount);
    }

    #[test]
    fn test_lost_target_reverts_to_wander() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 30.0);
        let bottle = arena.insert(Entity::prop(Vec2::new(50.0, 0.0), PropKind::Bottle));

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(brain.target, Some(bottle));

        arena.get_mut(bottle).unwrap().mark_deleted();
        arena.compact();

        brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
        assert_eq!(brain.state, BotState::Wander);
        assert_eq!(brain.target, None);
        assert!(brain.decision_timer <= 0.0);
    }

    #[test]
    fn test_power_up_is_food() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);
        let pu = arena.insert(Entity::power_up(Vec2::new(0.0, 100.0), PowerUpKind::Speed, &tuning));

        let mut brain = BotBrain::with_traits(0.0, 1.0);
        brain.think(&view(&arena, me), &arena, &mut rng, &tuning);
        assert_eq!(brain.target, Some(pu));
    }

    #[test]
    fn test_level_up_grants_one_upgrade() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut arena = Arena::new();
        let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);
        let entity = arena.get_mut(me).unwrap();

        assert!(level_up(entity, &mut rng, &tuning).is_none());
        entity.as_void_mut().unwrap().score = 350.0;
        assert!(level_up(entity, &mut rng, &tuning).is_some());
        assert!(level_up(entity, &mut rng, &tuning).is_none());
        let agent = entity.as_void().unwrap();
        assert_eq!(agent.leveling.level, 2);
        assert_eq!(agent.leveling.next_threshold, 800.0);
    }

    proptest! {
        #[test]
        fn prop_flee_points_away(tx in -250.0f32..250.0, ty in -250.0f32..250.0, seed in 0u64..1000) {
            prop_assume!(tx.abs() > 1.0 || ty.abs() > 1.0);
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut arena = Arena::new();
            let me = spawn_void(&mut arena, Vec2::ZERO, 20.0);
            let threat_pos = Vec2::new(tx, ty);
            spawn_void(&mut arena, threat_pos, 100.0);

            let mut brain = BotBrain::with_traits(0.0, 1.0);
            let intent = brain.decide(&view(&arena, me), &arena, 0.016, &mut rng, &tuning);
            prop_assert_eq!(brain.state, BotState::Flee);
            prop_assert!(intent.velocity.dot(Vec2::ZERO - threat_pos) >= 0.0);
        }
    }
}
