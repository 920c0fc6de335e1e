//! Enforcer pursuit layer
//!
//! PATROL -> CHASE when a target is both the best candidate and in plain
//! sight. Losing sight while chasing drops into SEARCH: drive to the last
//! known position, idle there spinning, and give up after a timeout.
//! Sight is blocked by solid rectangular props.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::SelfView;
use super::arena::{Arena, EntityId};
use super::collision::segment_distance;
use super::entity::Shape;
use crate::heading;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuitState {
    Patrol,
    Chase,
    Search,
}

/// Something that blocks line of sight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec2,
    /// Effective blocking half-size
    pub half_size: f32,
}

/// Sight blockers: every solid, rectangular prop not being swallowed
pub fn collect_obstacles(arena: &Arena, tuning: &Tuning) -> Vec<Obstacle> {
    arena
        .iter()
        .filter(|(_, e)| !e.marked_for_deletion)
        .filter_map(|(_, e)| {
            let prop = e.as_prop()?;
            if !prop.solid || prop.is_dying() {
                return None;
            }
            match prop.shape {
                Shape::Rect { width, length } => Some(Obstacle {
                    center: e.pos,
                    half_size: 0.5 * width.min(length) * tuning.sight_scale,
                }),
                Shape::Circle => None,
            }
        })
        .collect()
}

/// True when no obstacle sits on the segment `from..to`
pub fn line_of_sight(from: Vec2, to: Vec2, obstacles: &[Obstacle]) -> bool {
    !obstacles
        .iter()
        .any(|o| segment_distance(o.center, from, to) < o.half_size)
}

/// Enforcer brain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcerBrain {
    pub state: PursuitState,
    pub target: Option<EntityId>,
    pub last_known: Option<Vec2>,
    /// Seconds spent in SEARCH
    pub search_timer: f32,
    pub decision_timer: f32,
    pub patrol_angle: f32,
    pub turn_timer: f32,
    /// Facing for presentation; spins while idling at a search spot
    pub facing: f32,
}

impl Default for EnforcerBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl EnforcerBrain {
    pub fn new() -> Self {
        Self::with_heading(0.0)
    }

    pub fn with_heading(angle: f32) -> Self {
        Self {
            state: PursuitState::Patrol,
            target: None,
            last_known: None,
            search_timer: 0.0,
            decision_timer: 0.0,
            patrol_angle: angle,
            turn_timer: 0.0,
            facing: angle,
        }
    }

    /// Advance the state machine and return this tick's velocity
    #[allow(clippy::too_many_arguments)]
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        me: &SelfView,
        arena: &Arena,
        primary: Option<EntityId>,
        obstacles: &[Obstacle],
        dt: f32,
        rng: &mut R,
        tuning: &Tuning,
    ) -> Vec2 {
        self.decision_timer -= dt;
        if self.decision_timer <= 0.0 {
            self.think(me, arena, primary, obstacles, tuning);
            self.decision_timer = tuning.decision_interval + rng.random::<f32>() * tuning.decision_jitter;
        }

        match self.state {
            PursuitState::Chase => self.chase(me, arena, tuning),
            PursuitState::Search => self.search(me, dt, tuning),
            PursuitState::Patrol => self.patrol(me, dt, rng, tuning),
        }
    }

    /// Re-evaluate the target against the current sight lines
    pub fn think(
        &mut self,
        me: &SelfView,
        arena: &Arena,
        primary: Option<EntityId>,
        obstacles: &[Obstacle],
        tuning: &Tuning,
    ) {
        match select_target(me, arena, primary, obstacles, tuning) {
            Some((id, pos)) => {
                if self.state != PursuitState::Chase || self.target != Some(id) {
                    let name = arena
                        .live(id)
                        .and_then(|e| e.as_void())
                        .map(|a| a.name.as_str())
                        .unwrap_or("?");
                    log::info!("enforcer {:?} acquired {}", me.id, name);
                }
                self.state = PursuitState::Chase;
                self.target = Some(id);
                self.last_known = Some(pos);
                self.search_timer = 0.0;
            }
            None if self.state == PursuitState::Chase => self.lose_sight(me),
            None => {}
        }
    }

    fn lose_sight(&mut self, me: &SelfView) {
        log::debug!("enforcer {:?} lost sight, searching {:?}", me.id, self.last_known);
        self.state = PursuitState::Search;
        self.search_timer = 0.0;
    }

    fn chase(&mut self, me: &SelfView, arena: &Arena, tuning: &Tuning) -> Vec2 {
        let Some(target) = self.target.and_then(|t| arena.live(t)) else {
            // Eaten or gone between decisions
            self.lose_sight(me);
            return Vec2::ZERO;
        };
        self.last_known = Some(target.pos);

        let delta = target.pos - me.pos;
        if delta.length_squared() <= f32::EPSILON {
            return Vec2::ZERO;
        }
        self.facing = delta.y.atan2(delta.x);
        delta.normalize() * me.speed * tuning.chase_speed
    }

    fn search(&mut self, me: &SelfView, dt: f32, tuning: &Tuning) -> Vec2 {
        self.search_timer += dt;
        if self.search_timer >= tuning.search_timeout {
            log::debug!("enforcer {:?} gave up the search", me.id);
            self.state = PursuitState::Patrol;
            self.target = None;
            self.last_known = None;
            self.search_timer = 0.0;
            self.patrol_angle = self.facing;
            return Vec2::ZERO;
        }

        let Some(spot) = self.last_known else {
            self.search_timer = tuning.search_timeout;
            return Vec2::ZERO;
        };
        let delta = spot - me.pos;
        if delta.length() <= tuning.search_arrive {
            self.facing += tuning.search_spin * dt;
            return Vec2::ZERO;
        }
        self.facing = delta.y.atan2(delta.x);
        delta.normalize() * me.speed * tuning.search_speed
    }

    fn patrol<R: Rng + ?Sized>(&mut self, me: &SelfView, dt: f32, rng: &mut R, tuning: &Tuning) -> Vec2 {
        self.turn_timer += dt;
        if self.turn_timer >= tuning.patrol_turn_interval {
            self.turn_timer = 0.0;
            self.patrol_angle += (rng.random::<f32>() - 0.5) * tuning.patrol_turn;
        }

        let leash = tuning.patrol_leash;
        if me.pos.x.abs() > leash || me.pos.y.abs() > leash {
            self.patrol_angle = (-me.pos.y).atan2(-me.pos.x);
        }

        self.facing = self.patrol_angle;
        heading(self.patrol_angle) * me.speed * tuning.patrol_speed
    }
}

/// Best visible quarry: highest `radius / (distance + softening)` in range,
/// boosted for the primary target. Other enforcers are never quarry.
pub fn select_target(
    me: &SelfView,
    arena: &Arena,
    primary: Option<EntityId>,
    obstacles: &[Obstacle],
    tuning: &Tuning,
) -> Option<(EntityId, Vec2)> {
    let range_sq = tuning.detect_range * tuning.detect_range;
    let mut best: Option<(EntityId, Vec2, f32)> = None;

    for (id, entity) in arena.iter() {
        if id == me.id || entity.marked_for_deletion {
            continue;
        }
        let Some(agent) = entity.as_void() else {
            continue;
        };
        if agent.is_enforcer() {
            continue;
        }
        let dist_sq = entity.pos.distance_squared(me.pos);
        if dist_sq > range_sq || !line_of_sight(me.pos, entity.pos, obstacles) {
            continue;
        }

        let mut score = entity.radius / (dist_sq.sqrt() + tuning.target_softening);
        if primary == Some(id) {
            score *= tuning.primary_bonus;
        }
        if best.is_none_or(|(_, _, s)| score > s) {
            best = Some((id, entity.pos, score));
        }
    }

    best.map(|(id, pos, _)| (id, pos))
}
