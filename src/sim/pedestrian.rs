//! Pedestrian behaviour
//!
//! Human props are the only props that move on their own. Each one walks a
//! slowly bending path and breaks into a run, straight away from the nearest
//! void that could swallow it, once one comes within scan range.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use super::entity::EntityKind;
use crate::tuning::Tuning;
use crate::{direction_or_x, heading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkerState {
    Wander,
    Panic,
}

/// Steering state carried by a human prop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walker {
    pub state: WalkerState,
    pub heading: f32,
    /// Walking speed, fixed at spawn
    pub speed: f32,
    /// Seconds until the next heading change
    pub turn_timer: f32,
}

impl Walker {
    pub fn new(rng: &mut impl Rng, tuning: &Tuning) -> Self {
        Self {
            state: WalkerState::Wander,
            heading: rng.random::<f32>() * std::f32::consts::TAU,
            speed: rng.random_range(tuning.human_walk_min..=tuning.human_walk_max),
            // Zero so the first update picks a fresh interval
            turn_timer: 0.0,
        }
    }

    /// Velocity for this tick given the nearest threat position, if any
    pub fn steer(
        &mut self,
        pos: Vec2,
        threat: Option<Vec2>,
        dt: f32,
        rng: &mut impl Rng,
        tuning: &Tuning,
    ) -> Vec2 {
        if let Some(threat) = threat {
            self.state = WalkerState::Panic;
            return direction_or_x(threat, pos) * tuning.human_panic_speed;
        }

        self.state = WalkerState::Wander;
        self.turn_timer -= dt;
        if self.turn_timer <= 0.0 {
            self.turn_timer = rng.random_range(tuning.human_turn_min..=tuning.human_turn_max);
            self.heading += (rng.random::<f32>() - 0.5) * tuning.human_wander_turn;
        }
        heading(self.heading) * self.speed
    }
}

/// Nearest live void within `human_scan` of `pos` that could eat something of
/// `radius`
fn nearest_threat(voids: &[(Vec2, f32)], pos: Vec2, radius: f32, tuning: &Tuning) -> Option<Vec2> {
    voids
        .iter()
        .filter(|(_, r)| tuning.dominates(*r, radius))
        .map(|&(p, _)| (p, p.distance(pos)))
        .filter(|&(_, d)| d < tuning.human_scan)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

/// Set velocities for every walking prop, in arena order
pub fn update_pedestrians(arena: &mut Arena, dt: f32, rng: &mut impl Rng, tuning: &Tuning) {
    let voids: Vec<(Vec2, f32)> = arena
        .iter()
        .filter(|(_, e)| e.is_void() && !e.marked_for_deletion)
        .map(|(_, e)| (e.pos, e.radius))
        .collect();

    for (_, entity) in arena.iter_mut() {
        if entity.marked_for_deletion {
            continue;
        }
        let pos = entity.pos;
        let radius = entity.radius;
        let EntityKind::Prop(prop) = &mut entity.kind else {
            continue;
        };
        if prop.is_dying() {
            continue;
        }
        let Some(walker) = prop.walker.as_mut() else {
            continue;
        };
        let threat = nearest_threat(&voids, pos, radius, tuning);
        entity.vel = walker.steer(pos, threat, dt, rng, tuning);
    }
}
