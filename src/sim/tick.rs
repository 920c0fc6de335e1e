//! Fixed timestep simulation tick
//!
//! One tick runs, strictly in order: interaction resolution (which
//! integrates motion first), agent and pedestrian updates, ephemeral updates,
//! compaction.

use glam::Vec2;

use super::agent::{SelfView, level_up};
use super::arena::Arena;
use super::entity::{Entity, EntityKind, Pilot};
use super::growth::grow;
use super::interaction::{ConsumeEvent, resolve_interactions};
use super::pedestrian::update_pedestrians;
use super::pursuit::collect_obstacles;
use super::state::World;
use crate::consts::*;

/// Per-tick shake decay factor
const SHAKE_DECAY: f32 = 0.8;
/// Shake magnitude snapped to zero
const SHAKE_EPSILON: f32 = 0.1;
/// Per-tick velocity retention for debris
const PARTICLE_FRICTION: f32 = 0.95;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Normalized steering for the player; zero stops it
    pub steer: Vec2,
}

/// Advance the world by one fixed timestep; returns this tick's consumption
/// events in resolution order
pub fn tick(world: &mut World, input: &TickInput, dt: f32) -> Vec<ConsumeEvent> {
    let mut events = Vec::new();
    resolve_interactions(&mut world.arena, dt, &world.tuning, |event| events.push(event));

    update_agents(world, input, dt);
    update_ephemeral(&mut world.arena, dt);

    let removed = world.arena.compact();
    if removed > 0 {
        log::trace!("tick {}: compacted {} entities", world.time_ticks, removed);
    }
    world.time_ticks += 1;
    events
}

/// Timers, speed and steering for every live void, then pedestrians, in
/// arena order
fn update_agents(world: &mut World, input: &TickInput, dt: f32) {
    // Props do not move during this phase, so one sight snapshot serves all
    let obstacles = collect_obstacles(&world.arena, &world.tuning);
    let primary = world.player.filter(|&id| world.arena.is_live(id));

    for id in world.arena.ids() {
        let Some(entity) = world.arena.get_mut(id) else {
            continue;
        };
        if entity.marked_for_deletion {
            continue;
        }
        let radius = entity.radius;
        let Some(agent) = entity.as_void_mut() else {
            continue;
        };
        agent.tick_timers(dt);
        agent.refresh_speed(radius, &world.tuning);

        let Some(me) = SelfView::of(id, entity) else {
            continue;
        };
        let Some(agent) = entity.as_void_mut() else {
            continue;
        };
        // Take the brain out so it can read the arena it lives in
        let mut pilot = std::mem::replace(&mut agent.pilot, Pilot::Player);

        let (velocity, forage) = match &mut pilot {
            Pilot::Player => (input.steer.clamp_length_max(1.0) * me.speed, 0.0),
            Pilot::Bot(brain) => {
                let intent = brain.decide(&me, &world.arena, dt, &mut world.rng, &world.tuning);
                (intent.velocity, intent.forage)
            }
            Pilot::Enforcer(brain) => (
                brain.decide(
                    &me,
                    &world.arena,
                    primary,
                    &obstacles,
                    dt,
                    &mut world.rng,
                    &world.tuning,
                ),
                0.0,
            ),
        };
        let is_bot = matches!(pilot, Pilot::Bot(_));

        let Some(entity) = world.arena.get_mut(id) else {
            continue;
        };
        entity.vel = velocity;
        if let Some(agent) = entity.as_void_mut() {
            agent.pilot = pilot;
        }
        if is_bot {
            if forage > 0.0 {
                grow(entity, forage, &world.tuning);
            }
            level_up(entity, &mut world.rng, &world.tuning);
        }
    }

    update_pedestrians(&mut world.arena, dt, &mut world.rng, &world.tuning);
}

/// Particles, floating text, power-up lifetimes and shake decay
pub fn update_ephemeral(arena: &mut Arena, dt: f32) {
    for (_, entity) in arena.iter_mut() {
        let Entity {
            pos,
            vel,
            shake,
            marked_for_deletion,
            kind,
            ..
        } = entity;
        if *marked_for_deletion {
            continue;
        }

        *shake *= SHAKE_DECAY;
        if shake.length() < SHAKE_EPSILON {
            *shake = Vec2::ZERO;
        }

        let remaining = match kind {
            EntityKind::Particle(particle) => {
                *pos += *vel * dt;
                *vel *= PARTICLE_FRICTION;
                particle.life -= dt;
                particle.life
            }
            EntityKind::FloatingText(text) => {
                text.life -= dt;
                text.life
            }
            EntityKind::PowerUp(power_up) => {
                power_up.life -= dt;
                power_up.life
            }
            EntityKind::Void(_) | EntityKind::Prop(_) => continue,
        };
        if remaining <= 0.0 {
            *marked_for_deletion = true;
        }
    }
}

/// Fixed-timestep driver: turns variable frame time into whole ticks
#[derive(Debug, Clone)]
pub struct Stepper {
    accumulator: f32,
    /// Simulation speed multiplier (1 = real time, 0 = paused)
    pub time_scale: f32,
}

impl Default for Stepper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stepper {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            time_scale: 1.0,
        }
    }

    /// Feed one frame's elapsed time; returns how many ticks to run.
    /// Never more than `MAX_SUBSTEPS`; any backlog beyond that is dropped.
    /// A non-finite frame time counts as no time at all.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() { frame_dt } else { 0.0 };
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT) * self.time_scale.max(0.0);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if self.accumulator >= SIM_DT {
            log::debug!("stepper dropped {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        steps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }

    /// Advance the world by one frame's worth of ticks
    pub fn run(&mut self, world: &mut World, input: &TickInput, frame_dt: f32) -> Vec<ConsumeEvent> {
        let steps = self.advance(frame_dt);
        let mut events = Vec::new();
        for _ in 0..steps {
            events.extend(tick(world, input, SIM_DT));
        }
        events
    }
}
