//! Interaction resolver
//!
//! Once per tick: integrate motion, advance swallow animations, then settle
//! every void against power-ups, props and other voids. Each adjudicated meal
//! is reported through the caller's `on_consume` callback; the resolver never
//! talks to sound, camera or UI directly.
//!
//! Removal is flag-based. Once an entity is marked for deletion (or a prop
//! starts dying) every later pair check in the same pass skips it, so nothing
//! is consumed twice.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::Key;

use super::arena::{Arena, EntityId};
use super::collision::{circle_circle, circle_rect};
use super::entity::{Dying, Entity, EntityKind, PowerUpKind, PropKind, Shape};
use super::growth::{grow, shrink};
use super::motion::integrate_motion;
use crate::tuning::Tuning;
use crate::{direction_or_x, hash_jitter};

/// Max visual shake applied to a captured prop (pixels, full width)
const CAPTURE_SHAKE: f32 = 5.0;
/// Scale lost per second once a prop is over the rim
const RIM_SHRINK_RATE: f32 = 3.0;
/// Slack when deciding a swallow animation has finished
const DYING_EPSILON: f32 = 1e-4;

/// What was eaten
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Meal {
    PowerUp(PowerUpKind),
    Prop { kind: PropKind, value: f32 },
    Void { score: f32 },
    Enforcer,
}

/// What eating it did to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// Score credited after the growth multiplier
    Grew(f32),
    /// Shrink amount applied
    Penalized(f32),
    Empowered(PowerUpKind),
}

/// A single consumption, reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumeEvent {
    pub consumer: EntityId,
    pub consumed: EntityId,
    /// Radii at the moment of the eat decision
    pub consumer_radius: f32,
    pub consumed_radius: f32,
    /// Where the meal happened
    pub position: Vec2,
    pub meal: Meal,
    pub outcome: Outcome,
}

/// Run one full interaction pass
pub fn resolve_interactions<F>(arena: &mut Arena, dt: f32, tuning: &Tuning, mut on_consume: F)
where
    F: FnMut(ConsumeEvent),
{
    integrate_motion(arena, dt);
    advance_dying(arena, dt);

    let mut voids = Vec::new();
    let mut power_ups = Vec::new();
    let mut props = Vec::new();
    for (id, entity) in arena.iter() {
        if entity.marked_for_deletion {
            continue;
        }
        match &entity.kind {
            EntityKind::Void(_) => voids.push(id),
            EntityKind::PowerUp(_) => power_ups.push(id),
            EntityKind::Prop(prop) if !prop.is_dying() => props.push(id),
            _ => {}
        }
    }

    for (i, &void_id) in voids.iter().enumerate() {
        for &power_up_id in &power_ups {
            if !arena.is_live(void_id) {
                break;
            }
            if let Some(event) = void_vs_power_up(arena, void_id, power_up_id, tuning) {
                on_consume(event);
            }
        }

        for &prop_id in &props {
            if !arena.is_live(void_id) {
                break;
            }
            if let Some(event) = void_vs_prop(arena, void_id, prop_id, dt, tuning) {
                on_consume(event);
            }
        }

        for &other_id in &voids[i + 1..] {
            if !arena.is_live(void_id) {
                break;
            }
            if let Some(event) = void_vs_void(arena, void_id, other_id, tuning) {
                on_consume(event);
            }
        }
    }
}

/// Slide swallowed props into their eater and delete them when done
pub fn advance_dying(arena: &mut Arena, dt: f32) {
    let dying: Vec<(EntityId, Option<Vec2>)> = arena
        .iter()
        .filter_map(|(id, entity)| {
            let dying = entity.as_prop()?.dying?;
            Some((id, arena.get(dying.consumer).map(|c| c.pos)))
        })
        .collect();

    for (id, consumer_pos) in dying {
        let Some(entity) = arena.get_mut(id) else {
            continue;
        };
        let Entity {
            pos,
            scale,
            marked_for_deletion,
            kind,
            ..
        } = entity;
        let EntityKind::Prop(prop) = kind else {
            continue;
        };
        let Some(dying) = prop.dying.as_mut() else {
            continue;
        };

        if let Some(target) = consumer_pos {
            dying.target = target;
        }
        dying.elapsed += dt;
        let t = dying.progress();
        *pos = dying.start.lerp(dying.target, t);
        *scale = 1.0 - t;
        if dying.elapsed + DYING_EPSILON >= dying.duration {
            *scale = 0.0;
            *marked_for_deletion = true;
        }
    }
}

fn void_vs_power_up(
    arena: &mut Arena,
    void_id: EntityId,
    power_up_id: EntityId,
    tuning: &Tuning,
) -> Option<ConsumeEvent> {
    let (hole, item) = arena.pair_mut(void_id, power_up_id)?;
    if item.marked_for_deletion {
        return None;
    }
    let EntityKind::PowerUp(power_up) = &item.kind else {
        return None;
    };
    let kind = power_up.kind;

    if hole.pos.distance(item.pos) >= hole.radius + item.radius {
        return None;
    }

    let consumer_radius = hole.radius;
    item.mark_deleted();
    hole.as_void_mut()?.apply_power_up(kind, tuning);

    Some(ConsumeEvent {
        consumer: void_id,
        consumed: power_up_id,
        consumer_radius,
        consumed_radius: item.radius,
        position: item.pos,
        meal: Meal::PowerUp(kind),
        outcome: Outcome::Empowered(kind),
    })
}

fn void_vs_prop(
    arena: &mut Arena,
    void_id: EntityId,
    prop_id: EntityId,
    dt: f32,
    tuning: &Tuning,
) -> Option<ConsumeEvent> {
    let (hole, item) = arena.pair_mut(void_id, prop_id)?;
    if item.marked_for_deletion {
        return None;
    }
    let prop = item.as_prop()?;
    if prop.is_dying() {
        return None;
    }

    if !tuning.dominates(hole.radius, item.radius) {
        if prop.solid {
            let shape = prop.shape;
            block(hole, item, shape, tuning);
        }
        // Soft props (cars, pedestrians) pass under
        return None;
    }

    let suction = hole.as_void()?.suction_multiplier(tuning);
    let pull_radius = hole.radius + item.radius + tuning.pull_padding * suction;
    let dist = hole.pos.distance(item.pos);
    if dist >= pull_radius {
        return None;
    }

    // Captured: kill residual motion and drag toward the center
    item.vel *= tuning.capture_damping;
    let inward = direction_or_x(item.pos, hole.pos);
    let falloff = hole.radius / (dist.max(tuning.min_pull_distance) + tuning.pull_softening);
    let step = (tuning.pull_strength * falloff * dt).min(dist);
    let swirl = inward.perp() * step * tuning.swirl_ratio;
    item.pos += inward * step + swirl;

    // Low half of the key is the slot index
    let seed = (prop_id.data().as_ffi() as u32).wrapping_mul(31).wrapping_add(dist.to_bits());
    item.shake = Vec2::new(hash_jitter(seed), hash_jitter(seed.wrapping_add(1))) * CAPTURE_SHAKE;

    if dist < hole.radius {
        item.scale = (item.scale - RIM_SHRINK_RATE * dt).max(0.0);
    }

    if dist >= hole.radius * tuning.eat_depth {
        return None;
    }

    let consumer_radius = hole.radius;
    let consumed_radius = item.radius;
    let position = item.pos;
    let prop = item.as_prop_mut()?;
    let (kind, value, enforcer) = (prop.kind, prop.value, prop.enforcer);
    prop.dying = Some(Dying {
        consumer: void_id,
        start: position,
        target: hole.pos,
        elapsed: 0.0,
        duration: tuning.dying_duration,
    });
    item.vel = Vec2::ZERO;

    let (meal, outcome) = if enforcer {
        shrink(hole, tuning.enforcer_penalty, tuning);
        (Meal::Enforcer, Outcome::Penalized(tuning.enforcer_penalty))
    } else {
        let credited = grow(hole, value, tuning);
        (Meal::Prop { kind, value }, Outcome::Grew(credited))
    };

    Some(ConsumeEvent {
        consumer: void_id,
        consumed: prop_id,
        consumer_radius,
        consumed_radius,
        position,
        meal,
        outcome,
    })
}

/// Push a void out of a solid prop it cannot eat
fn block(hole: &mut Entity, item: &Entity, shape: Shape, tuning: &Tuning) {
    let result = match shape {
        Shape::Circle => circle_circle(
            hole.pos,
            hole.radius,
            item.pos,
            item.radius * tuning.circle_forgiveness,
        ),
        Shape::Rect { width, length } => {
            let half = Vec2::new(width, length) * 0.5 * tuning.rect_forgiveness;
            circle_rect(hole.pos, hole.radius, item.pos, half)
        }
    };
    hole.pos += result.correction();
}

fn void_vs_void(
    arena: &mut Arena,
    a_id: EntityId,
    b_id: EntityId,
    tuning: &Tuning,
) -> Option<ConsumeEvent> {
    let (a, b) = arena.pair_mut(a_id, b_id)?;
    if a.marked_for_deletion || b.marked_for_deletion {
        return None;
    }
    if a.as_void()?.invulnerable || b.as_void()?.invulnerable {
        return None;
    }

    let dist = a.pos.distance(b.pos);
    if dist >= a.radius.max(b.radius) {
        return None;
    }

    let ((big_id, big), (small_id, small)) = if a.radius >= b.radius {
        ((a_id, a), (b_id, b))
    } else {
        ((b_id, b), (a_id, a))
    };

    if !tuning.dominates(big.radius, small.radius) {
        // Similar sizes bump instead of eating
        let overlap = big.radius + small.radius - dist;
        let normal = direction_or_x(small.pos, big.pos);
        let push = normal * overlap * tuning.soft_push;
        big.pos += push;
        small.pos -= push;
        return None;
    }

    let consumer_radius = big.radius;
    let consumed_radius = small.radius;
    let position = small.pos;
    let victim = small.as_void()?;
    let victim_score = victim.score;
    let victim_enforcer = victim.is_enforcer();
    small.mark_deleted();

    let (meal, outcome) = if victim_enforcer {
        shrink(big, tuning.enforcer_penalty, tuning);
        (Meal::Enforcer, Outcome::Penalized(tuning.enforcer_penalty))
    } else {
        let reward = (victim_score * tuning.void_reward_fraction).floor();
        let reward = if reward > 0.0 { reward } else { tuning.void_reward_floor };
        let credited = grow(big, reward, tuning);
        (Meal::Void { score: victim_score }, Outcome::Grew(credited))
    };

    log::debug!(
        "void {:?} (r={:.1}) swallowed void {:?} (r={:.1})",
        big_id,
        consumer_radius,
        small_id,
        consumed_radius
    );

    Some(ConsumeEvent {
        consumer: big_id,
        consumed: small_id,
        consumer_radius,
        consumed_radius,
        position,
        meal,
        outcome,
    })
}
