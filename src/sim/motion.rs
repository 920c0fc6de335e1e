//! Movement integrator
//!
//! Plain Euler step for everything that does not move itself. The world is
//! unbounded, so there is no clamping here.

use super::arena::Arena;
use super::entity::EntityKind;

/// Advance positions by `vel * dt`
///
/// Skips particles (they integrate in their own update) and props that are
/// being swallowed (their position is interpolated toward the eater).
pub fn integrate_motion(arena: &mut Arena, dt: f32) {
    for (_, entity) in arena.iter_mut() {
        if entity.marked_for_deletion || entity.self_propelled() {
            continue;
        }
        if let EntityKind::Prop(prop) = &entity.kind {
            if prop.is_dying() {
                continue;
            }
        }
        entity.pos += entity.vel * dt;
    }
}
