//! Void Arena - simulation core for a growth arena of consuming voids
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, suction, collisions, consumption, agent brains)
//! - `tuning`: Data-driven balance constants

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Largest frame delta the stepper will accept before clamping
    pub const MAX_FRAME_DT: f32 = 0.25;
}

/// Unit vector for a heading angle (radians)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Direction from `from` toward `to`, or +X when the points coincide
#[inline]
pub fn direction_or_x(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let len = delta.length();
    if len > f32::EPSILON {
        delta / len
    } else {
        Vec2::X
    }
}

/// Cheap integer hash mapped to [-0.5, 0.5), used for visual-only jitter
#[inline]
pub fn hash_jitter(seed: u32) -> f32 {
    let hash = seed.wrapping_mul(2654435761).wrapping_add(7919);
    ((hash >> 8) % 1000) as f32 / 1000.0 - 0.5
}
