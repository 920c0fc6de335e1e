//! Growth and scoring economy
//!
//! Score is the growth currency. Radius follows score through area: each
//! point of effective growth adds `area_scale` square pixels, each point of
//! shrink removes `shrink_area_scale`. The two scales differ, so a grow and a
//! shrink of the same amount do not cancel.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use crate::tuning::Tuning;

/// Grow a void; returns the effective (multiplied) amount credited.
/// Non-void entities are left untouched.
pub fn grow(entity: &mut Entity, amount: f32, tuning: &Tuning) -> f32 {
    let Entity { radius, kind, .. } = entity;
    let EntityKind::Void(agent) = kind else {
        return 0.0;
    };

    let effective = amount * agent.growth_multiplier;
    if effective == 0.0 {
        return 0.0;
    }

    agent.score += effective;
    let area = PI * *radius * *radius + effective * tuning.area_scale;
    *radius = (area.max(0.0) / PI)
        .sqrt()
        .clamp(tuning.min_radius.min(*radius), tuning.max_radius);
    effective
}

/// Shrink a void as a penalty; radius never drops below `min_radius`
pub fn shrink(entity: &mut Entity, amount: f32, tuning: &Tuning) {
    let Entity { radius, kind, .. } = entity;
    let EntityKind::Void(agent) = kind else {
        return;
    };

    let amount = amount.max(0.0);
    agent.score = (agent.score - amount * tuning.shrink_score_scale).max(0.0);

    let min_area = PI * tuning.min_radius * tuning.min_radius;
    let area = (PI * *radius * *radius - amount * tuning.shrink_area_scale).max(min_area);
    *radius = (area / PI).sqrt().max(tuning.min_radius);
}

/// Permanent stat upgrades; every application stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// +30 base speed
    Speed,
    /// Instant 2% radius bump
    Size,
    /// One more orbiting satellite
    Satellite,
    /// +20% suction range
    Suction,
    /// +10% growth per item
    Digest,
    /// +15 base speed
    Agility,
}

impl Upgrade {
    pub const POOL: [Upgrade; 6] = [
        Upgrade::Speed,
        Upgrade::Size,
        Upgrade::Satellite,
        Upgrade::Suction,
        Upgrade::Digest,
        Upgrade::Agility,
    ];
}

/// Apply one upgrade to a void
pub fn apply_upgrade(entity: &mut Entity, upgrade: Upgrade, tuning: &Tuning) {
    let Entity { radius, kind, .. } = entity;
    let EntityKind::Void(agent) = kind else {
        return;
    };

    match upgrade {
        Upgrade::Speed => agent.base_speed += 30.0,
        Upgrade::Size => *radius = (*radius * 1.02).min(tuning.max_radius),
        Upgrade::Satellite => agent.satellites += 1,
        Upgrade::Suction => agent.suction_range += 0.2,
        Upgrade::Digest => agent.growth_multiplier += 0.1,
        Upgrade::Agility => agent.base_speed += 15.0,
    }
    log::debug!("{} took upgrade {:?}", agent.name, upgrade);
}

/// Score thresholds for leveling; each increment grows with level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leveling {
    pub level: u32,
    pub next_threshold: f32,
    step: f32,
}

impl Leveling {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            level: 1,
            next_threshold: tuning.level_base,
            step: tuning.level_step,
        }
    }

    /// Advance at most one level if `score` reached the threshold
    pub fn check(&mut self, score: f32) -> bool {
        if score < self.next_threshold {
            return false;
        }
        self.next_threshold += self.level as f32 * self.step;
        self.level += 1;
        true
    }
}
