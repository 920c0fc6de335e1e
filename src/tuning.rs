//! Balance constants
//!
//! Every "feel" number of the simulation lives here so it can be overridden
//! from JSON without recompiling. Defaults reproduce the shipped balance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(&'static str),
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Consumption ===
    /// Eater radius must exceed `victim radius * eat_margin`
    pub eat_margin: f32,
    /// Extra suction range beyond touching radii (scaled by suction multiplier)
    pub pull_padding: f32,
    /// Suction displacement gain (pixels/s at unit radius ratio)
    pub pull_strength: f32,
    /// Added to distance in the pull falloff so the curve stays finite
    pub pull_softening: f32,
    /// Distances below this are treated as this for the pull curve
    pub min_pull_distance: f32,
    /// Tangential swirl as a fraction of radial pull (must stay below 1)
    pub swirl_ratio: f32,
    /// Per-tick multiplier on a captured prop's own velocity
    pub capture_damping: f32,
    /// Prop is eaten once its center is within `radius * eat_depth`
    pub eat_depth: f32,
    /// Seconds a swallowed prop spends sliding into the void
    pub dying_duration: f32,
    /// Multiplier on solid circle radii for blocking
    pub circle_forgiveness: f32,
    /// Multiplier on rectangle half extents for blocking
    pub rect_forgiveness: f32,
    /// Fraction of overlap corrected when two similar voids bump
    pub soft_push: f32,
    /// Shrink amount applied for swallowing an enforcer
    pub enforcer_penalty: f32,
    /// Fraction of the victim's score awarded for eating a void
    pub void_reward_fraction: f32,
    /// Minimum reward for eating a void
    pub void_reward_floor: f32,

    // === Power-ups ===
    /// Seconds a claimed effect lasts
    pub power_up_duration: f32,
    /// Seconds an unclaimed power-up stays in the world
    pub power_up_lifetime: f32,
    /// Flat speed while the speed effect is active (added to base)
    pub speed_boost: f32,
    /// Suction multiplier while the magnet effect is active
    pub magnet_suction: f32,

    // === Growth ===
    /// Area added per effective point of growth
    pub area_scale: f32,
    /// Score removed per point of shrink
    pub shrink_score_scale: f32,
    /// Area removed per point of shrink
    pub shrink_area_scale: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub base_speed: f32,
    pub min_speed: f32,
    /// Radius above which voids start losing speed
    pub size_penalty_start: f32,
    /// Speed lost per pixel of radius above the start
    pub size_penalty_rate: f32,
    /// First level-up score
    pub level_base: f32,
    /// Threshold increment per level
    pub level_step: f32,

    // === Bot brain ===
    pub decision_interval: f32,
    pub decision_jitter: f32,
    pub scan_base: f32,
    pub scan_per_radius: f32,
    pub panic_base: f32,
    pub flee_speed: f32,
    pub hunt_speed: f32,
    pub wander_speed: f32,
    /// Max wander deflection per decision (radians, full width)
    pub wander_turn: f32,
    /// Worth of a smaller void per point of its score
    pub void_value_scale: f32,
    /// Score assumed for a void that has not scored yet
    pub void_value_floor: f32,
    /// Worth of a power-up to a bot
    pub power_up_appeal: f32,
    /// Distance softening in the opportunity score
    pub opportunity_epsilon: f32,
    /// Seconds of target velocity to lead while chasing
    pub lookahead: f32,
    /// Per-tick chance of off-screen growth when nothing is in range
    pub forage_chance: f32,
    pub forage_amount: f32,

    // === Enforcer brain ===
    pub enforcer_speed: f32,
    pub enforcer_radius: f32,
    /// Target score multiplier for the primary target (the player)
    pub primary_bonus: f32,
    pub target_softening: f32,
    pub detect_range: f32,
    pub chase_speed: f32,
    pub search_speed: f32,
    pub patrol_speed: f32,
    pub search_timeout: f32,
    pub search_arrive: f32,
    /// Idle spin while searching (radians/s)
    pub search_spin: f32,
    pub patrol_turn_interval: f32,
    pub patrol_turn: f32,
    /// Half-width of the square patrol area around the origin
    pub patrol_leash: f32,
    /// Multiplier on obstacle half-size for line-of-sight tests
    pub sight_scale: f32,

    // === Pedestrians ===
    /// Radius within which a pedestrian notices voids that could eat it
    pub human_scan: f32,
    /// Flight speed away from the nearest threat (pixels/s)
    pub human_panic_speed: f32,
    /// Walking speed range (pixels/s)
    pub human_walk_min: f32,
    pub human_walk_max: f32,
    /// Seconds between heading changes while walking
    pub human_turn_min: f32,
    pub human_turn_max: f32,
    /// Max heading change per turn (radians, full width)
    pub human_wander_turn: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            eat_margin: 1.1,
            pull_padding: 100.0,
            pull_strength: 600.0,
            pull_softening: 10.0,
            min_pull_distance: 5.0,
            swirl_ratio: 0.25,
            capture_damping: 0.9,
            eat_depth: 0.5,
            dying_duration: 0.5,
            circle_forgiveness: 1.0,
            rect_forgiveness: 0.85,
            soft_push: 0.1,
            enforcer_penalty: 20.0,
            void_reward_fraction: 1.0 / 3.0,
            void_reward_floor: 10.0,

            power_up_duration: 5.0,
            power_up_lifetime: 10.0,
            speed_boost: 200.0,
            magnet_suction: 1.5,

            area_scale: 3.0,
            shrink_score_scale: 5.0,
            shrink_area_scale: 15.0,
            min_radius: 15.0,
            max_radius: 600.0,
            base_speed: 150.0,
            min_speed: 50.0,
            size_penalty_start: 25.0,
            size_penalty_rate: 0.2,
            level_base: 300.0,
            level_step: 500.0,

            decision_interval: 0.2,
            decision_jitter: 0.1,
            scan_base: 600.0,
            scan_per_radius: 3.0,
            panic_base: 300.0,
            flee_speed: 1.3,
            hunt_speed: 1.1,
            wander_speed: 0.8,
            wander_turn: 1.0,
            void_value_scale: 50.0,
            void_value_floor: 10.0,
            power_up_appeal: 30.0,
            opportunity_epsilon: 10.0,
            lookahead: 0.25,
            forage_chance: 0.02,
            forage_amount: 1.0,

            enforcer_speed: 220.0,
            enforcer_radius: 60.0,
            primary_bonus: 2.0,
            target_softening: 100.0,
            detect_range: 1500.0,
            chase_speed: 1.0,
            search_speed: 0.75,
            patrol_speed: 0.6,
            search_timeout: 4.0,
            search_arrive: 40.0,
            search_spin: 3.0,
            patrol_turn_interval: 1.0,
            patrol_turn: 4.0,
            patrol_leash: 1900.0,
            sight_scale: 1.0,

            human_scan: 200.0,
            human_panic_speed: 100.0,
            human_walk_min: 30.0,
            human_walk_max: 50.0,
            human_turn_min: 1.0,
            human_turn_max: 3.0,
            human_wander_turn: 2.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        if let Err(e) = tuning.validate() {
            log::warn!("Rejected tuning: {e}");
            return Err(e);
        }
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values that break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.eat_margin <= 1.0 {
            return Err(TuningError::Invalid("eat_margin must be greater than 1"));
        }
        if !(self.eat_depth > 0.0 && self.eat_depth < 1.0) {
            return Err(TuningError::Invalid("eat_depth must be in (0, 1)"));
        }
        if !(0.0..1.0).contains(&self.swirl_ratio) {
            return Err(TuningError::Invalid("swirl_ratio must be in [0, 1)"));
        }
        if self.min_radius <= 0.0 || self.max_radius < self.min_radius {
            return Err(TuningError::Invalid("radius bounds must satisfy 0 < min <= max"));
        }
        if self.min_pull_distance <= 0.0 {
            return Err(TuningError::Invalid("min_pull_distance must be positive"));
        }
        if self.dying_duration <= 0.0 {
            return Err(TuningError::Invalid("dying_duration must be positive"));
        }
        if self.decision_interval <= 0.0 {
            return Err(TuningError::Invalid("decision_interval must be positive"));
        }
        if self.chase_speed <= self.search_speed {
            return Err(TuningError::Invalid("chase_speed must exceed search_speed"));
        }
        if !(0.0..=1.0).contains(&self.capture_damping) {
            return Err(TuningError::Invalid("capture_damping must be in [0, 1]"));
        }
        if !(self.soft_push > 0.0 && self.soft_push <= 1.0) {
            return Err(TuningError::Invalid("soft_push must be in (0, 1]"));
        }
        if !(self.rect_forgiveness > 0.0 && self.circle_forgiveness > 0.0) {
            return Err(TuningError::Invalid("blocking forgiveness must be positive"));
        }
        if !(self.search_timeout > 0.0) {
            return Err(TuningError::Invalid("search_timeout must be positive"));
        }
        if !(self.human_walk_min >= 0.0 && self.human_walk_max >= self.human_walk_min) {
            return Err(TuningError::Invalid("walk speeds must satisfy 0 <= min <= max"));
        }
        if !(self.human_turn_min > 0.0 && self.human_turn_max >= self.human_turn_min) {
            return Err(TuningError::Invalid("turn intervals must satisfy 0 < min <= max"));
        }
        Ok(())
    }

    /// Size dominance: can something of radius `eater` swallow radius `victim`
    #[inline]
    pub fn dominates(&self, eater: f32, victim: f32) -> bool {
        eater > victim * self.eat_margin
    }
}
