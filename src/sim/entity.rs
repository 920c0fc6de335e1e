//! Entity model
//!
//! Everything in the world is an `Entity`: shared spatial attributes plus a
//! closed `EntityKind` payload. Interaction rules match exhaustively on the
//! kind instead of dispatching through trait objects.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::agent::BotBrain;
use super::arena::EntityId;
use super::growth::Leveling;
use super::pedestrian::Walker;
use super::pursuit::EnforcerBrain;
use crate::tuning::Tuning;

/// Smallest radius any entity may carry
pub const MIN_ENTITY_RADIUS: f32 = 0.01;

/// A simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Render scale (1 = nominal); swallowed props shrink toward 0
    pub scale: f32,
    /// Visual-only offset, decays independently of gameplay
    pub shake: Vec2,
    /// Write-once removal flag, honored at end of tick
    pub marked_for_deletion: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec2, radius: f32, kind: EntityKind) -> Self {
        debug_assert!(radius > 0.0, "entity radius must be positive");
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: radius.max(MIN_ENTITY_RADIUS),
            scale: 1.0,
            shake: Vec2::ZERO,
            marked_for_deletion: false,
            kind,
        }
    }

    pub fn void(pos: Vec2, radius: f32, agent: VoidAgent) -> Self {
        Self::new(pos, radius, EntityKind::Void(agent))
    }

    /// A prop built from its archetype
    pub fn prop(pos: Vec2, kind: PropKind) -> Self {
        let prop = Prop::new(kind);
        Self::new(pos, kind.radius(), EntityKind::Prop(prop))
    }

    pub fn power_up(pos: Vec2, kind: PowerUpKind, tuning: &Tuning) -> Self {
        Self::new(
            pos,
            POWER_UP_RADIUS,
            EntityKind::PowerUp(PowerUp {
                kind,
                life: tuning.power_up_lifetime,
            }),
        )
    }

    /// Flag for removal; a no-op once set
    #[inline]
    pub fn mark_deleted(&mut self) {
        self.marked_for_deletion = true;
    }

    pub fn as_void(&self) -> Option<&VoidAgent> {
        match &self.kind {
            EntityKind::Void(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_void_mut(&mut self) -> Option<&mut VoidAgent> {
        match &mut self.kind {
            EntityKind::Void(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_prop(&self) -> Option<&Prop> {
        match &self.kind {
            EntityKind::Prop(prop) => Some(prop),
            _ => None,
        }
    }

    pub fn as_prop_mut(&mut self) -> Option<&mut Prop> {
        match &mut self.kind {
            EntityKind::Prop(prop) => Some(prop),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, EntityKind::Void(_))
    }

    /// Particles integrate their own motion
    pub fn self_propelled(&self) -> bool {
        matches!(self.kind, EntityKind::Particle(_))
    }
}

/// Entity payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Void(VoidAgent),
    Prop(Prop),
    PowerUp(PowerUp),
    Particle(Particle),
    FloatingText(FloatingText),
}

/// Who steers a void
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pilot {
    /// Follows the external steering vector
    Player,
    Bot(BotBrain),
    Enforcer(EnforcerBrain),
}

/// Timed effects granted by power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    Magnet,
    Shield,
}

/// A consuming void (player, bot or enforcer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidAgent {
    pub name: String,
    /// Growth currency
    pub score: f32,
    pub base_speed: f32,
    /// Speed after size penalty and active effects, refreshed each tick
    pub current_speed: f32,
    pub growth_multiplier: f32,
    pub suction_range: f32,
    pub satellites: u32,
    /// Active effect -> seconds remaining
    pub power_ups: BTreeMap<PowerUpKind, f32>,
    pub invulnerable: bool,
    pub invulnerable_timer: f32,
    pub leveling: Leveling,
    pub pilot: Pilot,
}

impl VoidAgent {
    pub fn new(name: impl Into<String>, pilot: Pilot, tuning: &Tuning) -> Self {
        Self {
            name: name.into(),
            score: 0.0,
            base_speed: tuning.base_speed,
            current_speed: tuning.base_speed,
            growth_multiplier: 1.0,
            suction_range: 1.0,
            satellites: 0,
            power_ups: BTreeMap::new(),
            invulnerable: false,
            invulnerable_timer: 0.0,
            leveling: Leveling::new(tuning),
            pilot,
        }
    }

    pub fn player(name: impl Into<String>, tuning: &Tuning) -> Self {
        Self::new(name, Pilot::Player, tuning)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.pilot, Pilot::Player)
    }

    pub fn is_enforcer(&self) -> bool {
        matches!(self.pilot, Pilot::Enforcer(_))
    }

    pub fn has_power_up(&self, kind: PowerUpKind) -> bool {
        self.power_ups.contains_key(&kind)
    }

    /// Effective suction multiplier including the magnet effect
    pub fn suction_multiplier(&self, tuning: &Tuning) -> f32 {
        if self.has_power_up(PowerUpKind::Magnet) {
            self.suction_range * tuning.magnet_suction
        } else {
            self.suction_range
        }
    }

    /// Claim a power-up effect (refreshes the timer if already active)
    pub fn apply_power_up(&mut self, kind: PowerUpKind, tuning: &Tuning) {
        match kind {
            PowerUpKind::Shield => self.make_invulnerable(tuning.power_up_duration),
            PowerUpKind::Speed | PowerUpKind::Magnet => {
                self.power_ups.insert(kind, tuning.power_up_duration);
            }
        }
    }

    pub fn make_invulnerable(&mut self, seconds: f32) {
        self.invulnerable = true;
        self.invulnerable_timer = self.invulnerable_timer.max(seconds);
    }

    /// Count down effects and invulnerability
    pub fn tick_timers(&mut self, dt: f32) {
        self.power_ups.retain(|_, remaining| {
            *remaining -= dt;
            *remaining > 0.0
        });

        if self.invulnerable {
            self.invulnerable_timer -= dt;
            if self.invulnerable_timer <= 0.0 {
                self.invulnerable = false;
                self.invulnerable_timer = 0.0;
            }
        }
    }

    /// Recompute `current_speed` from size and active effects
    pub fn refresh_speed(&mut self, radius: f32, tuning: &Tuning) {
        self.current_speed = if self.is_enforcer() {
            self.base_speed
        } else if self.has_power_up(PowerUpKind::Speed) {
            self.base_speed + tuning.speed_boost
        } else {
            let penalty = ((radius - tuning.size_penalty_start) * tuning.size_penalty_rate).max(0.0);
            (self.base_speed - penalty).max(tuning.min_speed)
        };
    }
}

/// Collision footprint of a prop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    /// Axis-aligned box centered on the prop
    Rect { width: f32, length: f32 },
}

/// Prop archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropKind {
    Bottle,
    Cone,
    Mailbox,
    Pole,
    Fence,
    TrashBin,
    Human,
    Bench,
    Motorcycle,
    Kiosk,
    Car,
    Van,
    Bus,
    Truck,
    Shelter,
    Building,
    /// Parked patrol car; swallowing it is punished
    PoliceCar,
}

impl PropKind {
    pub const ALL: [PropKind; 17] = [
        PropKind::Bottle,
        PropKind::Cone,
        PropKind::Mailbox,
        PropKind::Pole,
        PropKind::Fence,
        PropKind::TrashBin,
        PropKind::Human,
        PropKind::Bench,
        PropKind::Motorcycle,
        PropKind::Kiosk,
        PropKind::Car,
        PropKind::Van,
        PropKind::Bus,
        PropKind::Truck,
        PropKind::Shelter,
        PropKind::Building,
        PropKind::PoliceCar,
    ];

    pub fn radius(self) -> f32 {
        match self {
            PropKind::Bottle => 5.0,
            PropKind::Cone => 8.0,
            PropKind::Mailbox => 10.0,
            PropKind::Pole => 12.0,
            PropKind::Fence => 15.0,
            PropKind::TrashBin | PropKind::Human => 18.0,
            PropKind::Bench => 20.0,
            PropKind::Motorcycle => 28.0,
            PropKind::Kiosk => 35.0,
            PropKind::Car | PropKind::PoliceCar => 45.0,
            PropKind::Van => 55.0,
            PropKind::Bus => 60.0,
            PropKind::Truck => 70.0,
            PropKind::Shelter => 80.0,
            PropKind::Building => 200.0,
        }
    }

    /// Growth currency granted when eaten
    pub fn value(self) -> f32 {
        match self {
            PropKind::Bottle => 1.0,
            PropKind::Cone => 2.0,
            PropKind::Mailbox => 5.0,
            PropKind::Pole => 10.0,
            PropKind::Fence => 15.0,
            PropKind::TrashBin => 20.0,
            PropKind::Human => 25.0,
            PropKind::Bench => 30.0,
            PropKind::Motorcycle => 50.0,
            PropKind::Kiosk => 80.0,
            PropKind::Car => 100.0,
            PropKind::Van => 150.0,
            PropKind::Bus => 200.0,
            PropKind::Truck => 250.0,
            PropKind::Shelter => 400.0,
            PropKind::Building => 2500.0,
            PropKind::PoliceCar => 0.0,
        }
    }

    pub fn solid(self) -> bool {
        matches!(
            self,
            PropKind::Mailbox
                | PropKind::Pole
                | PropKind::Fence
                | PropKind::TrashBin
                | PropKind::Bench
                | PropKind::Kiosk
                | PropKind::Shelter
                | PropKind::Building
        )
    }

    pub fn shape(self) -> Shape {
        let r = self.radius();
        match self {
            PropKind::Building => Shape::Rect {
                width: r * 2.0,
                length: r * 2.0,
            },
            PropKind::Shelter => Shape::Rect {
                width: r * 2.0,
                length: r,
            },
            _ => Shape::Circle,
        }
    }
}

/// Swallow animation state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dying {
    pub consumer: EntityId,
    pub start: Vec2,
    /// Last known consumer position (kept if the consumer disappears)
    pub target: Vec2,
    pub elapsed: f32,
    pub duration: f32,
}

impl Dying {
    /// Interpolation parameter in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

/// A world object that can be eaten or block movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub kind: PropKind,
    pub value: f32,
    pub solid: bool,
    pub shape: Shape,
    /// Swallowing this shrinks the eater
    pub enforcer: bool,
    pub dying: Option<Dying>,
    /// Set for pedestrians, which steer themselves
    pub walker: Option<Walker>,
}

impl Prop {
    pub fn new(kind: PropKind) -> Self {
        Self {
            kind,
            value: kind.value(),
            solid: kind.solid(),
            shape: kind.shape(),
            enforcer: kind == PropKind::PoliceCar,
            dying: None,
            walker: None,
        }
    }

    pub fn is_dying(&self) -> bool {
        self.dying.is_some()
    }
}

/// Fixed pickup radius
pub const POWER_UP_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Seconds left before it vanishes unclaimed
    pub life: f32,
}

/// Debris burst; moves itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub life: f32,
    pub max_life: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub life: f32,
}

impl FloatingText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            life: 1.0,
        }
    }
}
