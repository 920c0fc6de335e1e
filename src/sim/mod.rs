//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by arena slot)
//! - No rendering or platform dependencies

pub mod agent;
pub mod arena;
pub mod collision;
pub mod entity;
pub mod growth;
pub mod interaction;
pub mod motion;
pub mod pedestrian;
pub mod pursuit;
pub mod state;
pub mod tick;

pub use agent::{BotBrain, BotIntent, BotState, SelfView};
pub use arena::{Arena, EntityId};
pub use collision::{CollisionResult, circle_circle, circle_rect};
pub use entity::{
    Entity, EntityKind, Pilot, PowerUpKind, Prop, PropKind, Shape, VoidAgent,
};
pub use growth::{Leveling, Upgrade, apply_upgrade, grow, shrink};
pub use interaction::{ConsumeEvent, Meal, Outcome, resolve_interactions};
pub use motion::integrate_motion;
pub use pedestrian::{Walker, WalkerState, update_pedestrians};
pub use pursuit::{EnforcerBrain, Obstacle, PursuitState, line_of_sight};
pub use state::{Role, Standing, World};
pub use tick::{Stepper, TickInput, tick};
