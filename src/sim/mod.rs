//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and the same input
//! queue, a session evolves identically:
//! - Seeded RNG only
//! - Time enters only through the delta multiplier
//! - Platforms addressed by stable id, never by index across ticks
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod effects;
pub mod generator;
pub mod rect;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use camera::update_camera;
pub use collision::{Contact, is_out_of_bounds, resolve_platform_collisions, resolve_side_walls};
pub use generator::{generate_down, generate_up, maintain_world, opening_layout, reset_layout};
pub use rect::Rect;
pub use state::{
    Ball, Camera, DeathCause, FloatingText, GameEvent, GamePhase, Oscillation, Particle, Platform,
    PlatformId, PlatformKind, SimulationState, Slingshot, TrailPoint,
};
pub use tick::{InputEvent, TickInput, hard_reset, tick};
pub use trajectory::{Trajectory, launch_power, launch_velocity};
