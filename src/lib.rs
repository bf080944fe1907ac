//! Ninja Sling - a vertical slingshot platformer
//!
//! Core modules:
//! - `sim`: Frame simulation (ball physics, collisions, camera, platform generation)
//! - `view`: Read-only projection of the simulation for the renderer and HUD
//! - `platform`: Browser/native platform abstraction (viewport, frame clock)
//! - `persistence`: Key/value storage for high score, settings and player data
//! - `highscores`: Local leaderboard and player identity
//! - `tuning`: Data-driven physics and generation balance

pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod view;

pub use error::{Error, Result};
pub use highscores::{HighScores, Leaderboard, PlayerProfile};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (world units per screen at scale 1)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Frame timing: physics is normalized to a 60 Hz baseline
    pub const FIXED_FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame we integrate in one go (30 fps floor)
    pub const MAX_FRAME_MS: f32 = 33.33;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 15.0;
    pub const SPAWN_X: f32 = 400.0;
    pub const SPAWN_Y: f32 = 500.0;
    pub const MAX_BOUNCES: u32 = 1;
    /// Extra grab distance around the ball for starting a drag
    pub const GRAB_TOLERANCE: f32 = 40.0;

    /// Live physics (per 60 Hz frame)
    pub const GRAVITY: f32 = 0.8;
    pub const AIR_RESISTANCE: f32 = 0.9995;
    /// Below this speed a bouncing ball is forced to land
    pub const MIN_VELOCITY: f32 = 0.1;

    /// Slingshot
    pub const MAX_POWER: f32 = 250.0;
    pub const LAUNCH_SCALE: f32 = 25.0;
    /// Releases at or below this power are cancelled
    pub const MIN_LAUNCH_POWER: f32 = 0.1;

    /// Trajectory preview physics (deliberately approximate)
    pub const PREVIEW_LAUNCH_SCALE: f32 = 35.0;
    pub const PREVIEW_GRAVITY: f32 = 0.5;
    pub const PREVIEW_AIR_RESISTANCE: f32 = 0.999;
    pub const PREVIEW_MAX_POINTS: usize = 30;
    pub const PREVIEW_GROUND_Y: f32 = 600.0;

    /// Bounce damping
    pub const SIDE_BOUNCE: f32 = 0.7;
    pub const UNDER_BOUNCE: f32 = 0.4;
    pub const TOP_BOUNCE: f32 = 0.5;
    pub const WALL_BOUNCE: f32 = 0.7;

    /// Side walls, relative to the camera's x
    pub const WALL_LEFT: f32 = 50.0;
    pub const WALL_RIGHT: f32 = 750.0;

    /// Out-of-bounds limits
    pub const DEATH_Y: f32 = 650.0;
    pub const OUT_LEFT_X: f32 = -50.0;
    pub const OUT_RIGHT_X: f32 = 900.0;

    /// Camera
    pub const CAMERA_TOP_BOUNDARY: f32 = 200.0;
    pub const CAMERA_BOTTOM_BOUNDARY: f32 = 400.0;
    pub const CAMERA_TOP_LOOKAHEAD: f32 = 300.0;
    pub const CAMERA_FOLLOW_SPEED: f32 = 0.08;
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const DEATH_SHAKE: f32 = 12.0;

    /// Generation
    pub const GENERATION_TRIGGER: f32 = 400.0;
    pub const PRUNE_WINDOW: f32 = 1000.0;
    pub const PLATFORM_HEIGHT: f32 = 15.0;

    /// Effects lifetimes (in 60 Hz frames)
    pub const TRAIL_LENGTH: usize = 15;
    pub const TRAIL_LIFE: f32 = 15.0;
    pub const PARTICLE_LIFE: f32 = 30.0;
    pub const FLOATING_TEXT_LIFE: f32 = 60.0;
}

/// Per-tick scalar that normalizes integration to the 60 Hz baseline.
///
/// Frame times longer than [`consts::MAX_FRAME_MS`] are clamped so a stalled
/// tab doesn't tunnel the ball through platforms. Non-finite input counts as
/// a single nominal frame.
#[inline]
pub fn delta_multiplier(elapsed_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() {
        return 1.0;
    }
    elapsed_ms.clamp(0.0, consts::MAX_FRAME_MS) / consts::FIXED_FRAME_MS
}

/// Score value of a platform at world height `y`
#[inline]
pub fn height_points(y: f32) -> u32 {
    ((y.abs() / 100.0).floor() as u32 + 1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_multiplier() {
        assert!((delta_multiplier(consts::FIXED_FRAME_MS) - 1.0).abs() < 1e-6);
        assert!((delta_multiplier(1000.0) - 33.33 / consts::FIXED_FRAME_MS).abs() < 1e-4);
        assert_eq!(delta_multiplier(-5.0), 0.0);
        assert_eq!(delta_multiplier(f32::NAN), 1.0);
    }

    #[test]
    fn test_height_points() {
        assert_eq!(height_points(-300.0), 4);
        assert_eq!(height_points(0.0), 1);
        assert_eq!(height_points(520.0), 6);
        assert_eq!(height_points(-99.9), 1);
    }
}
