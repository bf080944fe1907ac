//! Data-driven game balance
//!
//! Every physics and generation tunable the frame driver reads lives here.
//! Defaults come from [`crate::consts`]; a JSON document can override any
//! subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Live physics ===
    pub gravity: f32,
    pub air_resistance: f32,
    pub min_velocity: f32,
    pub max_bounces: u32,

    // === Slingshot ===
    pub max_power: f32,
    pub launch_scale: f32,
    pub min_launch_power: f32,
    pub grab_tolerance: f32,

    // === Trajectory preview ===
    pub preview_launch_scale: f32,
    pub preview_gravity: f32,
    pub preview_air_resistance: f32,
    pub preview_max_points: usize,
    pub preview_ground_y: f32,

    // === Bounces ===
    pub side_bounce: f32,
    pub under_bounce: f32,
    pub top_bounce: f32,
    pub wall_bounce: f32,

    // === Camera ===
    pub camera_follow_speed: f32,
    pub camera_top_boundary: f32,
    pub camera_bottom_boundary: f32,

    // === Generation ===
    pub generation_trigger: f32,
    pub prune_window: f32,
    /// Also extend the world below the camera (downward scrolling)
    pub generate_below: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            air_resistance: AIR_RESISTANCE,
            min_velocity: MIN_VELOCITY,
            max_bounces: MAX_BOUNCES,

            max_power: MAX_POWER,
            launch_scale: LAUNCH_SCALE,
            min_launch_power: MIN_LAUNCH_POWER,
            grab_tolerance: GRAB_TOLERANCE,

            preview_launch_scale: PREVIEW_LAUNCH_SCALE,
            preview_gravity: PREVIEW_GRAVITY,
            preview_air_resistance: PREVIEW_AIR_RESISTANCE,
            preview_max_points: PREVIEW_MAX_POINTS,
            preview_ground_y: PREVIEW_GROUND_Y,

            side_bounce: SIDE_BOUNCE,
            under_bounce: UNDER_BOUNCE,
            top_bounce: TOP_BOUNCE,
            wall_bounce: WALL_BOUNCE,

            camera_follow_speed: CAMERA_FOLLOW_SPEED,
            camera_top_boundary: CAMERA_TOP_BOUNDARY,
            camera_bottom_boundary: CAMERA_BOTTOM_BOUNDARY,

            generation_trigger: GENERATION_TRIGGER,
            prune_window: PRUNE_WINDOW,
            generate_below: false,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!(
            "Loaded tuning: gravity={} launch_scale={} generate_below={}",
            tuning.gravity,
            tuning.launch_scale,
            tuning.generate_below
        );
        Ok(tuning)
    }

    /// Read a tuning document from disk
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 1.2, "generate_below": true }"#).unwrap();
        assert_eq!(tuning.gravity, 1.2);
        assert!(tuning.generate_below);
        assert_eq!(tuning.launch_scale, LAUNCH_SCALE);
        assert_eq!(tuning.preview_max_points, PREVIEW_MAX_POINTS);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Tuning::from_json("{ gravity: ").is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir()
            .join(format!("ninja-sling-tuning-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "max_bounces": 3 }"#).unwrap();
        let tuning = Tuning::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(tuning.max_bounces, 3);
        assert_eq!(tuning.gravity, GRAVITY);

        assert!(matches!(
            Tuning::from_file(&path),
            Err(crate::Error::Io(_))
        ));
    }

    #[test]
    fn test_preview_differs_from_live_physics() {
        let tuning = Tuning::default();
        assert!(tuning.preview_launch_scale > tuning.launch_scale);
        assert!(tuning.preview_gravity < tuning.gravity);
    }
}
