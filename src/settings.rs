//! Player preferences
//!
//! Persisted as JSON separately from scores.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Camera shake on death
    pub screen_shake: bool,
    pub particles: bool,
    /// Ball trail
    pub trails: bool,
    /// Dotted arc while aiming
    pub show_trajectory: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            screen_shake: true,
            particles: true,
            trails: true,
            show_trajectory: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "ninjaSlingSettings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Volume multiplier applied to every tone
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Stored settings, or the defaults if none are stored or they are unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<()> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
