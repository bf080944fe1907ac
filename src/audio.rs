//! Sound effects
//!
//! Every effect is a single procedurally generated tone: an oscillator at a
//! fixed frequency whose gain decays exponentially over the duration. No
//! audio files are needed.

use crate::sim::GameEvent;

/// One oscillator note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Hz
    pub frequency: f32,
    /// Seconds
    pub duration: f32,
    /// Starting gain before settings are applied
    pub volume: f32,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundEffect {
    /// Ball slung; pitch rises with power
    Launch { power: f32 },
    /// Ball hit a side wall
    WallBounce,
    /// Landed on a new platform
    Score,
    /// Settled on a platform after bouncing
    Land,
    /// Game over
    Death,
    /// New high score
    HighScore,
}

impl SoundEffect {
    pub fn tone(&self) -> Tone {
        let (frequency, duration, volume) = match *self {
            SoundEffect::Launch { power } => (200.0 + power * 10.0, 0.2, 0.15),
            SoundEffect::WallBounce => (280.0, 0.12, 0.1),
            SoundEffect::Score => (300.0, 0.15, 0.1),
            SoundEffect::Land => (250.0, 0.1, 0.08),
            SoundEffect::Death => (150.0, 0.3, 0.2),
            SoundEffect::HighScore => (520.0, 0.4, 0.15),
        };
        Tone {
            frequency,
            duration,
            volume,
        }
    }

    /// The sound a simulation event makes, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Launched { power } => Some(SoundEffect::Launch { power: *power }),
            GameEvent::WallBounce => Some(SoundEffect::WallBounce),
            GameEvent::Landed {
                points: Some(_), ..
            } => Some(SoundEffect::Score),
            GameEvent::Landed { points: None, .. } => Some(SoundEffect::Land),
            GameEvent::GameOver { .. } => Some(SoundEffect::Death),
            GameEvent::HighScore { .. } => Some(SoundEffect::HighScore),
            GameEvent::PlatformBounce => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, Tone};

    /// Gain the envelope decays to (exponential ramps cannot reach zero)
    const RAMP_FLOOR: f32 = 0.01;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, volume: 1.0 }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Volume multiplier (0.0 - 1.0), see `Settings::effective_volume`
        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        pub fn play(&self, effect: SoundEffect) {
            self.play_tone(effect.tone());
        }

        /// Fire and forget; any Web Audio failure just means silence
        pub fn play_tone(&self, tone: Tone) {
            let vol = tone.volume * self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((osc, gain)) = create_osc(ctx, tone.frequency, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();
            let end = t + tone.duration as f64;

            osc.frequency().set_value_at_time(tone.frequency, t).ok();
            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(RAMP_FLOOR, end)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(end).ok();
        }
    }

    /// Create an oscillator routed through a gain node to the speakers
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
