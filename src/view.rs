//! Render projection
//!
//! A read-only, serializable snapshot of one frame in screen coordinates.
//! The drawing itself happens outside the crate (a canvas script on the web),
//! so everything here is plain data: positions already offset by the camera
//! and shake, colours as CSS strings, fades as alpha.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::{
    FLOATING_TEXT_LIFE, PARTICLE_LIFE, TRAIL_LIFE, VIEW_HEIGHT, VIEW_WIDTH,
};
use crate::settings::Settings;
use crate::sim::{GamePhase, SimulationState, launch_power};

/// Platforms this far outside the screen are still drawn
const CULL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    /// Ready to be slung (drawn highlighted)
    pub can_sling: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrailView {
    pub pos: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformView {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: &'static str,
    pub color: String,
    pub scored: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlingView {
    pub anchor: Vec2,
    pub drag: Vec2,
    /// 0-1
    pub power: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    pub color: String,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextView {
    pub pos: Vec2,
    pub text: String,
    pub color: String,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub score: u32,
    pub high_score: u32,
    pub phase: &'static str,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub width: f32,
    pub height: f32,
    /// World-to-screen translation, shake included
    pub offset: Vec2,
    pub ball: BallView,
    pub trail: Vec<TrailView>,
    pub platforms: Vec<PlatformView>,
    pub slingshot: Option<SlingView>,
    pub preview: Vec<Vec2>,
    pub particles: Vec<ParticleView>,
    pub texts: Vec<TextView>,
    pub hud: Hud,
}

fn css_color(rgb: u32) -> String {
    format!("#{:06x}", rgb & 0xFF_FFFF)
}

/// Random offset in `[-shake, shake]²`, stable for a given tick
fn shake_jitter(state: &SimulationState) -> Vec2 {
    let mut rng = Pcg32::seed_from_u64(state.seed ^ state.time_ticks);
    let shake = state.camera.shake;
    Vec2::new(
        (rng.random::<f32>() - 0.5) * 2.0 * shake,
        (rng.random::<f32>() - 0.5) * 2.0 * shake,
    )
}

impl FrameView {
    /// Project the state for rendering; `None` when the camera is unusable
    pub fn capture(state: &SimulationState, settings: &Settings) -> Option<Self> {
        let camera = &state.camera;
        if !camera.x.is_finite() || !camera.y.is_finite() || !camera.shake.is_finite() {
            log::warn!("Skipping frame: camera at ({}, {})", camera.x, camera.y);
            return None;
        }

        let jitter = if settings.effective_screen_shake() && camera.shake > 0.0 {
            shake_jitter(state)
        } else {
            Vec2::ZERO
        };
        let offset = jitter - Vec2::new(camera.x, camera.y);
        let to_screen = |p: Vec2| p + offset;

        let ball = &state.ball;

        let trail = if settings.trails {
            ball.trail
                .iter()
                .map(|t| TrailView {
                    pos: to_screen(t.pos),
                    alpha: (t.life / TRAIL_LIFE).clamp(0.0, 1.0),
                })
                .collect()
        } else {
            Vec::new()
        };

        let platforms = state
            .platforms
            .iter()
            .filter(|p| {
                let top = p.rect.top() + offset.y;
                top + p.rect.size.y >= -CULL_MARGIN && top <= VIEW_HEIGHT + CULL_MARGIN
            })
            .map(|p| PlatformView {
                pos: to_screen(p.rect.pos),
                size: p.rect.size,
                kind: p.kind.label(),
                color: css_color(p.kind.color()),
                scored: p.scored,
            })
            .collect();

        let aiming = state.phase == GamePhase::Aiming && state.slingshot.dragging;
        let slingshot = aiming.then(|| SlingView {
            anchor: to_screen(ball.pos),
            drag: to_screen(state.slingshot.drag),
            power: launch_power(ball.pos, state.slingshot.drag, state.slingshot.max_power),
        });
        let preview = if aiming && settings.show_trajectory {
            state.slingshot.preview.iter().map(|&p| to_screen(p)).collect()
        } else {
            Vec::new()
        };

        let particles = if settings.effective_particles() {
            state
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: to_screen(p.pos),
                    size: p.size,
                    color: css_color(p.color),
                    alpha: (p.life / PARTICLE_LIFE).clamp(0.0, 1.0),
                })
                .collect()
        } else {
            Vec::new()
        };

        let texts = state
            .floating_texts
            .iter()
            .map(|t| TextView {
                pos: to_screen(t.pos),
                text: t.text.clone(),
                color: css_color(t.color),
                alpha: (t.life / FLOATING_TEXT_LIFE).clamp(0.0, 1.0),
            })
            .collect();

        Some(Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            offset,
            ball: BallView {
                pos: to_screen(ball.pos),
                radius: ball.radius,
                can_sling: ball.can_sling(),
            },
            trail,
            platforms,
            slingshot,
            preview,
            particles,
            texts,
            hud: Hud {
                score: state.score,
                high_score: state.high_score,
                phase: state.phase.label(),
            },
        })
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{InputEvent, TickInput, tick};

    #[test]
    fn test_capture_applies_camera_offset() {
        let mut state = SimulationState::new(1);
        state.camera.y = -200.0;
        let view = FrameView::capture(&state, &Settings::default()).unwrap();
        assert_eq!(view.offset, Vec2::new(0.0, 200.0));
        assert_eq!(view.ball.pos, state.ball.pos + Vec2::new(0.0, 200.0));
        assert_eq!(view.hud.phase, "ready");
        assert!(view.ball.can_sling);
        assert!(view.slingshot.is_none());
    }

    #[test]
    fn test_offscreen_platforms_are_culled() {
        let mut state = SimulationState::new(1);
        state.camera.y = -5000.0;
        let view = FrameView::capture(&state, &Settings::default()).unwrap();
        assert!(view.platforms.is_empty());

        state.camera.y = 0.0;
        let view = FrameView::capture(&state, &Settings::default()).unwrap();
        assert!(!view.platforms.is_empty());
        assert!(view.platforms.iter().any(|p| p.kind == "deadly" && p.color == "#f44336"));
    }

    #[test]
    fn test_non_finite_camera_skips_frame() {
        let mut state = SimulationState::new(1);
        state.camera.y = f32::NAN;
        assert!(FrameView::capture(&state, &Settings::default()).is_none());
    }

    #[test]
    fn test_shake_respects_settings() {
        let mut state = SimulationState::new(1);
        state.camera.shake = 10.0;
        let view = FrameView::capture(&state, &Settings::default()).unwrap();
        assert!(view.offset.x.abs() <= 10.0 && view.offset.y.abs() <= 10.0);

        let calm = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let view = FrameView::capture(&state, &calm).unwrap();
        assert_eq!(view.offset, Vec2::ZERO);
    }

    #[test]
    fn test_aiming_view() {
        let mut state = SimulationState::new(1);
        let ball = state.ball.pos;
        let input = TickInput {
            events: vec![
                InputEvent::PointerDown(ball),
                InputEvent::PointerMove(ball + Vec2::new(0.0, 125.0)),
            ],
        };
        tick(&mut state, &input, crate::consts::FIXED_FRAME_MS);

        let view = FrameView::capture(&state, &Settings::default()).unwrap();
        let sling = view.slingshot.unwrap();
        assert!((sling.power - 0.5).abs() < 1e-5);
        assert!(!view.preview.is_empty());
        assert_eq!(view.hud.phase, "aiming");

        let hidden = Settings {
            show_trajectory: false,
            ..Default::default()
        };
        assert!(FrameView::capture(&state, &hidden).unwrap().preview.is_empty());
    }

    #[test]
    fn test_serializes_to_json() {
        let state = SimulationState::new(1);
        let json = FrameView::capture(&state, &Settings::default())
            .unwrap()
            .to_json()
            .unwrap();
        assert!(json.contains("\"hud\""));
        assert!(json.contains("\"score\":0"));
    }
}
