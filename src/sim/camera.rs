//! Camera tracking
//!
//! The camera only moves vertically. While the ball sits inside the band
//! between `top_boundary` and `bottom_boundary` (screen space) the camera
//! holds; outside it the camera eases toward a new target.

use super::state::SimulationState;
use crate::consts::{CAMERA_TOP_LOOKAHEAD, SHAKE_DECAY};

const SHAKE_CUTOFF: f32 = 0.01;

/// Follow the ball and decay shake by `dt` frames
pub fn update_camera(state: &mut SimulationState, dt: f32) {
    let ball_y = state.ball.pos.y;
    let camera = &mut state.camera;

    let screen_y = ball_y - camera.y;
    let target = if screen_y < camera.top_boundary {
        Some(ball_y - CAMERA_TOP_LOOKAHEAD)
    } else if screen_y > camera.bottom_boundary {
        Some(ball_y - camera.bottom_boundary)
    } else {
        None
    };

    if let Some(target) = target {
        camera.y += (target - camera.y) * camera.follow_speed * dt;
    }

    camera.y = camera.y.max(camera.world_max_y).min(camera.floor_y);

    if camera.shake > 0.0 {
        camera.shake *= SHAKE_DECAY.powf(dt);
        if camera.shake < SHAKE_CUTOFF {
            camera.shake = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_inside_band() {
        let mut state = SimulationState::new(1);
        state.ball.pos.y = 300.0;
        update_camera(&mut state, 1.0);
        assert_eq!(state.camera.y, 0.0);
    }

    #[test]
    fn test_scrolls_up_toward_ball() {
        let mut state = SimulationState::new(1);
        state.ball.pos.y = 100.0;
        update_camera(&mut state, 1.0);
        // target = 100 - 300 = -200, moved 8% of the way
        assert!((state.camera.y - (-16.0)).abs() < 1e-4);

        for _ in 0..500 {
            update_camera(&mut state, 1.0);
        }
        // Converges until the ball re-enters the band
        let screen_y = state.ball.pos.y - state.camera.y;
        assert!(screen_y >= state.camera.top_boundary - 1e-3);
    }

    #[test]
    fn test_never_below_origin() {
        let mut state = SimulationState::new(1);
        state.camera.y = -10.0;
        state.ball.pos.y = 590.0;
        for _ in 0..200 {
            update_camera(&mut state, 1.0);
            assert!(state.camera.y <= 0.0);
        }
        assert_eq!(state.camera.y, 0.0);
    }

    #[test]
    fn test_scrolls_down_when_ball_drops() {
        let mut state = SimulationState::new(1);
        state.camera.y = -2000.0;
        state.ball.pos.y = -1500.0;
        update_camera(&mut state, 1.0);
        // target = -1500 - 400 = -1900
        assert!((state.camera.y - (-2000.0 + 100.0 * 0.08)).abs() < 1e-3);
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut state = SimulationState::new(1);
        state.camera.shake = 10.0;
        update_camera(&mut state, 1.0);
        assert!((state.camera.shake - 9.0).abs() < 1e-4);
        for _ in 0..200 {
            update_camera(&mut state, 1.0);
        }
        assert_eq!(state.camera.shake, 0.0);
    }
}
