//! Slingshot maths: launch power, launch velocity and the aiming preview
//!
//! The preview deliberately runs on its own, lighter physics
//! (`preview_gravity`, `preview_launch_scale`) so the dotted arc reads as a
//! hint rather than an exact path.

use glam::Vec2;

use crate::tuning::Tuning;

/// Normalized launch power in `[0, 1]`
#[inline]
pub fn launch_power(ball: Vec2, drag: Vec2, max_power: f32) -> f32 {
    if max_power <= 0.0 {
        return 0.0;
    }
    (ball.distance(drag) / max_power).min(1.0)
}

/// Velocity for a drag, scaled by `scale`.
///
/// The ball flies along the drag vector: `(drag - ball) / max_power * power * scale`.
pub fn launch_velocity(ball: Vec2, drag: Vec2, max_power: f32, scale: f32) -> Vec2 {
    if max_power <= 0.0 {
        return Vec2::ZERO;
    }
    let power = launch_power(ball, drag, max_power);
    (drag - ball) / max_power * power * scale
}

/// Lazily evaluated ballistic preview
#[derive(Debug, Clone)]
pub struct Trajectory {
    pos: Vec2,
    vel: Vec2,
    gravity: f32,
    resistance: f32,
    ground_y: f32,
    remaining: usize,
}

impl Trajectory {
    /// Preview for the current drag using the tuning's preview physics
    pub fn predict(ball: Vec2, drag: Vec2, max_power: f32, tuning: &Tuning) -> Self {
        Self {
            pos: ball,
            vel: launch_velocity(ball, drag, max_power, tuning.preview_launch_scale),
            gravity: tuning.preview_gravity,
            resistance: tuning.preview_air_resistance,
            ground_y: tuning.preview_ground_y,
            remaining: tuning.preview_max_points,
        }
    }
}

impl Iterator for Trajectory {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.remaining == 0 {
            return None;
        }
        let point = self.pos;

        self.vel.y += self.gravity;
        self.vel *= self.resistance;
        self.pos += self.vel;

        // Past the ground the path is cut: nothing further is emitted
        self.remaining = if self.pos.y > self.ground_y {
            0
        } else {
            self.remaining - 1
        };
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use proptest::prelude::*;

    #[test]
    fn test_release_scenario_velocity() {
        let ball = Vec2::new(400.0, 500.0);
        let drag = Vec2::new(400.0, 750.0);
        assert_eq!(launch_power(ball, drag, MAX_POWER), 1.0);
        let vel = launch_velocity(ball, drag, MAX_POWER, LAUNCH_SCALE);
        assert!(vel.x.abs() < 1e-6);
        assert!((vel.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_power_is_capped() {
        let ball = Vec2::ZERO;
        assert_eq!(launch_power(ball, Vec2::new(1000.0, 0.0), MAX_POWER), 1.0);
        assert!((launch_power(ball, Vec2::new(125.0, 0.0), MAX_POWER) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_length_drag() {
        let ball = Vec2::new(10.0, 10.0);
        assert_eq!(launch_power(ball, ball, MAX_POWER), 0.0);
        assert_eq!(launch_velocity(ball, ball, MAX_POWER, LAUNCH_SCALE), Vec2::ZERO);
        assert_eq!(launch_velocity(ball, Vec2::ONE, 0.0, LAUNCH_SCALE), Vec2::ZERO);
    }

    #[test]
    fn test_preview_starts_at_ball_and_is_bounded() {
        let tuning = Tuning::default();
        let ball = Vec2::new(400.0, 500.0);
        // Drag upward: long arc, never reaches the ground within 30 points
        let points: Vec<_> =
            Trajectory::predict(ball, Vec2::new(400.0, 300.0), MAX_POWER, &tuning).collect();
        assert_eq!(points[0], ball);
        assert_eq!(points.len(), PREVIEW_MAX_POINTS);
    }

    #[test]
    fn test_preview_stops_at_ground() {
        let tuning = Tuning::default();
        let ball = Vec2::new(400.0, 500.0);
        // Drag downward at full power: 35 units/frame, past y=600 on the third step
        let points: Vec<_> =
            Trajectory::predict(ball, Vec2::new(400.0, 800.0), MAX_POWER, &tuning).collect();
        assert!(points.len() < PREVIEW_MAX_POINTS);
        assert!(points.iter().all(|p| p.y <= PREVIEW_GROUND_Y));
    }

    #[test]
    fn test_preview_uses_lighter_physics_than_launch() {
        let tuning = Tuning::default();
        let ball = Vec2::new(400.0, 500.0);
        let drag = Vec2::new(500.0, 400.0);
        let points: Vec<_> = Trajectory::predict(ball, drag, MAX_POWER, &tuning).take(2).collect();
        let preview_step = points[1] - points[0];
        let launch = launch_velocity(ball, drag, MAX_POWER, tuning.launch_scale);
        assert!(preview_step.x > launch.x);
    }

    proptest! {
        #[test]
        fn prop_preview_is_pure(
            bx in 50.0f32..750.0, by in -5000.0f32..550.0,
            dx in -300.0f32..300.0, dy in -300.0f32..300.0,
        ) {
            let tuning = Tuning::default();
            let ball = Vec2::new(bx, by);
            let drag = ball + Vec2::new(dx, dy);
            let a: Vec<_> = Trajectory::predict(ball, drag, MAX_POWER, &tuning).collect();
            let b: Vec<_> = Trajectory::predict(ball, drag, MAX_POWER, &tuning).collect();
            prop_assert_eq!(&a, &b);
            prop_assert!(a.len() <= PREVIEW_MAX_POINTS);
            prop_assert!(!a.is_empty());
        }
    }
}
