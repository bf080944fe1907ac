//! Collision detection and response
//!
//! The ball is a circle, platforms are axis-aligned rectangles. Every contact
//! is classified as a landing (come to rest on top), a bounce off a side, the
//! underside or the top, or death on a deadly platform.

use glam::Vec2;

use super::effects::{COLOR_SCORE, COLOR_WALL, spawn_particles, spawn_text};
use super::state::{GameEvent, GamePhase, PlatformId, SimulationState};
use crate::consts::{DEATH_Y, OUT_LEFT_X, OUT_RIGHT_X, VIEW_HEIGHT, WALL_LEFT, WALL_RIGHT};
use crate::height_points;

/// How far below the visible area the ball may fall when the world also
/// extends downward
const FALL_MARGIN: f32 = 50.0;

/// Outcome of resolving the ball against every platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Still in flight (possibly after bounces)
    Clear,
    /// Came to rest on this platform
    Landed(PlatformId),
    /// Touched a deadly platform; the caller resets the session
    Deadly,
}

/// Resolve the airborne ball against all platforms.
///
/// `prev_pos` is the ball position at the start of the tick, before
/// integration. A landing requires the ball's bottom to have been strictly
/// above the platform top there.
pub fn resolve_platform_collisions(state: &mut SimulationState, prev_pos: Vec2) -> Contact {
    if !state.ball.launched {
        return Contact::Clear;
    }

    let min_velocity = state.tuning.min_velocity;
    let max_bounces = state.tuning.max_bounces;

    for index in 0..state.platforms.len() {
        let rect = state.platforms[index].rect;
        let ball = &mut state.ball;
        if !rect.intersects_circle(ball.pos, ball.radius) {
            continue;
        }
        if state.platforms[index].is_deadly() {
            return Contact::Deadly;
        }

        let overlap = rect.circle_overlap(ball.pos, ball.radius);
        let was_above = prev_pos.y + ball.radius < rect.top();

        if overlap.y < overlap.x && was_above && ball.vel.y > 0.0 {
            return land(state, index, false);
        }

        if overlap.x < overlap.y {
            ball.vel.x = -ball.vel.x * state.tuning.side_bounce;
            ball.pos.x = if ball.pos.x > rect.center().x {
                rect.right() + ball.radius
            } else {
                rect.left() - ball.radius
            };
        } else if ball.pos.y > rect.top() {
            ball.pos.y = rect.bottom() + ball.radius;
            ball.vel.y = ball.vel.y.abs() * state.tuning.under_bounce;
        } else {
            ball.pos.y = rect.top() - ball.radius;
            ball.vel.y = -ball.vel.y.abs() * state.tuning.top_bounce;
        }
        ball.bounces += 1;

        let settle = ball.vel.length() < min_velocity || ball.bounces >= max_bounces;
        let above = ball.pos.y < rect.top();
        state.emit(GameEvent::PlatformBounce);

        if settle && above {
            return land(state, index, true);
        }
    }

    Contact::Clear
}

/// Put the ball to rest on `platforms[index]` and score it if it is new
fn land(state: &mut SimulationState, index: usize, forced: bool) -> Contact {
    state.ball.land_on(&state.platforms[index]);
    state.phase = GamePhase::Ready;

    let pos = state.ball.pos;
    let platform = &mut state.platforms[index];
    let id = platform.id;
    let color = platform.kind.color();

    let points = if !platform.scored && !platform.is_deadly() {
        platform.scored = true;
        Some(height_points(platform.rect.top()))
    } else {
        None
    };

    match points {
        Some(points) => {
            state.score += points;
            spawn_text(state, pos, format!("+{points}"), COLOR_SCORE);
            spawn_particles(state, pos, color, 6);
            log::debug!("Landed on {:?} for {} points (score {})", id, points, state.score);
        }
        None if forced => spawn_particles(state, pos, color, 4),
        None => {}
    }

    state.emit(GameEvent::Landed {
        platform: id,
        points,
    });
    Contact::Landed(id)
}

/// Bounce off the left and right walls, which follow the camera.
///
/// Only a ball moving toward a wall is affected. Returns true on a bounce.
pub fn resolve_side_walls(state: &mut SimulationState) -> bool {
    let left = state.camera.x + WALL_LEFT;
    let right = state.camera.x + WALL_RIGHT;
    let damping = state.tuning.wall_bounce;
    let ball = &mut state.ball;

    let hit = if ball.pos.x - ball.radius <= left && ball.vel.x < 0.0 {
        ball.pos.x = left + ball.radius;
        true
    } else if ball.pos.x + ball.radius >= right && ball.vel.x > 0.0 {
        ball.pos.x = right - ball.radius;
        true
    } else {
        false
    };

    if hit {
        ball.vel.x = -ball.vel.x * damping;
        ball.bounces += 1;
        let pos = ball.pos;
        spawn_particles(state, pos, COLOR_WALL, 6);
        state.emit(GameEvent::WallBounce);
    }
    hit
}

/// Lowest y the ball may reach before the run ends
pub fn death_line(state: &SimulationState) -> f32 {
    if state.tuning.generate_below {
        state.camera.y + VIEW_HEIGHT + FALL_MARGIN
    } else {
        DEATH_Y
    }
}

pub fn is_out_of_bounds(state: &SimulationState) -> bool {
    let pos = state.ball.pos;
    pos.y > death_line(state) || pos.x < OUT_LEFT_X || pos.x > state.camera.x + OUT_RIGHT_X
}
