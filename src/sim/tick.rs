//! Frame driver
//!
//! One call to [`tick`] per animation frame. Integration is scaled by the
//! delta multiplier so the game plays at the same speed at any refresh rate.

use glam::Vec2;

use super::camera::update_camera;
use super::collision::{Contact, is_out_of_bounds, resolve_platform_collisions, resolve_side_walls};
use super::effects::{COLOR_DEATH, COLOR_HIGH_SCORE, spawn_particles, spawn_text, update_effects};
use super::generator::{maintain_world, reset_layout};
use super::state::{DeathCause, GameEvent, GamePhase, SimulationState};
use super::trajectory::{Trajectory, launch_power, launch_velocity};
use crate::consts::DEATH_SHAKE;
use crate::delta_multiplier;

/// Pointer input in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
}

/// Input queued by the frontend since the previous tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }
}

/// Advance the session by one frame that took `elapsed_ms`
pub fn tick(state: &mut SimulationState, input: &TickInput, elapsed_ms: f32) {
    let dt = delta_multiplier(elapsed_ms);

    for event in &input.events {
        handle_input(state, *event);
    }

    move_platforms(state, dt);
    update_effects(state, dt);
    update_camera(state, dt);

    if state.phase == GamePhase::Aiming {
        refresh_preview(state);
    }

    if state.ball.launched {
        step_ball(state, dt);
    }

    state.time_ticks += 1;
}

fn handle_input(state: &mut SimulationState, event: InputEvent) {
    match event {
        InputEvent::PointerDown(pos) => {
            let reach = state.ball.radius + state.tuning.grab_tolerance;
            if state.phase == GamePhase::Ready
                && state.ball.can_sling()
                && pos.distance(state.ball.pos) <= reach
            {
                state.slingshot.dragging = true;
                state.slingshot.drag = pos;
                state.phase = GamePhase::Aiming;
            }
        }
        InputEvent::PointerMove(pos) => {
            if state.slingshot.dragging {
                state.slingshot.drag = pos;
            }
        }
        InputEvent::PointerUp => {
            if state.slingshot.dragging {
                release(state);
            }
        }
    }
}

/// Let go of the slingshot: launch if the drag was long enough
fn release(state: &mut SimulationState) {
    let ball = state.ball.pos;
    let drag = state.slingshot.drag;
    let max_power = state.slingshot.max_power;
    let power = launch_power(ball, drag, max_power);
    state.slingshot.cancel();

    if power > state.tuning.min_launch_power {
        let vel = launch_velocity(ball, drag, max_power, state.tuning.launch_scale);
        state.ball.launch(vel);
        state.phase = GamePhase::Launched;
        state.emit(GameEvent::Launched { power });
        log::debug!("Launched with power {:.2}, velocity {:?}", power, vel);
    } else {
        state.phase = GamePhase::Ready;
    }
}

fn refresh_preview(state: &mut SimulationState) {
    let sling = &mut state.slingshot;
    sling.preview.clear();
    sling.preview.extend(Trajectory::predict(
        state.ball.pos,
        sling.drag,
        sling.max_power,
        &state.tuning,
    ));
}

/// Oscillate moving platforms; a ball resting on one rides along
fn move_platforms(state: &mut SimulationState, dt: f32) {
    let resting_on = state.ball.resting_on.filter(|_| !state.ball.launched);
    for platform in &mut state.platforms {
        platform.advance(dt);
        if resting_on == Some(platform.id) {
            state.ball.pos.y = platform.rect.top() - state.ball.radius;
        }
    }
}

fn step_ball(state: &mut SimulationState, dt: f32) {
    let prev_pos = state.ball.pos;
    let gravity = state.tuning.gravity;
    let drag = state.tuning.air_resistance.powf(dt);

    let ball = &mut state.ball;
    ball.record_trail();
    ball.vel.y += gravity * dt;
    ball.vel *= drag;
    ball.pos += ball.vel * dt;

    resolve_side_walls(state);

    if resolve_platform_collisions(state, prev_pos) == Contact::Deadly {
        hard_reset(state, DeathCause::DeadlyPlatform);
        return;
    }
    if is_out_of_bounds(state) {
        hard_reset(state, DeathCause::OutOfBounds);
        return;
    }

    maintain_world(state);
}

/// End the run and restore the fixed starting situation
pub fn hard_reset(state: &mut SimulationState, cause: DeathCause) {
    let final_score = state.score;
    let death_pos = state.ball.pos;

    state.ball.respawn();
    state.camera.reset();
    state.camera.shake = DEATH_SHAKE;
    state.platforms = reset_layout(state);
    state.score = 0;
    state.phase = GamePhase::Ready;
    state.slingshot.cancel();

    let spawn = state.ball.pos;
    if final_score > state.high_score {
        state.high_score = final_score;
        spawn_text(
            state,
            spawn - Vec2::new(0.0, 30.0),
            "NEW HIGH SCORE!",
            COLOR_HIGH_SCORE,
        );
        state.emit(GameEvent::HighScore { score: final_score });
    }
    spawn_text(state, spawn, "Game Over!", COLOR_DEATH);
    spawn_particles(state, spawn, COLOR_DEATH, 12);
    state.emit(GameEvent::GameOver { cause, final_score });

    log::info!(
        "Game over ({:?}) at {:?} with score {} (best {})",
        cause,
        death_pos,
        final_score,
        state.high_score
    );
}
