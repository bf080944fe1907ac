//! Ephemeral effects: particles, floating text and the ball trail
//!
//! None of this affects gameplay. Every effect carries a remaining life in
//! 60 Hz frames that drives both its fade and its removal.

use glam::Vec2;
use rand::Rng;

use super::state::{FloatingText, Particle, SimulationState};
use crate::consts::{FLOATING_TEXT_LIFE, PARTICLE_LIFE};

/// Maximum live particles
pub const MAX_PARTICLES: usize = 256;

const PARTICLE_GRAVITY: f32 = 0.2;
const PARTICLE_SPREAD: f32 = 8.0;
const TEXT_RISE_SPEED: f32 = -2.0;

pub const COLOR_SCORE: u32 = 0x4CAF50;
pub const COLOR_WALL: u32 = 0xFFD700;
pub const COLOR_DEATH: u32 = 0xFF4444;
pub const COLOR_HIGH_SCORE: u32 = 0xFFD700;

/// Burst of `count` particles at `pos`
pub fn spawn_particles(state: &mut SimulationState, pos: Vec2, color: u32, count: usize) {
    let room = MAX_PARTICLES.saturating_sub(state.particles.len());
    for _ in 0..count.min(room) {
        let vel = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * PARTICLE_SPREAD,
            (state.rng.random::<f32>() - 0.5) * PARTICLE_SPREAD,
        );
        let size = state.rng.random::<f32>() * 4.0 + 2.0;
        state.particles.push(Particle {
            pos,
            vel,
            color,
            life: PARTICLE_LIFE,
            size,
        });
    }
}

pub fn spawn_text(state: &mut SimulationState, pos: Vec2, text: impl Into<String>, color: u32) {
    state.floating_texts.push(FloatingText {
        pos,
        text: text.into(),
        color,
        life: FLOATING_TEXT_LIFE,
        vel_y: TEXT_RISE_SPEED,
    });
}

/// Advance and expire all effects by `dt` frames
pub fn update_effects(state: &mut SimulationState, dt: f32) {
    for particle in &mut state.particles {
        particle.pos += particle.vel * dt;
        particle.vel.y += PARTICLE_GRAVITY * dt;
        particle.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for text in &mut state.floating_texts {
        text.pos.y += text.vel_y * dt;
        text.life -= dt;
    }
    state.floating_texts.retain(|t| t.life > 0.0);

    state.ball.decay_trail(dt);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_expire() {
        let mut state = SimulationState::new(1);
        spawn_particles(&mut state, Vec2::new(100.0, 100.0), COLOR_WALL, 6);
        assert_eq!(state.particles.len(), 6);

        update_effects(&mut state, PARTICLE_LIFE - 1.0);
        assert_eq!(state.particles.len(), 6);
        update_effects(&mut state, 1.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_particles_fall() {
        let mut state = SimulationState::new(1);
        spawn_particles(&mut state, Vec2::ZERO, COLOR_WALL, 1);
        let vy = state.particles[0].vel.y;
        update_effects(&mut state, 2.0);
        assert!((state.particles[0].vel.y - (vy + 0.4)).abs() < 1e-5);
    }

    #[test]
    fn test_particle_cap() {
        let mut state = SimulationState::new(1);
        for _ in 0..100 {
            spawn_particles(&mut state, Vec2::ZERO, COLOR_DEATH, 12);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_floating_text_rises_and_expires() {
        let mut state = SimulationState::new(1);
        spawn_text(&mut state, Vec2::new(0.0, 100.0), "+4", COLOR_SCORE);
        update_effects(&mut state, 1.0);
        assert_eq!(state.floating_texts[0].pos.y, 98.0);
        update_effects(&mut state, FLOATING_TEXT_LIFE);
        assert!(state.floating_texts.is_empty());
    }
}
