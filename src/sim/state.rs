//! Simulation state and entity types
//!
//! `SimulationState` is the single owner of every entity in a session. The
//! frame driver passes it by `&mut` to each subsystem.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the slingshot loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball at rest, waiting for a drag
    #[default]
    Ready,
    /// Player is dragging the slingshot
    Aiming,
    /// Ball is in flight
    Launched,
}

impl GamePhase {
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Ready => "ready",
            GamePhase::Aiming => "aiming",
            GamePhase::Launched => "launched",
        }
    }
}

/// Stable platform identifier. Platforms are pruned and recreated, so the
/// ball refers to the one it rests on by id, never by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Remaining life in 60 Hz frames
    pub life: f32,
}

/// The ninja
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// In flight; the ball can only be slung while this is false
    pub launched: bool,
    /// Bounces since the last launch
    pub bounces: u32,
    /// Platform the ball is resting on, if any
    pub resting_on: Option<PlatformId>,
    /// Oldest first, at most TRAIL_LENGTH points
    pub trail: VecDeque<TrailPoint>,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

impl Ball {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(SPAWN_X, SPAWN_Y),
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            launched: false,
            bounces: 0,
            resting_on: None,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    #[inline]
    pub fn can_sling(&self) -> bool {
        !self.launched
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }

    /// Start a flight with the given velocity
    pub fn launch(&mut self, vel: Vec2) {
        self.vel = vel;
        self.launched = true;
        self.bounces = 0;
        self.resting_on = None;
        self.trail.clear();
    }

    /// Come to rest on top of `platform`
    pub fn land_on(&mut self, platform: &Platform) {
        // Centre stays over the platform even after a side hit
        self.pos.x = self.pos.x.clamp(platform.rect.left(), platform.rect.right());
        self.pos.y = platform.rect.top() - self.radius;
        self.vel = Vec2::ZERO;
        self.launched = false;
        self.bounces = 0;
        self.resting_on = Some(platform.id);
    }

    /// Back to the spawn point, at rest
    pub fn respawn(&mut self) {
        *self = Self::new();
    }

    /// Record current position to trail (call each tick in flight)
    pub fn record_trail(&mut self) {
        if self.trail.len() >= TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(TrailPoint {
            pos: self.pos,
            life: TRAIL_LIFE,
        });
    }

    /// Age trail points and drop the expired ones
    pub fn decay_trail(&mut self, dt: f32) {
        for point in &mut self.trail {
            point.life -= dt;
        }
        self.trail.retain(|p| p.life > 0.0);
    }
}

/// Vertical oscillation of a moving platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    /// World units per 60 Hz frame
    pub speed: f32,
    /// Half the travel distance around `origin_y`
    pub range: f32,
    /// +1 moving down, -1 moving up
    pub direction: f32,
    pub origin_y: f32,
}

impl Oscillation {
    /// Advance from `y`; returns the new y, never outside `origin_y ± range`
    pub fn step(&mut self, y: f32, dt: f32) -> f32 {
        let mut y = y + self.speed * self.direction * dt;
        let low = self.origin_y + self.range;
        let high = self.origin_y - self.range;
        if self.direction > 0.0 && y >= low {
            self.direction = -1.0;
            y = low;
        } else if self.direction < 0.0 && y <= high {
            self.direction = 1.0;
            y = high;
        }
        y
    }
}

/// Platform behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformKind {
    Static,
    Moving(Oscillation),
    /// Touching it ends the run
    Deadly,
}

impl PlatformKind {
    /// Display colour (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            PlatformKind::Static => 0x4CAF50,
            PlatformKind::Moving(_) => 0x2196F3,
            PlatformKind::Deadly => 0xF44336,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlatformKind::Static => "static",
            PlatformKind::Moving(_) => "moving",
            PlatformKind::Deadly => "deadly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub rect: Rect,
    pub kind: PlatformKind,
    /// Base value; negative on hand-placed deadly platforms
    pub points: i32,
    /// Once true, landing here never scores again
    pub scored: bool,
}

impl Platform {
    pub fn new(id: PlatformId, rect: Rect, kind: PlatformKind, points: i32) -> Self {
        Self {
            id,
            rect,
            kind,
            points,
            scored: false,
        }
    }

    #[inline]
    pub fn is_deadly(&self) -> bool {
        matches!(self.kind, PlatformKind::Deadly)
    }

    /// Move a moving platform one step; returns how far it moved vertically
    pub fn advance(&mut self, dt: f32) -> f32 {
        match &mut self.kind {
            PlatformKind::Moving(osc) => {
                let before = self.rect.pos.y;
                self.rect.pos.y = osc.step(before, dt);
                self.rect.pos.y - before
            }
            _ => 0.0,
        }
    }

    /// Same geometry and behaviour, ignoring identity and scoring
    pub fn same_layout(&self, other: &Platform) -> bool {
        self.rect == other.rect && self.kind == other.kind && self.points == other.points
    }
}

/// Vertical-scrolling camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    /// Jitter magnitude in pixels, decays geometrically
    pub shake: f32,
    pub follow_speed: f32,
    /// Screen-space y above which the camera scrolls up
    pub top_boundary: f32,
    /// Screen-space y below which the camera scrolls down
    pub bottom_boundary: f32,
    /// Highest the camera may go (negative infinity: unbounded)
    pub world_max_y: f32,
    /// Lowest the camera may go (the world origin unless scrolling down)
    pub floor_y: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            shake: 0.0,
            follow_speed: CAMERA_FOLLOW_SPEED,
            top_boundary: CAMERA_TOP_BOUNDARY,
            bottom_boundary: CAMERA_BOTTOM_BOUNDARY,
            world_max_y: f32::NEG_INFINITY,
            floor_y: 0.0,
        }
    }
}

impl Camera {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            follow_speed: tuning.camera_follow_speed,
            top_boundary: tuning.camera_top_boundary,
            bottom_boundary: tuning.camera_bottom_boundary,
            floor_y: if tuning.generate_below { f32::INFINITY } else { 0.0 },
            ..Default::default()
        }
    }

    /// Snap back to the world origin
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }
}

/// Drag state of the slingshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slingshot {
    pub dragging: bool,
    /// Current pointer position (world coordinates)
    pub drag: Vec2,
    /// Drag distance giving full power
    pub max_power: f32,
    /// Predicted path, recomputed every tick while aiming
    pub preview: Vec<Vec2>,
}

impl Slingshot {
    pub fn new(max_power: f32) -> Self {
        Self {
            dragging: false,
            drag: Vec2::ZERO,
            max_power,
            preview: Vec::new(),
        }
    }

    pub fn cancel(&mut self) {
        self.dragging = false;
        self.preview.clear();
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Remaining life in 60 Hz frames
    pub life: f32,
    pub size: f32,
}

/// Rising score/status text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub life: f32,
    pub vel_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    DeadlyPlatform,
    OutOfBounds,
}

/// Things that happened during a tick, for the frontend to act on
/// (sound, storage, leaderboard). Drained after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Launched { power: f32 },
    /// `points` is set when the landing scored
    Landed { platform: PlatformId, points: Option<u32> },
    PlatformBounce,
    WallBounce,
    GameOver { cause: DeathCause, final_score: u32 },
    HighScore { score: u32 },
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub ball: Ball,
    pub camera: Camera,
    pub slingshot: Slingshot,
    pub platforms: Vec<Platform>,
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    pub score: u32,
    pub high_score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Outbox for the frontend
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl SimulationState {
    /// Create a new session with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            camera: Camera::from_tuning(&tuning),
            slingshot: Slingshot::new(tuning.max_power),
            tuning,
            phase: GamePhase::Ready,
            ball: Ball::new(),
            platforms: Vec::new(),
            particles: Vec::new(),
            floating_texts: Vec::new(),
            score: 0,
            high_score: 0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        };
        state.platforms = super::generator::opening_layout(&mut state);
        state
    }

    /// Allocate a new platform ID
    pub fn next_platform_id(&mut self) -> PlatformId {
        let id = PlatformId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Smallest y (highest platform), if there are any platforms
    pub fn topmost_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.rect.top()).reduce(f32::min)
    }

    /// Largest y (lowest platform), if there are any platforms
    pub fn bottommost_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.rect.top()).reduce(f32::max)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the events of the last tick(s) to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
