//! Procedural platform generation
//!
//! The world is infinite upward. New rows of platforms are appended above the
//! topmost one whenever the camera gets within `generation_trigger` of it, and
//! anything that drifts `prune_window` past the camera is dropped so memory
//! stays bounded. Difficulty scales with the height factor
//! (`|topmost y| / 1000`): wider gaps, narrower platforms, and more moving and
//! deadly platforms.

use rand::Rng;

use super::rect::Rect;
use super::state::{Oscillation, Platform, PlatformKind, SimulationState};
use crate::consts::{PLATFORM_HEIGHT, VIEW_HEIGHT};
use crate::height_points;

/// Minimum horizontal distance between platforms at similar heights
const MIN_HORIZONTAL_GAP: f32 = 120.0;
/// Platforms closer than this vertically count as "the same row"
const ROW_TOLERANCE: f32 = 50.0;
const PLACEMENT_RETRIES: u32 = 10;

/// A hand-placed platform
struct Blueprint {
    rect: Rect,
    kind: PlatformKind,
    points: i32,
}

const fn fixed(x: f32, y: f32, w: f32, h: f32, points: i32) -> Blueprint {
    Blueprint {
        rect: Rect::new(x, y, w, h),
        kind: PlatformKind::Static,
        points,
    }
}

const fn deadly(x: f32, y: f32, w: f32, h: f32, points: i32) -> Blueprint {
    Blueprint {
        rect: Rect::new(x, y, w, h),
        kind: PlatformKind::Deadly,
        points,
    }
}

const fn moving(
    x: f32,
    y: f32,
    w: f32,
    points: i32,
    speed: f32,
    range: f32,
    direction: f32,
) -> Blueprint {
    Blueprint {
        rect: Rect::new(x, y, w, PLATFORM_HEIGHT),
        kind: PlatformKind::Moving(Oscillation {
            speed,
            range,
            direction,
            origin_y: y,
        }),
        points,
    }
}

/// First screen of a fresh session, with a deadly floor under the start
const OPENING_LAYOUT: [Blueprint; 12] = [
    deadly(0.0, 580.0, 800.0, 20.0, 0),
    fixed(350.0, 520.0, 100.0, 15.0, 1),
    fixed(200.0, 450.0, 120.0, 15.0, 1),
    moving(500.0, 380.0, 100.0, 2, 1.0, 100.0, 1.0),
    fixed(150.0, 320.0, 80.0, 15.0, 1),
    deadly(600.0, 250.0, 60.0, 15.0, -1),
    moving(300.0, 180.0, 100.0, 2, 1.5, 80.0, -1.0),
    fixed(450.0, 120.0, 80.0, 15.0, 1),
    fixed(100.0, 60.0, 100.0, 15.0, 1),
    fixed(350.0, 0.0, 100.0, 15.0, 1),
    moving(200.0, -80.0, 80.0, 2, 0.9, 120.0, 1.0),
    fixed(500.0, -160.0, 90.0, 15.0, 1),
];

/// Layout restored after every death
const RESET_LAYOUT: [Blueprint; 7] = [
    fixed(300.0, 520.0, 200.0, 20.0, 0),
    fixed(350.0, 400.0, 100.0, 15.0, 10),
    moving(200.0, 320.0, 80.0, 15, 0.3, 40.0, 1.0),
    fixed(500.0, 240.0, 90.0, 15.0, 10),
    fixed(150.0, 160.0, 85.0, 15.0, 10),
    moving(450.0, 80.0, 95.0, 15, 0.25, 30.0, -1.0),
    fixed(300.0, 0.0, 100.0, 15.0, 10),
];

fn build(state: &mut SimulationState, blueprints: &[Blueprint]) -> Vec<Platform> {
    blueprints
        .iter()
        .map(|b| Platform::new(state.next_platform_id(), b.rect, b.kind, b.points))
        .collect()
}

/// Platforms for the start of a session
pub fn opening_layout(state: &mut SimulationState) -> Vec<Platform> {
    build(state, &OPENING_LAYOUT)
}

/// Platforms restored by a hard reset (always the same layout)
pub fn reset_layout(state: &mut SimulationState) -> Vec<Platform> {
    build(state, &RESET_LAYOUT)
}

/// Horizontal placement pattern for a new platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    LeftSide,
    RightSide,
    Center,
    /// Far left or far right
    Extreme,
}

impl Placement {
    fn pick(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..4) {
            0 => Placement::LeftSide,
            1 => Placement::RightSide,
            2 => Placement::Center,
            _ => Placement::Extreme,
        }
    }

    fn x(self, rng: &mut impl Rng) -> f32 {
        match self {
            Placement::LeftSide => 50.0 + rng.random::<f32>() * 250.0,
            Placement::RightSide => 500.0 + rng.random::<f32>() * 250.0,
            Placement::Center => 250.0 + rng.random::<f32>() * 300.0,
            Placement::Extreme => {
                if rng.random_bool(0.5) {
                    50.0 + rng.random::<f32>() * 150.0
                } else {
                    600.0 + rng.random::<f32>() * 150.0
                }
            }
        }
    }
}

fn crowded(platforms: &[Platform], x: f32, y: f32) -> bool {
    platforms.iter().any(|p| {
        (p.rect.top() - y).abs() < ROW_TOLERANCE && (p.rect.left() - x).abs() < MIN_HORIZONTAL_GAP
    })
}

/// Append 4-6 platforms above the current topmost one, then prune below.
///
/// Returns how many platforms were created.
pub fn generate_up(state: &mut SimulationState) -> usize {
    let topmost = state.topmost_y().unwrap_or(state.camera.y);
    let height_factor = topmost.abs() / 1000.0;
    let count = state.rng.random_range(4..=6);

    let base_spacing = 80.0 + height_factor * 20.0;
    let min_width = (100.0 - height_factor * 5.0).max(60.0);
    let deadly_chance = (0.05 + height_factor * 0.02).min(0.15);
    let moving_chance = (0.15 + height_factor * 0.02).min(0.25);

    for i in 0..count {
        let variable_spacing = state.rng.random::<f32>() * (100.0 + height_factor * 20.0);
        let y = topmost - base_spacing - i as f32 * (base_spacing + variable_spacing);

        let mut x = Placement::pick(&mut state.rng).x(&mut state.rng);
        let mut attempts = 0;
        while attempts < PLACEMENT_RETRIES && crowded(&state.platforms, x, y) {
            x = 50.0 + state.rng.random::<f32>() * 700.0;
            attempts += 1;
        }

        let width = min_width + state.rng.random::<f32>() * 60.0;

        let roll = state.rng.random::<f32>();
        let kind = if roll < 1.0 - moving_chance - deadly_chance {
            PlatformKind::Static
        } else if roll < 1.0 - deadly_chance {
            PlatformKind::Moving(Oscillation {
                speed: 0.3 + state.rng.random::<f32>() * (0.4 + height_factor * 0.1),
                range: 20.0 + state.rng.random::<f32>() * (30.0 + height_factor * 5.0),
                direction: if state.rng.random_bool(0.5) { 1.0 } else { -1.0 },
                origin_y: y,
            })
        } else {
            PlatformKind::Deadly
        };

        let id = state.next_platform_id();
        state.platforms.push(Platform::new(
            id,
            Rect::new(x, y, width, PLATFORM_HEIGHT),
            kind,
            height_points(y) as i32,
        ));
    }

    let pruned = prune_below(state);
    log::debug!(
        "Generated {} platforms above y={:.0} (height factor {:.2}), pruned {}",
        count,
        topmost,
        height_factor,
        pruned
    );
    count
}

/// Append 5-8 platforms below the current bottommost one, then prune above.
///
/// Spacing and type mix are flat: 60% static, 25% moving, 15% deadly.
pub fn generate_down(state: &mut SimulationState) -> usize {
    let bottommost = state
        .bottommost_y()
        .unwrap_or(state.camera.y + VIEW_HEIGHT);
    let count = state.rng.random_range(5..=8);

    for i in 0..count {
        let y = bottommost + 80.0 + i as f32 * (60.0 + state.rng.random::<f32>() * 80.0);
        let x = 50.0 + state.rng.random::<f32>() * 700.0;
        let width = 60.0 + state.rng.random::<f32>() * 80.0;

        let roll = state.rng.random::<f32>();
        let (kind, points) = if roll < 0.6 {
            (PlatformKind::Static, 10)
        } else if roll < 0.85 {
            let osc = Oscillation {
                speed: 0.5 + state.rng.random::<f32>(),
                range: 30.0 + state.rng.random::<f32>() * 50.0,
                direction: if state.rng.random_bool(0.5) { 1.0 } else { -1.0 },
                origin_y: y,
            };
            (PlatformKind::Moving(osc), 15)
        } else {
            (PlatformKind::Deadly, -5)
        };

        let id = state.next_platform_id();
        state.platforms.push(Platform::new(
            id,
            Rect::new(x, y, width, PLATFORM_HEIGHT),
            kind,
            points,
        ));
    }

    let pruned = prune_above(state);
    log::debug!(
        "Generated {} platforms below y={:.0}, pruned {}",
        count,
        bottommost,
        pruned
    );
    count
}

/// Drop platforms that fell `prune_window` below the camera
pub fn prune_below(state: &mut SimulationState) -> usize {
    let limit = state.camera.y + state.tuning.prune_window;
    let before = state.platforms.len();
    state.platforms.retain(|p| p.rect.top() < limit);
    before - state.platforms.len()
}

/// Drop platforms that are `prune_window` above the camera
pub fn prune_above(state: &mut SimulationState) -> usize {
    let limit = state.camera.y - state.tuning.prune_window;
    let before = state.platforms.len();
    state.platforms.retain(|p| p.rect.top() > limit);
    before - state.platforms.len()
}

/// Extend the world when the camera nears its current vertical extent
pub fn maintain_world(state: &mut SimulationState) {
    let trigger = state.tuning.generation_trigger;

    let camera_top = state.camera.y;
    if state.topmost_y().is_none_or(|y| y > camera_top - trigger) {
        generate_up(state);
    }

    if state.tuning.generate_below {
        let camera_bottom = state.camera.y + VIEW_HEIGHT;
        if state.bottommost_y().is_none_or(|y| y < camera_bottom + trigger) {
            generate_down(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    #[test]
    fn test_reset_layout_is_fixed() {
        let mut a = SimulationState::new(1);
        let mut b = SimulationState::new(99);
        let la = reset_layout(&mut a);
        let lb = reset_layout(&mut b);
        assert_eq!(la.len(), 7);
        assert!(la.iter().zip(&lb).all(|(x, y)| x.same_layout(y)));
        assert!(la.iter().all(|p| !p.scored && !p.is_deadly()));
    }

    #[test]
    fn test_opening_layout_has_deadly_floor() {
        let mut state = SimulationState::new(1);
        let layout = opening_layout(&mut state);
        assert_eq!(layout.len(), 12);
        let floor = &layout[0];
        assert!(floor.is_deadly());
        assert_eq!(floor.rect.top(), 580.0);
        assert_eq!(floor.rect.size.x, 800.0);
    }

    #[test]
    fn test_generate_up_adds_platforms_above() {
        let mut state = SimulationState::new(42);
        let topmost = state.topmost_y().unwrap();
        let before = state.platforms.len();

        let count = generate_up(&mut state);
        assert!((4..=6).contains(&count));
        assert_eq!(state.platforms.len(), before + count);

        let new = &state.platforms[before..];
        for p in new {
            assert!(p.rect.top() < topmost);
            assert_eq!(p.rect.size.y, PLATFORM_HEIGHT);
            assert!(p.rect.size.x >= 60.0 && p.rect.size.x <= 160.0);
            assert_eq!(p.points, height_points(p.rect.top()) as i32);
            assert!(!p.scored);
            if let PlatformKind::Moving(osc) = p.kind {
                assert_eq!(osc.origin_y, p.rect.top());
                assert!(osc.direction == 1.0 || osc.direction == -1.0);
            }
        }
    }

    #[test]
    fn test_generation_on_empty_world_anchors_at_camera() {
        let mut state = SimulationState::new(5);
        state.platforms.clear();
        state.camera.y = -3000.0;
        let count = generate_up(&mut state);
        assert_eq!(state.platforms.len(), count);
        assert!(state.platforms.iter().all(|p| p.rect.top() < -3000.0));
    }

    #[test]
    fn test_generate_down_adds_platforms_below() {
        let mut state = SimulationState::new(8);
        let bottommost = state.bottommost_y().unwrap();
        let before = state.platforms.len();
        let count = generate_down(&mut state);
        assert!((5..=8).contains(&count));
        let new = &state.platforms[state.platforms.len() - count..];
        assert!(new.iter().all(|p| p.rect.top() > bottommost));
        assert!(state.platforms.len() <= before + count);
    }

    #[test]
    fn test_generation_is_deterministic_per_seed() {
        let mut a = SimulationState::new(1234);
        let mut b = SimulationState::new(1234);
        generate_up(&mut a);
        generate_up(&mut b);
        assert_eq!(a.platforms.len(), b.platforms.len());
        assert!(a.platforms.iter().zip(&b.platforms).all(|(x, y)| x.same_layout(y)));
    }

    #[test]
    fn test_maintain_world_triggers_near_top() {
        let mut state = SimulationState::new(3);
        // Opening layout tops out at -160, camera at 0: within the trigger
        let before = state.platforms.len();
        maintain_world(&mut state);
        assert!(state.platforms.len() > before);

        // Far below the topmost platform: nothing to do
        let mut state = SimulationState::new(3);
        state.platforms.retain(|p| p.rect.top() < -100.0);
        state.camera.y = 1000.0;
        let before = state.platforms.len();
        maintain_world(&mut state);
        assert_eq!(state.platforms.len(), before);
    }

    #[test]
    fn test_maintain_world_below_only_when_enabled() {
        let tuning = Tuning {
            generate_below: true,
            ..Default::default()
        };
        let mut state = SimulationState::with_tuning(3, tuning);
        let bottommost = state.bottommost_y().unwrap();
        maintain_world(&mut state);
        assert!(state.bottommost_y().unwrap() > bottommost);

        let mut state = SimulationState::new(3);
        let bottommost = state.bottommost_y().unwrap();
        maintain_world(&mut state);
        assert_eq!(state.bottommost_y().unwrap(), bottommost);
    }

    #[test]
    fn test_difficulty_scales_with_height() {
        // Very high up the type chances hit their caps, and over many rows
        // moving and deadly platforms both show up.
        let mut state = SimulationState::new(77);
        state.platforms.clear();
        state.camera.y = -20_000.0;
        let mut moving = 0;
        let mut deadly = 0;
        for _ in 0..50 {
            generate_up(&mut state);
            moving += state
                .platforms
                .iter()
                .filter(|p| matches!(p.kind, PlatformKind::Moving(_)))
                .count();
            deadly += state.platforms.iter().filter(|p| p.is_deadly()).count();
            state.camera.y = state.topmost_y().unwrap();
        }
        assert!(moving > 0);
        assert!(deadly > 0);
    }

    proptest! {
        #[test]
        fn prop_climbing_prunes_below_camera(
            seed in any::<u64>(),
            rounds in 3usize..8,
            lead in 0.0f32..400.0,
        ) {
            let mut state = SimulationState::new(seed);
            let mut pruned = false;
            for _ in 0..rounds {
                // Camera just under the current top, as when the ball climbs
                let topmost = state.topmost_y().unwrap();
                state.camera.y = topmost + lead;
                let before = state.platforms.len();

                let created = generate_up(&mut state);
                let limit = state.camera.y + state.tuning.prune_window;
                prop_assert!(state.platforms.iter().all(|p| p.rect.top() < limit));
                // Fresh platforms are never pruned
                let len = state.platforms.len();
                prop_assert!(len >= created);
                let fresh = &state.platforms[len - created..];
                prop_assert!(fresh.iter().all(|p| p.rect.top() < topmost));
                pruned |= len < before + created;
            }
            // By the third row the opening floor is out of the window
            prop_assert!(pruned);
            prop_assert!(!state.platforms.iter().any(|p| p.rect.top() == 580.0));
        }

        #[test]
        fn prop_descending_prunes_above_camera(
            seed in any::<u64>(),
            rounds in 5usize..10,
            lead in 0.0f32..400.0,
        ) {
            let mut state = SimulationState::new(seed);
            let mut pruned = false;
            for _ in 0..rounds {
                let bottommost = state.bottommost_y().unwrap();
                state.camera.y = bottommost - VIEW_HEIGHT - lead;
                let before = state.platforms.len();

                let created = generate_down(&mut state);
                let limit = state.camera.y - state.tuning.prune_window;
                prop_assert!(state.platforms.iter().all(|p| p.rect.top() > limit));
                let len = state.platforms.len();
                prop_assert!(len >= created);
                let fresh = &state.platforms[len - created..];
                prop_assert!(fresh.iter().all(|p| p.rect.top() > bottommost));
                pruned |= len < before + created;
            }
            prop_assert!(pruned);
            prop_assert!(!state.platforms.iter().any(|p| p.rect.top() == -160.0));
        }
    }
}
