//! Entry and exit flight paths
//!
//! A path moves a bird's anchor in a straight line from where it is to a
//! target anchor. The distance is cut into a whole number of steps up front;
//! each tick covers `scale` of a step, and once the bird is within one step
//! of the target on both axes it snaps exactly onto it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::{FLIGHT_STEP_PX, SPAWN_RANDOMNESS_OFFSET, WIN_HEIGHT, WIN_WIDTH};

/// Extra snap reach per axis, for axes whose step is below f32 precision
const SNAP_SLACK_PX: f32 = 0.05;

/// What a bird should do with its position this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightMove {
    /// Already on the target
    Arrived,
    /// Move by this displacement
    Glide(Vec2),
    /// Land exactly on this anchor
    Snap(Vec2),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightPath {
    target: Vec2,
    step: Vec2,
    steps: u32,
}

impl FlightPath {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        let delta = to - from;
        let steps = (delta.x.abs().max(delta.y.abs()) / FLIGHT_STEP_PX)
            .round()
            .max(1.0) as u32;
        Self {
            target: to,
            step: delta / steps as f32,
            steps,
        }
    }

    /// Target anchor
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Number of steps the distance was divided into
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Next move for a bird whose anchor is at `current`
    pub fn next_move(&self, current: Vec2, scale: f32) -> FlightMove {
        if current == self.target {
            return FlightMove::Arrived;
        }

        let glide = self.step * scale;
        let remaining = self.target - current;
        // Never let a long glide carry the bird past the target
        let reach = self.step.abs().max(glide.abs()) + Vec2::splat(SNAP_SLACK_PX);
        if remaining.x.abs() <= reach.x && remaining.y.abs() <= reach.y {
            FlightMove::Snap(self.target)
        } else {
            FlightMove::Glide(glide)
        }
    }

    /// Upper bound on ticks until `next_move` reports `Arrived`, when each
    /// tick covers `scale` of a step. Counts the glides, the snap, the
    /// arrival tick and one tick of rounding slack.
    pub fn max_ticks(&self, scale: f32) -> u32 {
        if scale <= 0.0 {
            return u32::MAX;
        }
        let steps = self.steps as f32;
        let glides = ((steps - scale.max(1.0)) / scale).ceil().max(0.0);
        glides as u32 + 3
    }
}

/// Edge of the window a bird arrives from or leaves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// A rectangle of `size` just outside the window, on a random side
pub fn outside_location<R: Rng + ?Sized>(size: Vec2, rng: &mut R) -> Rect {
    let side = match rng.random_range(0..4) {
        0 => Side::Left,
        1 => Side::Right,
        2 => Side::Top,
        _ => Side::Bottom,
    };
    outside_location_on(side, size, rng)
}

pub fn outside_location_on<R: Rng + ?Sized>(side: Side, size: Vec2, rng: &mut R) -> Rect {
    let half_w = WIN_WIDTH / 2.0;
    let half_h = WIN_HEIGHT / 2.0;
    let off = SPAWN_RANDOMNESS_OFFSET;

    match side {
        Side::Left => {
            let y = rng.random_range(-half_h - off..half_h + off);
            Rect::from_min_size(Vec2::new(-half_w - size.x, y), size)
        }
        Side::Right => {
            let y = rng.random_range(-half_h - off..half_h + off);
            Rect::from_min_size(Vec2::new(half_w, y), size)
        }
        Side::Top => {
            let x = rng.random_range(-half_w - off..half_w + off);
            Rect::from_min_size(Vec2::new(x, half_h), size)
        }
        Side::Bottom => {
            let x = rng.random_range(-half_w - off..half_w + off);
            Rect::from_min_size(Vec2::new(x, -half_h - size.y), size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Fly until arrival, returning the landing spot and tick count
    fn fly(path: &FlightPath, from: Vec2, scale: f32) -> (Vec2, u32) {
        let mut pos = from;
        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks <= path.max_ticks(scale), "flight overran its bound");
            match path.next_move(pos, scale) {
                FlightMove::Arrived => return (pos, ticks),
                FlightMove::Glide(delta) => pos += delta,
                FlightMove::Snap(anchor) => pos = anchor,
            }
        }
    }

    #[test]
    fn test_step_count_from_distance() {
        let path = FlightPath::new(Vec2::ZERO, Vec2::new(-304.0, 96.0));
        assert_eq!(path.steps(), 30);
        let path = FlightPath::new(Vec2::ZERO, Vec2::new(2.0, 1.0));
        assert_eq!(path.steps(), 1);
    }

    #[test]
    fn test_lands_on_target() {
        let from = Vec2::new(-990.0, 312.5);
        let to = Vec2::new(280.0, -340.0);
        let path = FlightPath::new(from, to);
        let (landed, _) = fly(&path, from, 0.5);
        assert_eq!(landed, to);
    }

    #[test]
    fn test_final_move_is_snap() {
        let path = FlightPath::new(Vec2::ZERO, Vec2::new(100.0, 0.0));
        // One step short of the target
        assert_eq!(
            path.next_move(Vec2::new(91.0, 0.0), 0.5),
            FlightMove::Snap(Vec2::new(100.0, 0.0))
        );
        assert_eq!(
            path.next_move(Vec2::new(50.0, 0.0), 0.5),
            FlightMove::Glide(Vec2::new(5.0, 0.0))
        );
    }

    #[test]
    fn test_nearly_vertical_flight_still_lands() {
        // The x step is too small to survive rounding at this position
        let from = Vec2::new(300.0, 900.0);
        let to = Vec2::new(300.004, -340.0);
        let path = FlightPath::new(from, to);
        let (landed, _) = fly(&path, from, 0.5);
        assert_eq!(landed, to);
    }

    #[test]
    fn test_outside_locations_are_off_screen() {
        let mut rng = Pcg32::seed_from_u64(5);
        let size = Vec2::new(190.0, 221.0);
        for _ in 0..200 {
            let rect = outside_location(size, &mut rng);
            let visible = rect.max.x > -WIN_WIDTH / 2.0
                && rect.min.x < WIN_WIDTH / 2.0
                && rect.max.y > -WIN_HEIGHT / 2.0
                && rect.min.y < WIN_HEIGHT / 2.0;
            assert!(!visible, "{rect:?} overlaps the window");
            assert!((rect.size() - size).abs().max_element() < 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_flight_lands_exactly_within_bound(
            fx in -2000.0f32..2000.0, fy in -2000.0f32..2000.0,
            tx in -500.0f32..500.0, ty in -500.0f32..500.0,
            scale in 0.05f32..3.0,
        ) {
            let from = Vec2::new(fx, fy);
            let to = Vec2::new(tx, ty);
            let path = FlightPath::new(from, to);
            let (landed, ticks) = fly(&path, from, scale);
            prop_assert_eq!(landed, to);
            prop_assert!(ticks <= path.max_ticks(scale));
        }
    }
}
