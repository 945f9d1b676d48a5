//! Per-bird animation state
//!
//! Tracks which clip is playing, how long it has played and which way the
//! bird faces. Frame rectangles live with the loaded sprite sheets; this
//! only picks the frame index.

use serde::{Deserialize, Serialize};

use super::bird::BirdState;
use crate::consts::BIRD_FRAME_RATE;

/// Named clip in an animation map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clip {
    Perch,
    Fly,
    Eat,
    Sing,
}

impl Clip {
    pub const ALL: [Clip; 4] = [Clip::Perch, Clip::Fly, Clip::Eat, Clip::Sing];

    /// Row name in the animation CSV
    pub fn name(&self) -> &'static str {
        match self {
            Clip::Perch => "Perch",
            Clip::Fly => "Fly",
            Clip::Eat => "Eat",
            Clip::Sing => "Sing",
        }
    }

    pub fn for_state(state: &BirdState) -> Self {
        match state {
            BirdState::Singing => Clip::Sing,
            BirdState::Eating { .. } => Clip::Eat,
            BirdState::Perched => Clip::Perch,
            BirdState::Entering | BirdState::Exiting | BirdState::Removed => Clip::Fly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BirdAnimation {
    clip: Clip,
    counter: f32,
    facing: Facing,
    direction_locked: bool,
}

impl Default for BirdAnimation {
    fn default() -> Self {
        Self {
            clip: Clip::Fly,
            counter: 0.0,
            facing: Facing::default(),
            direction_locked: false,
        }
    }
}

impl BirdAnimation {
    pub fn clip(&self) -> Clip {
        self.clip
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn lock_direction(&mut self) {
        self.direction_locked = true;
    }

    pub fn unlock_direction(&mut self) {
        self.direction_locked = false;
    }

    pub fn is_direction_locked(&self) -> bool {
        self.direction_locked
    }

    /// Advance the clip timer, restarting it when the bird's state picks a new clip
    pub fn update(&mut self, dt: f32, state: &BirdState, vel_x: f32) {
        self.counter += dt;

        let clip = Clip::for_state(state);
        if clip != self.clip {
            self.clip = clip;
            self.counter = 0.0;
        }

        if vel_x != 0.0 && !self.direction_locked {
            self.facing = if vel_x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
        }
    }

    /// Frame to show out of a clip with `len` frames
    pub fn frame_index(&self, len: usize) -> usize {
        if len == 0 || self.clip == Clip::Perch {
            return 0;
        }
        (self.counter / BIRD_FRAME_RATE).floor() as usize % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_change_restarts_counter() {
        let mut anim = BirdAnimation::default();
        anim.update(0.35, &BirdState::Entering, -4.0);
        assert_eq!(anim.frame_index(4), 3);
        anim.update(0.05, &BirdState::Eating { until: 9.0 }, 0.0);
        assert_eq!(anim.clip(), Clip::Eat);
        assert_eq!(anim.frame_index(4), 0);
    }

    #[test]
    fn test_facing_follows_velocity_unless_locked() {
        let mut anim = BirdAnimation::default();
        anim.update(0.01, &BirdState::Entering, -3.0);
        assert_eq!(anim.facing(), Facing::Left);
        anim.lock_direction();
        anim.update(0.01, &BirdState::Entering, 5.0);
        assert_eq!(anim.facing(), Facing::Left);
        anim.unlock_direction();
        anim.update(0.01, &BirdState::Entering, 5.0);
        assert_eq!(anim.facing(), Facing::Right);
    }

    #[test]
    fn test_perch_clip_holds_first_frame() {
        let mut anim = BirdAnimation::default();
        anim.update(0.01, &BirdState::Perched, 0.0);
        anim.update(1.37, &BirdState::Perched, 0.0);
        assert_eq!(anim.frame_index(6), 0);
    }
}
