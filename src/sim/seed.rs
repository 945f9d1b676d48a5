//! Seed pile
//!
//! The pile is drawn as a rectangle that empties from the top down. A bird
//! can only start eating while the pile's bottom edge is still below
//! `done_lower_y`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::{REFERENCE_FRAME_DT, SEED_REFILL_FRACTION};

/// Pile geometry and capacity, as configured by a feeder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPileConfig {
    pub center: Vec2,
    pub width: f32,
    /// Height of the full pile
    pub height: f32,
    pub seed_count: f32,
    /// Scale applied when drawing the pile texture
    pub draw_scale: Vec2,
    /// Offset applied when drawing the pile texture
    pub draw_offset: Vec2,
    /// The pile is finished once its bottom edge rises to this height
    pub done_lower_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedPile {
    config: SeedPileConfig,
    count: f32,
    seeds_per_row: f32,
}

impl SeedPile {
    pub fn new(config: SeedPileConfig) -> Self {
        let seeds_per_row = if config.height > 0.0 && config.seed_count > 0.0 {
            config.seed_count / config.height
        } else {
            1.0
        };
        Self {
            count: config.seed_count.max(0.0),
            seeds_per_row,
            config,
        }
    }

    pub fn config(&self) -> &SeedPileConfig {
        &self.config
    }

    pub fn count(&self) -> f32 {
        self.count
    }

    pub fn original_count(&self) -> f32 {
        self.config.seed_count.max(0.0)
    }

    /// Remove what the eating birds ate over `dt` seconds.
    /// `rate_per_frame` is the summed consumption rate of every eating bird.
    pub fn consume(&mut self, rate_per_frame: f32, dt: f32) {
        let eaten = rate_per_frame.max(0.0) * dt / REFERENCE_FRAME_DT;
        self.count = (self.count - eaten).max(0.0);
    }

    /// Top the pile up by a fixed fraction of its capacity
    pub fn refill(&mut self) {
        let original = self.original_count();
        let amount = original * SEED_REFILL_FRACTION;
        self.count = (self.count + amount).min(original);
        log::debug!("Seed refilled to {:.1}/{:.1}", self.count, original);
    }

    /// Top edge of the pile, fixed by its capacity
    fn upper_y(&self) -> f32 {
        self.config.center.y + (self.original_count() / self.seeds_per_row) / 2.0
    }

    /// Bottom edge of what is left
    fn lower_y(&self) -> f32 {
        self.upper_y() - self.count / self.seeds_per_row
    }

    /// An empty pile is always finished
    pub fn finished(&self) -> bool {
        self.count <= 0.0 || self.lower_y() >= self.config.done_lower_y
    }

    /// Portion of the pile texture still showing
    pub fn fill_rect(&self) -> Rect {
        let half_w = self.config.width / 2.0;
        Rect::new(
            self.config.center.x - half_w,
            self.lower_y(),
            self.config.center.x + half_w,
            self.upper_y(),
        )
    }
}
