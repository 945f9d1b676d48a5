//! Perches and perch allocation

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// A spot on the feeder that holds one bird at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perch {
    pub rect: Rect,
    #[serde(skip)]
    pub occupied: bool,
}

impl Perch {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            occupied: false,
        }
    }

    /// Free and large enough for a body of `size`
    pub fn accepts(&self, size: Vec2) -> bool {
        !self.occupied && self.rect.fits(size)
    }
}

/// Pick uniformly among the free perches that fit `size`.
/// Returns the perch index, or `None` when the feeder is full.
pub fn choose_perch<R: Rng + ?Sized>(perches: &[Perch], size: Vec2, rng: &mut R) -> Option<usize> {
    let eligible: Vec<usize> = perches
        .iter()
        .enumerate()
        .filter(|(_, perch)| perch.accepts(size))
        .map(|(i, _)| i)
        .collect();

    if eligible.is_empty() {
        return None;
    }
    Some(eligible[rng.random_range(0..eligible.len())])
}
