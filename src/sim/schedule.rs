//! Weighted random scheduling
//!
//! Durations are drawn in two stages: a time-length category by weighted
//! likelihood, then a whole number of seconds uniformly from that
//! category's `[min, max)` range.

use std::collections::BTreeMap;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_EATING_GAP, DEFAULT_EATING_LENGTH, DEFAULT_FEEDER_LENGTH, DEFAULT_SINGING_GAP,
    DEFAULT_SPAWN_LENGTH, LIKELIHOOD_MAX,
};
use crate::error::ScheduleError;

/// Duration buckets, from a few seconds to "practically never"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeLength {
    VeryShort,
    Short,
    Medium,
    Long,
    VeryLong,
    Insane,
}

impl TimeLength {
    pub const ALL: [TimeLength; 6] = [
        TimeLength::VeryShort,
        TimeLength::Short,
        TimeLength::Medium,
        TimeLength::Long,
        TimeLength::VeryLong,
        TimeLength::Insane,
    ];
}

/// Half-open range of whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: u32,
    pub max: u32,
}

impl LengthRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u32, ScheduleError> {
        if self.min >= self.max {
            return Err(ScheduleError::EmptyRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(rng.random_range(self.min..self.max))
    }
}

/// Seconds range per time-length category
pub type LengthTable = BTreeMap<TimeLength, LengthRange>;

/// Relative weight per time-length category
pub type Likelihoods = BTreeMap<TimeLength, u32>;

/// Picks one of a fixed set of outcomes by relative weight
#[derive(Debug, Clone)]
pub struct WeightedChooser<T> {
    items: Vec<T>,
    index: WeightedIndex<u64>,
}

impl<T: Clone> WeightedChooser<T> {
    /// Fails if no outcome has a positive weight
    pub fn new(choices: impl IntoIterator<Item = (T, u64)>) -> Result<Self, ScheduleError> {
        let (items, weights): (Vec<T>, Vec<u64>) =
            choices.into_iter().filter(|(_, weight)| *weight > 0).unzip();
        if items.is_empty() {
            return Err(ScheduleError::NoWeights);
        }
        let index = WeightedIndex::new(&weights).map_err(|_| ScheduleError::NoWeights)?;
        Ok(Self { items, index })
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.items[self.index.sample(rng)].clone()
    }
}

/// Draw a duration in seconds from `table`, weighting categories by `likelihoods`
pub fn resolve_length<R: Rng + ?Sized>(
    likelihoods: &Likelihoods,
    table: &LengthTable,
    rng: &mut R,
) -> Result<u32, ScheduleError> {
    let chooser =
        WeightedChooser::new(likelihoods.iter().map(|(length, w)| (*length, u64::from(*w))))?;
    let category = chooser.pick(rng);
    let range = table
        .get(&category)
        .ok_or(ScheduleError::MissingRange(category))?;
    range.sample(rng)
}

/// Like [`resolve_length`], falling back to `default` seconds on failure
pub fn length_or<R: Rng + ?Sized>(
    likelihoods: &Likelihoods,
    table: &LengthTable,
    default: u32,
    what: &str,
    rng: &mut R,
) -> u32 {
    match resolve_length(likelihoods, table, rng) {
        Ok(secs) => secs,
        Err(e) => {
            log::warn!("Could not draw {what} ({e}), using {default}s");
            default
        }
    }
}

/// Every randomized duration a feeder schedules, sharing one set of
/// category likelihoods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub time_likelihoods: Likelihoods,
    /// Gap between bird arrivals
    pub spawn_lengths: LengthTable,
    /// How long a bird stays before leaving
    pub feeder_lengths: LengthTable,
    pub eating_lengths: LengthTable,
    pub eating_gaps: LengthTable,
    pub singing_gaps: LengthTable,
}

impl Timing {
    pub fn spawn_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        length_or(
            &self.time_likelihoods,
            &self.spawn_lengths,
            DEFAULT_SPAWN_LENGTH,
            "spawn gap",
            rng,
        )
    }

    pub fn feeder_length<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        length_or(
            &self.time_likelihoods,
            &self.feeder_lengths,
            DEFAULT_FEEDER_LENGTH,
            "feeder length",
            rng,
        )
    }

    pub fn eating_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        length_or(
            &self.time_likelihoods,
            &self.eating_gaps,
            DEFAULT_EATING_GAP,
            "eating gap",
            rng,
        )
    }

    pub fn eating_length<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        length_or(
            &self.time_likelihoods,
            &self.eating_lengths,
            DEFAULT_EATING_LENGTH,
            "eating length",
            rng,
        )
    }

    pub fn singing_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        length_or(
            &self.time_likelihoods,
            &self.singing_gaps,
            DEFAULT_SINGING_GAP,
            "singing gap",
            rng,
        )
    }
}

/// Weighted coin flip: sing with probability `likelihood / LIKELIHOOD_MAX`
pub fn decide_to_sing<R: Rng + ?Sized>(likelihood: u32, rng: &mut R) -> bool {
    let sing = u64::from(likelihood.min(LIKELIHOOD_MAX));
    let quiet = u64::from(LIKELIHOOD_MAX) - sing;
    WeightedChooser::new([(true, sing), (false, quiet)])
        .map(|chooser| chooser.pick(rng))
        .unwrap_or(false)
}
