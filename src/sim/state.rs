//! Simulation state
//!
//! Everything one tick reads or writes lives here. There are no globals;
//! the app owns a single `FeederState` and hands it to [`super::tick`].

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bird::Bird;
use super::perch::Perch;
use super::seed::SeedPile;
use crate::context::FeederContext;

/// Complete feeder simulation state
#[derive(Debug, Clone)]
pub struct FeederState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Sim clock in seconds
    pub time_secs: f64,
    /// Sim tick counter
    pub time_ticks: u64,
    /// Sim time of the next spawn attempt
    pub next_spawn_at: f64,
    /// Live birds, sorted by id
    pub birds: Vec<Bird>,
    pub perches: Vec<Perch>,
    pub seed_pile: SeedPile,
    pub(super) context: FeederContext,
    next_id: u32,
}

impl FeederState {
    /// Fresh state for `context`, with the first spawn already scheduled
    pub fn new(context: FeederContext, seed: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_secs: 0.0,
            time_ticks: 0,
            next_spawn_at: 0.0,
            birds: Vec::new(),
            perches: context.perches.iter().map(|p| Perch::new(p.rect)).collect(),
            seed_pile: SeedPile::new(context.seed.clone()),
            context,
            next_id: 1,
        };
        state.schedule_next_spawn();
        state
    }

    pub fn context(&self) -> &FeederContext {
        &self.context
    }

    /// Swap to a different context. All birds leave at once and the perches
    /// and seed pile start over; the clock and RNG keep running.
    pub fn switch_context(&mut self, context: FeederContext) {
        log::info!(
            "Switching feeder from {} to {} ({} birds cleared)",
            self.context.name,
            context.name,
            self.birds.len()
        );
        self.birds.clear();
        self.perches = context.perches.iter().map(|p| Perch::new(p.rect)).collect();
        self.seed_pile = SeedPile::new(context.seed.clone());
        self.context = context;
        self.schedule_next_spawn();
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn schedule_next_spawn(&mut self) {
        let gap = self.context.timing.spawn_gap(&mut self.rng);
        self.next_spawn_at = self.time_secs + f64::from(gap);
        log::debug!("Next spawn attempt in {gap}s");
    }

    /// True when each perch is marked occupied exactly when one live bird
    /// holds it
    pub fn occupancy_consistent(&self) -> bool {
        self.perches.iter().enumerate().all(|(i, perch)| {
            let holders = self
                .birds
                .iter()
                .filter(|b| b.perch() == i && b.state().holds_perch())
                .count();
            holders <= 1 && perch.occupied == (holders == 1)
        })
    }
}
