//! Fixed timestep simulation tick
//!
//! Advances the feeder deterministically: departures, spawning, bird
//! updates and seed depletion, in that order.

use rand::Rng;

use super::bird::{Bird, BirdEnv, BirdEvent, BirdState};
use super::perch::choose_perch;
use super::schedule::WeightedChooser;
use super::species::Species;
use super::state::FeederState;
use crate::daylight::TimeOfDay;

/// Outside conditions for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub time_of_day: TimeOfDay,
    /// Shared mute flag, sampled once per tick
    pub sound_disabled: bool,
    /// Birds whose song playback finished since the last tick
    pub finished_songs: Vec<u32>,
    /// Top the seed pile up
    pub refill: bool,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeederEvent {
    BirdSpawned { bird: u32, species: Species },
    BirdPerched { bird: u32 },
    /// Play `song` and report back when it ends
    SongRequested { bird: u32, song: &'static str },
    BirdLeft { bird: u32 },
}

/// Advance the feeder state by one fixed timestep
pub fn tick(state: &mut FeederState, input: &TickInput, dt: f32) -> Vec<FeederEvent> {
    let mut events = Vec::new();
    state.time_secs += f64::from(dt);
    state.time_ticks += 1;

    // Departures
    let now = state.time_secs;
    for bird in &mut state.birds {
        if bird.should_exit(now) {
            bird.begin_exit(&mut state.perches);
        }
    }
    state.birds.retain(|b| b.state() != BirdState::Removed);

    // Birds rarely turn up at night
    let odds = state.context.night_bird_odds;
    let night_blocked = input.time_of_day == TimeOfDay::Night
        && (odds < 2 || state.rng.random_range(0..odds) != 1);
    if !night_blocked && now >= state.next_spawn_at {
        if let Some(event) = spawn_bird(state) {
            events.push(event);
        }
        state.schedule_next_spawn();
    }

    // Bird updates
    let seed_finished = state.seed_pile.finished();
    let FeederState {
        birds,
        perches,
        rng,
        context,
        ..
    } = state;
    let mut env = BirdEnv {
        now,
        dt,
        perches: perches.as_mut_slice(),
        timing: &context.timing,
        seed_finished,
        sound_disabled: input.sound_disabled,
        finished_songs: &input.finished_songs,
        rng,
    };
    for bird in birds.iter_mut() {
        let Some(event) = bird.update(&mut env) else {
            continue;
        };
        events.push(match event {
            BirdEvent::Landed => FeederEvent::BirdPerched { bird: bird.id },
            BirdEvent::SongRequested => FeederEvent::SongRequested {
                bird: bird.id,
                song: bird.species.song(),
            },
            BirdEvent::Left => FeederEvent::BirdLeft { bird: bird.id },
        });
    }

    // Seed
    if input.refill {
        state.seed_pile.refill();
    }
    let eaten: f32 = state
        .birds
        .iter()
        .filter(|b| b.is_eating())
        .map(|b| b.data().consumption_rate)
        .sum();
    state.seed_pile.consume(eaten, dt);

    events
}

/// Try to bring a new bird to the feeder. `None` when no species can be
/// drawn or no perch fits.
fn spawn_bird(state: &mut FeederState) -> Option<FeederEvent> {
    let weights = state
        .context
        .species_likelihoods
        .iter()
        .map(|(species, w)| (*species, u64::from(*w)));
    let species = match WeightedChooser::new(weights) {
        Ok(chooser) => chooser.pick(&mut state.rng),
        Err(e) => {
            log::warn!("No species to spawn for {}: {e}", state.context.name);
            return None;
        }
    };

    let size = species.data().size;
    let Some(perch) = choose_perch(&state.perches, size, &mut state.rng) else {
        log::debug!("No free perch for a {}", species.name());
        return None;
    };

    let id = state.next_entity_id();
    let bird = Bird::new(
        id,
        species,
        perch,
        &mut state.perches,
        &state.context.timing,
        state.time_secs,
        &mut state.rng,
    );
    log::info!("{} (bird {id}) is flying in to perch {perch}", species.name());
    state.birds.push(bird);
    Some(FeederEvent::BirdSpawned { bird: id, species })
}
