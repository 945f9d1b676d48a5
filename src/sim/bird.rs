//! A visiting bird and its state machine
//!
//! ```text
//! Entering -> Perched <-> Eating
//!                     <-> Singing
//!             Perched -> Exiting -> Removed
//! ```
//!
//! All times are simulation seconds.

use glam::Vec2;
use rand::Rng;

use super::animation::BirdAnimation;
use super::flight::{FlightMove, FlightPath, outside_location};
use super::geom::Rect;
use super::perch::Perch;
use super::schedule::{Timing, decide_to_sing};
use super::species::{Species, SpeciesData};

/// What a bird is doing. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BirdState {
    /// Flying in to its perch
    Entering,
    Perched,
    /// Eating until the given time
    Eating { until: f64 },
    Singing,
    /// Flying away
    Exiting,
    /// Gone; dropped at the next tick
    Removed,
}

impl BirdState {
    /// Whether a bird in this state holds its perch
    pub fn holds_perch(&self) -> bool {
        !matches!(self, BirdState::Exiting | BirdState::Removed)
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, BirdState::Entering | BirdState::Exiting)
    }
}

/// Position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub rect: Rect,
    /// World pixels per second
    pub vel: Vec2,
}

/// Something a bird did that the outside world cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BirdEvent {
    Landed,
    /// Started singing; the song should be played and its end reported
    SongRequested,
    Left,
}

/// What a bird sees of the world during its update
pub struct BirdEnv<'a, R: Rng + ?Sized> {
    pub now: f64,
    pub dt: f32,
    pub perches: &'a mut [Perch],
    pub timing: &'a Timing,
    pub seed_finished: bool,
    pub sound_disabled: bool,
    /// Birds whose song finished playing since the last tick
    pub finished_songs: &'a [u32],
    pub rng: &'a mut R,
}

#[derive(Debug, Clone)]
pub struct Bird {
    pub id: u32,
    pub species: Species,
    data: SpeciesData,
    state: BirdState,
    pub body: Body,
    pub animation: BirdAnimation,
    perch: usize,
    exit_target: Rect,
    flight: FlightPath,

    entrance_at: f64,
    removal_at: f64,
    eating_at: f64,
    /// Unset until the bird first settles on its perch
    singing_at: Option<f64>,
    /// Drawn together with `singing_at`
    chosen_to_sing: bool,
}

impl Bird {
    /// Spawn a bird just outside the window, headed for `perch`
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        species: Species,
        perch: usize,
        perches: &mut [Perch],
        timing: &Timing,
        now: f64,
        rng: &mut R,
    ) -> Self {
        let data = species.data();
        let spawn = outside_location(data.size, rng);
        let exit_target = outside_location(data.size, rng);
        let target = perches[perch].rect.resting_spot(data.size).anchor();

        let mut bird = Self {
            id,
            species,
            data,
            state: BirdState::Entering,
            body: Body {
                rect: spawn,
                vel: Vec2::ZERO,
            },
            animation: BirdAnimation::default(),
            perch,
            exit_target,
            flight: FlightPath::new(spawn.anchor(), target),
            entrance_at: now,
            removal_at: now + f64::from(timing.feeder_length(rng)),
            eating_at: now + f64::from(timing.eating_gap(rng)),
            singing_at: None,
            chosen_to_sing: false,
        };
        bird.set_state(BirdState::Entering, perches);
        bird
    }

    pub fn state(&self) -> BirdState {
        self.state
    }

    pub fn data(&self) -> &SpeciesData {
        &self.data
    }

    pub fn perch(&self) -> usize {
        self.perch
    }

    pub fn flight(&self) -> &FlightPath {
        &self.flight
    }

    pub fn entrance_at(&self) -> f64 {
        self.entrance_at
    }

    pub fn removal_at(&self) -> f64 {
        self.removal_at
    }

    pub fn eating_at(&self) -> f64 {
        self.eating_at
    }

    pub fn singing_at(&self) -> Option<f64> {
        self.singing_at
    }

    pub fn is_eating(&self) -> bool {
        matches!(self.state, BirdState::Eating { .. })
    }

    /// Only a bird sitting idle on its perch may start leaving
    pub fn should_exit(&self, now: f64) -> bool {
        self.state == BirdState::Perched && now > self.removal_at
    }

    fn set_state(&mut self, state: BirdState, perches: &mut [Perch]) {
        log::debug!(
            "Bird {} ({}) {:?} -> {:?}",
            self.id,
            self.species.name(),
            self.state,
            state
        );
        self.state = state;
        // The perch was released on exit and may belong to another bird by now
        if state == BirdState::Removed {
            return;
        }
        if let Some(perch) = perches.get_mut(self.perch) {
            perch.occupied = state.holds_perch();
        }
    }

    /// Leave the perch for the exit target
    pub fn begin_exit(&mut self, perches: &mut [Perch]) {
        let target = self.exit_target.resting_spot(self.data.size).anchor();
        self.flight = FlightPath::new(self.body.rect.anchor(), target);
        self.set_state(BirdState::Exiting, perches);
    }

    /// Advance one tick
    pub fn update<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) -> Option<BirdEvent> {
        let event = match self.state {
            BirdState::Entering | BirdState::Exiting => self.fly(env),
            BirdState::Singing => {
                if env.sound_disabled || env.finished_songs.contains(&self.id) {
                    self.stop_singing(env);
                }
                None
            }
            BirdState::Eating { until } => {
                if env.now > until || env.seed_finished {
                    self.set_state(BirdState::Perched, env.perches);
                    self.schedule_eating(env);
                }
                None
            }
            BirdState::Perched => self.idle(env),
            BirdState::Removed => None,
        };

        self.animation.update(env.dt, &self.state, self.body.vel.x);
        event
    }

    fn idle<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) -> Option<BirdEvent> {
        let singing_at = match self.singing_at {
            Some(at) => at,
            None => self.schedule_singing(env),
        };

        if env.now > singing_at {
            if env.sound_disabled || !self.chosen_to_sing {
                self.schedule_singing(env);
                None
            } else {
                self.set_state(BirdState::Singing, env.perches);
                Some(BirdEvent::SongRequested)
            }
        } else if env.now > self.eating_at {
            if env.seed_finished {
                self.schedule_eating(env);
            } else {
                let until = env.now + f64::from(env.timing.eating_length(env.rng));
                self.set_state(BirdState::Eating { until }, env.perches);
            }
            None
        } else {
            None
        }
    }

    fn fly<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) -> Option<BirdEvent> {
        let scale = self.data.flight_speed * env.dt;
        match self.flight.next_move(self.body.rect.anchor(), scale) {
            FlightMove::Glide(delta) => {
                self.body.rect = self.body.rect.moved(delta);
                self.body.vel = delta / env.dt;
                None
            }
            FlightMove::Snap(anchor) => {
                let delta = anchor - self.body.rect.anchor();
                self.body.rect = Rect::from_anchor(anchor, self.data.size);
                self.body.vel = delta / env.dt;
                // The last nudge can point anywhere; keep the bird facing forward
                self.animation.lock_direction();
                None
            }
            FlightMove::Arrived => {
                self.body.vel = Vec2::ZERO;
                if self.state == BirdState::Entering {
                    self.set_state(BirdState::Perched, env.perches);
                    self.animation.unlock_direction();
                    Some(BirdEvent::Landed)
                } else {
                    self.set_state(BirdState::Removed, env.perches);
                    Some(BirdEvent::Left)
                }
            }
        }
    }

    fn stop_singing<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) {
        self.set_state(BirdState::Perched, env.perches);
        self.schedule_singing(env);
        self.schedule_eating(env);
    }

    fn schedule_eating<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) {
        self.eating_at = env.now + f64::from(env.timing.eating_gap(env.rng));
    }

    fn schedule_singing<R: Rng + ?Sized>(&mut self, env: &mut BirdEnv<'_, R>) -> f64 {
        let at = env.now + f64::from(env.timing.singing_gap(env.rng));
        self.singing_at = Some(at);
        self.chosen_to_sing = decide_to_sing(self.data.singing_likelihood, env.rng);
        at
    }
}
