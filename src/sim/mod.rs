//! Deterministic simulation module
//!
//! All feeder logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or wall-clock dependencies

pub mod animation;
pub mod bird;
pub mod flight;
pub mod geom;
pub mod perch;
pub mod schedule;
pub mod seed;
pub mod species;
pub mod state;
pub mod tick;

pub use animation::{BirdAnimation, Clip, Facing};
pub use bird::{Bird, BirdState, Body};
pub use flight::{FlightMove, FlightPath, Side, outside_location};
pub use geom::Rect;
pub use perch::{Perch, choose_perch};
pub use schedule::{
    LengthRange, LengthTable, Likelihoods, TimeLength, Timing, WeightedChooser, decide_to_sing,
    resolve_length,
};
pub use seed::{SeedPile, SeedPileConfig};
pub use species::{Species, SpeciesData};
pub use state::FeederState;
pub use tick::{FeederEvent, TickInput, tick};
