//! Species catalog
//!
//! Every bird reads its size, speed, appetite and voice from here. The
//! values are fixed per species and never change during a visit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The birds that visit the feeder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    NorthernCardinal,
    DownyWoodpecker,
    BlackCappedChickadee,
    TuftedTitmouse,
}

/// Static attributes of a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesData {
    /// Body size in world pixels
    pub size: Vec2,
    /// Flight steps per second
    pub flight_speed: f32,
    /// Seed eaten per reference frame while eating
    pub consumption_rate: f32,
    /// Chance of singing when a song is due, out of `LIKELIHOOD_MAX`
    pub singing_likelihood: u32,
    /// Sprite sheet, relative to the asset root
    pub sprite_sheet: &'static str,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::NorthernCardinal,
        Species::DownyWoodpecker,
        Species::BlackCappedChickadee,
        Species::TuftedTitmouse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Species::NorthernCardinal => "Northern Cardinal",
            Species::DownyWoodpecker => "Downy Woodpecker",
            Species::BlackCappedChickadee => "Black-capped Chickadee",
            Species::TuftedTitmouse => "Tufted Titmouse",
        }
    }

    /// Key of this species' song in a feeder's sound table
    pub fn song(&self) -> &'static str {
        self.name()
    }

    pub fn data(&self) -> SpeciesData {
        let size = Vec2::new(190.0, 221.0);
        match self {
            Species::NorthernCardinal => SpeciesData {
                size,
                flight_speed: 30.0,
                consumption_rate: 0.002,
                singing_likelihood: 100,
                sprite_sheet: "sprites/northernCardinal.png",
            },
            Species::DownyWoodpecker => SpeciesData {
                size,
                flight_speed: 30.0,
                consumption_rate: 0.003,
                singing_likelihood: 30,
                sprite_sheet: "sprites/downyWoodpecker.png",
            },
            Species::BlackCappedChickadee => SpeciesData {
                size,
                flight_speed: 30.0,
                consumption_rate: 0.005,
                singing_likelihood: 100,
                sprite_sheet: "sprites/blackCappedChickadee.png",
            },
            Species::TuftedTitmouse => SpeciesData {
                size,
                flight_speed: 30.0,
                consumption_rate: 0.002,
                singing_likelihood: 80,
                sprite_sheet: "sprites/tuftedTitmouse.png",
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }
}
