//! Time-of-day buckets for scenery and night spawning

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::consts::{SUNRISE_HOUR, SUNSET_HOUR};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[default]
    Day,
    Dusk,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Day, TimeOfDay::Dusk, TimeOfDay::Night];

    /// Bucket for a local hour (0-23). Dusk covers the hour before sunrise
    /// and sunset as well as the hour itself.
    pub fn from_hour(hour: u32) -> Self {
        let near = |edge: u32| hour + 1 == edge || hour == edge;
        if near(SUNRISE_HOUR) || near(SUNSET_HOUR) {
            TimeOfDay::Dusk
        } else if SUNRISE_HOUR < hour && hour < SUNSET_HOUR {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    /// Bucket for the current local time
    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "day",
            TimeOfDay::Dusk => "dusk",
            TimeOfDay::Night => "night",
        }
    }
}
