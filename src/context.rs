//! Feeder contexts
//!
//! A context is everything that makes one feeder scene different from
//! another: how often birds come and go, which species visit, where they can
//! perch, how much seed there is, and which sounds and pictures to use.
//! Exactly one context is active at a time.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::daylight::TimeOfDay;
use crate::error::ConfigError;
use crate::sim::{
    LengthRange, LengthTable, Likelihoods, Perch, Rect, SeedPileConfig, Species, TimeLength,
    Timing,
};

/// Name of the built-in context
pub const BACKYARD_SUNFLOWER: &str = "Backyard Sunflower Feeder";

/// Sound table key of the looping ambience
pub const BACKGROUND_SOUND: &str = "Background";

/// One in this many night ticks may bring a bird
pub const DEFAULT_NIGHT_BIRD_ODDS: u64 = 1_000_000_000_000;

fn default_night_bird_odds() -> u64 {
    DEFAULT_NIGHT_BIRD_ODDS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeederContext {
    pub name: String,
    pub timing: Timing,
    /// Relative chance of each species being the next visitor
    pub species_likelihoods: BTreeMap<Species, u32>,
    pub perches: Vec<Perch>,
    pub seed: SeedPileConfig,
    #[serde(default = "default_night_bird_odds")]
    pub night_bird_odds: u64,
    /// Song name or [`BACKGROUND_SOUND`] to a sound file
    pub sounds: BTreeMap<String, String>,
    pub backgrounds: BTreeMap<TimeOfDay, String>,
    /// Seed pile texture per time of day
    pub seed_images: BTreeMap<TimeOfDay, String>,
}

fn table(ranges: [(u32, u32); 6]) -> LengthTable {
    TimeLength::ALL
        .into_iter()
        .zip(ranges)
        .map(|(length, (min, max))| (length, LengthRange::new(min, max)))
        .collect()
}

impl FeederContext {
    /// The sunflower feeder in the back yard
    pub fn backyard_sunflower() -> Self {
        let time_likelihoods: Likelihoods = TimeLength::ALL
            .into_iter()
            .zip([50, 400, 400, 144, 5, 1])
            .collect();

        let timing = Timing {
            time_likelihoods,
            spawn_lengths: table([
                (5, 30),
                (30, 120),
                (120, 600),
                (600, 3000),
                (3000, 7000),
                (7000, 15000),
            ]),
            feeder_lengths: table([
                (10, 20),
                (20, 90),
                (90, 200),
                (200, 400),
                (400, 700),
                (700, 2000),
            ]),
            eating_lengths: table([(1, 3), (3, 5), (5, 7), (7, 9), (9, 15), (15, 20)]),
            eating_gaps: table([(5, 10), (10, 15), (15, 25), (25, 35), (35, 80), (80, 150)]),
            singing_gaps: table([
                (45, 80),
                (80, 100),
                (120, 240),
                (250, 350),
                (350, 500),
                (500, 1000),
            ]),
        };

        let species_likelihoods = [
            (Species::NorthernCardinal, 120),
            (Species::DownyWoodpecker, 300),
            (Species::BlackCappedChickadee, 300),
            (Species::TuftedTitmouse, 280),
        ]
        .into_iter()
        .collect();

        let song = "sounds/songs/downyWoodpeckerSong.mp3";
        let mut sounds: BTreeMap<String, String> = Species::ALL
            .iter()
            .map(|s| (s.song().to_string(), song.to_string()))
            .collect();
        sounds.insert(
            BACKGROUND_SOUND.to_string(),
            "sounds/background/ambience.mp3".to_string(),
        );

        let per_time = |prefix: &str, suffix: &str| -> BTreeMap<TimeOfDay, String> {
            [
                (TimeOfDay::Night, "Night"),
                (TimeOfDay::Day, "Day"),
                (TimeOfDay::Dusk, "Dusk"),
            ]
            .into_iter()
            .map(|(tod, label)| (tod, format!("{prefix}{label}{suffix}")))
            .collect()
        };

        Self {
            name: BACKYARD_SUNFLOWER.to_string(),
            timing,
            species_likelihoods,
            perches: vec![
                Perch::new(Rect::new(90.0, -340.0, 280.0, -119.0)),
                Perch::new(Rect::new(270.0, -350.0, 460.0, -129.0)),
            ],
            seed: SeedPileConfig {
                center: Vec2::ZERO,
                width: 700.0,
                height: 300.0,
                seed_count: 3000.0,
                draw_scale: Vec2::splat(1.15),
                draw_offset: Vec2::new(100.0, -300.0),
                done_lower_y: 100.0,
            },
            night_bird_odds: DEFAULT_NIGHT_BIRD_ODDS,
            sounds,
            backgrounds: per_time("sprites/backgrounds/backyardSunflower", "Empty.png"),
            seed_images: per_time("sprites/seeds/sunflowerSeedPile", ".png"),
        }
    }

    /// Read a context from a JSON file
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn song_path(&self, species: Species) -> Option<&str> {
        self.sounds.get(species.song()).map(String::as_str)
    }

    pub fn background_sound(&self) -> Option<&str> {
        self.sounds.get(BACKGROUND_SOUND).map(String::as_str)
    }

    pub fn background_image(&self, time: TimeOfDay) -> Option<&str> {
        self.backgrounds.get(&time).map(String::as_str)
    }

    pub fn seed_image(&self, time: TimeOfDay) -> Option<&str> {
        self.seed_images.get(&time).map(String::as_str)
    }

    /// Species that can visit at all
    pub fn visiting_species(&self) -> impl Iterator<Item = Species> + '_ {
        self.species_likelihoods
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(s, _)| *s)
    }
}

/// Named contexts in menu order
#[derive(Debug, Clone, Default)]
pub struct FeederRegistry {
    contexts: Vec<FeederContext>,
}

impl FeederRegistry {
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        registry.register(FeederContext::backyard_sunflower());
        registry
    }

    /// Add a context, replacing any with the same name
    pub fn register(&mut self, context: FeederContext) {
        match self.contexts.iter_mut().find(|c| c.name == context.name) {
            Some(existing) => {
                log::info!("Replacing feeder {}", context.name);
                *existing = context;
            }
            None => {
                log::info!("Registered feeder {}", context.name);
                self.contexts.push(context);
            }
        }
    }

    /// Load and register a context file
    pub fn register_json(&mut self, path: &Path) -> Result<&FeederContext, ConfigError> {
        let context = FeederContext::load_json(path)?;
        let name = context.name.clone();
        self.register(context);
        self.get(&name)
    }

    pub fn get(&self, name: &str) -> Result<&FeederContext, ConfigError> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownFeeder(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backyard_tables_are_complete() {
        let context = FeederContext::backyard_sunflower();
        let timing = &context.timing;
        for table in [
            &timing.spawn_lengths,
            &timing.feeder_lengths,
            &timing.eating_lengths,
            &timing.eating_gaps,
            &timing.singing_gaps,
        ] {
            assert_eq!(table.len(), TimeLength::ALL.len());
            assert!(table.values().all(|r| r.min < r.max));
        }
        assert_eq!(timing.spawn_lengths[&TimeLength::Insane], LengthRange::new(7000, 15000));
        assert_eq!(context.visiting_species().count(), 4);
    }

    #[test]
    fn test_backyard_perches_fit_every_species() {
        let context = FeederContext::backyard_sunflower();
        for species in Species::ALL {
            assert!(context.perches.iter().all(|p| p.accepts(species.data().size)));
            assert!(context.song_path(species).is_some());
        }
        assert_eq!(
            context.background_image(TimeOfDay::Dusk),
            Some("sprites/backgrounds/backyardSunflowerDuskEmpty.png")
        );
        assert_eq!(
            context.seed_image(TimeOfDay::Night),
            Some("sprites/seeds/sunflowerSeedPileNight.png")
        );
    }

    #[test]
    fn test_json_round_trip_keeps_context() {
        let context = FeederContext::backyard_sunflower();
        let json = serde_json::to_string(&context).unwrap();
        let back: FeederContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, context);
    }

    #[test]
    fn test_registry_lookup_and_replace() {
        let mut registry = FeederRegistry::with_builtin();
        assert_eq!(registry.names(), vec![BACKYARD_SUNFLOWER]);
        assert!(matches!(
            registry.get("Porch"),
            Err(ConfigError::UnknownFeeder(name)) if name == "Porch"
        ));

        let mut porch = FeederContext::backyard_sunflower();
        porch.name = "Porch".into();
        registry.register(porch);
        let mut replacement = FeederContext::backyard_sunflower();
        replacement.night_bird_odds = 10;
        registry.register(replacement);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(BACKYARD_SUNFLOWER).unwrap().night_bird_odds, 10);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FeederContext::load_json(Path::new("/nonexistent/feeder.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
