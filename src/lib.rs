//! Feeder - a bird feeder ambiance simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird state machine, scheduling, flight)
//! - `context`: Feeder scene configuration and the registry of scenes
//! - `assets`: Animation frame maps and asset discovery
//! - `audio`: Song/background playback tasks over a pluggable backend
//! - `scene`: Per-frame draw list handed to the renderer
//! - `menu`: Main and pause menus
//! - `app`: Frame loop gluing input, simulation, audio and rendering

pub mod app;
pub mod assets;
pub mod audio;
pub mod context;
pub mod daylight;
pub mod error;
pub mod menu;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod update;

pub use app::{FeederApp, FrameInput, Key};
pub use context::{FeederContext, FeederRegistry};
pub use error::{AssetError, AudioError, ConfigError, FeederError, ScheduleError, UpdateError};
pub use settings::Settings;

/// Simulation and presentation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the VSync rate the art is tuned for)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame duration that per-frame rates (seed consumption) are expressed in
    pub const REFERENCE_FRAME_DT: f32 = 1.0 / 60.0;

    /// Window dimensions (world space is centered on the window)
    pub const WIN_WIDTH: f32 = 1600.0;
    pub const WIN_HEIGHT: f32 = 900.0;
    /// How far past the window edges birds may appear from or leave to
    pub const SPAWN_RANDOMNESS_OFFSET: f32 = 500.0;

    /// Fallback durations (seconds) when a schedule cannot be drawn
    pub const DEFAULT_SPAWN_LENGTH: u32 = 100;
    pub const DEFAULT_FEEDER_LENGTH: u32 = 10;
    pub const DEFAULT_EATING_GAP: u32 = 10;
    pub const DEFAULT_EATING_LENGTH: u32 = 10;
    pub const DEFAULT_SINGING_GAP: u32 = 60;

    /// Fraction of the original seed count restored per refill
    pub const SEED_REFILL_FRACTION: f32 = 0.05;
    /// Denominator for species singing likelihoods
    pub const LIKELIHOOD_MAX: u32 = 1000;
    /// Pixels per flight step
    pub const FLIGHT_STEP_PX: f32 = 10.0;

    /// Seconds per animation frame
    pub const BIRD_FRAME_RATE: f32 = 1.0 / 10.0;
    /// Width of one frame in the bird sprite sheets
    pub const SPRITE_FRAME_WIDTH: f32 = 43.0;
    /// Animation map shared by every bird sheet (relative to the asset root)
    pub const ANIMATION_MAP_FILE: &str = "animationMap/animationMappings.csv";

    /// Rough local hours for the scenery
    pub const SUNRISE_HOUR: u32 = 7;
    pub const SUNSET_HOUR: u32 = 19;

    /// Version reported to the update endpoint
    pub const VERSION: &str = "1.0";
}
