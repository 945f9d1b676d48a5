//! Error types
//!
//! Asset and audio errors are fatal at startup. Schedule errors are never
//! surfaced to the user; callers fall back to fixed durations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: {reason}", path.display())]
    MalformedCsv {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("clip {name} wants frames {start}..={end} but the sheet has {available}")]
    FrameRange {
        name: String,
        start: usize,
        end: usize,
        available: usize,
    },
    #[error("animation map has no {0} clip")]
    MissingClip(&'static str),
    #[error("{} is not a readable PNG", .0.display())]
    BadImage(PathBuf),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no sound registered for {0}")]
    UnknownSound(String),
    #[error("failed to load sound {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    #[error("playback failed: {0}")]
    Playback(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no outcome has a positive weight")]
    NoWeights,
    #[error("empty range {min}..{max}")]
    EmptyRange { min: u32, max: u32 },
    #[error("no range configured for {0:?}")]
    MissingRange(crate::sim::TimeLength),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown feeder: {0}")]
    UnknownFeeder(String),
}

/// Why an update check gave no answer. Never fatal.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected reply {0:?}")]
    Parse(String),
}

/// Anything that stops the app from starting or switching feeders
#[derive(Debug, Error)]
pub enum FeederError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}
