//! Error types shared across the crate.
//!
//! Transport and navigation never surface errors to callers; these types
//! exist for the seams that can genuinely fail (device binding, track
//! sources, preference storage) and for the few operations that report
//! inconsistencies instead of hiding them.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a media device.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no output device available: {0}")]
    NoDevice(String),

    #[error("failed to open {locator}: {source}")]
    Open {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {locator}: {reason}")]
    Decode { locator: String, reason: String },

    #[error("no media resource is bound")]
    NotBound,
}

/// Failures reported by a `TrackSource`.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("track {0} has no streaming locator")]
    NoLocator(String),

    #[error("library I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading or writing persisted playback preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed preferences file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Inconsistencies the engine reports rather than silently papering over.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("current track {track_id} is missing from the original queue order")]
    ShuffleRestore { track_id: String },
}

/// Failures from the high-level "play this track" control.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("track {0} is not playable from the library")]
    UnknownTrack(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}
