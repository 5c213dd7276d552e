//! Playback engine: the single owner of the media device, the play queue
//! and the live session.
//!
//! The engine never talks to audio hardware directly. It drives a
//! `MediaBackend`, resolves locators through a `TrackSource`, and persists a
//! small set of preferences through a `PreferencesStore`. All three are
//! injected at construction.

mod media;
mod player;
mod prefs;
mod queue;
mod types;

pub use media::{EventSender, MediaBackend, MediaEvent, MediaEventKind, ResourceId};
pub use player::PlaybackEngine;
pub use prefs::{
    MemoryPreferencesStore, PlaybackPreferences, PreferencesPatch, PreferencesStore,
    TomlPreferencesStore,
};
pub use types::{EngineSettings, PlaybackSession, PlayerMode, PlayerModeUpdate, PlayerSnapshot};
