//! Engine-facing value types: presentation mode, live session state and the
//! read model handed to UI observers.

use serde::{Deserialize, Serialize};

use crate::config::PlaybackSettings;
use crate::library::Track;

/// Visibility/expansion flags for whatever presents the player.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerMode {
    pub is_expanded: bool,
    pub is_visible: bool,
    pub is_mini_player: bool,
}

impl Default for PlayerMode {
    fn default() -> Self {
        Self {
            is_expanded: false,
            is_visible: true,
            is_mini_player: true,
        }
    }
}

impl PlayerMode {
    /// Mode after the queue is cleared: collapsed, hidden, mini.
    pub fn hidden() -> Self {
        Self {
            is_expanded: false,
            is_visible: false,
            is_mini_player: true,
        }
    }

    pub fn merge(&mut self, update: PlayerModeUpdate) {
        if let Some(v) = update.is_expanded {
            self.is_expanded = v;
        }
        if let Some(v) = update.is_visible {
            self.is_visible = v;
        }
        if let Some(v) = update.is_mini_player {
            self.is_mini_player = v;
        }
    }
}

/// Partial update for `PlayerMode`; `None` leaves a flag untouched.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PlayerModeUpdate {
    pub is_expanded: Option<bool>,
    pub is_visible: Option<bool>,
    pub is_mini_player: Option<bool>,
}

/// Live, never-persisted runtime state. Times are seconds as reported by
/// the device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_time: f64,
    pub is_buffering: bool,
}

/// Everything an observer may read, captured at one revision.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub revision: u64,
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_time: f64,
    pub is_buffering: bool,
    pub queue: Vec<Track>,
    pub queue_index: usize,
    pub is_shuffled: bool,
    pub is_repeating: bool,
    pub volume: f32,
    pub player_mode: PlayerMode,
    pub context_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub restart_threshold_secs: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            restart_threshold_secs: 3.0,
        }
    }
}

impl From<&PlaybackSettings> for EngineSettings {
    fn from(p: &PlaybackSettings) -> Self {
        Self {
            restart_threshold_secs: p.restart_threshold_secs,
        }
    }
}
