//! Persisted, user-scoped playback preferences.
//!
//! Only volume, shuffle, repeat and the player mode survive restarts. The
//! engine loads them once at construction and saves a patch after every
//! change to one of them.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PreferencesError;

use super::types::PlayerMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackPreferences {
    pub volume: f32,
    pub is_shuffled: bool,
    pub is_repeating: bool,
    pub player_mode: PlayerMode,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self {
            volume: 1.0,
            is_shuffled: false,
            is_repeating: false,
            player_mode: PlayerMode::default(),
        }
    }
}

/// The subset of preferences touched by one mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesPatch {
    pub volume: Option<f32>,
    pub is_shuffled: Option<bool>,
    pub is_repeating: Option<bool>,
    pub player_mode: Option<PlayerMode>,
}

impl PreferencesPatch {
    pub fn apply(&self, prefs: &mut PlaybackPreferences) {
        if let Some(v) = self.volume {
            prefs.volume = v;
        }
        if let Some(v) = self.is_shuffled {
            prefs.is_shuffled = v;
        }
        if let Some(v) = self.is_repeating {
            prefs.is_repeating = v;
        }
        if let Some(m) = self.player_mode {
            prefs.player_mode = m;
        }
    }
}

/// Durable key-value storage for `PlaybackPreferences`.
pub trait PreferencesStore {
    fn load(&mut self) -> Result<PlaybackPreferences, PreferencesError>;
    fn save(&mut self, patch: &PreferencesPatch) -> Result<(), PreferencesError>;
}

/// Preferences kept in a TOML file.
pub struct TomlPreferencesStore {
    path: PathBuf,
    cached: Option<PlaybackPreferences>,
}

impl TomlPreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
        }
    }

    fn read(&self) -> Result<PlaybackPreferences, PreferencesError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no preferences file yet");
                return Ok(PlaybackPreferences::default());
            }
            Err(source) => {
                return Err(PreferencesError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| PreferencesError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferencesStore for TomlPreferencesStore {
    fn load(&mut self) -> Result<PlaybackPreferences, PreferencesError> {
        let prefs = self.read()?;
        self.cached = Some(prefs.clone());
        Ok(prefs)
    }

    fn save(&mut self, patch: &PreferencesPatch) -> Result<(), PreferencesError> {
        // A corrupt file is overwritten rather than blocking every save.
        let mut prefs = match self.cached.take() {
            Some(p) => p,
            None => self.read().unwrap_or_default(),
        };
        patch.apply(&mut prefs);

        let text = toml::to_string(&prefs)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let written = fs::write(&self.path, text).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        });
        self.cached = Some(prefs);
        written
    }
}

/// In-process store. Clones share the same backing value, so a caller can
/// keep one handle to observe what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferencesStore {
    inner: Rc<RefCell<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    prefs: PlaybackPreferences,
    saves: usize,
}

#[cfg(test)]
impl MemoryPreferencesStore {
    pub fn new(initial: PlaybackPreferences) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryState {
                prefs: initial,
                saves: 0,
            })),
        }
    }

    pub fn current(&self) -> PlaybackPreferences {
        self.inner.borrow().prefs.clone()
    }

    /// Number of `save` calls seen so far.
    pub fn saves(&self) -> usize {
        self.inner.borrow().saves
    }
}

impl PreferencesStore for MemoryPreferencesStore {
    fn load(&mut self) -> Result<PlaybackPreferences, PreferencesError> {
        Ok(self.inner.borrow().prefs.clone())
    }

    fn save(&mut self, patch: &PreferencesPatch) -> Result<(), PreferencesError> {
        let mut state = self.inner.borrow_mut();
        patch.apply(&mut state.prefs);
        state.saves += 1;
        Ok(())
    }
}
