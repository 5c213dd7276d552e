use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::LibrarySettings;
use crate::error::SourceError;

use super::model::{PlaybackContext, Track};
use super::scan::{LibraryEntry, scan};

/// Anything that can hand the engine an ordered list of playable tracks and
/// turn a track into a streaming locator.
pub trait TrackSource {
    /// Every track playable by the current user.
    fn list_tracks(&self) -> Result<Vec<Track>, SourceError>;

    /// A playlist's tracks in playlist order, wrapped in its context.
    fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaybackContext, SourceError>;

    /// Resolve a time-bounded locator for `track`. The engine treats the
    /// result as opaque and never retries.
    fn resolve_streaming_url(&self, track: &Track) -> Result<String, SourceError> {
        track
            .stream_url
            .clone()
            .ok_or_else(|| SourceError::NoLocator(track.id.clone()))
    }
}

/// A `TrackSource` over a directory tree scanned once at startup.
///
/// Playlists are the sub-directories of the root: the playlist id is the
/// directory path relative to the root, and its tracks are every track below
/// it, in library order.
pub struct LibrarySource {
    root: PathBuf,
    entries: Vec<LibraryEntry>,
    paths: HashMap<String, PathBuf>,
}

impl LibrarySource {
    pub fn scan(root: &Path, settings: &LibrarySettings) -> Self {
        let entries = scan(root, settings);
        info!(root = %root.display(), tracks = entries.len(), "library scanned");
        Self::from_entries(root.to_path_buf(), entries)
    }

    pub(crate) fn from_entries(root: PathBuf, entries: Vec<LibraryEntry>) -> Self {
        let paths = entries
            .iter()
            .map(|e| (e.track.id.clone(), e.path.clone()))
            .collect();
        Self {
            root,
            entries,
            paths,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TrackSource for LibrarySource {
    fn list_tracks(&self) -> Result<Vec<Track>, SourceError> {
        Ok(self.entries.iter().map(|e| e.track.clone()).collect())
    }

    fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaybackContext, SourceError> {
        let id = playlist_id.trim_matches('/');
        if id.is_empty() {
            return Err(SourceError::PlaylistNotFound(playlist_id.to_string()));
        }

        let prefix = format!("{id}/");
        let tracks: Vec<Track> = self
            .entries
            .iter()
            .filter(|e| e.track.id.starts_with(&prefix))
            .map(|e| e.track.clone())
            .collect();
        if tracks.is_empty() {
            return Err(SourceError::PlaylistNotFound(playlist_id.to_string()));
        }

        let name = id.rsplit('/').next().unwrap_or(id).to_string();
        Ok(PlaybackContext {
            id: id.to_string(),
            name,
            tracks,
        })
    }

    fn resolve_streaming_url(&self, track: &Track) -> Result<String, SourceError> {
        if let Some(url) = &track.stream_url {
            return Ok(url.clone());
        }
        self.paths
            .get(&track.id)
            .map(|p| format!("file://{}", p.display()))
            .ok_or_else(|| SourceError::NoLocator(track.id.clone()))
    }
}
