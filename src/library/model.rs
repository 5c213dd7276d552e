use std::time::Duration;

/// One playable audio item.
///
/// Tracks are treated as immutable values by the engine: they are copied,
/// reordered and indexed, never edited. Identity is the `id` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub duration: Option<Duration>,
    pub thumbnail: Option<String>,
    /// Short-lived streaming locator. `None` until a source resolves it.
    pub stream_url: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: None,
            duration: None,
            thumbnail: None,
            stream_url: None,
        }
    }

    /// `"Artist - Title"`, or just the title when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.title.trim()),
            _ => self.title.trim().to_string(),
        }
    }

    /// Identity comparison used by all queue logic.
    pub fn same_track(&self, other: &Track) -> bool {
        self.id == other.id
    }
}

/// Back-reference to the collection a queue was started from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackContext {
    pub id: String,
    pub name: String,
    /// The collection's tracks in their canonical order.
    pub tracks: Vec<Track>,
}
