//! Application model types: `App` and `Pane`.
//!
//! `App` is pure view state. Everything about playback comes from the latest
//! `PlayerSnapshot` the engine published; the model only tracks which pane
//! has focus, where the cursors are and the last message to show.

use crate::engine::PlayerSnapshot;
use crate::library::Track;

/// Which list receives navigation keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Library,
    Queue,
}

/// The main application model.
pub struct App {
    pub library: Vec<Track>,
    pub library_selected: usize,
    pub queue_selected: usize,
    pub focus: Pane,

    /// Latest published engine state.
    pub snapshot: Option<PlayerSnapshot>,

    /// Queue cursor tracks the current track until the user moves it.
    pub follow_playback: bool,

    /// One-line message for the status block (errors, hints).
    pub message: Option<String>,
}

impl App {
    /// Create a new `App` over the scanned `library`.
    pub fn new(library: Vec<Track>) -> Self {
        Self {
            library,
            library_selected: 0,
            queue_selected: 0,
            focus: Pane::Library,
            snapshot: None,
            follow_playback: true,
            message: None,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Library => Pane::Queue,
            Pane::Queue => Pane::Library,
        };
    }

    /// Tracks currently queued, in play order.
    pub fn queue(&self) -> &[Track] {
        self.snapshot
            .as_ref()
            .map(|s| s.queue.as_slice())
            .unwrap_or(&[])
    }

    /// Index of the current track in `queue()`, if anything is loaded.
    pub fn playing_index(&self) -> Option<usize> {
        self.snapshot
            .as_ref()
            .filter(|s| s.current_track.is_some())
            .map(|s| s.queue_index)
    }

    pub fn selected_library_track(&self) -> Option<&Track> {
        self.library.get(self.library_selected)
    }

    pub fn selected_queue_index(&self) -> Option<usize> {
        (self.queue_selected < self.queue().len()).then_some(self.queue_selected)
    }

    /// Take a new snapshot, keeping the queue cursor valid.
    pub fn apply_snapshot(&mut self, snapshot: PlayerSnapshot) {
        let len = snapshot.queue.len();
        let playing = snapshot.current_track.is_some().then_some(snapshot.queue_index);
        self.snapshot = Some(snapshot);

        if self.follow_playback {
            if let Some(i) = playing {
                self.queue_selected = i;
            }
        }
        if self.queue_selected >= len {
            self.queue_selected = len.saturating_sub(1);
        }
    }

    /// Move selection down in the focused pane, wrapping to the top.
    pub fn next(&mut self) {
        match self.focus {
            Pane::Library => {
                self.library_selected = wrap_next(self.library_selected, self.library.len());
            }
            Pane::Queue => {
                self.follow_playback = false;
                self.queue_selected = wrap_next(self.queue_selected, self.queue().len());
            }
        }
    }

    /// Move selection up in the focused pane, wrapping to the bottom.
    pub fn prev(&mut self) {
        match self.focus {
            Pane::Library => {
                self.library_selected = wrap_prev(self.library_selected, self.library.len());
            }
            Pane::Queue => {
                self.follow_playback = false;
                self.queue_selected = wrap_prev(self.queue_selected, self.queue().len());
            }
        }
    }

    pub fn select_first(&mut self) {
        match self.focus {
            Pane::Library => self.library_selected = 0,
            Pane::Queue => {
                self.follow_playback = false;
                self.queue_selected = 0;
            }
        }
    }

    pub fn select_last(&mut self) {
        match self.focus {
            Pane::Library => self.library_selected = self.library.len().saturating_sub(1),
            Pane::Queue => {
                self.follow_playback = false;
                self.queue_selected = self.queue().len().saturating_sub(1);
            }
        }
    }

    /// Snap the queue cursor back to the playing track.
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
        if let Some(i) = self.playing_index() {
            self.queue_selected = i;
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

fn wrap_next(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn wrap_prev(current: usize, len: usize) -> usize {
    match (current, len) {
        (_, 0) => 0,
        (0, len) => len - 1,
        (c, _) => c - 1,
    }
}
