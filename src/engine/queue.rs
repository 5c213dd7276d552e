//! The play queue: an ordered list of tracks, a pointer to the active one,
//! and the pre-shuffle order used to restore it.
//!
//! Everything here is pure data manipulation; binding audio for whatever
//! ends up current is the engine's job.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::library::Track;

/// Where a removed entry sat relative to the current index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Removed {
    BeforeCurrent,
    Current,
    AfterCurrent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    tracks: Vec<Track>,
    index: usize,
    original_order: Vec<Track>,
}

impl Queue {
    /// Queue over `tracks` positioned at `index`; the original order is a copy.
    pub fn new(tracks: Vec<Track>, index: usize) -> Self {
        let original_order = tracks.clone();
        Self {
            tracks,
            index,
            original_order,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn original_order(&self) -> &[Track] {
        &self.original_order
    }

    /// Position of the active track; `0` when the queue is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.tracks.len()
    }

    /// Move the pointer. Out-of-range indices are refused.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index < self.tracks.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Append to both the working queue and the original order.
    pub fn push(&mut self, track: Track) {
        self.original_order.push(track.clone());
        self.tracks.push(track);
    }

    /// Remove the entry at `index`, keeping the pointer on the same logical
    /// track when an earlier entry goes away.
    ///
    /// While shuffled the two orders differ, so the original-order copy is
    /// located by identifier instead of by position.
    pub fn remove(&mut self, index: usize, shuffled: bool) -> Option<Removed> {
        if index >= self.tracks.len() {
            return None;
        }
        let removed = self.tracks.remove(index);

        if shuffled {
            if let Some(pos) = self
                .original_order
                .iter()
                .position(|t| t.same_track(&removed))
            {
                self.original_order.remove(pos);
            }
        } else if index < self.original_order.len() {
            self.original_order.remove(index);
        }

        let which = if index < self.index {
            self.index -= 1;
            Removed::BeforeCurrent
        } else if index == self.index {
            if self.index >= self.tracks.len() {
                self.index = self.tracks.len().saturating_sub(1);
            }
            Removed::Current
        } else {
            Removed::AfterCurrent
        };
        Some(which)
    }

    /// Put the current track first, followed by a random permutation of
    /// every other track in `source`. The pointer ends up at 0.
    pub fn shuffle_from<R: Rng + ?Sized>(&mut self, source: &[Track], rng: &mut R) {
        let Some(current) = self.current().cloned() else {
            return;
        };

        let mut rest: Vec<Track> = source
            .iter()
            .filter(|t| !t.same_track(&current))
            .cloned()
            .collect();
        rest.shuffle(rng);

        let mut tracks = Vec::with_capacity(rest.len() + 1);
        tracks.push(current);
        tracks.extend(rest);
        self.tracks = tracks;
        self.index = 0;
    }

    /// Restore the original order and point at the current track's place in
    /// it. When the current track cannot be found there the pointer falls
    /// back to 0 and the missing track's id is returned as the error.
    pub fn unshuffle(&mut self) -> Result<(), String> {
        let Some(current) = self.current().cloned() else {
            self.tracks = self.original_order.clone();
            self.index = 0;
            return Ok(());
        };

        self.tracks = self.original_order.clone();
        match self.tracks.iter().position(|t| t.same_track(&current)) {
            Some(pos) => {
                self.index = pos;
                Ok(())
            }
            None => {
                self.index = 0;
                Err(current.id)
            }
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.original_order.clear();
        self.index = 0;
    }
}
