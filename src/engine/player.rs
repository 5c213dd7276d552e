use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, trace, warn};

use crate::error::EngineError;
use crate::library::{PlaybackContext, Track, TrackSource};

use super::media::{MediaBackend, MediaEvent, MediaEventKind, ResourceId};
use super::prefs::{PlaybackPreferences, PreferencesPatch, PreferencesStore};
use super::queue::{Queue, Removed};
use super::types::{EngineSettings, PlaybackSession, PlayerMode, PlayerModeUpdate, PlayerSnapshot};

/// The resource currently held by the device.
#[derive(Debug, Copy, Clone)]
struct Binding {
    id: ResourceId,
    /// False when the locator could not be resolved or the device refused it.
    ready: bool,
}

/// Single owner of the media device, the play queue and the live session.
///
/// Observers call the command methods and read `snapshot()` (or subscribe to
/// receive one after every change). Device events come back in through
/// `dispatch`, which is the only place asynchronous input mutates state.
pub struct PlaybackEngine {
    media: Box<dyn MediaBackend>,
    source: Rc<dyn TrackSource>,
    store: Box<dyn PreferencesStore>,
    prefs: PlaybackPreferences,
    settings: EngineSettings,

    queue: Queue,
    session: PlaybackSession,
    context: Option<PlaybackContext>,

    binding: Option<Binding>,
    next_resource: u64,

    rng: StdRng,
    subscribers: Vec<Sender<PlayerSnapshot>>,
    revision: u64,
}

impl PlaybackEngine {
    /// Build an engine with an empty queue and nothing bound. Preferences
    /// are loaded before any other state exists.
    pub fn new(
        media: Box<dyn MediaBackend>,
        source: Rc<dyn TrackSource>,
        mut store: Box<dyn PreferencesStore>,
        settings: EngineSettings,
    ) -> Self {
        let prefs = match store.load() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "could not load playback preferences, using defaults");
                PlaybackPreferences::default()
            }
        };
        debug!(?prefs, "playback preferences loaded");

        Self {
            media,
            source,
            store,
            prefs,
            settings,
            queue: Queue::default(),
            session: PlaybackSession::default(),
            context: None,
            binding: None,
            next_resource: 0,
            rng: StdRng::from_rng(&mut rand::rng()),
            subscribers: Vec::new(),
            revision: 0,
        }
    }

    /// Replace the shuffle RNG with a deterministic one.
    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ---- read model ---------------------------------------------------

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    #[cfg(test)]
    pub fn original_order(&self) -> &[Track] {
        self.queue.original_order()
    }

    pub fn queue_index(&self) -> usize {
        self.queue.index()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    pub fn preferences(&self) -> &PlaybackPreferences {
        &self.prefs
    }

    pub fn context(&self) -> Option<&PlaybackContext> {
        self.context.as_ref()
    }

    /// Id of the bound resource, if any.
    pub fn bound_resource(&self) -> Option<ResourceId> {
        self.binding.map(|b| b.id)
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            revision: self.revision,
            current_track: self.queue.current().cloned(),
            is_playing: self.session.is_playing,
            current_time: self.session.current_time,
            duration: self.session.duration,
            buffered_time: self.session.buffered_time,
            is_buffering: self.session.is_buffering,
            queue: self.queue.tracks().to_vec(),
            queue_index: self.queue.index(),
            is_shuffled: self.prefs.is_shuffled,
            is_repeating: self.prefs.is_repeating,
            volume: self.prefs.volume,
            player_mode: self.prefs.player_mode,
            context_id: self.context.as_ref().map(|c| c.id.clone()),
        }
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&mut self) -> Receiver<PlayerSnapshot> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    // ---- queue lifecycle ----------------------------------------------

    /// Start a fresh session over `tracks`, bound to `tracks[start_index]`
    /// but paused: callers follow up with `play()` when they want sound.
    pub fn initialize(
        &mut self,
        tracks: Vec<Track>,
        start_index: usize,
        context: Option<PlaybackContext>,
    ) {
        if start_index >= tracks.len() {
            warn!(
                start_index,
                len = tracks.len(),
                "initialize called with an empty queue or out-of-range start"
            );
            return;
        }

        self.release_resource();
        debug!(
            tracks = tracks.len(),
            start_index,
            context = ?context.as_ref().map(|c| c.id.as_str()),
            "initializing queue"
        );

        self.queue = Queue::new(tracks, start_index);
        self.context = context;
        self.session = PlaybackSession::default();

        if !self.prefs.player_mode.is_visible {
            self.prefs.player_mode.is_visible = true;
            self.persist(PreferencesPatch {
                player_mode: Some(self.prefs.player_mode),
                ..Default::default()
            });
        }

        self.bind_current();
        self.publish();
    }

    /// Jump to `index` and start playing it. Out-of-range indices are ignored.
    pub fn play_queue_item(&mut self, index: usize) {
        if !self.queue.set_index(index) {
            debug!(index, len = self.queue.len(), "ignoring out-of-range queue item");
            return;
        }

        self.release_resource();
        self.session = PlaybackSession::default();
        self.bind_current();
        self.start_bound();
        self.publish();
    }

    /// Append to the end of the queue without touching playback. The first
    /// track added to an empty queue is bound, paused, so `play()` works.
    pub fn add_to_queue(&mut self, track: Track) {
        let was_empty = self.queue.is_empty();
        debug!(track = %track.id, "adding to queue");
        self.queue.push(track);

        if was_empty {
            self.release_resource();
            self.session = PlaybackSession::default();
            self.bind_current();
        }
        self.publish();
    }

    /// Remove the entry at `index`.
    ///
    /// Removing the current track stops playback and binds, paused, whatever
    /// track now sits at the current position. Removing the last remaining
    /// track clears the engine.
    pub fn remove_from_queue(&mut self, index: usize) {
        let Some(removed) = self.queue.remove(index, self.prefs.is_shuffled) else {
            debug!(index, len = self.queue.len(), "ignoring out-of-range removal");
            return;
        };

        if self.queue.is_empty() {
            debug!("queue emptied by removal");
            self.reset();
        } else if removed == Removed::Current {
            debug!(index, "current track removed, stopping");
            self.release_resource();
            self.session = PlaybackSession::default();
            self.bind_current();
        }
        self.publish();
    }

    /// Release the device and drop every piece of session state.
    pub fn clear_queue(&mut self) {
        if self.queue.is_empty() && self.binding.is_none() && self.context.is_none() {
            trace!("clear_queue on an empty engine");
            return;
        }
        self.reset();
        self.publish();
    }

    fn reset(&mut self) {
        self.release_resource();
        self.queue.clear();
        self.context = None;
        self.session = PlaybackSession::default();
        self.prefs.player_mode = PlayerMode::hidden();
        self.persist(PreferencesPatch {
            player_mode: Some(self.prefs.player_mode),
            ..Default::default()
        });
    }

    // ---- transport ----------------------------------------------------

    /// Start the bound resource. `is_playing` only becomes true once the
    /// device accepted the start.
    pub fn play(&mut self) {
        if self.binding.is_none() {
            trace!("play with nothing bound");
            return;
        }
        self.start_bound();
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.binding.is_none() {
            return;
        }
        self.media.pause();
        self.session.is_playing = false;
        self.publish();
    }

    pub fn play_pause(&mut self) {
        if self.session.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move the device position. Clamping is the caller's job.
    pub fn seek(&mut self, seconds: f64) {
        if self.binding.is_none() {
            return;
        }
        self.media.seek(seconds);
        self.session.current_time = seconds;
        self.publish();
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.prefs.volume = volume;
        if self.binding.is_some() {
            self.media.set_volume(volume);
        }
        self.persist(PreferencesPatch {
            volume: Some(volume),
            ..Default::default()
        });
        self.publish();
    }

    // ---- navigation ---------------------------------------------------

    pub fn next_song(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        if !self.queue.is_last() {
            self.play_queue_item(self.queue.index() + 1);
        } else if self.prefs.is_repeating {
            self.play_queue_item(0);
        }
    }

    /// Past the restart threshold this restarts the current track; otherwise
    /// it steps back one entry (or restarts when already at the top).
    pub fn previous_song(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        if self.session.current_time > self.settings.restart_threshold_secs {
            self.seek(0.0);
        } else if self.queue.index() > 0 {
            self.play_queue_item(self.queue.index() - 1);
        } else {
            self.seek(0.0);
        }
    }

    // ---- shuffle / repeat / mode ----------------------------------------

    /// Flip shuffle.
    ///
    /// Turning it on keeps the current track in place at the head of a
    /// shuffled queue built from the bound context (or the original order).
    /// Turning it off restores the original order. If the current track is
    /// missing from it, the engine lands on the first track, paused, and
    /// reports the inconsistency.
    pub fn toggle_shuffle(&mut self) -> Result<(), EngineError> {
        let mut outcome = Ok(());

        if !self.prefs.is_shuffled {
            let source: Vec<Track> = match &self.context {
                Some(ctx) => ctx.tracks.clone(),
                None => self.queue.original_order().to_vec(),
            };
            self.queue.shuffle_from(&source, &mut self.rng);
            self.prefs.is_shuffled = true;
            debug!(len = self.queue.len(), "shuffle on");
        } else {
            if let Err(track_id) = self.queue.unshuffle() {
                error!(
                    track = %track_id,
                    "current track missing from original order, falling back to the first track"
                );
                self.release_resource();
                self.session = PlaybackSession::default();
                if !self.queue.is_empty() {
                    self.bind_current();
                }
                outcome = Err(EngineError::ShuffleRestore { track_id });
            }
            self.prefs.is_shuffled = false;
            debug!(index = self.queue.index(), "shuffle off");
        }

        self.persist(PreferencesPatch {
            is_shuffled: Some(self.prefs.is_shuffled),
            ..Default::default()
        });
        self.publish();
        outcome
    }

    /// Flip repeat. Only consulted at the next end-of-queue decision.
    pub fn toggle_repeat(&mut self) {
        self.prefs.is_repeating = !self.prefs.is_repeating;
        self.persist(PreferencesPatch {
            is_repeating: Some(self.prefs.is_repeating),
            ..Default::default()
        });
        self.publish();
    }

    pub fn set_player_mode(&mut self, update: PlayerModeUpdate) {
        self.prefs.player_mode.merge(update);
        self.persist(PreferencesPatch {
            player_mode: Some(self.prefs.player_mode),
            ..Default::default()
        });
        self.publish();
    }

    // ---- device events ------------------------------------------------

    /// Let the device emit whatever progress it has accumulated.
    pub fn tick(&mut self) {
        self.media.tick();
    }

    /// Apply one device event. Events from anything but the bound resource
    /// are stale and dropped.
    pub fn dispatch(&mut self, event: MediaEvent) {
        if self.bound_resource() != Some(event.resource) {
            trace!(resource = %event.resource, kind = ?event.kind, "dropping stale media event");
            return;
        }

        match event.kind {
            MediaEventKind::TimeUpdate(t) => self.session.current_time = t,
            MediaEventKind::MetadataLoaded { duration } => self.session.duration = duration,
            MediaEventKind::BufferProgress(t) => self.session.buffered_time = t,
            MediaEventKind::BufferingStarted => self.session.is_buffering = true,
            MediaEventKind::BufferingStopped => self.session.is_buffering = false,
            MediaEventKind::Ended => {
                self.on_ended();
                return;
            }
            MediaEventKind::Failed(reason) => {
                warn!(resource = %event.resource, %reason, "playback failed");
                self.session.is_playing = false;
                self.session.is_buffering = false;
            }
        }
        self.publish();
    }

    fn on_ended(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        if self.prefs.is_repeating && self.queue.is_last() {
            debug!("end of queue, repeating from the top");
            self.play_queue_item(0);
        } else if !self.queue.is_last() {
            self.play_queue_item(self.queue.index() + 1);
        } else {
            debug!("end of queue");
            self.session.is_playing = false;
            self.session.is_buffering = false;
            self.publish();
        }
    }

    // ---- resource management ------------------------------------------

    /// Detach the device from whatever it holds. Always safe to call.
    fn release_resource(&mut self) {
        if let Some(b) = self.binding.take() {
            trace!(resource = %b.id, "releasing media resource");
        }
        self.media.release();
    }

    /// Bind a new resource for the current track. The previous one must
    /// already be released.
    fn bind_current(&mut self) {
        let Some(track) = self.queue.current().cloned() else {
            return;
        };

        self.next_resource += 1;
        let id = ResourceId(self.next_resource);

        let ready = match self.source.resolve_streaming_url(&track) {
            Ok(locator) => match self.media.bind(id, &locator, self.prefs.volume) {
                Ok(()) => true,
                Err(e) => {
                    warn!(resource = %id, track = %track.id, error = %e, "device refused track");
                    false
                }
            },
            Err(e) => {
                warn!(resource = %id, track = %track.id, error = %e, "could not resolve streaming locator");
                false
            }
        };

        debug!(resource = %id, track = %track.id, ready, "bound media resource");
        self.binding = Some(Binding { id, ready });
    }

    fn start_bound(&mut self) {
        let Some(binding) = self.binding else {
            return;
        };
        if !binding.ready {
            warn!(resource = %binding.id, "cannot start, resource is not ready");
            self.session.is_playing = false;
            return;
        }
        match self.media.start() {
            Ok(()) => self.session.is_playing = true,
            Err(e) => {
                warn!(resource = %binding.id, error = %e, "playback did not start");
                self.session.is_playing = false;
            }
        }
    }

    fn persist(&mut self, patch: PreferencesPatch) {
        if let Err(e) = self.store.save(&patch) {
            warn!(error = %e, "could not save playback preferences");
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}
