use std::path::PathBuf;
use std::time::{Duration, Instant, TryFromFloatSecsError};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, trace};

use crate::engine::{EventSender, MediaBackend, MediaEvent, MediaEventKind, ResourceId};
use crate::error::MediaError;

use super::sink::{create_sink_at, locator_path};

/// Minimum position change, in seconds, before another `TimeUpdate` is sent.
const TIME_UPDATE_STEP: f64 = 0.25;

/// Position and run state of the loaded resource, kept apart from the sink so
/// it can be driven with explicit instants.
#[derive(Debug, Clone)]
pub(super) struct Playhead {
    paused: bool,
    /// Position when playback last (re)started or was paused.
    accumulated: Duration,
    started_at: Option<Instant>,
    last_reported: f64,
    ended: bool,
}

impl Default for Playhead {
    fn default() -> Self {
        Self {
            paused: true,
            accumulated: Duration::ZERO,
            started_at: None,
            last_reported: 0.0,
            ended: false,
        }
    }
}

impl Playhead {
    pub(super) fn position(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }

    pub(super) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(super) fn is_ended(&self) -> bool {
        self.ended
    }

    /// Start the clock. Returns false when it was already running.
    pub(super) fn resume(&mut self, now: Instant) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.started_at = Some(now);
        true
    }

    /// Stop the clock at the current position. Returns false when it was
    /// already stopped.
    pub(super) fn pause(&mut self, now: Instant) -> bool {
        if self.paused {
            return false;
        }
        self.accumulated = self.position(now);
        self.started_at = None;
        self.paused = true;
        true
    }

    /// The sink ran dry. A drained resource counts as paused.
    pub(super) fn finish(&mut self, now: Instant) {
        self.pause(now);
        self.ended = true;
    }

    /// Move to `target`, keeping the current run state.
    pub(super) fn jump(&mut self, target: Duration, now: Instant) {
        self.accumulated = target;
        self.started_at = (!self.paused).then_some(now);
        self.last_reported = target.as_secs_f64();
        self.ended = false;
    }

    /// Position worth reporting, if it moved at least `TIME_UPDATE_STEP`
    /// since the last report.
    pub(super) fn report(&mut self, now: Instant) -> Option<f64> {
        if self.paused {
            return None;
        }
        let pos = self.position(now).as_secs_f64();
        if (pos - self.last_reported).abs() < TIME_UPDATE_STEP {
            return None;
        }
        self.last_reported = pos;
        Some(pos)
    }
}

/// Clamp negative targets to zero. Targets too large for a `Duration` are
/// refused.
pub(super) fn seek_target(seconds: f64) -> Result<Duration, TryFromFloatSecsError> {
    Duration::try_from_secs_f64(seconds.max(0.0))
}

/// The single resource currently loaded into the output stream.
struct Loaded {
    resource: ResourceId,
    path: PathBuf,
    sink: Sink,
    head: Playhead,
}

/// `MediaBackend` that plays local files through the default output device.
pub struct RodioBackend {
    stream: OutputStream,
    events: EventSender,
    volume: f32,
    current: Option<Loaded>,
}

impl RodioBackend {
    /// Open the default output device. Events for bound resources are sent
    /// on `events`.
    pub fn open(events: EventSender) -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::NoDevice(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which corrupts the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            events,
            volume: 1.0,
            current: None,
        })
    }

    fn emit(&self, resource: ResourceId, kind: MediaEventKind) {
        // The receiver only goes away at shutdown.
        let _ = self.events.send(MediaEvent::new(resource, kind));
    }
}

impl MediaBackend for RodioBackend {
    fn bind(&mut self, resource: ResourceId, locator: &str, volume: f32) -> Result<(), MediaError> {
        self.release();
        self.volume = volume;

        let path = locator_path(locator)?;
        let (sink, duration) = create_sink_at(&self.stream, &path, Duration::ZERO, volume)?;
        debug!(%resource, path = %path.display(), ?duration, "bound sink");

        self.current = Some(Loaded {
            resource,
            path,
            sink,
            head: Playhead::default(),
        });

        if let Some(d) = duration {
            let secs = d.as_secs_f64();
            self.emit(resource, MediaEventKind::MetadataLoaded { duration: secs });
            // Local files are fully available as soon as they open.
            self.emit(resource, MediaEventKind::BufferProgress(secs));
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(loaded) = self.current.take() {
            trace!(resource = %loaded.resource, "stopping sink");
            loaded.sink.stop();
        }
    }

    fn start(&mut self) -> Result<(), MediaError> {
        let Some(loaded) = self.current.as_mut() else {
            return Err(MediaError::NotBound);
        };
        let now = Instant::now();
        let reload = loaded.head.is_ended();
        if reload {
            // A drained sink has nothing left to play; reload from the top.
            let (sink, _) = create_sink_at(&self.stream, &loaded.path, Duration::ZERO, self.volume)?;
            loaded.sink.stop();
            loaded.sink = sink;
            loaded.head.jump(Duration::ZERO, now);
            debug!(resource = %loaded.resource, "reloaded drained sink");
        }
        if loaded.head.resume(now) {
            loaded.sink.play();
        }
        let resource = loaded.resource;
        if reload {
            self.emit(resource, MediaEventKind::TimeUpdate(0.0));
        }
        self.emit(resource, MediaEventKind::BufferingStopped);
        Ok(())
    }

    fn pause(&mut self) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        if loaded.head.pause(Instant::now()) {
            loaded.sink.pause();
        }
    }

    fn seek(&mut self, seconds: f64) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        let resource = loaded.resource;
        let target = match seek_target(seconds) {
            Ok(target) => target,
            Err(e) => {
                if loaded.head.pause(Instant::now()) {
                    loaded.sink.pause();
                }
                let reason = format!("bad seek target {seconds}: {e}");
                self.emit(resource, MediaEventKind::Failed(reason));
                return;
            }
        };

        // Rebuild the sink and skip into the file.
        let (sink, _) = match create_sink_at(&self.stream, &loaded.path, target, self.volume) {
            Ok(built) => built,
            Err(e) => {
                // `Failed` stops the engine; the old sink stops with it.
                if loaded.head.pause(Instant::now()) {
                    loaded.sink.pause();
                }
                self.emit(resource, MediaEventKind::Failed(e.to_string()));
                return;
            }
        };
        loaded.sink.stop();
        if !loaded.head.is_paused() {
            sink.play();
        }
        loaded.sink = sink;
        loaded.head.jump(target, Instant::now());

        self.emit(resource, MediaEventKind::TimeUpdate(target.as_secs_f64()));
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(loaded) = self.current.as_ref() {
            loaded.sink.set_volume(volume);
        }
    }

    fn tick(&mut self) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        if loaded.head.is_paused() {
            return;
        }

        let resource = loaded.resource;
        let now = Instant::now();
        if loaded.sink.empty() {
            loaded.head.finish(now);
            debug!(%resource, "sink drained");
            self.emit(resource, MediaEventKind::Ended);
            return;
        }

        if let Some(pos) = loaded.head.report(now) {
            self.emit(resource, MediaEventKind::TimeUpdate(pos));
        }
    }
}
