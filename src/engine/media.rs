//! The seam between the engine and whatever actually makes sound.
//!
//! A device holds at most one bound resource. Every bind is tagged with a
//! fresh `ResourceId`, and every event the device emits carries the id of the
//! resource that produced it, so the engine can drop events from resources it
//! has already released.

use std::fmt;
use std::sync::mpsc::Sender;

use crate::error::MediaError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Playback position, in seconds.
    TimeUpdate(f64),
    /// Total length became known.
    MetadataLoaded { duration: f64 },
    /// Furthest buffered timestamp, in seconds.
    BufferProgress(f64),
    BufferingStarted,
    BufferingStopped,
    /// The track played to its end without user action.
    Ended,
    /// The device gave up on the resource after it was bound.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub resource: ResourceId,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(resource: ResourceId, kind: MediaEventKind) -> Self {
        Self { resource, kind }
    }
}

/// Where devices publish their events. The runtime drains the receiving end
/// and feeds each event to `PlaybackEngine::dispatch`.
pub type EventSender = Sender<MediaEvent>;

/// A playback device owned exclusively by the engine.
pub trait MediaBackend {
    /// Load `locator` as the single active resource, paused at position 0.
    /// The engine always calls `release` first.
    fn bind(&mut self, resource: ResourceId, locator: &str, volume: f32) -> Result<(), MediaError>;

    /// Stop and drop the active resource, if any. Must be safe to call
    /// repeatedly and with nothing bound.
    fn release(&mut self);

    /// Start or resume the active resource.
    fn start(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    fn seek(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f32);

    /// Give polling devices a chance to emit progress/completion events.
    fn tick(&mut self) {}
}
