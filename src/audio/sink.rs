//! Utilities for turning locators into paused `rodio` sinks.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::MediaError;

/// Map a locator to a local path. Accepts `file://` URLs and bare paths;
/// anything with another scheme is refused.
pub(super) fn locator_path(locator: &str) -> Result<PathBuf, MediaError> {
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if let Some((scheme, _)) = locator.split_once("://") {
        return Err(MediaError::Decode {
            locator: locator.to_string(),
            reason: format!("unsupported scheme `{scheme}`"),
        });
    }
    Ok(PathBuf::from(locator))
}

/// Create a paused `Sink` for `path` positioned at `start_at`, along with the
/// total duration when the decoder knows it.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let locator = path.display().to_string();
    let file = File::open(path).map_err(|source| MediaError::Open {
        locator: locator.clone(),
        source,
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
        locator,
        reason: e.to_string(),
    })?;
    let duration = decoder.total_duration();
    // `skip_duration` is the seeking primitive; Duration::ZERO is a no-op.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok((sink, duration))
}
