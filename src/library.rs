//! Music library: the `Track` model, playlist contexts and the `TrackSource`
//! seam the playback engine consumes.
//!
//! `LibrarySource` is the concrete source used by the binary: it scans a
//! directory tree once and treats every sub-directory as a playlist.

mod model;
mod scan;
mod source;

pub use model::*;
pub use scan::{LibraryEntry, scan};
pub use source::{LibrarySource, TrackSource};

#[cfg(test)]
mod tests;
