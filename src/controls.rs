//! High-level "play this track" control shared by every front end.

use tracing::{debug, warn};

use crate::engine::PlaybackEngine;
use crate::error::ControlError;
use crate::library::{PlaybackContext, Track, TrackSource};

/// Play `track_id`, preferably from within `playlist_id`.
///
/// Selecting the track that is already current toggles play/pause instead of
/// restarting it. When the playlist cannot be fetched or does not contain the
/// track, the whole library becomes the queue.
pub fn play_track(
    engine: &mut PlaybackEngine,
    source: &dyn TrackSource,
    track_id: &str,
    playlist_id: Option<&str>,
) -> Result<(), ControlError> {
    if let Some(playlist_id) = playlist_id {
        match source.list_playlist_tracks(playlist_id) {
            Ok(ctx) => {
                if let Some(index) = position(&ctx.tracks, track_id) {
                    let tracks = ctx.tracks.clone();
                    start_at(engine, tracks, index, Some(ctx));
                    return Ok(());
                }
                debug!(track = track_id, playlist = playlist_id, "track not in playlist, using library");
            }
            Err(e) => {
                warn!(playlist = playlist_id, error = %e, "could not load playlist, using library");
            }
        }
    }

    let tracks = source.list_tracks()?;
    let Some(index) = position(&tracks, track_id) else {
        return Err(ControlError::UnknownTrack(track_id.to_string()));
    };
    start_at(engine, tracks, index, None);
    Ok(())
}

fn position(tracks: &[Track], track_id: &str) -> Option<usize> {
    tracks.iter().position(|t| t.id == track_id)
}

fn start_at(
    engine: &mut PlaybackEngine,
    tracks: Vec<Track>,
    index: usize,
    context: Option<PlaybackContext>,
) {
    let already_current = engine
        .current_track()
        .is_some_and(|cur| cur.same_track(&tracks[index]));
    if already_current {
        engine.play_pause();
        return;
    }
    engine.initialize(tracks, index, context);
    engine.play();
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::{EngineSettings, MediaBackend, MemoryPreferencesStore, ResourceId};
    use crate::error::{MediaError, SourceError};

    #[derive(Default)]
    struct NullMedia;

    impl MediaBackend for NullMedia {
        fn bind(&mut self, _: ResourceId, _: &str, _: f32) -> Result<(), MediaError> {
            Ok(())
        }
        fn release(&mut self) {}
        fn start(&mut self) -> Result<(), MediaError> {
            Ok(())
        }
        fn pause(&mut self) {}
        fn seek(&mut self, _: f64) {}
        fn set_volume(&mut self, _: f32) {}
    }

    struct Catalog {
        library: Vec<Track>,
        playlist: PlaybackContext,
        library_calls: RefCell<usize>,
    }

    impl TrackSource for Catalog {
        fn list_tracks(&self) -> Result<Vec<Track>, SourceError> {
            *self.library_calls.borrow_mut() += 1;
            Ok(self.library.clone())
        }

        fn list_playlist_tracks(&self, playlist_id: &str) -> Result<PlaybackContext, SourceError> {
            if playlist_id == self.playlist.id {
                Ok(self.playlist.clone())
            } else {
                Err(SourceError::PlaylistNotFound(playlist_id.to_string()))
            }
        }

        fn resolve_streaming_url(&self, track: &Track) -> Result<String, SourceError> {
            Ok(format!("mem://{}", track.id))
        }
    }

    fn t(id: &str) -> Track {
        Track::new(id, id)
    }

    fn setup() -> (PlaybackEngine, Rc<Catalog>) {
        let catalog = Rc::new(Catalog {
            library: vec![t("a"), t("b"), t("c"), t("d")],
            playlist: PlaybackContext {
                id: "faves".into(),
                name: "Faves".into(),
                tracks: vec![t("d"), t("b")],
            },
            library_calls: RefCell::new(0),
        });
        let engine = PlaybackEngine::new(
            Box::new(NullMedia),
            catalog.clone(),
            Box::new(MemoryPreferencesStore::default()),
            EngineSettings::default(),
        );
        (engine, catalog)
    }

    fn queue_ids(engine: &PlaybackEngine) -> Vec<&str> {
        engine.queue().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn plays_from_playlist_with_context() {
        let (mut engine, catalog) = setup();
        play_track(&mut engine, catalog.as_ref(), "b", Some("faves")).unwrap();

        assert_eq!(queue_ids(&engine), vec!["d", "b"]);
        assert_eq!(engine.queue_index(), 1);
        assert_eq!(engine.context().map(|c| c.id.as_str()), Some("faves"));
        assert!(engine.is_playing());
        assert_eq!(*catalog.library_calls.borrow(), 0);
    }

    #[test]
    fn falls_back_to_library_when_track_not_in_playlist() {
        let (mut engine, catalog) = setup();
        play_track(&mut engine, catalog.as_ref(), "c", Some("faves")).unwrap();

        assert_eq!(queue_ids(&engine), vec!["a", "b", "c", "d"]);
        assert_eq!(engine.queue_index(), 2);
        assert!(engine.context().is_none());
        assert!(engine.is_playing());
    }

    #[test]
    fn falls_back_to_library_when_playlist_is_missing() {
        let (mut engine, catalog) = setup();
        play_track(&mut engine, catalog.as_ref(), "a", Some("nope")).unwrap();
        assert_eq!(engine.current_track().map(|t| t.id.as_str()), Some("a"));
        assert_eq!(*catalog.library_calls.borrow(), 1);
    }

    #[test]
    fn selecting_current_track_toggles_instead_of_restarting() {
        let (mut engine, catalog) = setup();
        play_track(&mut engine, catalog.as_ref(), "b", None).unwrap();
        let resource = engine.bound_resource();

        play_track(&mut engine, catalog.as_ref(), "b", None).unwrap();
        assert!(!engine.is_playing());
        assert_eq!(engine.bound_resource(), resource);

        play_track(&mut engine, catalog.as_ref(), "b", None).unwrap();
        assert!(engine.is_playing());
    }

    #[test]
    fn unknown_track_is_an_error() {
        let (mut engine, catalog) = setup();
        let err = play_track(&mut engine, catalog.as_ref(), "zzz", None).unwrap_err();
        assert!(matches!(err, ControlError::UnknownTrack(ref id) if id == "zzz"));
        assert!(engine.queue().is_empty());
    }
}
