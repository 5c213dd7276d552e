use std::path::PathBuf;

use super::*;
use crate::error::SourceError;

fn entry(id: &str, title: &str) -> LibraryEntry {
    LibraryEntry {
        track: Track::new(id, title),
        path: PathBuf::from("/music").join(id),
    }
}

fn source() -> LibrarySource {
    LibrarySource::from_entries(
        PathBuf::from("/music"),
        vec![
            entry("loose.mp3", "Loose"),
            entry("rock/a.mp3", "A"),
            entry("rock/live/b.mp3", "B"),
            entry("jazz/c.mp3", "C"),
        ],
    )
}

#[test]
fn display_prefers_artist_dash_title() {
    let mut t = Track::new("x", "Song");
    assert_eq!(t.display(), "Song");
    t.artist = Some("  Artist  ".into());
    assert_eq!(t.display(), "Artist - Song");
    t.artist = Some("   ".into());
    assert_eq!(t.display(), "Song");
}

#[test]
fn same_track_compares_identity_only() {
    let a = Track::new("id-1", "One");
    let mut b = a.clone();
    b.stream_url = Some("https://cdn/one?sig=abc".into());
    assert!(a.same_track(&b));
    assert!(!a.same_track(&Track::new("id-2", "One")));
}

#[test]
fn list_tracks_returns_every_entry_in_order() {
    let ids: Vec<String> = source()
        .list_tracks()
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec!["loose.mp3", "rock/a.mp3", "rock/live/b.mp3", "jazz/c.mp3"]);
}

#[test]
fn playlist_is_a_directory_including_nested_tracks() {
    let ctx = source().list_playlist_tracks("rock").unwrap();
    assert_eq!(ctx.id, "rock");
    assert_eq!(ctx.name, "rock");
    let ids: Vec<&str> = ctx.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["rock/a.mp3", "rock/live/b.mp3"]);

    let nested = source().list_playlist_tracks("rock/live/").unwrap();
    assert_eq!(nested.name, "live");
    assert_eq!(nested.tracks.len(), 1);
}

#[test]
fn unknown_or_empty_playlist_is_not_found() {
    assert!(matches!(
        source().list_playlist_tracks("metal"),
        Err(SourceError::PlaylistNotFound(_))
    ));
    assert!(matches!(
        source().list_playlist_tracks(""),
        Err(SourceError::PlaylistNotFound(_))
    ));
}

#[test]
fn resolve_prefers_existing_locator_then_file_path() {
    let src = source();
    let mut t = Track::new("jazz/c.mp3", "C");
    assert_eq!(
        src.resolve_streaming_url(&t).unwrap(),
        format!("file://{}", PathBuf::from("/music/jazz/c.mp3").display())
    );

    t.stream_url = Some("https://cdn/c".into());
    assert_eq!(src.resolve_streaming_url(&t).unwrap(), "https://cdn/c");

    let missing = Track::new("nowhere.mp3", "?");
    assert!(matches!(
        src.resolve_streaming_url(&missing),
        Err(SourceError::NoLocator(_))
    ));
}
