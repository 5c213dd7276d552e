use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::backend::{Playhead, seek_target};
use super::sink::locator_path;
use crate::error::MediaError;

#[test]
fn file_urls_map_to_local_paths() {
    assert_eq!(
        locator_path("file:///music/a/b.flac").unwrap(),
        PathBuf::from("/music/a/b.flac")
    );
}

#[test]
fn bare_paths_pass_through() {
    assert_eq!(
        locator_path("relative/song.mp3").unwrap(),
        PathBuf::from("relative/song.mp3")
    );
}

#[test]
fn remote_schemes_are_refused() {
    let err = locator_path("https://cdn.example/stream/abc").unwrap_err();
    assert!(matches!(err, MediaError::Decode { ref reason, .. } if reason.contains("https")));
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[test]
fn playhead_counts_only_while_running() {
    let t0 = Instant::now();
    let mut head = Playhead::default();
    assert!(head.is_paused());
    assert_eq!(head.position(t0 + secs(5.0)), Duration::ZERO);

    assert!(head.resume(t0));
    assert!(!head.resume(t0 + secs(1.0)));
    assert_eq!(head.position(t0 + secs(2.0)), secs(2.0));

    assert!(head.pause(t0 + secs(2.0)));
    assert!(!head.pause(t0 + secs(3.0)));
    assert_eq!(head.position(t0 + secs(10.0)), secs(2.0));
}

#[test]
fn drained_playhead_is_paused_and_restarts_from_zero() {
    let t0 = Instant::now();
    let mut head = Playhead::default();
    head.resume(t0);
    head.finish(t0 + secs(30.0));

    assert!(head.is_ended());
    assert!(head.is_paused());
    assert_eq!(head.report(t0 + secs(31.0)), None);

    // Starting again after the end reloads at zero and runs.
    let t1 = t0 + secs(40.0);
    head.jump(Duration::ZERO, t1);
    assert!(!head.is_ended());
    assert!(head.resume(t1));
    assert_eq!(head.position(t1 + secs(1.0)), secs(1.0));
}

#[test]
fn jump_keeps_run_state() {
    let t0 = Instant::now();
    let mut head = Playhead::default();
    head.jump(secs(12.0), t0);
    assert!(head.is_paused());
    assert_eq!(head.position(t0 + secs(3.0)), secs(12.0));

    head.resume(t0);
    head.jump(secs(50.0), t0 + secs(1.0));
    assert!(!head.is_paused());
    assert_eq!(head.position(t0 + secs(2.0)), secs(51.0));
}

#[test]
fn pausing_after_failed_seek_freezes_position() {
    let t0 = Instant::now();
    let mut head = Playhead::default();
    head.resume(t0);
    assert!(head.pause(t0 + secs(7.0)));
    assert!(head.is_paused());
    assert_eq!(head.report(t0 + secs(20.0)), None);
    assert_eq!(head.position(t0 + secs(20.0)), secs(7.0));
}

#[test]
fn report_is_rate_limited() {
    let t0 = Instant::now();
    let mut head = Playhead::default();
    head.resume(t0);
    assert_eq!(head.report(t0 + secs(0.1)), None);
    assert_eq!(head.report(t0 + secs(0.5)), Some(0.5));
    assert_eq!(head.report(t0 + secs(0.6)), None);
    assert_eq!(head.report(t0 + secs(1.0)), Some(1.0));
}

#[test]
fn seek_targets_clamp_low_and_refuse_huge() {
    assert_eq!(seek_target(-3.0), Ok(Duration::ZERO));
    assert_eq!(seek_target(90.0), Ok(secs(90.0)));
    assert!(seek_target(f64::INFINITY).is_err());
    assert!(seek_target(1e30).is_err());
}
