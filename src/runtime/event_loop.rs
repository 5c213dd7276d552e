use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::{App, Pane};
use crate::config;
use crate::controls;
use crate::engine::{MediaEvent, PlaybackEngine, PlayerModeUpdate, PlayerSnapshot};
use crate::library::TrackSource;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Everything a key press may act on.
pub struct Context<'a> {
    pub settings: &'a config::Settings,
    pub app: &'a mut App,
    pub engine: &'a mut PlaybackEngine,
    pub source: &'a dyn TrackSource,
}

/// Main terminal event loop: feeds device events to the engine, mirrors its
/// snapshots into `app`, draws, and handles input. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    cx: &mut Context<'_>,
    media_events: &Receiver<MediaEvent>,
    snapshots: &Receiver<PlayerSnapshot>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        cx.engine.tick();
        while let Ok(ev) = media_events.try_recv() {
            cx.engine.dispatch(ev);
        }
        // Only the newest snapshot matters for drawing.
        if let Some(snap) = snapshots.try_iter().last() {
            cx.app.apply_snapshot(snap);
        }

        terminal.draw(|f| ui::draw(f, cx.app, &cx.settings.playback))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, cx, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// The directory-playlist a library track belongs to, if any.
fn playlist_of(track_id: &str) -> Option<&str> {
    track_id.rsplit_once('/').map(|(dir, _)| dir)
}

/// New position after moving `delta` seconds, kept inside the track.
fn seek_target(current: f64, duration: f64, delta: f64) -> f64 {
    let target = (current + delta).max(0.0);
    if duration > 0.0 {
        target.min(duration)
    } else {
        target
    }
}

fn play_selected(cx: &mut Context<'_>) {
    match cx.app.focus {
        Pane::Library => {
            let Some(track) = cx.app.selected_library_track() else {
                return;
            };
            let id = track.id.clone();
            cx.app.follow_playback_on();
            if let Err(e) = controls::play_track(cx.engine, cx.source, &id, playlist_of(&id)) {
                warn!(track = %id, error = %e, "could not play selection");
                cx.app.set_message(e.to_string());
            }
        }
        Pane::Queue => {
            if let Some(index) = cx.app.selected_queue_index() {
                cx.app.follow_playback_on();
                cx.engine.play_queue_item(index);
            }
        }
    }
}

/// Handle one key press. Returns `true` when the app should quit.
pub fn handle_key_event(key: KeyEvent, cx: &mut Context<'_>, state: &mut EventLoopState) -> bool {
    let pending_gg = std::mem::take(&mut state.pending_gg);
    cx.app.clear_message();

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => cx.app.toggle_focus(),
        KeyCode::Char('g') => {
            if pending_gg {
                cx.app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => cx.app.select_last(),
        KeyCode::Char('j') | KeyCode::Down => cx.app.next(),
        KeyCode::Char('k') | KeyCode::Up => cx.app.prev(),
        KeyCode::Char('f') => cx.app.follow_playback_on(),
        KeyCode::Enter => play_selected(cx),
        KeyCode::Char(' ') | KeyCode::Char('p') => cx.engine.play_pause(),
        KeyCode::Char('l') => cx.engine.next_song(),
        KeyCode::Char('h') => cx.engine.previous_song(),
        KeyCode::Char('L') | KeyCode::Char('H') => {
            let step = cx.settings.playback.seek_step_secs as f64;
            let delta = if key.code == KeyCode::Char('L') { step } else { -step };
            let session = cx.engine.session();
            let target = seek_target(session.current_time, session.duration, delta);
            cx.engine.seek(target);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = cx.engine.preferences().volume + cx.settings.playback.volume_step;
            cx.engine.set_volume(v);
        }
        KeyCode::Char('-') => {
            let v = cx.engine.preferences().volume - cx.settings.playback.volume_step;
            cx.engine.set_volume(v);
        }
        KeyCode::Char('s') => {
            if let Err(e) = cx.engine.toggle_shuffle() {
                cx.app.set_message(e.to_string());
            }
        }
        KeyCode::Char('r') => cx.engine.toggle_repeat(),
        KeyCode::Char('a') => {
            if cx.app.focus == Pane::Library {
                if let Some(track) = cx.app.selected_library_track().cloned() {
                    debug!(track = %track.id, "queueing selection");
                    cx.engine.add_to_queue(track);
                }
            }
        }
        KeyCode::Char('d') => {
            if cx.app.focus == Pane::Queue {
                if let Some(index) = cx.app.selected_queue_index() {
                    cx.engine.remove_from_queue(index);
                }
            }
        }
        KeyCode::Char('c') => cx.engine.clear_queue(),
        KeyCode::Char('e') => {
            let expanded = cx.engine.preferences().player_mode.is_expanded;
            cx.engine.set_player_mode(PlayerModeUpdate {
                is_expanded: Some(!expanded),
                ..Default::default()
            });
        }
        _ => {}
    }

    false
}
