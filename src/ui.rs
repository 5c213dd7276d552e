//! UI rendering helpers for the terminal user interface.
//!
//! Everything drawn here comes from `App`, which in turn only mirrors the
//! engine's published `PlayerSnapshot`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Pane};
use crate::config::PlaybackSettings;
use crate::engine::PlayerSnapshot;
use crate::library::Track;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("tab", "switch pane");
    map.insert("enter", "play selected");
    map.insert("space", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L and +/- are filled from config.
    map.insert("a", "add to queue");
    map.insert("d", "remove from queue");
    map.insert("c", "clear queue");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("e", "expand");
    map.insert("f", "follow");
    map.insert("q", "quit");
    map
});

/// Render the controls help text with the configured step sizes.
fn controls_text(settings: &PlaybackSettings) -> String {
    let order = [
        "j/k", "gg/G", "tab", "enter", "space", "h/l", "H/L", "+/-", "a", "d", "c", "s", "r",
        "e", "f", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "H/L" => Some(format!("[H/L] seek -/+{}s", settings.seek_step_secs)),
            "+/-" => Some(format!(
                "[+/-] volume {}%",
                (settings.volume_step * 100.0).round()
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `MM:SS`.
fn format_mmss(secs: f64) -> String {
    let secs = secs.max(0.0) as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Window of `total` rows that keeps `selected` roughly centred in `height`.
///
/// Returns `(start, end, selected_pos_in_window)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Height of the now-playing block for the current player mode.
fn now_playing_height(snap: Option<&PlayerSnapshot>) -> u16 {
    match snap.map(|s| s.player_mode) {
        Some(mode) if !mode.is_visible => 3,
        Some(mode) if mode.is_expanded => 8,
        _ => 5,
    }
}

fn track_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    tracks: &[Track],
    selected: usize,
    focused: bool,
    playing: Option<usize>,
) {
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, pos) = visible_window(tracks.len(), height, selected);

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let item = ListItem::new(track.display());
            if playing == Some(start + offset) {
                item.bold()
            } else {
                item
            }
        })
        .collect();

    let border_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && !tracks.is_empty() {
        state.select(Some(pos));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_flags(snap: &PlayerSnapshot) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(if snap.is_playing { "Playing" } else { "Paused" }.to_string());
    if snap.is_buffering {
        parts.push("Buffering".to_string());
    }
    parts.push(format!("Shuffle: {}", if snap.is_shuffled { "ON" } else { "OFF" }));
    parts.push(format!("Repeat: {}", if snap.is_repeating { "ON" } else { "OFF" }));
    parts.push(format!("Vol: {:.0}%", snap.volume * 100.0));
    parts.join(" • ")
}

fn draw_now_playing(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::bordered()
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
        .title(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(snap) = app.snapshot.as_ref() else {
        frame.render_widget(Paragraph::new("Stopped"), inner);
        return;
    };
    let Some(track) = snap.current_track.as_ref().filter(|_| snap.player_mode.is_visible) else {
        let text = app.message.as_deref().unwrap_or("Nothing queued");
        frame.render_widget(Paragraph::new(text), inner);
        return;
    };

    let mut lines: Vec<Line> = vec![Line::from(track.display()).bold()];
    if snap.player_mode.is_expanded {
        lines.push(Line::from(format!(
            "Queue: {}/{}{}",
            snap.queue_index + 1,
            snap.queue.len(),
            snap.context_id
                .as_deref()
                .map(|c| format!(" • from {c}"))
                .unwrap_or_default()
        )));
        if let Some(thumb) = track.thumbnail.as_deref() {
            lines.push(Line::from(format!("Art: {thumb}")));
        }
    }
    lines.push(Line::from(status_flags(snap)));
    if let Some(msg) = app.message.as_deref() {
        lines.push(Line::from(msg.to_string()).italic());
    }

    let text_height = lines.len() as u16;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(text_height), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[0]);

    if rows[1].height > 0 {
        // Fall back to the tagged length until the device reports one.
        let total = if snap.duration > 0.0 {
            snap.duration
        } else {
            track.duration.map_or(0.0, |d| d.as_secs_f64())
        };
        let ratio = if total > 0.0 {
            (snap.current_time / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let gauge = Gauge::default().ratio(ratio).label(format!(
            "{} / {}",
            format_mmss(snap.current_time),
            format_mmss(total)
        ));
        frame.render_widget(gauge, Rect { height: 1, ..rows[1] });
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, settings: &PlaybackSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(now_playing_height(app.snapshot.as_ref())),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let source = app
        .snapshot
        .as_ref()
        .and_then(|s| s.context_id.as_deref())
        .map(|c| format!("playlist: {c}"))
        .unwrap_or_else(|| format!("library: {} tracks", app.library.len()));
    let header = Paragraph::new(source).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" encore ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Library | queue
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let playing_id = app
        .snapshot
        .as_ref()
        .and_then(|s| s.current_track.as_ref())
        .map(|t| t.id.as_str());
    let library_playing = playing_id.and_then(|id| app.library.iter().position(|t| t.id == id));
    track_list(
        frame,
        panes[0],
        " library ".to_string(),
        &app.library,
        app.library_selected,
        app.focus == Pane::Library,
        library_playing,
    );

    let queue = app.queue();
    let follow = if app.follow_playback { "follow" } else { "free" };
    track_list(
        frame,
        panes[1],
        format!(" queue ({}) [{}] ", queue.len(), follow),
        queue,
        app.queue_selected,
        app.focus == Pane::Queue,
        app.playing_index(),
    );

    draw_now_playing(frame, chunks[2], app);

    let footer = Paragraph::new(controls_text(settings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}
