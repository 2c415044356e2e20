//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Tabs, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, InputMode, NameTarget, Screen, Scrub};
use crate::config::ControlsSettings;
use crate::library::Track;
use crate::player::{Phase, PlayerState};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("tab", "screens");
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play/open");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("a", "add to queue");
    map.insert("d", "remove");
    map.insert("/", "filter");
    map.insert("n/N", "new playlist/save queue");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "tab", "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "m", "a", "d", "/", "n/N", "gg/G",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn transport_text(player: &PlayerState) -> &'static str {
    match player.phase {
        _ if player.is_audible() => "Playing",
        Phase::Loading => "Loading",
        Phase::Ready => "Paused",
        Phase::Ended => "Ended",
        Phase::Idle if player.current_track.is_some() && player.is_playing => "Not playable",
        Phase::Idle => "Stopped",
    }
}

fn volume_text(player: &PlayerState) -> String {
    if player.is_muted() {
        "Muted".to_string()
    } else {
        format!("Vol: {:.0}%", player.volume * 100.0)
    }
}

/// Build the status line: transport, song with time, volume, filter, message.
fn status_text(app: &App, player: &PlayerState, scrub: &Scrub) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" {}", transport_text(player)));

    if let Some(track) = &player.current_track {
        let elapsed = scrub.display(player.current_time);
        let time = if player.duration.is_zero() {
            format_mmss(elapsed)
        } else {
            format!("{} / {}", format_mmss(elapsed), format_mmss(player.duration))
        };
        let marker = if scrub.is_active() { " (seeking)" } else { "" };
        parts.push(format!("Song: {} [{}]{}", track.display(), time, marker));
    }

    parts.push(volume_text(player));
    parts.push(format!("Queue: {}", player.playlist.len()));

    let q = app.filter_query.trim();
    if app.input == InputMode::Filter || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Visible `[start, end)` window keeping `selected` centered when possible,
/// plus the selected row's offset inside it.
fn list_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected.min(total.saturating_sub(1)));
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn track_row(track: &Track, current_id: Option<&str>) -> String {
    let marker = if current_id == Some(track.id.as_str()) {
        "♪ "
    } else {
        "  "
    };
    let suffix = if track.is_playable() { "" } else { " (no link)" };
    format!("{}{}{}", marker, track.display(), suffix)
}

/// Rows and block title for the current screen.
fn screen_rows(app: &App, player: &PlayerState) -> (String, Vec<String>) {
    let current = player.current_id();
    match app.screen {
        Screen::Home => (
            " recently played ".to_string(),
            app.home_tracks()
                .iter()
                .map(|t| track_row(t, current))
                .collect(),
        ),
        Screen::Library => {
            let title = if app.authenticated {
                format!(" library ({}) ", app.catalog_name)
            } else {
                format!(" library ({}, not signed in) ", app.catalog_name)
            };
            let rows = app
                .visible_library()
                .into_iter()
                .map(|i| track_row(&app.library[i], current))
                .collect();
            (title, rows)
        }
        Screen::Queue => (
            " queue ".to_string(),
            player
                .playlist
                .iter()
                .map(|t| track_row(t, current))
                .collect(),
        ),
        Screen::Playlists => match app.current_playlist() {
            Some(p) => (
                format!(" playlist: {} (esc closes) ", p.name),
                p.tracks.iter().map(|t| track_row(t, current)).collect(),
            ),
            None => (
                " playlists ".to_string(),
                app.playlists
                    .all()
                    .iter()
                    .map(|p| format!("  {} ({} tracks)", p.name, p.tracks.len()))
                    .collect(),
            ),
        },
        Screen::Settings => (" settings ".to_string(), Vec::new()),
    }
}

fn settings_text(app: &App, player: &PlayerState) -> String {
    let account = if app.authenticated {
        "signed in"
    } else {
        "not signed in"
    };
    format!(
        "Catalog: {}\nAccount: {}  [O] log out\nVolume: {}  [+/-] adjust  [m] mute\nRecently played: {} tracks\nPlaylists: {}",
        app.catalog_name,
        account,
        volume_text(player),
        app.recent.len(),
        app.playlists.len(),
    )
}

fn draw_list(frame: &mut Frame, area: Rect, title: String, rows: Vec<String>, selected: usize) {
    let total = rows.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let (start, end, selected_in_window) = list_window(total, list_height, selected);

    let items: Vec<ListItem> = rows
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(ListItem::new)
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_in_window));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_naming_popup(frame: &mut Frame, area: Rect, target: NameTarget, buffer: &str) {
    let popup_area = centered_rect_sized(60, 3, area);
    frame.render_widget(Clear, popup_area);

    let title = match target {
        NameTarget::NewPlaylist => " new playlist (enter saves, esc cancels) ",
        NameTarget::SaveQueue => " save queue as (enter saves, esc cancels) ",
    };
    let input = Paragraph::new(format!("{buffer}_")).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(input, popup_area);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    player: &PlayerState,
    scrub: &Scrub,
    header_text: &str,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header with screen tabs
    let tabs = Tabs::new(Screen::ALL.iter().map(|s| s.title()))
        .select(app.screen.index())
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(header_text)
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(tabs, chunks[0]);

    let status = status_text(app, player, scrub);
    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    let status_par = if player.is_loading() {
        status_par.slow_blink()
    } else {
        status_par
    };
    frame.render_widget(status_par, chunks[1]);

    if app.screen == Screen::Settings {
        let body = Paragraph::new(settings_text(app, player))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" settings ")
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    }),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(body, chunks[2]);
    } else {
        let (title, rows) = screen_rows(app, player);
        draw_list(frame, chunks[2], title, rows, app.selected());
    }

    if let InputMode::Naming(target) = app.input {
        draw_naming_popup(frame, chunks[2], target, &app.name_buffer);
    }

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
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
