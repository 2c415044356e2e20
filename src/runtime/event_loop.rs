use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode, NameTarget, Screen, Scrub};
use crate::audio::{AudioEvent, AudioOutput};
use crate::ui;

use super::{Session, actions};

pub type Tui = Terminal<CrosstermBackend<std::io::Stdout>>;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Scrub gesture shadowing the coordinator's position.
    pub scrub: Scrub,
    /// Track the scrub gesture belongs to.
    scrub_track: Option<String>,
}

impl EventLoopState {
    pub fn new(scrub_commit: Duration) -> Self {
        Self {
            pending_gg: false,
            scrub: Scrub::new(scrub_commit),
            scrub_track: None,
        }
    }
}

/// Main terminal event loop: applies audio events, commits scrubs, draws
/// and handles input. Returns `Ok(())` when shutdown is requested.
pub fn run<O: AudioOutput>(
    terminal: &mut Tui,
    app: &mut App,
    session: &mut Session<O>,
    events: &Receiver<AudioEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    app.set_status("Loading library...");
    draw(terminal, app, session, state)?;
    actions::refresh_library(app, session);

    loop {
        session.player.drain_events(events);

        // A scrub never carries over to another track.
        if state.scrub.is_active()
            && state.scrub_track.as_deref() != session.player.state().current_id()
        {
            state.scrub.cancel();
        }
        if let Some(position) = state.scrub.poll_commit(Instant::now()) {
            session.player.seek_to_position(position);
        }

        draw(terminal, app, session, state)?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, session, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn draw<O: AudioOutput>(
    terminal: &mut Tui,
    app: &App,
    session: &Session<O>,
    state: &EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    terminal.draw(|f| {
        ui::draw(
            f,
            app,
            session.player.state(),
            &state.scrub,
            &session.settings.ui.header_text,
            &session.settings.controls,
        )
    })?;
    Ok(())
}

/// Handle one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event<O: AudioOutput>(
    key: KeyEvent,
    app: &mut App,
    session: &mut Session<O>,
    state: &mut EventLoopState,
) -> bool {
    match app.input {
        InputMode::Filter => {
            state.pending_gg = false;
            handle_filter_key(key, app, session);
            return false;
        }
        InputMode::Naming(_) => {
            state.pending_gg = false;
            match key.code {
                KeyCode::Esc => app.cancel_naming(),
                KeyCode::Backspace => app.pop_name_char(),
                KeyCode::Enter => actions::finish_naming(app, session),
                KeyCode::Char(c) if !c.is_control() => app.push_name_char(c),
                _ => {}
            }
            return false;
        }
        InputMode::Normal => {}
    }

    let rows = app.rows(&session.player.state().playlist);
    let controls = &session.settings.controls;
    let scrub_secs = controls.scrub_seconds.min(i64::MAX as u64) as i64;
    let volume_step = controls.volume_step;

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.next_screen(),
        KeyCode::BackTab => app.prev_screen(),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.switch_to(Screen::ALL[idx]);
        }
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Esc => {
            if app.screen == Screen::Playlists && app.open_playlist.is_some() {
                app.close_playlist();
            } else if !app.filter_query.is_empty() {
                app.clear_filter();
            } else {
                app.clear_status();
            }
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.select_last(rows),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(rows),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(rows),
        KeyCode::Enter => actions::activate(app, session),
        KeyCode::Char('p') | KeyCode::Char(' ') => session.player.toggle_play_pause(),
        KeyCode::Char('l') => session.player.next_track(),
        KeyCode::Char('h') => session.player.prev_track(),
        KeyCode::Char('L') => scrub(session, state, scrub_secs),
        KeyCode::Char('H') => scrub(session, state, -scrub_secs),
        KeyCode::Char('+') | KeyCode::Char('=') => actions::change_volume(session, volume_step),
        KeyCode::Char('-') => actions::change_volume(session, -volume_step),
        KeyCode::Char('m') => session.player.toggle_mute(),
        KeyCode::Char('a') => actions::enqueue_selected(app, session),
        KeyCode::Char('A') => actions::add_selected_to_open_playlist(app, session),
        KeyCode::Char('d') | KeyCode::Delete => actions::remove_selected(app, session),
        KeyCode::Char('P') => actions::play_playlist(app, session),
        KeyCode::Char('n') => app.begin_naming(NameTarget::NewPlaylist),
        KeyCode::Char('N') => app.begin_naming(NameTarget::SaveQueue),
        KeyCode::Char('r') => actions::refresh_library(app, session),
        KeyCode::Char('O') if app.screen == Screen::Settings => actions::logout(app, session),
        _ => {}
    }

    false
}

fn handle_filter_key<O: AudioOutput>(key: KeyEvent, app: &mut App, session: &mut Session<O>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('j') | KeyCode::Char('n') if ctrl => {
            app.select_next(app.visible_library().len());
        }
        KeyCode::Char('k') | KeyCode::Char('p') if ctrl => {
            app.select_prev(app.visible_library().len());
        }
        KeyCode::Down => app.select_next(app.visible_library().len()),
        KeyCode::Up => app.select_prev(app.visible_library().len()),
        KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
        KeyCode::Enter => {
            if app.visible_library().is_empty() {
                return;
            }
            app.exit_filter_mode();
            actions::activate(app, session);
        }
        _ => {}
    }
}

fn scrub<O: AudioOutput>(session: &Session<O>, state: &mut EventLoopState, delta_secs: i64) {
    let player = session.player.state();
    let Some(id) = player.current_id() else {
        return;
    };
    if state.scrub_track.as_deref() != Some(id) {
        state.scrub.cancel();
        state.scrub_track = Some(id.to_string());
    }
    state
        .scrub
        .adjust(player.current_time, player.duration, delta_secs, Instant::now());
}
