//! Application model types: `App`, `Screen` and `InputMode`.
//!
//! The `App` struct holds the library listing, the persisted collections
//! and per-screen cursors used by the UI and runtime.

use crate::library::{Playlist, Track};
use crate::store::{RecentlyPlayed, SavedPlaylist, UserPlaylists};

const SCREEN_COUNT: usize = 5;

/// Top-level screens, in tab order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Library,
    Queue,
    Playlists,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; SCREEN_COUNT] = [
        Screen::Home,
        Screen::Library,
        Screen::Queue,
        Screen::Playlists,
        Screen::Settings,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Library => "Library",
            Screen::Queue => "Queue",
            Screen::Playlists => "Playlists",
            Screen::Settings => "Settings",
        }
    }
}

/// What a typed name is for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameTarget {
    NewPlaylist,
    SaveQueue,
}

/// How key presses are interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the library filter.
    Filter,
    /// Typing a playlist name.
    Naming(NameTarget),
}

/// The main application model.
pub struct App {
    pub screen: Screen,
    pub library: Vec<Track>,
    pub recent: RecentlyPlayed,
    pub playlists: UserPlaylists,
    /// Playlist whose tracks the Playlists screen is showing.
    pub open_playlist: Option<String>,
    pub input: InputMode,
    pub filter_query: String,
    pub name_buffer: String,
    pub status: Option<String>,
    pub authenticated: bool,
    pub catalog_name: &'static str,
    pub home_recent_count: usize,
    cursors: [usize; SCREEN_COUNT],
    playlist_cursor: usize,
}

impl App {
    pub fn new(recent: RecentlyPlayed, playlists: UserPlaylists) -> Self {
        Self {
            screen: Screen::Home,
            library: Vec::new(),
            recent,
            playlists,
            open_playlist: None,
            input: InputMode::Normal,
            filter_query: String::new(),
            name_buffer: String::new(),
            status: None,
            authenticated: false,
            catalog_name: "",
            home_recent_count: 10,
            cursors: [0; SCREEN_COUNT],
            playlist_cursor: 0,
        }
    }

    /// Replace the library listing and reset its cursor.
    pub fn set_library(&mut self, tracks: Vec<Track>) {
        self.library = tracks;
        self.cursors[Screen::Library.index()] = 0;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn switch_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.input = InputMode::Normal;
    }

    pub fn next_screen(&mut self) {
        self.switch_to(self.screen.next());
    }

    pub fn prev_screen(&mut self) {
        self.switch_to(self.screen.prev());
    }

    /// Library indices passing the filter, in listing order.
    pub fn visible_library(&self) -> Vec<usize> {
        self.library
            .iter()
            .enumerate()
            .filter(|(_, t)| t.matches(&self.filter_query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Recently played tracks listed on the home screen.
    pub fn home_tracks(&self) -> &[Track] {
        let tracks = self.recent.tracks();
        &tracks[..tracks.len().min(self.home_recent_count)]
    }

    pub fn current_playlist(&self) -> Option<&SavedPlaylist> {
        self.open_playlist
            .as_deref()
            .and_then(|id| self.playlists.get(id))
    }

    /// Number of rows the current screen lists.
    pub fn rows(&self, queue: &Playlist) -> usize {
        match self.screen {
            Screen::Home => self.home_tracks().len(),
            Screen::Library => self.visible_library().len(),
            Screen::Queue => queue.len(),
            Screen::Playlists => match self.current_playlist() {
                Some(p) => p.tracks.len(),
                None => self.playlists.len(),
            },
            Screen::Settings => 0,
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        if self.screen == Screen::Playlists && self.open_playlist.is_some() {
            &mut self.playlist_cursor
        } else {
            &mut self.cursors[self.screen.index()]
        }
    }

    /// Row selected on the current screen.
    pub fn selected(&self) -> usize {
        if self.screen == Screen::Playlists && self.open_playlist.is_some() {
            self.playlist_cursor
        } else {
            self.cursors[self.screen.index()]
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn select_next(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        *cursor = (*cursor + 1) % rows;
    }

    /// Move selection up, wrapping to the bottom.
    pub fn select_prev(&mut self, rows: usize) {
        if rows == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        *cursor = (*cursor + rows - 1) % rows;
    }

    pub fn select_first(&mut self) {
        *self.cursor_mut() = 0;
    }

    pub fn select_last(&mut self, rows: usize) {
        *self.cursor_mut() = rows.saturating_sub(1);
    }

    /// Pull the cursor back inside `rows` after the list shrank.
    pub fn clamp_selection(&mut self, rows: usize) {
        let cursor = self.cursor_mut();
        if *cursor >= rows {
            *cursor = rows.saturating_sub(1);
        }
    }

    /// The track under the cursor, on any screen that lists tracks.
    pub fn selected_track<'a>(&'a self, queue: &'a Playlist) -> Option<&'a Track> {
        let sel = self.selected();
        match self.screen {
            Screen::Home => self.home_tracks().get(sel),
            Screen::Library => self
                .visible_library()
                .get(sel)
                .and_then(|&i| self.library.get(i)),
            Screen::Queue => queue.get(sel),
            Screen::Playlists => self.current_playlist().and_then(|p| p.tracks.get(sel)),
            Screen::Settings => None,
        }
    }

    /// The playlist under the cursor while the playlists list is shown.
    pub fn selected_playlist(&self) -> Option<&SavedPlaylist> {
        if self.screen != Screen::Playlists || self.open_playlist.is_some() {
            return None;
        }
        self.playlists.all().get(self.selected())
    }

    /// Show the tracks of the selected playlist.
    pub fn open_selected_playlist(&mut self) -> bool {
        let Some(id) = self.selected_playlist().map(|p| p.id.clone()) else {
            return false;
        };
        self.open_playlist = Some(id);
        self.playlist_cursor = 0;
        true
    }

    pub fn close_playlist(&mut self) {
        self.open_playlist = None;
    }

    /// Enter filter mode on the library screen.
    pub fn enter_filter_mode(&mut self) {
        self.screen = Screen::Library;
        self.input = InputMode::Filter;
        self.ensure_selected_visible();
    }

    /// Stop typing; the query stays applied.
    pub fn exit_filter_mode(&mut self) {
        self.input = InputMode::Normal;
    }

    /// Clear the active filter and leave filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.input = InputMode::Normal;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    fn ensure_selected_visible(&mut self) {
        let visible = self.visible_library().len();
        let cursor = &mut self.cursors[Screen::Library.index()];
        if *cursor >= visible {
            *cursor = 0;
        }
    }

    pub fn begin_naming(&mut self, target: NameTarget) {
        self.name_buffer.clear();
        self.input = InputMode::Naming(target);
    }

    pub fn push_name_char(&mut self, c: char) {
        self.name_buffer.push(c);
    }

    pub fn pop_name_char(&mut self) {
        self.name_buffer.pop();
    }

    pub fn cancel_naming(&mut self) {
        self.name_buffer.clear();
        self.input = InputMode::Normal;
    }

    /// Finish naming and hand out what the name is for.
    pub fn take_name(&mut self) -> Option<(NameTarget, String)> {
        let InputMode::Naming(target) = self.input else {
            return None;
        };
        self.input = InputMode::Normal;
        Some((target, std::mem::take(&mut self.name_buffer)))
    }
}
