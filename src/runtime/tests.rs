use std::cell::RefCell;
use std::fs;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::{TempDir, tempdir};

use super::event_loop::{EventLoopState, handle_key_event};
use super::*;
use crate::app::{InputMode, Screen};
use crate::audio::{AudioCmd, AudioEvent};
use crate::catalog::{DropboxCatalog, LocalCatalog};
use crate::config::CatalogSettings;
use crate::store::{TOKEN_KEY, UserPlaylists};

#[derive(Default)]
struct FakeOutput {
    sent: RefCell<Vec<AudioCmd>>,
}

impl FakeOutput {
    fn loads(&self) -> usize {
        self.sent
            .borrow()
            .iter()
            .filter(|c| matches!(c, AudioCmd::Load { .. }))
            .count()
    }
}

impl AudioOutput for FakeOutput {
    fn send(&self, cmd: AudioCmd) {
        self.sent.borrow_mut().push(cmd);
    }
}

struct Fixture {
    _music: TempDir,
    _data: TempDir,
    session: Session<FakeOutput>,
    app: App,
    state: EventLoopState,
}

fn fixture() -> Fixture {
    let music = tempdir().unwrap();
    for name in ["Artist - One.mp3", "Two.mp3", "Three.flac", "notes.txt"] {
        fs::write(music.path().join(name), b"not real audio").unwrap();
    }
    let data = tempdir().unwrap();
    let store = LocalStore::open(data.path()).unwrap();

    let session = Session {
        settings: Settings::default(),
        store,
        catalog: Box::new(LocalCatalog::new(
            music.path(),
            vec!["mp3".into(), "flac".into()],
        )),
        player: Coordinator::new(FakeOutput::default(), 0.5),
    };
    let app = session.new_app();

    Fixture {
        _music: music,
        _data: data,
        session,
        app,
        state: EventLoopState::new(Duration::from_millis(500)),
    }
}

impl Fixture {
    fn key(&mut self, code: KeyCode) -> bool {
        handle_key_event(
            KeyEvent::new(code, KeyModifiers::NONE),
            &mut self.app,
            &mut self.session,
            &mut self.state,
        )
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    fn loaded(mut self) -> Self {
        actions::refresh_library(&mut self.app, &mut self.session);
        self
    }

    fn current(&self) -> Option<&str> {
        self.session.player.state().current_id()
    }
}

#[test]
fn refresh_lists_library_and_queues_it() {
    let f = fixture().loaded();

    let names: Vec<&str> = f.app.library.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["One", "Three", "Two"]);
    assert_eq!(f.session.player.state().playlist.len(), 3);
    assert_eq!(f.app.status.as_deref(), Some("Loaded 3 tracks"));
    assert!(f.app.authenticated);
}

#[test]
fn enter_in_library_plays_and_records_recent() {
    let mut f = fixture().loaded();
    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Char('j'));
    f.key(KeyCode::Enter);

    let expected = f.app.library[1].id.clone();
    assert_eq!(f.current(), Some(expected.as_str()));
    assert_eq!(f.session.player.output().loads(), 1);

    let stored = RecentlyPlayed::load(&f.session.store, 20);
    assert_eq!(stored.tracks()[0].id, expected);
    assert_eq!(f.app.home_tracks().len(), 1);
}

#[test]
fn enter_on_current_track_toggles_instead_of_reloading() {
    let mut f = fixture().loaded();
    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Enter);
    assert!(f.session.player.state().is_playing);

    f.key(KeyCode::Enter);

    assert!(!f.session.player.state().is_playing);
    assert_eq!(f.session.player.output().loads(), 1);
}

#[test]
fn transport_keys_drive_the_coordinator() {
    let mut f = fixture().loaded();
    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Enter);
    let first = f.current().map(str::to_string);

    f.key(KeyCode::Char('l'));
    assert_ne!(f.current().map(str::to_string), first);
    f.key(KeyCode::Char('h'));
    assert_eq!(f.current().map(str::to_string), first);

    f.key(KeyCode::Char('+'));
    assert!((f.session.player.state().volume - 0.55).abs() < 1e-6);
    f.key(KeyCode::Char('m'));
    assert!(f.session.player.state().is_muted());
    f.key(KeyCode::Char('m'));
    assert!((f.session.player.state().volume - 0.55).abs() < 1e-6);
}

#[test]
fn scrub_keys_move_shadow_and_commit_once() {
    let mut f = fixture().loaded();
    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Enter);
    let generation = f.session.player.generation();
    f.session.player.handle_event(AudioEvent::MetadataLoaded {
        generation,
        duration: Duration::from_secs(120),
    });

    f.key(KeyCode::Char('L'));
    f.key(KeyCode::Char('L'));
    assert_eq!(f.state.scrub.display(Duration::ZERO), Duration::from_secs(10));
    assert_eq!(f.session.player.state().current_time, Duration::ZERO);

    let later = Instant::now() + Duration::from_secs(1);
    let position = f.state.scrub.poll_commit(later).unwrap();
    f.session.player.seek_to_position(position);

    assert_eq!(f.session.player.state().current_time, Duration::from_secs(10));
    let seeks = f
        .session
        .player
        .output()
        .sent
        .borrow()
        .iter()
        .filter(|c| matches!(c, AudioCmd::Seek { .. }))
        .count();
    assert_eq!(seeks, 1);
}

#[test]
fn filter_keys_narrow_the_library() {
    let mut f = fixture().loaded();
    f.key(KeyCode::Char('/'));
    assert_eq!(f.app.screen, Screen::Library);
    assert_eq!(f.app.input, InputMode::Filter);

    f.type_text("tw");
    assert_eq!(f.app.visible_library().len(), 1);

    f.key(KeyCode::Enter);
    assert_eq!(f.app.input, InputMode::Normal);
    assert_eq!(
        f.session.player.state().current_track.as_ref().map(|t| t.name.as_str()),
        Some("Two")
    );
}

#[test]
fn enqueue_reports_duplicates() {
    let mut f = fixture().loaded();
    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Char('a'));
    assert!(f.app.status.as_deref().unwrap().contains("already queued"));

    f.session.player.set_playlist(Vec::new());
    f.key(KeyCode::Char('a'));
    assert_eq!(f.session.player.state().playlist.len(), 1);
}

#[test]
fn queue_can_be_saved_as_playlist() {
    let mut f = fixture().loaded();
    f.key(KeyCode::Char('N'));
    f.type_text("Mix");
    f.key(KeyCode::Enter);

    assert_eq!(f.app.playlists.len(), 1);
    let saved = UserPlaylists::load(&f.session.store);
    assert_eq!(saved.all()[0].name, "Mix");
    assert_eq!(saved.all()[0].tracks.len(), 3);
}

#[test]
fn saving_empty_queue_is_ignored() {
    let mut f = fixture();
    f.key(KeyCode::Char('N'));
    f.type_text("Nothing");
    f.key(KeyCode::Enter);

    assert!(f.app.playlists.is_empty());
    assert_eq!(f.app.status.as_deref(), Some("Queue is empty"));
}

#[test]
fn playlist_lifecycle_through_keys() {
    let mut f = fixture().loaded();

    f.app.switch_to(Screen::Playlists);
    f.key(KeyCode::Char('n'));
    f.type_text("  Favourites ");
    f.key(KeyCode::Enter);
    assert_eq!(f.app.playlists.all()[0].name, "Favourites");

    f.key(KeyCode::Enter);
    assert!(f.app.open_playlist.is_some());

    f.app.switch_to(Screen::Library);
    f.key(KeyCode::Char('A'));
    f.key(KeyCode::Char('A'));
    f.key(KeyCode::Char('j'));
    f.key(KeyCode::Char('A'));
    assert_eq!(f.app.playlists.all()[0].tracks.len(), 2);

    f.app.switch_to(Screen::Playlists);
    f.key(KeyCode::Char('P'));
    assert_eq!(f.session.player.state().playlist.len(), 2);
    assert_eq!(f.current(), Some(f.app.library[0].id.as_str()));

    f.key(KeyCode::Char('d'));
    assert_eq!(f.app.playlists.all()[0].tracks.len(), 1);

    f.key(KeyCode::Esc);
    assert!(f.app.open_playlist.is_none());
    f.key(KeyCode::Char('d'));
    assert!(f.app.playlists.is_empty());
    assert!(UserPlaylists::load(&f.session.store).is_empty());
}

#[test]
fn unauthenticated_catalog_reports_status() {
    let data = tempdir().unwrap();
    let store = LocalStore::open(data.path()).unwrap();
    let catalog = DropboxCatalog::new(&CatalogSettings::default(), store.clone()).unwrap();
    let mut session = Session {
        settings: Settings::default(),
        store,
        catalog: Box::new(catalog),
        player: Coordinator::new(FakeOutput::default(), 0.5),
    };
    let mut app = session.new_app();

    actions::refresh_library(&mut app, &mut session);

    assert!(!app.authenticated);
    assert!(app.library.is_empty());
    assert!(app.status.as_deref().unwrap().starts_with("Not signed in"));
}

#[test]
fn logout_on_settings_screen_forgets_token() {
    let data = tempdir().unwrap();
    let store = LocalStore::open(data.path()).unwrap();
    store.set(TOKEN_KEY, "secret").unwrap();
    let catalog = DropboxCatalog::new(&CatalogSettings::default(), store.clone()).unwrap();
    let session = Session {
        settings: Settings::default(),
        store: store.clone(),
        catalog: Box::new(catalog),
        player: Coordinator::new(FakeOutput::default(), 0.5),
    };
    let app = session.new_app();
    assert!(app.authenticated);

    let mut f = Fixture {
        _music: tempdir().unwrap(),
        _data: data,
        session,
        app,
        state: EventLoopState::new(Duration::from_millis(500)),
    };

    f.key(KeyCode::Char('O'));
    assert!(f.app.authenticated);

    f.app.switch_to(Screen::Settings);
    f.key(KeyCode::Char('O'));
    assert!(!f.app.authenticated);
    assert_eq!(store.get::<String>(TOKEN_KEY).unwrap(), None);
}

#[test]
fn quit_key_ends_the_loop_but_not_while_typing() {
    let mut f = fixture();
    f.key(KeyCode::Char('/'));
    assert!(!f.key(KeyCode::Char('q')));
    assert_eq!(f.app.filter_query, "q");

    f.key(KeyCode::Esc);
    assert!(f.key(KeyCode::Char('q')));
}

#[test]
fn second_logging_init_reports_failure() {
    let logs = tempdir().unwrap();
    let mut settings = Settings::default();
    settings.logging.file = Some(logs.path().join("dropbeat.log"));

    let _ = startup::init_logging(&settings);

    assert!(startup::init_logging(&settings).is_err());
    assert!(logs.path().join("dropbeat.log").exists());
}
