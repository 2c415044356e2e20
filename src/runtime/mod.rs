//! Runtime: wires settings, logging, store, catalog and audio together and
//! runs the terminal event loop.

use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{AudioOutput, AudioPlayer};
use crate::catalog::{self, Catalog, DropboxCatalog};
use crate::config::Settings;
use crate::player::Coordinator;
use crate::store::{LocalStore, RecentlyPlayed, UserPlaylists};

mod actions;
mod event_loop;
mod settings;
mod startup;

pub use settings::load_settings;

/// Everything user actions operate on besides the UI model.
pub struct Session<O: AudioOutput> {
    pub settings: Settings,
    pub store: LocalStore,
    pub catalog: Box<dyn Catalog>,
    pub player: Coordinator<O>,
}

impl<O: AudioOutput> Session<O> {
    /// The UI model seeded from persisted collections.
    pub fn new_app(&self) -> App {
        let mut app = App::new(
            RecentlyPlayed::load(&self.store, self.settings.storage.recently_played_limit),
            UserPlaylists::load(&self.store),
        );
        app.home_recent_count = self.settings.ui.home_recent_count;
        app.catalog_name = self.catalog.name();
        app.authenticated = self.catalog.is_authenticated();
        app
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = load_settings();
    if let Err(e) = startup::init_logging(&settings) {
        eprintln!("dropbeat: logging disabled: {e}");
    }
    if let Some(msg) = config_problem {
        warn!("{msg}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let store = LocalStore::open(settings.data_dir())?;
    let catalog = catalog::from_settings(&settings.catalog, &store)?;

    let http = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(settings.catalog.timeout_secs.max(1)))
        .build()?;
    let (audio_player, events) = AudioPlayer::new(settings.audio.clone(), http);
    let player = Coordinator::new(audio_player, settings.audio.initial_volume);

    let fade_out = Duration::from_millis(settings.audio.quit_fade_out_ms);
    let scrub_commit = Duration::from_millis(settings.controls.scrub_commit_ms);
    let mut session = Session {
        settings,
        store,
        catalog,
        player,
    };
    let mut app = session.new_app();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(scrub_commit);
        event_loop::run(&mut terminal, &mut app, &mut session, &events, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session.player.output().quit_softly(fade_out);
    info!("stopped");

    run_result
}

/// Persist a Dropbox access token for later sessions.
pub fn store_token(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, _) = load_settings();
    let store = LocalStore::open(settings.data_dir())?;
    let mut dropbox = DropboxCatalog::new(&settings.catalog, store)?;
    dropbox.set_token(token.trim());
    Ok(())
}

#[cfg(test)]
mod tests;
