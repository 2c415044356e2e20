//! User actions that touch more than the UI model: the coordinator, the
//! catalog and the store.

use tracing::{error, info, warn};

use crate::app::{App, NameTarget, Screen};
use crate::audio::AudioOutput;
use crate::error::{CatalogError, StoreError};
use crate::library::Track;

use super::Session;

/// Reload the library from the catalog and queue all of it.
pub fn refresh_library<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    app.catalog_name = session.catalog.name();
    app.authenticated = session.catalog.is_authenticated();
    if !app.authenticated {
        app.set_status("Not signed in: run dropbeat --set-token <TOKEN>");
        return;
    }

    let folder = session.catalog.default_folder().to_string();
    match session.catalog.list_audio_files(&folder) {
        Ok(tracks) => {
            app.set_status(format!("Loaded {} tracks", tracks.len()));
            session.player.set_playlist(tracks.clone());
            app.set_library(tracks);
        }
        Err(CatalogError::NotAuthenticated) => {
            warn!("catalog rejected credentials");
            app.authenticated = false;
            app.set_status("Session expired: sign in again");
        }
        Err(e) => {
            error!(error = %e, folder = %folder, "failed to load library");
            app.set_status(format!("Failed to load library: {e}"));
        }
    }
}

fn record_recent<O: AudioOutput>(app: &mut App, session: &Session<O>, track: Track) {
    if let Err(e) = app.recent.record(&session.store, track) {
        warn!(error = %e, "failed to save recently played");
    }
}

fn save_playlists<O: AudioOutput>(app: &mut App, session: &Session<O>) {
    if let Err(e) = app.playlists.save(&session.store) {
        warn!(error = %e, "failed to save playlists");
        app.set_status(format!("Could not save playlists: {e}"));
    }
}

/// Start `track`, or flip play/pause when it is already current.
fn play_or_toggle<O: AudioOutput>(session: &mut Session<O>, track: &Track) -> bool {
    if session.player.state().current_id() == Some(track.id.as_str()) {
        session.player.toggle_play_pause();
        false
    } else {
        session.player.play_track(track.clone());
        true
    }
}

/// Enter: play the selected track, or open the selected playlist.
pub fn activate<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    if app.screen == Screen::Playlists && app.open_playlist.is_none() {
        app.open_selected_playlist();
        return;
    }

    let Some(track) = app.selected_track(&session.player.state().playlist).cloned() else {
        return;
    };
    let started = play_or_toggle(session, &track);
    if started && matches!(app.screen, Screen::Home | Screen::Library) {
        record_recent(app, session, track);
    }
}

/// Replace the queue with the selected playlist and start its first track.
pub fn play_playlist<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    let playlist = if app.open_playlist.is_some() {
        app.current_playlist()
    } else {
        app.selected_playlist()
    };
    let Some(playlist) = playlist.cloned() else {
        return;
    };
    let Some(first) = playlist.tracks.first().cloned() else {
        app.set_status(format!("{} is empty", playlist.name));
        return;
    };

    info!(playlist = %playlist.name, tracks = playlist.tracks.len(), "playing playlist");
    session.player.set_playlist(playlist.tracks);
    session.player.play_track(first);
}

/// Append the selected track to the queue.
pub fn enqueue_selected<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    if app.screen == Screen::Queue {
        return;
    }
    let Some(track) = app.selected_track(&session.player.state().playlist).cloned() else {
        return;
    };
    if session.player.add_to_playlist(track.clone()) {
        app.set_status(format!("Queued {}", track.display()));
    } else {
        app.set_status(format!("{} is already queued", track.display()));
    }
}

/// Append the selected track to the playlist opened last.
pub fn add_selected_to_open_playlist<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    let Some(id) = app.open_playlist.clone() else {
        app.set_status("Open a playlist first");
        return;
    };
    if app.screen == Screen::Playlists {
        return;
    }
    let Some(track) = app.selected_track(&session.player.state().playlist).cloned() else {
        return;
    };

    match app.playlists.add_track(&id, track) {
        Ok(true) => {
            save_playlists(app, session);
            app.set_status("Added to playlist");
        }
        Ok(false) => app.set_status("Already in playlist"),
        Err(StoreError::PlaylistNotFound(_)) => {
            app.close_playlist();
            app.set_status("Playlist no longer exists");
        }
        Err(e) => app.set_status(format!("Could not add track: {e}")),
    }
}

/// Remove the selected row: a queued track, a playlist track, or a
/// whole playlist.
pub fn remove_selected<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    match app.screen {
        Screen::Queue => {
            let Some(id) = app
                .selected_track(&session.player.state().playlist)
                .map(|t| t.id.clone())
            else {
                return;
            };
            session.player.remove_from_playlist(&id);
        }
        Screen::Playlists => match app.open_playlist.clone() {
            Some(playlist_id) => {
                let Some(track_id) = app
                    .selected_track(&session.player.state().playlist)
                    .map(|t| t.id.clone())
                else {
                    return;
                };
                if let Ok(true) = app.playlists.remove_track(&playlist_id, &track_id) {
                    save_playlists(app, session);
                }
            }
            None => {
                let Some(playlist) = app.selected_playlist().cloned() else {
                    return;
                };
                if app.playlists.delete(&playlist.id) {
                    info!(playlist = %playlist.name, "deleted playlist");
                    save_playlists(app, session);
                    app.set_status(format!("Deleted {}", playlist.name));
                }
            }
        },
        _ => return,
    }
    let rows = app.rows(&session.player.state().playlist);
    app.clamp_selection(rows);
}

/// Apply a finished name prompt.
pub fn finish_naming<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    let Some((target, name)) = app.take_name() else {
        return;
    };

    let result = match target {
        NameTarget::NewPlaylist => app.playlists.create(&name).map(|p| Some(p.name.clone())),
        NameTarget::SaveQueue => app
            .playlists
            .save_queue(&name, session.player.state().playlist.tracks())
            .map(|p| p.map(|p| p.name.clone())),
    };

    match result {
        Ok(Some(saved)) => {
            save_playlists(app, session);
            app.set_status(format!("Saved playlist {saved}"));
        }
        Ok(None) => app.set_status("Queue is empty"),
        Err(StoreError::InvalidName) => app.set_status("Playlist name cannot be empty"),
        Err(e) => app.set_status(format!("Could not create playlist: {e}")),
    }
}

/// Forget catalog credentials and clear the listing.
pub fn logout<O: AudioOutput>(app: &mut App, session: &mut Session<O>) {
    session.catalog.logout();
    app.authenticated = false;
    app.set_library(Vec::new());
    app.set_status("Logged out");
}

/// Nudge volume by `delta`.
pub fn change_volume<O: AudioOutput>(session: &mut Session<O>, delta: f32) {
    let volume = session.player.state().volume + delta;
    session.player.set_volume(volume);
}
