use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::library::Track;

use super::{LocalStore, USER_PLAYLISTS_KEY};

/// A named playlist saved by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// The user's saved playlists, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPlaylists {
    playlists: Vec<SavedPlaylist>,
}

impl UserPlaylists {
    pub fn load(store: &LocalStore) -> Self {
        Self {
            playlists: store.get_or_default(USER_PLAYLISTS_KEY),
        }
    }

    pub fn save(&self, store: &LocalStore) -> StoreResult<()> {
        store.set(USER_PLAYLISTS_KEY, &self.playlists)
    }

    pub fn all(&self) -> &[SavedPlaylist] {
        &self.playlists
    }

    pub fn get(&self, id: &str) -> Option<&SavedPlaylist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Create an empty playlist named `name` (trimmed, must not be blank).
    pub fn create(&mut self, name: &str) -> StoreResult<&SavedPlaylist> {
        self.insert(name, Vec::new())
    }

    /// Save `tracks` (the current queue) as a new playlist.
    ///
    /// Returns `Ok(None)` when there is nothing to save.
    pub fn save_queue(&mut self, name: &str, tracks: &[Track]) -> StoreResult<Option<&SavedPlaylist>> {
        if tracks.is_empty() {
            return Ok(None);
        }
        self.insert(name, tracks.to_vec()).map(Some)
    }

    fn insert(&mut self, name: &str, tracks: Vec<Track>) -> StoreResult<&SavedPlaylist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidName);
        }

        let mut unique: Vec<Track> = Vec::with_capacity(tracks.len());
        for t in tracks {
            if !unique.iter().any(|u| u.id == t.id) {
                unique.push(t);
            }
        }

        let id = self.next_id(now_millis());
        self.playlists.push(SavedPlaylist {
            id,
            name: name.to_string(),
            tracks: unique,
        });
        let last = self.playlists.len() - 1;
        Ok(&self.playlists[last])
    }

    /// Timestamp id, bumped past any id already in use.
    fn next_id(&self, mut candidate: u128) -> String {
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Delete the playlist with `id`. Returns `true` when one was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.id != id);
        self.playlists.len() != before
    }

    /// Append `track` to playlist `id` unless it is already there.
    pub fn add_track(&mut self, id: &str, track: Track) -> StoreResult<bool> {
        let playlist = self.get_mut(id)?;
        if playlist.tracks.iter().any(|t| t.id == track.id) {
            return Ok(false);
        }
        playlist.tracks.push(track);
        Ok(true)
    }

    /// Remove `track_id` from playlist `id`.
    pub fn remove_track(&mut self, id: &str, track_id: &str) -> StoreResult<bool> {
        let playlist = self.get_mut(id)?;
        let before = playlist.tracks.len();
        playlist.tracks.retain(|t| t.id != track_id);
        Ok(playlist.tracks.len() != before)
    }

    fn get_mut(&mut self, id: &str) -> StoreResult<&mut SavedPlaylist> {
        self.playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::PlaylistNotFound(id.to_string()))
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
