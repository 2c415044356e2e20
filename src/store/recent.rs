use crate::error::StoreResult;
use crate::library::Track;

use super::{LocalStore, RECENTLY_PLAYED_KEY};

/// Bounded, most-recent-first, id-unique list of played tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentlyPlayed {
    tracks: Vec<Track>,
    limit: usize,
}

impl RecentlyPlayed {
    pub fn new(limit: usize) -> Self {
        Self {
            tracks: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn load(store: &LocalStore, limit: usize) -> Self {
        let mut recent = Self::new(limit);
        let stored: Vec<Track> = store.get_or_default(RECENTLY_PLAYED_KEY);
        for t in stored.into_iter().rev() {
            recent.push(t);
        }
        recent
    }

    pub fn save(&self, store: &LocalStore) -> StoreResult<()> {
        store.set(RECENTLY_PLAYED_KEY, &self.tracks)
    }

    /// Move `track` to the front, dropping older entries past the limit.
    pub fn push(&mut self, track: Track) {
        self.tracks.retain(|t| t.id != track.id);
        self.tracks.insert(0, track);
        self.tracks.truncate(self.limit);
    }

    /// `push` and persist.
    pub fn record(&mut self, store: &LocalStore, track: Track) -> StoreResult<()> {
        self.push(track);
        self.save(store)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
