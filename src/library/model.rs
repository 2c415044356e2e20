use serde::{Deserialize, Serialize};

/// A playable audio item.
///
/// `id` is the stable source path and is unique within any playlist.
/// `url` may be empty until the catalog resolved a playable link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: None,
            url: String::new(),
            thumbnail: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Whether the track can be handed to the audio backend.
    pub fn is_playable(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// "Artist - Name" when an artist is known, the bare name otherwise.
    pub fn display(&self) -> String {
        match self.artist.as_deref().map(str::trim) {
            Some(a) if !a.is_empty() => format!("{} - {}", a, self.name),
            _ => self.name.clone(),
        }
    }

    /// Case-insensitive substring match over name and artist.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&q)
            || self
                .artist
                .as_deref()
                .map(|a| a.to_lowercase().contains(&q))
                .unwrap_or(false)
    }
}

/// Ordered, duplicate-id-free sequence of tracks.
///
/// Insertion order is playback order for next/prev.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from `tracks`, keeping the first occurrence of each id.
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        let mut playlist = Self::new();
        playlist.replace(tracks);
        playlist
    }

    /// Append `track` unless a track with the same id is already present.
    ///
    /// Returns `true` when the playlist changed.
    pub fn add(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove the track with `id`. Returns `true` when something was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() != before
    }

    /// Replace the whole sequence.
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks.clear();
        for t in tracks {
            self.add(t);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The track after `current_id`, wrapping to the first.
    ///
    /// `None` when the playlist holds fewer than two tracks. An id that is not
    /// in the playlist resolves to the first track.
    pub fn next_after(&self, current_id: Option<&str>) -> Option<&Track> {
        let len = self.tracks.len();
        if len <= 1 {
            return None;
        }
        let next = match current_id.and_then(|id| self.position(id)) {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.tracks.get(next)
    }

    /// The track before `current_id`, wrapping to the last.
    ///
    /// `None` when the playlist holds fewer than two tracks. An id that is not
    /// in the playlist resolves to the last track.
    pub fn prev_before(&self, current_id: Option<&str>) -> Option<&Track> {
        let len = self.tracks.len();
        if len <= 1 {
            return None;
        }
        let prev = match current_id.and_then(|id| self.position(id)) {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        self.tracks.get(prev)
    }
}
