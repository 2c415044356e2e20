use std::time::Duration;

use crate::library::{Playlist, Track};

/// Transport phase of the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing loaded, or the last load failed.
    #[default]
    Idle,
    /// A load was requested and its completion has not arrived yet.
    Loading,
    /// The source is loaded; `is_playing` decides whether it runs.
    Ready,
    /// The track played to the end and nothing followed it.
    Ended,
}

/// Everything the presentation layer may read about playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub current_track: Option<Track>,
    /// Play/pause intent. The transport follows it once a load completes.
    pub is_playing: bool,
    pub current_time: Duration,
    /// Zero until the source reports a duration.
    pub duration: Duration,
    /// Always within `[0, 1]`.
    pub volume: f32,
    pub playlist: Playlist,
    pub phase: Phase,
}

impl PlayerState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            current_time: Duration::ZERO,
            duration: Duration::ZERO,
            volume: volume.clamp(0.0, 1.0),
            playlist: Playlist::new(),
            phase: Phase::Idle,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.volume <= 0.0
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.id.as_str())
    }

    /// Whether audio is actually coming out right now.
    pub fn is_audible(&self) -> bool {
        self.is_playing && self.phase == Phase::Ready
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(0.5)
    }
}
