//! Commands accepted by the audio thread and events it emits.
//!
//! Every event carries the `generation` of the load it belongs to so the
//! receiver can drop completions that belong to a superseded track.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Replace the current source with `url`. Starts paused.
    Load { url: String, generation: u64 },
    /// Resume the loaded source. Dropped when nothing is loaded.
    Play,
    /// Pause the loaded source.
    Pause,
    /// Jump to `position`. `seq` is echoed back on later time updates.
    Seek { position: Duration, seq: u64 },
    /// Set output volume in `[0, 1]`. Also applies to future sources.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// The source for `generation` is decoded and ready; `duration` is zero
    /// when the container does not report one.
    MetadataLoaded { generation: u64, duration: Duration },
    /// Periodic position report while playing.
    TimeUpdate {
        generation: u64,
        position: Duration,
        /// Sequence number of the last seek applied before this report.
        seek_seq: u64,
    },
    /// The source for `generation` played to the end.
    Ended { generation: u64 },
    /// Loading or playing `generation` failed.
    Error { generation: u64, message: String },
}

impl AudioEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::MetadataLoaded { generation, .. }
            | Self::TimeUpdate { generation, .. }
            | Self::Ended { generation }
            | Self::Error { generation, .. } => *generation,
        }
    }
}

/// The command side of an audio backend.
///
/// The coordinator owns exactly one implementation and is the only caller.
pub trait AudioOutput {
    fn send(&self, cmd: AudioCmd);
}
