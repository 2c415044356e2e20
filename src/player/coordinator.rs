use std::sync::mpsc::Receiver;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{AudioCmd, AudioEvent, AudioOutput};
use crate::library::{Playlist, Track};

use super::state::{Phase, PlayerState};

const DEFAULT_UNMUTE_VOLUME: f32 = 0.5;

/// Single owner of playback state and of the audio backend.
///
/// Intents arrive as method calls, backend events through `handle_event`.
/// Each `play_track` bumps `generation`; events carrying an older
/// generation belong to a superseded load and are dropped. Each `Seek`
/// actually sent to the backend bumps `seek_seq`; position reports stamped
/// with an older sequence predate that seek and are dropped as well.
pub struct Coordinator<O: AudioOutput> {
    output: O,
    state: PlayerState,
    generation: u64,
    seek_seq: u64,
    pending_seek: Option<Duration>,
    volume_before_mute: f32,
}

impl<O: AudioOutput> Coordinator<O> {
    pub fn new(output: O, volume: f32) -> Self {
        let state = PlayerState::new(volume);
        output.send(AudioCmd::SetVolume(state.volume));
        Self {
            output,
            volume_before_mute: state.volume,
            state,
            generation: 0,
            seek_seq: 0,
            pending_seek: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Make `track` current and start it.
    ///
    /// Supersedes any load still in flight.
    pub fn play_track(&mut self, track: Track) {
        self.pending_seek = None;
        self.start(track);
    }

    fn start(&mut self, track: Track) {
        self.generation += 1;
        self.state.is_playing = true;
        self.state.duration = Duration::ZERO;
        self.state.current_time = self.pending_seek.unwrap_or(Duration::ZERO);

        if !track.is_playable() {
            warn!(track = %track.id, "track has no playable url");
            self.state.current_track = Some(track);
            self.state.phase = Phase::Idle;
            self.output.send(AudioCmd::Pause);
            return;
        }

        info!(track = %track.id, generation = self.generation, "loading track");
        self.state.phase = Phase::Loading;
        self.output.send(AudioCmd::Load {
            url: track.url.clone(),
            generation: self.generation,
        });
        self.state.current_track = Some(track);
    }

    /// Flip the play/pause intent.
    ///
    /// Applied to the backend right away when a source is ready, on load
    /// completion while loading. With nothing loaded, asking to play reloads
    /// the current track.
    pub fn toggle_play_pause(&mut self) {
        let playing = !self.state.is_playing;
        self.state.is_playing = playing;

        match self.state.phase {
            Phase::Ready => {
                self.output.send(if playing {
                    AudioCmd::Play
                } else {
                    AudioCmd::Pause
                });
            }
            Phase::Loading => {
                debug!(playing, "intent recorded while loading");
            }
            Phase::Idle | Phase::Ended => {
                if !playing {
                    return;
                }
                match self.state.current_track.clone() {
                    Some(track) if track.is_playable() => self.start(track),
                    _ => debug!("nothing to resume"),
                }
            }
        }
    }

    /// Play the next playlist entry, wrapping to the first.
    ///
    /// No-op for playlists with fewer than two tracks.
    pub fn next_track(&mut self) {
        let next = self
            .state
            .playlist
            .next_after(self.state.current_id())
            .cloned();
        match next {
            Some(track) => self.play_track(track),
            None => debug!(len = self.state.playlist.len(), "next ignored"),
        }
    }

    /// Play the previous playlist entry, wrapping to the last.
    ///
    /// No-op for playlists with fewer than two tracks.
    pub fn prev_track(&mut self) {
        let prev = self
            .state
            .playlist
            .prev_before(self.state.current_id())
            .cloned();
        match prev {
            Some(track) => self.play_track(track),
            None => debug!(len = self.state.playlist.len(), "prev ignored"),
        }
    }

    /// Set volume, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.output.send(AudioCmd::SetVolume(volume));
    }

    /// Mute, or restore the volume from before muting.
    pub fn toggle_mute(&mut self) {
        if self.state.is_muted() {
            let restore = if self.volume_before_mute > 0.0 {
                self.volume_before_mute
            } else {
                DEFAULT_UNMUTE_VOLUME
            };
            self.set_volume(restore);
        } else {
            self.volume_before_mute = self.state.volume;
            self.set_volume(0.0);
        }
    }

    /// Commit a seek to `position`.
    ///
    /// Callers send the final value of a drag gesture, not every
    /// intermediate one. `current_time` moves immediately; position reports
    /// that predate this seek are ignored afterwards.
    pub fn seek_to_position(&mut self, position: Duration) {
        if self.state.current_track.is_none() {
            return;
        }
        let position = self.clamp_to_duration(position);
        self.state.current_time = position;

        match self.state.phase {
            Phase::Ready => self.send_seek(position),
            Phase::Loading | Phase::Idle | Phase::Ended => self.pending_seek = Some(position),
        }
    }

    // A held seek does not count until it reaches the backend, so reports
    // for a load that dropped it are still accepted.
    fn send_seek(&mut self, position: Duration) {
        self.seek_seq += 1;
        self.output.send(AudioCmd::Seek {
            position,
            seq: self.seek_seq,
        });
    }

    fn clamp_to_duration(&self, position: Duration) -> Duration {
        if self.state.duration.is_zero() {
            position
        } else {
            position.min(self.state.duration)
        }
    }

    /// Append `track` unless its id is already queued.
    pub fn add_to_playlist(&mut self, track: Track) -> bool {
        self.state.playlist.add(track)
    }

    /// Remove `id` from the playlist; absent ids are ignored.
    pub fn remove_from_playlist(&mut self, id: &str) -> bool {
        self.state.playlist.remove(id)
    }

    /// Replace the playlist wholesale.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.state.playlist = Playlist::from_tracks(tracks);
    }

    /// Apply every event already queued on `events` without blocking.
    pub fn drain_events(&mut self, events: &Receiver<AudioEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    pub fn handle_event(&mut self, event: AudioEvent) {
        if event.generation() != self.generation {
            debug!(
                event_generation = event.generation(),
                current = self.generation,
                "dropping stale audio event"
            );
            return;
        }

        match event {
            AudioEvent::MetadataLoaded { duration, .. } => self.on_loaded(duration),
            AudioEvent::TimeUpdate {
                position, seek_seq, ..
            } => {
                if self.state.phase == Phase::Ready && seek_seq >= self.seek_seq {
                    self.state.current_time = position;
                }
            }
            AudioEvent::Ended { .. } => self.on_ended(),
            AudioEvent::Error { message, .. } => {
                warn!(
                    track = self.state.current_id().unwrap_or("-"),
                    error = %message,
                    "playback failed"
                );
                self.state.phase = Phase::Idle;
            }
        }
    }

    fn on_loaded(&mut self, duration: Duration) {
        if self.state.phase != Phase::Loading {
            return;
        }
        self.state.duration = duration;
        self.state.phase = Phase::Ready;

        if let Some(position) = self.pending_seek.take() {
            let position = self.clamp_to_duration(position);
            self.state.current_time = position;
            self.send_seek(position);
        }
        if self.state.is_playing {
            self.output.send(AudioCmd::Play);
        }
    }

    fn on_ended(&mut self) {
        if self.state.phase != Phase::Ready {
            return;
        }
        self.state.phase = Phase::Ended;
        self.state.current_time = self.state.duration;

        let next = self
            .state
            .playlist
            .next_after(self.state.current_id())
            .cloned();
        match next {
            Some(track) => self.play_track(track),
            None => {
                info!("playback finished");
                self.state.is_playing = false;
            }
        }
    }
}
