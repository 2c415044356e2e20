use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::error::AudioError;

use super::source::{create_sink, open_source};
use super::types::{AudioCmd, AudioEvent};

/// The source currently owned by the audio thread.
pub(super) struct Loaded {
    pub(super) sink: Sink,
    pub(super) generation: u64,
    pub(super) ended: bool,
}

impl Loaded {
    pub(super) fn new(sink: Sink, generation: u64) -> Self {
        Self {
            sink,
            generation,
            ended: false,
        }
    }
}

/// Everything the audio thread mutates while handling commands.
pub(super) struct Backend {
    stream: Option<OutputStream>,
    http: reqwest::blocking::Client,
    events: Sender<AudioEvent>,
    pub(super) current: Option<Loaded>,
    pub(super) paused: bool,
    pub(super) volume: f32,
    pub(super) seek_seq: u64,
}

/// Whether the command loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Stop,
}

impl Backend {
    fn emit(&self, event: AudioEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Replace whatever is loaded with `url`.
    pub(super) fn load(&mut self, url: &str, generation: u64) -> bool {
        if let Some(old) = self.current.take() {
            old.sink.stop();
        }
        self.paused = true;

        let Some(stream) = self.stream.as_ref() else {
            let err = AudioError::Output("output stream unavailable".to_string());
            return self.emit(AudioEvent::Error {
                generation,
                message: err.to_string(),
            });
        };

        match open_source(url, &self.http) {
            Ok(source) => {
                let (sink, duration) = create_sink(stream, source, self.volume);
                self.current = Some(Loaded::new(sink, generation));
                debug!(generation, ?duration, "source loaded");
                self.emit(AudioEvent::MetadataLoaded {
                    generation,
                    duration,
                })
            }
            Err(e) => {
                warn!(generation, error = %e, "failed to load source");
                self.emit(AudioEvent::Error {
                    generation,
                    message: e.to_string(),
                })
            }
        }
    }

    pub(super) fn seek(&mut self, position: Duration, seq: u64) -> bool {
        self.seek_seq = seq;
        let Some(cur) = self.current.as_mut() else {
            return true;
        };
        if let Err(e) = cur.sink.try_seek(position) {
            warn!(error = %AudioError::Seek(e.to_string()), "seek failed");
        }
        cur.ended = false;
        let report = AudioEvent::TimeUpdate {
            generation: cur.generation,
            position: cur.sink.get_pos(),
            seek_seq: seq,
        };
        self.emit(report)
    }

    /// Periodic report: position while playing, `Ended` once when drained.
    pub(super) fn tick(&mut self) -> bool {
        if self.paused {
            return true;
        }
        let Some(cur) = self.current.as_mut() else {
            return true;
        };
        if cur.ended {
            return true;
        }
        let event = if cur.sink.empty() {
            cur.ended = true;
            AudioEvent::Ended {
                generation: cur.generation,
            }
        } else {
            AudioEvent::TimeUpdate {
                generation: cur.generation,
                position: cur.sink.get_pos(),
                seek_seq: self.seek_seq,
            }
        };
        self.emit(event)
    }

    fn fade_out(&self, fade_out_ms: u64) {
        let Some(cur) = self.current.as_ref() else {
            return;
        };
        if fade_out_ms == 0 || self.paused {
            cur.sink.stop();
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            cur.sink.set_volume(self.volume * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        cur.sink.stop();
    }

    pub(super) fn new(
        stream: Option<OutputStream>,
        http: reqwest::blocking::Client,
        events: Sender<AudioEvent>,
        volume: f32,
    ) -> Self {
        Self {
            stream,
            http,
            events,
            current: None,
            paused: true,
            volume: volume.clamp(0.0, 1.0),
            seek_seq: 0,
        }
    }

    fn alive(ok: bool) -> Flow {
        if ok { Flow::Continue } else { Flow::Stop }
    }

    /// Apply one command.
    pub(super) fn handle(&mut self, cmd: AudioCmd) -> Flow {
        match cmd {
            AudioCmd::Load { url, generation } => Self::alive(self.load(&url, generation)),
            AudioCmd::Play => {
                match self.current.as_ref() {
                    Some(cur) => {
                        cur.sink.play();
                        self.paused = false;
                    }
                    None => debug!("play dropped: nothing loaded"),
                }
                Flow::Continue
            }
            AudioCmd::Pause => {
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.pause();
                }
                self.paused = true;
                Flow::Continue
            }
            AudioCmd::Seek { position, seq } => Self::alive(self.seek(position, seq)),
            AudioCmd::SetVolume(v) => {
                self.set_volume(v);
                Flow::Continue
            }
            AudioCmd::Quit { fade_out_ms } => {
                self.fade_out(fade_out_ms);
                info!("audio thread quitting");
                Flow::Stop
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(cur) = self.current.as_ref() {
            cur.sink.set_volume(self.volume);
        }
    }

    /// Apply `first` together with everything already queued behind it.
    ///
    /// A load followed by another load (or by a quit) is skipped, as are
    /// plays and seeks aimed at the source being replaced. The last queued
    /// volume is applied before any load starts.
    pub(super) fn handle_batch(&mut self, first: AudioCmd, rx: &Receiver<AudioCmd>) -> Flow {
        let mut batch = vec![first];
        if matches!(batch[0], AudioCmd::Load { .. }) {
            batch.extend(rx.try_iter());
        }
        if batch.len() == 1 {
            return batch.pop().map_or(Flow::Continue, |cmd| self.handle(cmd));
        }

        if let Some(v) = batch.iter().rev().find_map(|c| match c {
            AudioCmd::SetVolume(v) => Some(*v),
            _ => None,
        }) {
            self.set_volume(v);
        }

        let last_switch = batch
            .iter()
            .rposition(|c| matches!(c, AudioCmd::Load { .. } | AudioCmd::Quit { .. }));
        for (i, cmd) in batch.into_iter().enumerate() {
            match cmd {
                AudioCmd::SetVolume(_) => {}
                AudioCmd::Load { generation, .. } if Some(i) != last_switch => {
                    debug!(generation, "load superseded before it started");
                }
                AudioCmd::Play | AudioCmd::Seek { .. } if last_switch.is_some_and(|l| i < l) => {
                    debug!("command for a replaced source dropped");
                }
                cmd => {
                    if self.handle(cmd) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
            }
        }
        Flow::Continue
    }
}

/// Run the command loop until a quit, a closed channel, or a gone listener.
///
/// Commands are applied in arrival order, so a Play queued behind a Load
/// only runs once that Load has finished.
pub(super) fn run(backend: &mut Backend, rx: &Receiver<AudioCmd>, tick: Duration) {
    loop {
        let flow = match rx.recv_timeout(tick) {
            Ok(cmd) => backend.handle_batch(cmd, rx),
            Err(RecvTimeoutError::Timeout) => Backend::alive(backend.tick()),
            Err(RecvTimeoutError::Disconnected) => Flow::Stop,
        };
        if flow == Flow::Stop {
            break;
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    audio_settings: AudioSettings,
    http: reqwest::blocking::Client,
) -> JoinHandle<()> {
    thread::spawn(move || {
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the TUI.
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device");
                None
            }
        };

        let mut backend = Backend::new(stream, http, events, audio_settings.initial_volume);
        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));
        run(&mut backend, &rx, tick);
    })
}
