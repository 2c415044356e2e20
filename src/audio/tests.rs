use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use rodio::Sink;
use rodio::source::SineWave;

use super::source::{Location, classify, open_source};
use super::thread::{Backend, Flow, Loaded, run};
use super::types::{AudioCmd, AudioEvent};
use crate::error::AudioError;

/// A backend without an output device.
fn backend() -> (Backend, Receiver<AudioEvent>) {
    let (tx, rx) = mpsc::channel();
    let backend = Backend::new(None, reqwest::blocking::Client::new(), tx, 0.5);
    (backend, rx)
}

/// A sink holding an endless source that nothing pulls samples from.
fn playing_sink() -> Sink {
    let (sink, _queue) = Sink::new();
    sink.append(SineWave::new(440.0));
    sink
}

fn load(url: &str, generation: u64) -> AudioCmd {
    AudioCmd::Load {
        url: url.to_string(),
        generation,
    }
}

#[test]
fn classify_recognises_remote_links() {
    assert_eq!(
        classify("https://dl.example.test/a.mp3"),
        Location::Remote("https://dl.example.test/a.mp3")
    );
    assert_eq!(
        classify("HTTP://dl.example.test/a.mp3"),
        Location::Remote("HTTP://dl.example.test/a.mp3")
    );
}

#[test]
fn classify_treats_file_urls_and_paths_as_local() {
    assert_eq!(classify("file:///music/a.mp3"), Location::Local("/music/a.mp3"));
    assert_eq!(classify("/music/a.mp3"), Location::Local("/music/a.mp3"));
    assert_eq!(classify("a.mp3"), Location::Local("a.mp3"));
}

#[test]
fn open_source_reports_missing_files() {
    let http = reqwest::blocking::Client::new();
    let err = open_source("/definitely/not/here.mp3", &http).err().unwrap();
    assert!(matches!(err, AudioError::Open { .. }));
}

#[test]
fn open_source_reports_undecodable_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.mp3");
    std::fs::write(&path, b"this is not audio").unwrap();

    let http = reqwest::blocking::Client::new();
    let err = open_source(path.to_str().unwrap(), &http).err().unwrap();
    assert!(matches!(err, AudioError::Decode(_)));
}

#[test]
fn events_expose_their_generation() {
    let events = [
        AudioEvent::MetadataLoaded {
            generation: 1,
            duration: Duration::ZERO,
        },
        AudioEvent::TimeUpdate {
            generation: 2,
            position: Duration::from_secs(3),
            seek_seq: 0,
        },
        AudioEvent::Ended { generation: 3 },
        AudioEvent::Error {
            generation: 4,
            message: "boom".into(),
        },
    ];
    let gens: Vec<u64> = events.iter().map(AudioEvent::generation).collect();
    assert_eq!(gens, vec![1, 2, 3, 4]);
}

#[test]
fn play_with_nothing_loaded_is_dropped() {
    let (mut b, events) = backend();

    assert_eq!(b.handle(AudioCmd::Play), Flow::Continue);

    assert!(b.paused);
    assert!(b.tick());
    assert!(events.try_recv().is_err());
}

#[test]
fn failed_load_reports_error_for_its_generation() {
    let (mut b, events) = backend();

    b.handle(load("/music/a.mp3", 7));

    match events.try_recv().unwrap() {
        AudioEvent::Error { generation, .. } => assert_eq!(generation, 7),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(b.current.is_none());
}

#[test]
fn load_replaces_the_previous_source() {
    let (mut b, events) = backend();
    b.current = Some(Loaded::new(playing_sink(), 1));
    b.paused = false;

    b.handle(load("/music/b.mp3", 2));

    assert!(b.current.is_none());
    assert!(b.paused);
    assert_eq!(events.try_recv().unwrap().generation(), 2);
    assert!(b.tick());
    assert!(events.try_recv().is_err());
}

#[test]
fn seek_sequence_is_echoed_in_later_reports() {
    let (mut b, events) = backend();
    let (sink, _queue) = Sink::new();
    b.current = Some(Loaded::new(sink, 3));

    b.handle(AudioCmd::Seek {
        position: Duration::from_secs(10),
        seq: 4,
    });
    assert_eq!(
        events.try_recv().unwrap(),
        AudioEvent::TimeUpdate {
            generation: 3,
            position: Duration::ZERO,
            seek_seq: 4,
        }
    );

    b.current = Some(Loaded::new(playing_sink(), 3));
    b.handle(AudioCmd::Play);
    b.tick();
    match events.try_recv().unwrap() {
        AudioEvent::TimeUpdate { seek_seq, .. } => assert_eq!(seek_seq, 4),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn ended_is_reported_once() {
    let (mut b, events) = backend();
    let (sink, _queue) = Sink::new();
    b.current = Some(Loaded::new(sink, 5));
    b.handle(AudioCmd::Play);

    b.tick();
    b.tick();
    b.tick();

    let received: Vec<AudioEvent> = events.try_iter().collect();
    assert_eq!(received, vec![AudioEvent::Ended { generation: 5 }]);
}

#[test]
fn paused_backend_stays_quiet() {
    let (mut b, events) = backend();
    b.current = Some(Loaded::new(playing_sink(), 1));
    b.handle(AudioCmd::Pause);

    b.tick();
    assert!(events.try_recv().is_err());
}

#[test]
fn queued_loads_collapse_to_the_last_one() {
    let (mut b, events) = backend();
    let (tx, rx) = mpsc::channel();
    tx.send(load("/music/1.mp3", 1)).unwrap();
    tx.send(load("/music/2.mp3", 2)).unwrap();
    tx.send(AudioCmd::SetVolume(0.2)).unwrap();
    tx.send(load("/music/3.mp3", 3)).unwrap();
    tx.send(AudioCmd::Play).unwrap();
    drop(tx);

    run(&mut b, &rx, Duration::from_millis(5));

    let received: Vec<u64> = events.try_iter().map(|e| e.generation()).collect();
    assert_eq!(received, vec![3]);
    assert!((b.volume - 0.2).abs() < 1e-6);
    assert!(b.paused);
}

#[test]
fn quit_skips_loads_queued_before_it() {
    let (mut b, events) = backend();
    let (tx, rx) = mpsc::channel();
    tx.send(load("/music/1.mp3", 1)).unwrap();
    tx.send(AudioCmd::Quit { fade_out_ms: 0 }).unwrap();
    tx.send(load("/music/2.mp3", 2)).unwrap();

    run(&mut b, &rx, Duration::from_millis(5));

    assert!(events.try_recv().is_err());
}

#[test]
fn volume_is_clamped_and_kept_for_later_sources() {
    let (mut b, _events) = backend();
    b.handle(AudioCmd::SetVolume(3.0));
    assert_eq!(b.volume, 1.0);
    b.handle(AudioCmd::SetVolume(-1.0));
    assert_eq!(b.volume, 0.0);
}
