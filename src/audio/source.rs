//! Opening playable sources from URLs or paths.
//!
//! Remote links are downloaded into memory; local files are streamed from
//! disk. Either way the result is handed to `rodio`'s decoder.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::debug;

use crate::error::AudioError;

pub(super) trait MediaReader: Read + Seek + Send + Sync {}
impl<T: Read + Seek + Send + Sync> MediaReader for T {}

pub(super) type MediaDecoder = Decoder<Box<dyn MediaReader>>;

/// Where a URL points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Location<'a> {
    Remote(&'a str),
    Local(&'a str),
}

pub(super) fn classify(url: &str) -> Location<'_> {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Location::Remote(url)
    } else if let Some(path) = url.strip_prefix("file://") {
        Location::Local(path)
    } else {
        Location::Local(url)
    }
}

fn open_reader(
    url: &str,
    http: &reqwest::blocking::Client,
) -> Result<Box<dyn MediaReader>, AudioError> {
    match classify(url) {
        Location::Remote(link) => {
            let fetch = |source| AudioError::Fetch {
                url: link.to_string(),
                source,
            };
            let bytes = http
                .get(link)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map_err(fetch)?;
            debug!(len = bytes.len(), "fetched remote source");
            Ok(Box::new(Cursor::new(bytes.to_vec())))
        }
        Location::Local(path) => {
            let file = File::open(path).map_err(|source| AudioError::Open {
                path: path.to_string(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Open and decode `url`.
pub(super) fn open_source(
    url: &str,
    http: &reqwest::blocking::Client,
) -> Result<MediaDecoder, AudioError> {
    let reader = open_reader(url, http)?;
    Decoder::new(reader).map_err(|e| AudioError::Decode(format!("{url}: {e}")))
}

/// Create a paused `Sink` playing `source` at `volume`.
///
/// Returns the sink and the duration reported by the container (zero when unknown).
pub(super) fn create_sink(
    stream: &OutputStream,
    source: MediaDecoder,
    volume: f32,
) -> (Sink, Duration) {
    let duration = source.total_duration().unwrap_or(Duration::ZERO);
    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    (sink, duration)
}
