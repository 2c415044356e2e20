use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::CatalogError;
use crate::library::{Track, has_audio_extension, parse_track_name};

use super::Catalog;

/// Catalog backed by a folder on disk. Always authenticated.
pub struct LocalCatalog {
    root: PathBuf,
    extensions: Vec<String>,
}

impl LocalCatalog {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    fn resolve(&self, folder: &str) -> PathBuf {
        let rel = folder.trim().trim_matches('/');
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn track_from_path(path: &Path) -> Option<Track> {
    let file_name = path.file_name()?.to_str()?;
    let location = path.to_str()?;
    let parsed = parse_track_name(file_name);

    let mut track = Track::new(location, parsed.title).with_url(location);
    track.artist = parsed.artist;
    Some(track)
}

/// Audio files under `dir`, recursively, hidden entries skipped.
fn scan(dir: &Path, extensions: &[String]) -> Vec<Track> {
    let mut tracks: Vec<Track> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| has_audio_extension(name, extensions))
        })
        .filter_map(|e| track_from_path(e.path()))
        .collect();

    tracks.sort_by_key(|t| t.display().to_lowercase());
    tracks
}

impl Catalog for LocalCatalog {
    fn is_authenticated(&self) -> bool {
        true
    }

    fn list_audio_files(&self, folder: &str) -> Result<Vec<Track>, CatalogError> {
        let dir = self.resolve(folder);
        if !dir.is_dir() {
            return Err(CatalogError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )));
        }

        debug!(dir = %dir.display(), "scanning local folder");
        let tracks = scan(&dir, &self.extensions);
        info!(count = tracks.len(), "listed audio files");
        Ok(tracks)
    }

    fn logout(&mut self) {}

    fn default_folder(&self) -> &str {
        ""
    }

    fn name(&self) -> &'static str {
        "Local folder"
    }
}
