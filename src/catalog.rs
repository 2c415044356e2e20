//! Track catalogs: where the library listing comes from.
//!
//! A catalog lists the audio files of one folder and hands back `Track`s
//! whose `url` the audio backend can open directly. Dropbox links are
//! short-lived, so listings are not cached.

mod dropbox;
mod local;

pub use dropbox::DropboxCatalog;
pub use local::LocalCatalog;

use tracing::info;

use crate::config::{CatalogProvider, CatalogSettings};
use crate::error::CatalogError;
use crate::library::Track;
use crate::store::LocalStore;

pub trait Catalog {
    /// Whether listing can be attempted at all.
    fn is_authenticated(&self) -> bool;

    /// List the audio files in `folder`.
    fn list_audio_files(&self, folder: &str) -> Result<Vec<Track>, CatalogError>;

    /// Forget any credentials, in memory and on disk.
    fn logout(&mut self);

    /// Folder listed when the user has not picked one.
    fn default_folder(&self) -> &str;

    /// Human-readable provider name for the settings screen.
    fn name(&self) -> &'static str;
}

/// Build the catalog selected by `settings.provider`.
pub fn from_settings(
    settings: &CatalogSettings,
    store: &LocalStore,
) -> Result<Box<dyn Catalog>, CatalogError> {
    info!(provider = ?settings.provider, "opening catalog");
    match settings.provider {
        CatalogProvider::Dropbox => Ok(Box::new(DropboxCatalog::new(settings, store.clone())?)),
        CatalogProvider::Local => {
            let root = settings
                .local_root
                .clone()
                .ok_or_else(|| CatalogError::Config("catalog.local_root is not set".to_string()))?;
            Ok(Box::new(LocalCatalog::new(root, settings.extensions.clone())))
        }
    }
}
