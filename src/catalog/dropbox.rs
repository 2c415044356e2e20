use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::CatalogSettings;
use crate::error::CatalogError;
use crate::library::{Track, has_audio_extension, normalize_remote_path, parse_track_name};
use crate::store::{LocalStore, TOKEN_KEY};

use super::Catalog;

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<Entry>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct Entry {
    #[serde(rename = ".tag")]
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemporaryLink {
    link: String,
}

#[derive(Serialize)]
struct ListFolderArgs<'a> {
    path: &'a str,
    recursive: bool,
    include_media_info: bool,
}

/// Dropbox HTTP API catalog.
///
/// The access token comes from `catalog.access_token`, or else from the
/// `dropboxToken` store key.
pub struct DropboxCatalog {
    http: Client,
    api_base: String,
    folder: String,
    extensions: Vec<String>,
    token: Option<String>,
    store: LocalStore,
}

impl DropboxCatalog {
    pub fn new(settings: &CatalogSettings, store: LocalStore) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;

        let token = settings
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| store.get_or_default::<Option<String>>(TOKEN_KEY))
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            http,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            folder: settings.folder.clone(),
            extensions: settings.extensions.clone(),
            token,
            store,
        })
    }

    /// Use `token` from now on and persist it.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        if let Err(e) = self.store.set(TOKEN_KEY, &token) {
            warn!(error = %e, "failed to persist access token");
        }
        self.token = Some(token);
    }

    fn rpc<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<R, CatalogError> {
        let token = self.token.as_deref().ok_or(CatalogError::NotAuthenticated)?;
        let url = format!("{}/2/{}", self.api_base, endpoint);
        debug!(url = %url, "dropbox request");

        let response = self.http.post(&url).bearer_auth(token).json(body).send()?;
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .map_err(|e| CatalogError::Decode(format!("{endpoint}: {e}")))
        } else if status.as_u16() == 401 {
            Err(CatalogError::NotAuthenticated)
        } else {
            let body = response.text().unwrap_or_default();
            Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn list_entries(&self, path: &str) -> Result<Vec<Entry>, CatalogError> {
        let mut page: ListFolderResponse = self.rpc(
            "files/list_folder",
            &ListFolderArgs {
                path,
                recursive: false,
                include_media_info: true,
            },
        )?;
        let mut entries = std::mem::take(&mut page.entries);

        while page.has_more {
            page = self.rpc("files/list_folder/continue", &json!({ "cursor": page.cursor }))?;
            entries.append(&mut page.entries);
        }
        Ok(entries)
    }

    fn temporary_link(&self, path: &str) -> Result<String, CatalogError> {
        let path = normalize_remote_path(path);
        let link: TemporaryLink = self.rpc("files/get_temporary_link", &json!({ "path": path }))?;
        Ok(link.link)
    }
}

/// Map one listing entry to a track, skipping folders and non-audio files.
pub(super) fn track_from_entry(entry: &Entry, extensions: &[String]) -> Option<Track> {
    if entry.tag != "file" || !has_audio_extension(&entry.name, extensions) {
        return None;
    }
    let parsed = parse_track_name(&entry.name);
    let id = entry
        .path_lower
        .clone()
        .unwrap_or_else(|| entry.name.clone());

    let mut track = Track::new(id, parsed.title);
    track.artist = parsed.artist;
    Some(track)
}

impl Catalog for DropboxCatalog {
    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn list_audio_files(&self, folder: &str) -> Result<Vec<Track>, CatalogError> {
        let path = normalize_remote_path(folder);
        info!(folder = %path, "listing dropbox folder");

        let entries = self.list_entries(&path)?;
        let total = entries.len();
        let mut tracks: Vec<Track> = entries
            .iter()
            .filter_map(|e| track_from_entry(e, &self.extensions))
            .collect();
        debug!(total, audio = tracks.len(), "filtered listing");

        for track in &mut tracks {
            match self.temporary_link(&track.id) {
                Ok(link) => track.url = link,
                Err(CatalogError::NotAuthenticated) => return Err(CatalogError::NotAuthenticated),
                Err(e) => warn!(track = %track.id, error = %e, "failed to resolve link"),
            }
        }

        info!(count = tracks.len(), "listed audio files");
        Ok(tracks)
    }

    fn logout(&mut self) {
        self.token = None;
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to remove stored token");
        }
        info!("logged out of dropbox");
    }

    fn default_folder(&self) -> &str {
        &self.folder
    }

    fn name(&self) -> &'static str {
        "Dropbox"
    }
}
