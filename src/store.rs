//! Local persistence: a small key/value store of JSON documents.
//!
//! Each key lives in its own file and is fully rewritten on every mutation.
//! The collections built on top of it (`RecentlyPlayed`, `UserPlaylists`)
//! are plain in-memory values that load from and save to the store.

mod kv;
mod playlists;
mod recent;

pub use kv::*;
pub use playlists::*;
pub use recent::*;

/// Most-recent-first list of tracks the user started.
pub const RECENTLY_PLAYED_KEY: &str = "recentlyPlayed";
/// User-defined playlists.
pub const USER_PLAYLISTS_KEY: &str = "userPlaylists";
/// Dropbox access token.
pub const TOKEN_KEY: &str = "dropboxToken";
