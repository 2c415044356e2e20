//! Filename and path conventions used when building tracks from a folder listing.

use std::path::Path;

/// Title and optional artist parsed from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub title: String,
    pub artist: Option<String>,
}

/// Parse `"Artist - Title.ext"` into its parts.
///
/// The split happens at the last `" - "` of the stem, so
/// `"A - B - C.mp3"` yields artist `"A - B"` and title `"C"`. Names that
/// do not follow the convention keep the stem as title and have no artist.
pub fn parse_track_name(file_name: &str) -> ParsedName {
    let stem = strip_extension(file_name);

    if let Some((artist, title)) = stem.rsplit_once(" - ") {
        let (artist, title) = (artist.trim(), title.trim());
        if !artist.is_empty() && !title.is_empty() {
            return ParsedName {
                title: title.to_string(),
                artist: Some(artist.to_string()),
            };
        }
    }

    ParsedName {
        title: stem.to_string(),
        artist: None,
    }
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(' ') => stem,
        _ => file_name,
    }
}

/// Whether `name` ends with one of `extensions` (case-insensitive, dot optional).
pub fn has_audio_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

/// Normalise a remote folder path: `""` for the root, otherwise a leading
/// `/` and no trailing `/`.
pub fn normalize_remote_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return String::new();
    }

    let mut out = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
