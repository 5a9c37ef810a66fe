//! Local lyrics database.
//!
//! A JSON file mapping track file names to already-timed lyric lines. The
//! database is read once at startup and answers lookups from memory. It does
//! not parse any lyric file format; lines are stored exactly as the engine
//! consumes them.
//!
//! # Storage Format
//!
//! ```json
//! {
//!   "entries": {
//!     "artist - song": {
//!       "file_name": "Artist - Song.flac",
//!       "lines": [{ "time": 0, "mainText": "...", "subText": "" }]
//!     }
//!   }
//! }
//! ```
//!
//! Keys are the lowercase file stem, so `Song.flac`, `song.mp3` and `SONG`
//! all resolve to the same entry.

use crate::lyrics::LyricSource;
use crate::lyrics::types::{LyricLine, LyricsError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// Database entry for a single track's lyrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricsEntry {
    /// Original file name the lines were recorded for.
    #[serde(default)]
    pub file_name: String,
    pub lines: Vec<LyricLine>,
}

/// In-memory database structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LyricsDatabase {
    entries: HashMap<String, LyricsEntry>,
}

impl LyricsDatabase {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Lowercase, trimmed file stem (the name without its last extension).
    fn normalize(file_name: &str) -> String {
        let trimmed = file_name.trim();
        let base = trimmed
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(trimmed);
        let stem = match base.rfind('.') {
            Some(idx) if idx > 0 => &base[..idx],
            _ => base,
        };
        stem.to_lowercase()
    }

    pub fn get(&self, file_name: &str) -> Option<&LyricsEntry> {
        self.entries.get(&Self::normalize(file_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl LyricSource for LyricsDatabase {
    async fn fetch_lyric_lines(&self, file_name: &str) -> Result<Vec<LyricLine>, LyricsError> {
        Ok(self
            .get(file_name)
            .map(|entry| entry.lines.clone())
            .unwrap_or_default())
    }
}

/// Loads the database from a JSON file.
///
/// Returns an empty database if the file doesn't exist or is invalid.
pub async fn load_database(path: &Path) -> LyricsDatabase {
    match load_database_inner(path).await {
        Ok(db) => {
            tracing::info!(
                path = %path.display(),
                entries = db.len(),
                "Loaded lyrics database"
            );
            db
        }
        Err(LyricsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(
                path = %path.display(),
                "No lyrics database found, starting empty"
            );
            LyricsDatabase::new()
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to load lyrics database, using empty database"
            );
            LyricsDatabase::new()
        }
    }
}

async fn load_database_inner(path: &Path) -> Result<LyricsDatabase, LyricsError> {
    let contents = fs::read_to_string(path).await?;
    let raw: LyricsDatabase = serde_json::from_str(&contents)?;
    // Re-key through `normalize` so hand-written files may use any casing.
    let entries = raw
        .entries
        .into_iter()
        .map(|(key, entry)| (LyricsDatabase::normalize(&key), entry))
        .collect();
    Ok(LyricsDatabase { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "entries": {
            "Artist - Song": {
                "file_name": "Artist - Song.flac",
                "lines": [
                    { "time": 0, "mainText": "first" },
                    { "time": 1200, "mainText": "second", "subText": "zweite" }
                ]
            }
        }
    }"#;

    #[test]
    fn normalize_strips_directory_and_extension() {
        assert_eq!(LyricsDatabase::normalize("Song.FLAC"), "song");
        assert_eq!(LyricsDatabase::normalize("/music/a/Song.mp3"), "song");
        assert_eq!(LyricsDatabase::normalize("C:\\music\\Song.mp3"), "song");
        assert_eq!(LyricsDatabase::normalize("  Song  "), "song");
        assert_eq!(LyricsDatabase::normalize(".hidden"), ".hidden");
        assert_eq!(LyricsDatabase::normalize("a.b.c"), "a.b");
    }

    #[tokio::test]
    async fn loads_entries_and_resolves_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lyrics.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let db = load_database(&path).await;
        assert_eq!(db.len(), 1);

        let lines = db.fetch_lyric_lines("artist - song.mp3").await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].sub_text, "");
        assert_eq!(lines[1], LyricLine::new(1200, "second", "zweite"));
    }

    #[tokio::test]
    async fn unknown_track_yields_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lyrics.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let db = load_database(&path).await;
        assert!(db.fetch_lyric_lines("other.flac").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_or_malformed_file_gives_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_database(&dir.path().join("absent.json")).await;
        assert_eq!(missing.len(), 0);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(load_database(&bad).await.len(), 0);
    }
}
