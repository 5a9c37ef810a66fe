// lyrics/mod.rs - lyric data, timeline lookup and the local lyric source
pub mod database;
pub mod index;
pub mod types;

pub use index::{LyricIndex, Lookup};
pub use types::{LyricLine, LyricsError};

use std::future::Future;

/// Supplies the timed lines for a track, keyed by its file name.
///
/// An unknown track is not an error: implementations return an empty list.
pub trait LyricSource: Send + Sync + 'static {
    fn fetch_lyric_lines(
        &self,
        file_name: &str,
    ) -> impl Future<Output = Result<Vec<LyricLine>, LyricsError>> + Send;
}
