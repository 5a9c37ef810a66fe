use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single timed lyric line. `time` is in milliseconds from track start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    pub time: i64,
    pub main_text: String,
    /// Secondary text (translation or romanization), empty when absent.
    #[serde(default)]
    pub sub_text: String,
}

#[cfg(test)]
impl LyricLine {
    pub fn new(time: i64, main_text: impl Into<String>, sub_text: impl Into<String>) -> Self {
        Self {
            time,
            main_text: main_text.into(),
            sub_text: sub_text.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LyricsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
