//! Sorted lyric timeline for one track.

use crate::lyrics::types::LyricLine;

/// Result of resolving a playback position against a [`LyricIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Active { index: usize, line: &'a LyricLine },
    /// No line has started yet, or the index is empty.
    Unresolved,
}

/// Immutable, time-ordered lyric lines of a single track.
///
/// An index is never edited after construction; a track change builds a new
/// one and the owner swaps it in as a whole.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LyricIndex {
    lines: Vec<LyricLine>,
}

impl LyricIndex {
    /// Build an index, stable-sorting by time so that lines sharing a
    /// timestamp keep their source order.
    pub fn new(mut lines: Vec<LyricLine>) -> Self {
        lines.sort_by_key(|line| line.time);
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Return the last line whose time is `<= position`.
    ///
    /// Among equal timestamps the later line wins; positions past the final
    /// line hold on it.
    pub fn lookup(&self, position: i64) -> Lookup<'_> {
        // First index whose time is > position; everything before qualifies.
        let end = self.lines.partition_point(|line| line.time <= position);
        match end.checked_sub(1) {
            Some(index) => Lookup::Active {
                index,
                line: &self.lines[index],
            },
            None => Lookup::Unresolved,
        }
    }
}
