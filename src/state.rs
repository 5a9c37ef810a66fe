// state.rs: What the overlay currently shows

use crate::event::Update;
use crate::lyrics::LyricLine;
use crate::player::TrackIdentity;

/// Shown before any track has been seen.
pub const READY_TEXT: &str = "Lyrics ready";
/// Shown when no lyric line is active at the current position.
pub const PLACEHOLDER_TEXT: &str = "...";

/// The main/sub text pair currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub main_text: String,
    pub sub_text: String,
}

impl Display {
    pub fn ready() -> Self {
        Self {
            main_text: READY_TEXT.to_string(),
            sub_text: String::new(),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            main_text: PLACEHOLDER_TEXT.to_string(),
            sub_text: String::new(),
        }
    }

    pub fn from_line(line: &LyricLine) -> Self {
        Self {
            main_text: line.main_text.clone(),
            sub_text: line.sub_text.clone(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::ready()
    }
}

/// Renderer-facing state, plus versioning.
#[derive(Debug, Default)]
pub struct OverlayState {
    pub display: Display,
    pub locked: bool,
    pub settings_open: bool,
    pub track: Option<TrackIdentity>,
    pub version: u64, // Incremented on any state change
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the displayed text changed.
    pub fn set_display(&mut self, display: Display) -> bool {
        if self.display == display {
            return false;
        }
        self.display = display;
        self.version += 1;
        true
    }

    pub fn set_locked(&mut self, locked: bool) -> bool {
        if self.locked == locked {
            return false;
        }
        self.locked = locked;
        self.version += 1;
        true
    }

    pub fn set_settings_open(&mut self, open: bool) -> bool {
        if self.settings_open == open {
            return false;
        }
        self.settings_open = open;
        self.version += 1;
        true
    }

    pub fn set_track(&mut self, track: TrackIdentity) {
        self.track = Some(track);
        self.version += 1;
    }

    pub fn snapshot(&self) -> Update {
        Update {
            main_text: self.display.main_text.clone(),
            sub_text: self.display.sub_text.clone(),
            locked: self.locked,
            settings_open: self.settings_open,
            track: self.track.clone(),
            version: self.version,
        }
    }
}
