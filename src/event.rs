use crate::config::{AppConfig, SettingsEdit};
use crate::lyrics::{LyricLine, LyricsError};
use crate::player::TrackIdentity;
use crate::poller::PollResult;
use crate::window::WindowSize;

/// Inbound requests from the window host and the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The host reports the window's actual size (user drag or an applied
    /// resize request).
    HostResized(WindowSize),
    /// Enter click-through mode.
    Lock,
    Unlock,
    OpenSettings,
    /// Leave the settings surface, persisting the configuration.
    CloseSettings,
    Edit(SettingsEdit),
    Shutdown,
}

/// Snapshot sent to the renderer whenever what it shows changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub main_text: String,
    pub sub_text: String,
    pub locked: bool,
    pub settings_open: bool,
    pub track: Option<TrackIdentity>,
    pub version: u64, // Incremented on any state change
}

/// Results of collaborator calls that ran outside the event loop.
#[derive(Debug)]
pub enum Event {
    Poll(PollResult),
    Lyrics {
        track: TrackIdentity,
        result: Result<Vec<LyricLine>, LyricsError>,
    },
    ConfigLoaded(Option<AppConfig>),
}
