//! Media-player side of the overlay: the data polled from the player and the
//! trait a player driver implements.

pub mod connection;
pub mod mpris;

pub use connection::PlayerError;
pub use mpris::MprisPlayer;

use std::future::Future;
use tokio::time::Instant;

/// Identifies the loaded track. Only compared for equality to detect track
/// changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TrackIdentity {
    pub file_name: String,
    pub track_number: i32,
}

/// Player transport state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Paused,
    Playing,
}

impl PlaybackState {
    /// Map an MPRIS `PlaybackStatus` value.
    pub fn from_status(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            _ => Self::Stopped,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// One polled observation of the player clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSample {
    /// Position in milliseconds.
    pub position: i64,
    pub state: PlaybackState,
    /// Monotonic time at which `position` was observed.
    pub sampled_at: Instant,
}

impl PlaybackSample {
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }
}

/// Outcome of one poll cycle: both observations, or the first error.
pub type PollResult = Result<(TrackIdentity, PlaybackSample), PlayerError>;

/// Poll-style access to the external player.
pub trait PlayerSource: Send + Sync + 'static {
    fn fetch_track_identity(&self) -> impl Future<Output = Result<TrackIdentity, PlayerError>> + Send;

    fn fetch_playback_sample(&self) -> impl Future<Output = Result<PlaybackSample, PlayerError>> + Send;

    /// Identity and sample for one poll cycle, taken from the same player.
    ///
    /// Drivers that pick a player per call should override this to pick it
    /// once for both reads.
    fn fetch_poll(&self) -> impl Future<Output = PollResult> + Send {
        async move {
            let (track, sample) = tokio::join!(self.fetch_track_identity(), self.fetch_playback_sample());
            Ok((track?, sample?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SplitPlayer {
        track: Result<TrackIdentity, ()>,
    }

    impl PlayerSource for SplitPlayer {
        async fn fetch_track_identity(&self) -> Result<TrackIdentity, PlayerError> {
            self.track.clone().map_err(|()| PlayerError::NoPlayer)
        }

        async fn fetch_playback_sample(&self) -> Result<PlaybackSample, PlayerError> {
            Ok(PlaybackSample {
                position: 42,
                state: PlaybackState::Paused,
                sampled_at: Instant::now(),
            })
        }
    }

    #[tokio::test]
    async fn default_poll_pairs_both_reads() {
        let track = TrackIdentity {
            file_name: "a.flac".to_string(),
            track_number: 2,
        };
        let player = SplitPlayer { track: Ok(track.clone()) };
        let (polled, sample) = player.fetch_poll().await.unwrap();
        assert_eq!(polled, track);
        assert_eq!(sample.position, 42);

        let player = SplitPlayer { track: Err(()) };
        assert!(matches!(player.fetch_poll().await, Err(PlayerError::NoPlayer)));
    }

    #[test]
    fn playback_state_from_mpris_status() {
        assert_eq!(PlaybackState::from_status("Playing"), PlaybackState::Playing);
        assert_eq!(PlaybackState::from_status("Paused"), PlaybackState::Paused);
        assert_eq!(PlaybackState::from_status("Stopped"), PlaybackState::Stopped);
        assert_eq!(PlaybackState::from_status(""), PlaybackState::Stopped);
        assert!(PlaybackState::Playing.is_playing());
        assert!(!PlaybackState::Paused.is_playing());
    }
}
