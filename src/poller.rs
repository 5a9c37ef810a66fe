//! Periodic polling of the external player.
//!
//! Each poll reads track identity and playback sample from the same player in
//! a spawned task and reports both back to the event loop as one result, so a
//! cycle is applied as a single state transition or not at all. Only one
//! poll is outstanding at a time: if the player hangs, interval ticks are
//! skipped until it answers, and the event loop itself keeps running. A poll
//! task that dies without reporting frees the slot for the next tick.

use crate::event::Event;
use crate::player::{PlaybackSample, PlaybackState, PlayerSource, TrackIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use crate::player::PollResult;

/// Default interval between polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// State change derived from a successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollTransition {
    pub track: TrackIdentity,
    pub sample: PlaybackSample,
    /// The track differs from the previously observed one.
    pub track_changed: bool,
    /// Playback left `Playing` while the overlay was locked.
    pub unlock: bool,
}

pub struct PlaybackPoller<P> {
    player: Arc<P>,
    /// The outstanding poll, until its result is observed.
    in_flight: Option<JoinHandle<()>>,
    last_track: Option<TrackIdentity>,
    last_state: PlaybackState,
}

impl<P: PlayerSource> PlaybackPoller<P> {
    pub fn new(player: Arc<P>) -> Self {
        Self {
            player,
            in_flight: None,
            last_track: None,
            last_state: PlaybackState::Stopped,
        }
    }

    /// Start a poll unless one is still outstanding. Returns whether a poll
    /// was started.
    pub fn start_poll(&mut self, events: &mpsc::Sender<Event>) -> bool {
        if let Some(task) = &self.in_flight {
            if !task.is_finished() {
                tracing::trace!("Previous poll still outstanding, skipping tick");
                return false;
            }
            tracing::warn!("Previous poll ended without a result");
        }

        let player = Arc::clone(&self.player);
        let events = events.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = player.fetch_poll().await;
            let _ = events.send(Event::Poll(result)).await;
        }));
        true
    }

    /// Fold a poll result into the poller's view of the player.
    ///
    /// A failed poll changes nothing and yields `None`; the next poll simply
    /// tries again.
    pub fn observe(&mut self, result: PollResult, locked: bool) -> Option<PollTransition> {
        self.in_flight = None;
        let (track, sample) = match result {
            Ok(pair) => pair,
            Err(e) => {
                tracing::debug!(error = %e, "Player poll failed, keeping previous state");
                return None;
            }
        };

        let track_changed = self.last_track.as_ref() != Some(&track);
        if track_changed {
            self.last_track = Some(track.clone());
        }

        let unlock = locked && self.last_state.is_playing() && !sample.is_playing();
        self.last_state = sample.state;

        Some(PollTransition {
            track,
            sample,
            track_changed,
            unlock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerError;
    use tokio::time::Instant;

    struct FixedPlayer {
        track: TrackIdentity,
        position: i64,
    }

    impl PlayerSource for FixedPlayer {
        async fn fetch_track_identity(&self) -> Result<TrackIdentity, PlayerError> {
            Ok(self.track.clone())
        }

        async fn fetch_playback_sample(&self) -> Result<PlaybackSample, PlayerError> {
            Ok(PlaybackSample {
                position: self.position,
                state: PlaybackState::Playing,
                sampled_at: Instant::now(),
            })
        }
    }

    /// Answers whole cycles only; the single reads always fail.
    struct CyclePlayer;

    impl PlayerSource for CyclePlayer {
        async fn fetch_track_identity(&self) -> Result<TrackIdentity, PlayerError> {
            Err(PlayerError::NoPlayer)
        }

        async fn fetch_playback_sample(&self) -> Result<PlaybackSample, PlayerError> {
            Err(PlayerError::NoPlayer)
        }

        async fn fetch_poll(&self) -> PollResult {
            Ok((track("cycle.mp3", 7), sample(PlaybackState::Paused)))
        }
    }

    struct PanickingPlayer;

    impl PlayerSource for PanickingPlayer {
        async fn fetch_track_identity(&self) -> Result<TrackIdentity, PlayerError> {
            panic!("player driver bug")
        }

        async fn fetch_playback_sample(&self) -> Result<PlaybackSample, PlayerError> {
            panic!("player driver bug")
        }
    }

    fn track(name: &str, number: i32) -> TrackIdentity {
        TrackIdentity {
            file_name: name.to_string(),
            track_number: number,
        }
    }

    fn sample(state: PlaybackState) -> PlaybackSample {
        PlaybackSample {
            position: 1000,
            state,
            sampled_at: Instant::now(),
        }
    }

    fn poller() -> PlaybackPoller<FixedPlayer> {
        PlaybackPoller::new(Arc::new(FixedPlayer {
            track: track("a.mp3", 1),
            position: 0,
        }))
    }

    #[test]
    fn first_observation_is_a_track_change() {
        let mut p = poller();
        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), false).unwrap();
        assert!(t.track_changed);

        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), false).unwrap();
        assert!(!t.track_changed);
    }

    #[test]
    fn track_identity_compares_both_fields() {
        let mut p = poller();
        p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), false);

        let t = p.observe(Ok((track("a.mp3", 2), sample(PlaybackState::Playing))), false).unwrap();
        assert!(t.track_changed);
        let t = p.observe(Ok((track("b.mp3", 2), sample(PlaybackState::Playing))), false).unwrap();
        assert!(t.track_changed);
    }

    #[test]
    fn failed_poll_leaves_state_untouched() {
        let mut p = poller();
        p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), true);

        assert_eq!(p.observe(Err(PlayerError::NoPlayer), true), None);

        // Still the same track, still considered playing.
        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Paused))), true).unwrap();
        assert!(!t.track_changed);
        assert!(t.unlock);
    }

    #[test]
    fn unlock_only_when_leaving_playing_while_locked() {
        let mut p = poller();
        p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), true);
        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Paused))), false).unwrap();
        assert!(!t.unlock, "not locked");

        p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Playing))), true);
        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Stopped))), true).unwrap();
        assert!(t.unlock);

        // Locking while already paused does not bounce straight back.
        let t = p.observe(Ok((track("a.mp3", 1), sample(PlaybackState::Paused))), true).unwrap();
        assert!(!t.unlock);
    }

    #[tokio::test]
    async fn only_one_poll_outstanding() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut p = poller();

        assert!(p.start_poll(&tx));
        assert!(!p.start_poll(&tx));

        let Some(Event::Poll(result)) = rx.recv().await else {
            panic!("expected a poll result");
        };
        let (track, sample) = result.as_ref().unwrap();
        assert_eq!(track.file_name, "a.mp3");
        assert_eq!(sample.position, 0);

        p.observe(result, false);
        assert!(p.start_poll(&tx));
    }

    #[tokio::test]
    async fn one_cycle_reads_from_one_player_call() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut p = PlaybackPoller::new(Arc::new(CyclePlayer));

        assert!(p.start_poll(&tx));
        let Some(Event::Poll(result)) = rx.recv().await else {
            panic!("expected a poll result");
        };
        let t = p.observe(result, false).unwrap();
        assert_eq!(t.track, track("cycle.mp3", 7));
        assert_eq!(t.sample.state, PlaybackState::Paused);
    }

    #[tokio::test]
    async fn panicking_player_does_not_stop_polling() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut p = PlaybackPoller::new(Arc::new(PanickingPlayer));

        assert!(p.start_poll(&tx));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());

        assert!(p.start_poll(&tx));
    }
}
