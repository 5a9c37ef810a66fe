use crate::player::PlaybackSample;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Display frame period used to drive position estimation (~60 Hz).
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// Last applied observation of the player clock. Stored as one value so a
/// new sample replaces position, timestamp and playing flag together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    position: i64,
    sampled_at: Instant,
    playing: bool,
}

/// Extrapolates the playback position between polled samples.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PositionEstimator {
    anchor: Option<Anchor>,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the anchor with a freshly polled sample.
    pub fn apply(&mut self, sample: &PlaybackSample) {
        self.anchor = Some(Anchor {
            position: sanitize_position(sample.position),
            sampled_at: sample.sampled_at,
            playing: sample.is_playing(),
        });
    }

    /// Move the anchor back to the start of the track, keeping the playing
    /// flag. Used when a new track is detected.
    pub fn reset(&mut self, now: Instant) {
        let playing = self.is_playing();
        self.anchor = Some(Anchor {
            position: 0,
            sampled_at: now,
            playing,
        });
    }

    pub fn is_playing(&self) -> bool {
        self.anchor.is_some_and(|a| a.playing)
    }

    /// Estimated position in milliseconds at `now`.
    ///
    /// Frozen at the anchor while paused; advances linearly with wall-clock
    /// time while playing. Before any sample has been applied this is 0.
    pub fn estimate_at(&self, now: Instant) -> i64 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        if !anchor.playing {
            return anchor.position;
        }
        let elapsed = now.saturating_duration_since(anchor.sampled_at).as_millis();
        let elapsed = i64::try_from(elapsed).unwrap_or(i64::MAX);
        anchor.position.saturating_add(elapsed)
    }
}

/// Negative positions are not meaningful; clamp to zero.
pub fn sanitize_position(p: i64) -> i64 {
    p.max(0)
}

/// Repeating per-frame tick. Missed ticks are skipped rather than replayed,
/// so a loop that stalled does not fire a burst of frames afterwards.
pub fn frame_ticker() -> Interval {
    let mut interval = tokio::time::interval(FRAME_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlaybackState;

    fn sample(position: i64, state: PlaybackState, sampled_at: Instant) -> PlaybackSample {
        PlaybackSample {
            position,
            state,
            sampled_at,
        }
    }

    #[test]
    fn extrapolates_while_playing() {
        let t0 = Instant::now();
        let mut est = PositionEstimator::new();
        est.apply(&sample(1000, PlaybackState::Playing, t0));

        assert_eq!(est.estimate_at(t0), 1000);
        assert_eq!(est.estimate_at(t0 + Duration::from_millis(500)), 1500);
        assert_eq!(est.estimate_at(t0 + Duration::from_millis(2750)), 3750);
    }

    #[test]
    fn frozen_while_paused_or_stopped() {
        let t0 = Instant::now();
        let mut est = PositionEstimator::new();
        est.apply(&sample(4200, PlaybackState::Paused, t0));
        assert_eq!(est.estimate_at(t0 + Duration::from_secs(30)), 4200);

        est.apply(&sample(4200, PlaybackState::Stopped, t0));
        assert_eq!(est.estimate_at(t0 + Duration::from_secs(30)), 4200);
    }

    #[test]
    fn monotonic_between_samples() {
        let t0 = Instant::now();
        let mut est = PositionEstimator::new();
        est.apply(&sample(0, PlaybackState::Playing, t0));

        let mut last = i64::MIN;
        for ms in (0..2000).step_by(16) {
            let now = est.estimate_at(t0 + Duration::from_millis(ms));
            assert!(now >= last);
            assert_eq!(now, ms as i64);
            last = now;
        }
    }

    #[test]
    fn new_sample_replaces_anchor_completely() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(100);
        let mut est = PositionEstimator::new();
        est.apply(&sample(1000, PlaybackState::Playing, t0));
        est.apply(&sample(5000, PlaybackState::Playing, t1));

        assert_eq!(est.estimate_at(t1 + Duration::from_millis(50)), 5050);
    }

    #[test]
    fn clock_before_sample_does_not_go_backwards() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut est = PositionEstimator::new();
        est.apply(&sample(800, PlaybackState::Playing, t0));
        assert_eq!(est.estimate_at(t0 - Duration::from_millis(300)), 800);
    }

    #[test]
    fn reset_returns_to_start_and_keeps_playing_flag() {
        let t0 = Instant::now();
        let mut est = PositionEstimator::new();
        est.apply(&sample(90_000, PlaybackState::Playing, t0));

        let t1 = t0 + Duration::from_millis(10);
        est.reset(t1);
        assert!(est.is_playing());
        assert_eq!(est.estimate_at(t1 + Duration::from_millis(250)), 250);
    }

    #[test]
    fn negative_positions_are_clamped() {
        let t0 = Instant::now();
        let mut est = PositionEstimator::new();
        est.apply(&sample(-500, PlaybackState::Paused, t0));
        assert_eq!(est.estimate_at(t0), 0);
        assert_eq!(PositionEstimator::new().estimate_at(t0), 0);
    }
}
