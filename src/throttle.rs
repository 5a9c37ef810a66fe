//! Rate limiting of position-driven lyric lookups.
//!
//! The throttler is a plain state machine over explicit instants; the event
//! loop owns the actual timer by sleeping until [`UpdateThrottler::deadline`]
//! and then calling [`UpdateThrottler::expire`].

use std::time::Duration;
use tokio::time::Instant;

/// Minimum quiet period between two lookups.
pub const QUIET_WINDOW: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct UpdateThrottler {
    window: Duration,
    deadline: Option<Instant>,
    last_looked_up: Option<i64>,
    pending: Option<i64>,
}

impl Default for UpdateThrottler {
    fn default() -> Self {
        Self::new(QUIET_WINDOW)
    }
}

impl UpdateThrottler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            last_looked_up: None,
            pending: None,
        }
    }

    /// Offer a position. Returns the position to look up right now, if any.
    ///
    /// Outside a quiet window the position is returned immediately and a
    /// window is opened; inside one it is held as the pending value,
    /// replacing any earlier pending value.
    pub fn submit(&mut self, position: i64, now: Instant) -> Option<i64> {
        if self.deadline.is_some() {
            self.pending = Some(position);
            return None;
        }
        self.look_up(position, now)
    }

    /// When the current quiet window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Close the quiet window. Returns the pending position if it differs
    /// from the last one looked up; flushing opens a new window.
    pub fn expire(&mut self, now: Instant) -> Option<i64> {
        self.deadline = None;
        match self.pending.take() {
            Some(position) if Some(position) != self.last_looked_up => self.look_up(position, now),
            _ => None,
        }
    }

    /// Forget all timing state so the next submission is looked up at once.
    pub fn reset(&mut self) {
        self.deadline = None;
        self.last_looked_up = None;
        self.pending = None;
    }

    fn look_up(&mut self, position: i64, now: Instant) -> Option<i64> {
        self.last_looked_up = Some(position);
        self.deadline = Some(now + self.window);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_submission_is_immediate() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        assert_eq!(t.submit(100, t0), Some(100));
        assert_eq!(t.deadline(), Some(t0 + QUIET_WINDOW));
    }

    #[test]
    fn burst_coalesces_to_latest_value() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        let mut lookups = Vec::new();

        for (i, pos) in [100, 116, 133, 150].into_iter().enumerate() {
            lookups.extend(t.submit(pos, t0 + MS * (i as u32 * 16)));
        }
        let deadline = t.deadline().unwrap();
        lookups.extend(t.expire(deadline));

        assert_eq!(lookups, vec![100, 150]);
    }

    #[test]
    fn unchanged_pending_value_is_not_looked_up_twice() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        assert_eq!(t.submit(700, t0), Some(700));
        assert_eq!(t.submit(700, t0 + MS * 16), None);
        assert_eq!(t.expire(t0 + QUIET_WINDOW), None);
        assert_eq!(t.deadline(), None);
    }

    #[test]
    fn quiet_expiry_without_pending_closes_window() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        t.submit(1, t0);
        assert_eq!(t.expire(t0 + QUIET_WINDOW), None);
        assert_eq!(t.deadline(), None);
        let t1 = t0 + QUIET_WINDOW + MS;
        assert_eq!(t.submit(2, t1), Some(2));
    }

    #[test]
    fn flush_opens_a_new_window() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        t.submit(10, t0);
        t.submit(20, t0 + MS * 10);

        let close = t0 + QUIET_WINDOW;
        assert_eq!(t.expire(close), Some(20));
        assert_eq!(t.deadline(), Some(close + QUIET_WINDOW));
        // Right after a flush a new value waits for the next window.
        assert_eq!(t.submit(30, close + MS), None);
        assert_eq!(t.expire(close + QUIET_WINDOW), Some(30));
    }

    #[test]
    fn bursts_produce_one_or_two_lookups_ending_on_last_value() {
        for n in 1..20i64 {
            let t0 = Instant::now();
            let mut t = UpdateThrottler::default();
            let mut lookups = Vec::new();
            for i in 0..n {
                lookups.extend(t.submit(i * 7, t0 + MS * (i as u32 % 50)));
            }
            if let Some(deadline) = t.deadline() {
                lookups.extend(t.expire(deadline));
            }
            assert!(lookups.len() == 1 || lookups.len() == 2, "n={n}: {lookups:?}");
            assert_eq!(*lookups.last().unwrap(), (n - 1) * 7);
        }
    }

    #[test]
    fn reset_allows_immediate_lookup() {
        let t0 = Instant::now();
        let mut t = UpdateThrottler::default();
        t.submit(5, t0);
        t.submit(6, t0 + MS);
        t.reset();
        assert_eq!(t.deadline(), None);
        assert_eq!(t.submit(5, t0 + MS * 2), Some(5));
    }
}
