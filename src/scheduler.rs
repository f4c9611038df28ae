//! Cancellable timers driven by an explicit clock.
//!
//! Nothing here sleeps. The owner passes the current [`Instant`] to
//! [`Timer::poll`] and gets told whether the timer fired, which keeps the
//! reducer deterministic under test.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    interval: Duration,
    next_due: Option<Instant>,
    repeating: bool,
}

impl Timer {
    /// Fire once, `delay` after `now`.
    pub fn arm_once(&mut self, now: Instant, delay: Duration) {
        self.interval = delay;
        self.repeating = false;
        self.next_due = Some(now + delay);
    }

    /// Fire every `interval`, first at `now + interval`.
    pub fn arm_repeating(&mut self, now: Instant, interval: Duration) {
        self.interval = interval;
        self.repeating = true;
        self.next_due = Some(now + interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// True if the timer fired. A repeating timer re-arms relative to
    /// `now`, so a stalled clock fires it once rather than catching up.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = if self.repeating { Some(now + self.interval) } else { None };
                true
            }
            _ => false,
        }
    }
}

/// The timers a network connection owns.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timers {
    /// Periodic keepalive `PING`.
    pub ping: Timer,
    /// Checks how long ago the last line arrived.
    pub ping_timeout: Timer,
    /// Ends capability negotiation that takes too long.
    pub cap_grace: Timer,
}

impl Timers {
    /// Cancel everything, e.g. on disconnect.
    pub fn cancel_all(&mut self) {
        self.ping.cancel();
        self.ping_timeout.cancel();
        self.cap_grace.cancel();
    }

    /// Earliest deadline across all timers.
    pub fn next_due(&self) -> Option<Instant> {
        [self.ping, self.ping_timeout, self.cap_grace]
            .iter()
            .filter_map(Timer::next_due)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot() {
        let start = Instant::now();
        let mut timer = Timer::default();
        assert!(!timer.poll(start));

        timer.arm_once(start, Duration::from_secs(5));
        assert!(!timer.poll(start + Duration::from_secs(4)));
        assert!(timer.poll(start + Duration::from_secs(5)));
        assert!(!timer.is_armed());
        assert!(!timer.poll(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_repeating_rearms() {
        let start = Instant::now();
        let mut timer = Timer::default();
        timer.arm_repeating(start, Duration::from_secs(2));
        assert!(timer.poll(start + Duration::from_secs(2)));
        assert!(!timer.poll(start + Duration::from_secs(3)));
        assert!(timer.poll(start + Duration::from_secs(4)));
        timer.cancel();
        assert!(!timer.poll(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_timers_next_due() {
        let start = Instant::now();
        let mut timers = Timers::default();
        assert_eq!(timers.next_due(), None);
        timers.ping.arm_repeating(start, Duration::from_secs(20));
        timers.cap_grace.arm_once(start, Duration::from_secs(10));
        assert_eq!(timers.next_due(), Some(start + Duration::from_secs(10)));
        timers.cancel_all();
        assert_eq!(timers.next_due(), None);
    }
}
