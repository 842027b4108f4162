//! A cancellable deadline.
//!
//! The timer never sleeps. Callers arm it with the current instant and ask
//! later whether it is due, or wait on [`DebounceTimer::deadline`] in their
//! own event loop.

use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTimer {
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`, replacing any
    /// earlier deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) -> Instant {
        let deadline = now + delay;
        self.deadline = Some(deadline);
        deadline
    }

    /// Disarm the timer. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_pushes_deadline_back() {
        let t0 = Instant::now();
        let delay = Duration::from_millis(100);
        let mut timer = DebounceTimer::new();

        timer.arm(t0, delay);
        timer.arm(t0 + Duration::from_millis(60), delay);

        assert!(!timer.fire_if_due(t0 + Duration::from_millis(100)));
        assert!(timer.fire_if_due(t0 + Duration::from_millis(160)));
        assert!(!timer.is_armed());
        assert!(!timer.fire_if_due(t0 + Duration::from_secs(10)));
    }

    #[test]
    fn test_cancel() {
        let mut timer = DebounceTimer::new();
        assert!(!timer.cancel());
        timer.arm(Instant::now(), Duration::ZERO);
        assert!(timer.cancel());
        assert_eq!(timer.deadline(), None);
    }
}
