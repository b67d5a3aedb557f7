//! L3 Molecular Layer: Autoplay timer state machine
//!
//! Autoplay walks backwards through the diary (towards older entries), one
//! entry per interval. The scheduler only decides *when* to step and *which*
//! index comes next; the controller performs the scroll.
//!
//! State machine:
//!
//! ```text
//!            play / resume(idx > 0)
//!   Stopped ───────────────────────► Running ──tick at index 0──► Parked
//!      ▲                               │  ▲                         │
//!      └──────────── pause ────────────┘  └──── resume(idx > 0) ────┘
//!      ▲                                                            │
//!      └─────────────────────────── pause ──────────────────────────┘
//! ```
//!
//! `Parked` is the terminal state at the start of the diary: still "playing"
//! from the user's point of view, but no timer is pending and ticks do nothing.

use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayState {
    Stopped,
    Running,
    /// Playing, but frozen at the first entry
    Parked,
}

#[derive(Debug, Clone)]
pub struct AutoplayScheduler {
    state: AutoplayState,
    interval: Duration,
    /// Deadline of the next tick; `None` means no tick is scheduled
    next_tick: Option<Instant>,
}

impl AutoplayScheduler {
    pub fn new(interval: Duration, playing: bool) -> Self {
        Self {
            state: if playing {
                AutoplayState::Running
            } else {
                AutoplayState::Stopped
            },
            interval,
            next_tick: None,
        }
    }

    #[inline]
    pub fn state(&self) -> AutoplayState {
        self.state
    }

    /// Running or parked at the boundary
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state != AutoplayState::Stopped
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Start playback from `index`, scheduling the first tick one interval out
    pub fn play(&mut self, now: Instant, index: usize) {
        if index == 0 {
            self.state = AutoplayState::Parked;
            self.next_tick = None;
        } else {
            self.state = AutoplayState::Running;
            self.next_tick = Some(now + self.interval);
        }
        debug!("Autoplay {:?} at index {}", self.state, index);
    }

    /// Stop playback; a pending tick is cancelled immediately
    pub fn pause(&mut self) {
        self.state = AutoplayState::Stopped;
        self.next_tick = None;
    }

    /// Cancel the pending tick without leaving the playing state
    ///
    /// Used while the user is scrolling and while the view is unmounted.
    pub fn hold(&mut self) {
        self.next_tick = None;
    }

    /// Restart the timer after a hold, if playback is active
    pub fn resume(&mut self, now: Instant, index: usize) {
        if self.is_playing() {
            self.play(now, index);
        }
    }

    /// Whether a tick is due at `now`; reschedules the following tick
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state != AutoplayState::Running {
            return false;
        }
        match self.next_tick {
            Some(deadline) if deadline <= now => {
                let mut next = deadline + self.interval;
                if next <= now {
                    next = now + self.interval;
                }
                self.next_tick = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Index to move to from `current`, or `None` at the boundary
    ///
    /// Reaching the boundary parks the scheduler.
    pub fn advance(&mut self, current: usize) -> Option<usize> {
        if current == 0 {
            if self.state == AutoplayState::Running {
                debug!("Autoplay reached the first entry, parking");
                self.state = AutoplayState::Parked;
                self.next_tick = None;
            }
            return None;
        }
        Some(current - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(2000);

    #[test]
    fn test_initial_state() {
        assert_eq!(AutoplayScheduler::new(INTERVAL, true).state(), AutoplayState::Running);
        assert_eq!(AutoplayScheduler::new(INTERVAL, false).state(), AutoplayState::Stopped);
        // No tick until the timer is started
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        assert!(!scheduler.poll(Instant::now() + INTERVAL * 10));
    }

    #[test]
    fn test_ticks_at_interval() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        scheduler.play(t0, 5);

        assert!(!scheduler.poll(t0 + Duration::from_millis(1999)));
        assert!(scheduler.poll(t0 + INTERVAL));
        assert!(!scheduler.poll(t0 + INTERVAL));
        assert!(scheduler.poll(t0 + INTERVAL * 2));
    }

    #[test]
    fn test_pause_cancels_pending_tick() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        scheduler.play(t0, 5);
        scheduler.pause();

        assert!(!scheduler.poll(t0 + INTERVAL * 3));
        assert_eq!(scheduler.next_tick(), None);
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn test_boundary_parks() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        scheduler.play(t0, 1);

        assert_eq!(scheduler.advance(1), Some(0));
        assert_eq!(scheduler.advance(0), None);
        assert_eq!(scheduler.state(), AutoplayState::Parked);
        assert!(scheduler.is_playing());
        assert!(!scheduler.poll(t0 + INTERVAL * 5));

        // Moving away from the start lets it run again
        scheduler.resume(t0 + INTERVAL * 5, 3);
        assert_eq!(scheduler.state(), AutoplayState::Running);
    }

    #[test]
    fn test_hold_and_resume() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        scheduler.play(t0, 4);
        scheduler.hold();
        assert!(!scheduler.poll(t0 + INTERVAL));
        assert_eq!(scheduler.state(), AutoplayState::Running);

        let t1 = t0 + Duration::from_millis(3000);
        scheduler.resume(t1, 4);
        assert!(!scheduler.poll(t1 + Duration::from_millis(1000)));
        assert!(scheduler.poll(t1 + INTERVAL));
    }

    #[test]
    fn test_resume_when_stopped_is_noop() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, false);
        scheduler.resume(t0, 4);
        assert_eq!(scheduler.state(), AutoplayState::Stopped);
        assert_eq!(scheduler.next_tick(), None);
    }

    #[test]
    fn test_late_poll_does_not_burst() {
        let t0 = Instant::now();
        let mut scheduler = AutoplayScheduler::new(INTERVAL, true);
        scheduler.play(t0, 9);

        let late = t0 + INTERVAL * 4;
        assert!(scheduler.poll(late));
        assert!(!scheduler.poll(late));
        assert_eq!(scheduler.next_tick(), Some(late + INTERVAL));
    }
}
