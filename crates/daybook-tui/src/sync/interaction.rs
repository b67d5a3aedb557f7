//! L3 Molecular Layer: Classifies scroll events and debounces manual scrolling
//!
//! A scroll only counts as manual when a pointer-start (wheel, click, scroll
//! key) preceded it. Scrolls inside the suppression window belong to the
//! engine and never touch the scrolling flag.

use std::time::{Duration, Instant};

use tracing::debug;

use super::suppression::SuppressionWindow;

/// Who caused a scroll event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    /// Inside the suppression window: the engine's own scroll
    Programmatic,
    /// User-driven, following a pointer start
    Manual,
    /// Neither (resize, host-driven reflow)
    Passive,
}

#[derive(Debug, Clone)]
pub struct InteractionDetector {
    settle: Duration,
    pointer_active: bool,
    user_scrolling: bool,
    settle_deadline: Option<Instant>,
}

impl InteractionDetector {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pointer_active: false,
            user_scrolling: false,
            settle_deadline: None,
        }
    }

    #[inline]
    pub fn is_scrolling(&self) -> bool {
        self.user_scrolling
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_deadline
    }

    /// Record genuine user intent; the next scrolls are manual
    pub fn pointer_start(&mut self) {
        self.pointer_active = true;
    }

    /// Classify a scroll event and update the scrolling flag
    ///
    /// Suppression wins over pointer intent: a user scroll landing inside the
    /// window is reported as `Programmatic` and does not hold autoplay. The
    /// pointer intent stays set for the next unsuppressed scroll.
    pub fn on_scroll(&mut self, now: Instant, suppression: &SuppressionWindow) -> ScrollKind {
        if suppression.is_active(now) {
            return ScrollKind::Programmatic;
        }
        if !self.pointer_active {
            return ScrollKind::Passive;
        }

        if !self.user_scrolling {
            debug!("Manual scrolling started");
        }
        self.user_scrolling = true;
        self.settle_deadline = Some(now + self.settle);
        ScrollKind::Manual
    }

    /// Fire the settle timer if it is due; returns true when scrolling settled
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.settle_deadline {
            Some(deadline) if deadline <= now => {
                debug!("Manual scrolling settled");
                self.settle_deadline = None;
                self.user_scrolling = false;
                self.pointer_active = false;
                true
            }
            _ => false,
        }
    }

    /// Drop all pending state (teardown)
    pub fn reset(&mut self) {
        self.pointer_active = false;
        self.user_scrolling = false;
        self.settle_deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(150);

    #[test]
    fn test_scroll_without_pointer_is_passive() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        let window = SuppressionWindow::new();

        assert_eq!(detector.on_scroll(t0, &window), ScrollKind::Passive);
        assert!(!detector.is_scrolling());
    }

    #[test]
    fn test_manual_scroll_debounces() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        let window = SuppressionWindow::new();

        detector.pointer_start();
        assert_eq!(detector.on_scroll(t0, &window), ScrollKind::Manual);
        assert!(detector.is_scrolling());

        // A second scroll restarts the settle timer
        let t1 = t0 + Duration::from_millis(100);
        detector.on_scroll(t1, &window);
        assert!(!detector.poll(t0 + SETTLE));
        assert!(detector.is_scrolling());

        assert!(detector.poll(t1 + SETTLE));
        assert!(!detector.is_scrolling());
        assert!(!detector.poll(t1 + SETTLE * 2));
    }

    #[test]
    fn test_suppressed_scroll_is_programmatic() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        let mut window = SuppressionWindow::new();
        window.arm(t0, Duration::from_millis(100));

        detector.pointer_start();
        assert_eq!(detector.on_scroll(t0, &window), ScrollKind::Programmatic);
        assert!(!detector.is_scrolling());
        assert_eq!(detector.settle_deadline(), None);
    }

    #[test]
    fn test_pointer_intent_outlives_suppressed_scroll() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        let mut window = SuppressionWindow::new();
        window.arm(t0, Duration::from_millis(100));

        detector.pointer_start();
        assert_eq!(
            detector.on_scroll(t0 + Duration::from_millis(50), &window),
            ScrollKind::Programmatic
        );
        assert_eq!(
            detector.on_scroll(t0 + Duration::from_millis(100), &window),
            ScrollKind::Manual
        );
        assert!(detector.is_scrolling());
    }

    #[test]
    fn test_settle_clears_pointer_intent() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        let window = SuppressionWindow::new();

        detector.pointer_start();
        detector.on_scroll(t0, &window);
        detector.poll(t0 + SETTLE);

        assert_eq!(detector.on_scroll(t0 + SETTLE * 2, &window), ScrollKind::Passive);
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut detector = InteractionDetector::new(SETTLE);
        detector.pointer_start();
        detector.on_scroll(t0, &SuppressionWindow::new());
        detector.reset();

        assert!(!detector.is_scrolling());
        assert!(!detector.poll(t0 + SETTLE));
    }
}
