//! L4 Atomic Layer: Time-stamped window during which scroll events are
//! attributed to the engine's own programmatic scrolls

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SuppressionWindow {
    until: Option<Instant>,
}

impl SuppressionWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or extend) the window to cover `now + length`
    ///
    /// The deadline only ever moves forward, so a second programmatic scroll
    /// shortly after the first keeps both covered.
    pub fn arm(&mut self, now: Instant, length: Duration) {
        let deadline = now + length;
        self.until = Some(match self.until {
            Some(current) if current > deadline => current,
            _ => deadline,
        });
    }

    #[inline]
    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.until
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_expires() {
        let t0 = Instant::now();
        let mut window = SuppressionWindow::new();
        assert!(!window.is_active(t0));

        window.arm(t0, Duration::from_millis(100));
        assert!(window.is_active(t0));
        assert!(window.is_active(t0 + Duration::from_millis(99)));
        assert!(!window.is_active(t0 + Duration::from_millis(100)));
    }

    #[test]
    fn test_rearm_extends_never_shortens() {
        let t0 = Instant::now();
        let mut window = SuppressionWindow::new();

        window.arm(t0, Duration::from_millis(100));
        window.arm(t0 + Duration::from_millis(60), Duration::from_millis(100));
        assert!(window.is_active(t0 + Duration::from_millis(150)));

        // A shorter arm later on does not pull the deadline back
        window.arm(t0 + Duration::from_millis(70), Duration::from_millis(10));
        assert_eq!(window.deadline(), Some(t0 + Duration::from_millis(160)));
    }

    #[test]
    fn test_clear() {
        let t0 = Instant::now();
        let mut window = SuppressionWindow::new();
        window.arm(t0, Duration::from_secs(1));
        window.clear();
        assert!(!window.is_active(t0));
    }
}
