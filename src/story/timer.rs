//! One-shot timers owned by the component that arms them
//!
//! A timer never outlives its owner: dropping the stage drops its timers,
//! so nothing can fire into an unmounted stage.

use crate::Millis;

/// Single-deadline timer polled against host time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneShot {
    deadline: Option<Millis>,
    fired: bool,
}

impl OneShot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) to fire `delay` after `now`; a pending deadline is replaced
    pub fn arm(&mut self, now: Millis, delay: Millis) {
        self.deadline = Some(now + delay);
        self.fired = false;
    }

    /// Arm only if this timer has never been armed
    ///
    /// Returns true when the timer was armed by this call.
    pub fn arm_once(&mut self, now: Millis, delay: Millis) -> bool {
        if self.deadline.is_some() || self.fired {
            return false;
        }
        self.deadline = Some(now + delay);
        true
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether this arming has already fired
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// Returns true exactly once when `now` reaches the deadline
    pub fn fire(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.fired = true;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Millis>>) -> Option<Millis> {
    deadlines.into_iter().flatten().reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let mut timer = OneShot::new();
        timer.arm(100.0, 50.0);
        assert!(!timer.fire(149.0));
        assert!(timer.fire(150.0));
        assert!(!timer.fire(500.0));
        assert!(timer.has_fired());
    }

    #[test]
    fn test_arm_once_ignores_rearm() {
        let mut timer = OneShot::new();
        assert!(timer.arm_once(0.0, 100.0));
        assert!(!timer.arm_once(50.0, 100.0));
        assert_eq!(timer.deadline(), Some(100.0));
        assert!(timer.fire(100.0));
        // A fired timer stays spent for arm_once
        assert!(!timer.arm_once(200.0, 100.0));
    }

    #[test]
    fn test_arm_resets_window() {
        let mut timer = OneShot::new();
        timer.arm(0.0, 1500.0);
        timer.arm(1000.0, 1500.0);
        assert!(!timer.fire(1500.0));
        assert!(timer.fire(2500.0));
    }

    #[test]
    fn test_cancel() {
        let mut timer = OneShot::new();
        timer.arm(0.0, 10.0);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(1000.0));
    }

    #[test]
    fn test_earliest() {
        assert_eq!(earliest([None, Some(30.0), Some(10.0)]), Some(10.0));
        assert_eq!(earliest([None, None]), None);
    }
}
