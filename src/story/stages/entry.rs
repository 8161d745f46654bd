//! Opening screen: a single "open it" affordance

use crate::Millis;
use crate::story::timer::OneShot;

/// Completes on the first press, with no dwell
#[derive(Debug, Clone, Default)]
pub struct EntryStage {
    done: OneShot,
}

impl EntryStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press the open button; only the first press counts
    pub fn open(&mut self, now: Millis) -> bool {
        self.done.arm_once(now, 0.0)
    }

    pub fn is_opened(&self) -> bool {
        self.done.is_armed() || self.done.has_fired()
    }

    pub fn tick(&mut self, now: Millis) -> bool {
        self.done.fire(now)
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.done.deadline()
    }
}
