//! Uniform completion gating
//!
//! Every interactive stage owns one gate over its configured item ids.
//! Acting on an item is idempotent; once every expected id has been acted
//! upon the gate latches, arms its dwell timer, and reports completion
//! exactly once when the dwell elapses. Order of interaction is irrelevant.

use std::collections::BTreeSet;

use super::timer::OneShot;
use crate::Millis;

/// Result of acting on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Act {
    /// Unknown id, already acted upon, or gate already latched
    Ignored,
    /// Newly counted; `saturated` is true for the act that filled the gate
    Accepted { count: usize, saturated: bool },
}

impl Act {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Act::Accepted { .. })
    }
}

/// Completion gate over a set of expected item ids
#[derive(Debug, Clone)]
pub struct CompletionGate<Id: Ord> {
    expected: BTreeSet<Id>,
    acted: BTreeSet<Id>,
    /// Set synchronously when the gate fills, before the dwell is armed
    latched: bool,
    dwell: Millis,
    timer: OneShot,
}

impl<Id: Ord + Copy> CompletionGate<Id> {
    /// Gate over `ids` completing `dwell` ms after the last one is acted upon
    pub fn new(ids: impl IntoIterator<Item = Id>, dwell: Millis) -> Self {
        Self {
            expected: ids.into_iter().collect(),
            acted: BTreeSet::new(),
            latched: false,
            dwell,
            timer: OneShot::new(),
        }
    }

    /// Record an interaction with `id`
    pub fn act(&mut self, id: Id, now: Millis) -> Act {
        if self.latched || !self.expected.contains(&id) || !self.acted.insert(id) {
            return Act::Ignored;
        }

        let count = self.acted.len();
        let saturated = count == self.expected.len();
        if saturated {
            self.latched = true;
            self.timer.arm_once(now, self.dwell);
        }
        Act::Accepted { count, saturated }
    }

    /// Returns true exactly once, when the dwell after saturation elapses
    pub fn poll(&mut self, now: Millis) -> bool {
        self.timer.fire(now)
    }

    pub fn is_acted(&self, id: Id) -> bool {
        self.acted.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.acted.len()
    }

    pub fn required(&self) -> usize {
        self.expected.len()
    }

    /// Fraction of items acted upon, for progress bars
    pub fn progress(&self) -> f32 {
        if self.expected.is_empty() {
            return 1.0;
        }
        self.acted.len() as f32 / self.expected.len() as f32
    }

    /// All items acted upon (completion may still be dwelling)
    pub fn is_saturated(&self) -> bool {
        self.latched
    }

    /// Completion has been reported
    pub fn is_complete(&self) -> bool {
        self.timer.has_fired()
    }

    /// Pending dwell deadline, if any
    pub fn deadline(&self) -> Option<Millis> {
        self.timer.deadline()
    }

    /// When the gate filled, the time the dwell started
    pub fn saturated_at(&self) -> Option<Millis> {
        self.timer.deadline().map(|d| d - self.dwell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completes_once_after_dwell() {
        let mut gate = CompletionGate::new([1u32, 2, 3], 2000.0);
        assert!(gate.act(1, 0.0).is_accepted());
        assert!(gate.act(2, 10.0).is_accepted());
        assert_eq!(
            gate.act(3, 20.0),
            Act::Accepted {
                count: 3,
                saturated: true
            }
        );
        assert!(gate.is_saturated());
        assert!(!gate.poll(2019.0));
        assert!(gate.poll(2020.0));
        assert!(!gate.poll(5000.0));
        assert!(gate.is_complete());
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut gate = CompletionGate::new([1u32, 2], 1500.0);
        gate.act(1, 0.0);
        assert_eq!(gate.act(1, 5.0), Act::Ignored);
        assert_eq!(gate.count(), 1);
        assert!(!gate.is_saturated());
    }

    #[test]
    fn test_unknown_id_ignored() {
        let mut gate = CompletionGate::new([10u32, 20], 1500.0);
        assert_eq!(gate.act(15, 0.0), Act::Ignored);
        assert_eq!(gate.count(), 0);
    }

    #[test]
    fn test_sparse_ids() {
        let mut gate = CompletionGate::new([7u32, 300, 42], 1500.0);
        gate.act(300, 0.0);
        gate.act(7, 1.0);
        gate.act(42, 2.0);
        assert!(gate.poll(1502.0));
    }

    #[test]
    fn test_progress() {
        let mut gate = CompletionGate::new([1u32, 2, 3, 4], 1500.0);
        gate.act(2, 0.0);
        assert!((gate.progress() - 0.25).abs() < 1e-6);
        assert_eq!(gate.saturated_at(), None);
        gate.act(1, 0.0);
        gate.act(3, 0.0);
        gate.act(4, 100.0);
        assert_eq!(gate.saturated_at(), Some(100.0));
    }
}
