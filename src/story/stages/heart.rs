//! Heart tapping: one affirmation per tap until every one has been shown

use crate::Millis;
use crate::consts::{HEART_DWELL_MS, HEART_UNLOCK_MS, RIPPLE_LIFETIME_MS};
use crate::story::StoryEvent;
use crate::story::gate::{Act, CompletionGate};
use crate::story::timer::{OneShot, earliest};

/// Expanding ring spawned by a tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub id: u32,
    pub born: Millis,
}

impl Ripple {
    /// Animation progress in [0, 1]
    pub fn progress(&self, now: Millis) -> f32 {
        ((now - self.born) / RIPPLE_LIFETIME_MS).clamp(0.0, 1.0) as f32
    }
}

/// Tap counter over the configured affirmations
///
/// Tap `k` (0-based) acts on gate item `k`, so the counter is bounded by
/// the affirmation count and affirmations appear strictly in order.
#[derive(Debug, Clone)]
pub struct HeartStage {
    gate: CompletionGate<u32>,
    shown: Option<usize>,
    ripples: Vec<Ripple>,
    unlock: OneShot,
}

impl HeartStage {
    pub fn new(affirmations: usize) -> Self {
        Self {
            gate: CompletionGate::new(0..affirmations as u32, HEART_DWELL_MS),
            shown: None,
            ripples: Vec::new(),
            unlock: OneShot::new(),
        }
    }

    /// Tap the heart; ignored once every affirmation has been shown
    pub fn tap(&mut self, now: Millis, events: &mut Vec<StoryEvent>) -> Act {
        let id = self.gate.count() as u32;
        let act = self.gate.act(id, now);
        if let Act::Accepted { count, saturated } = act {
            let index = count - 1;
            self.shown = Some(index);
            self.ripples.push(Ripple { id, born: now });
            events.push(StoryEvent::AffirmationShown { index });
            log::debug!("Heart tap {}/{}", count, self.gate.required());
            if saturated {
                self.unlock.arm_once(now, HEART_UNLOCK_MS);
            }
        } else {
            log::debug!("Heart tap ignored");
        }
        act
    }

    /// Advance timers; returns true once when the stage is complete
    pub fn tick(&mut self, now: Millis, events: &mut Vec<StoryEvent>) -> bool {
        self.ripples.retain(|r| now - r.born < RIPPLE_LIFETIME_MS);
        if self.unlock.fire(now) {
            events.push(StoryEvent::HeartUnlocked);
        }
        self.gate.poll(now)
    }

    pub fn deadline(&self) -> Option<Millis> {
        earliest([self.unlock.deadline(), self.gate.deadline()])
    }

    /// Index of the affirmation currently on screen
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }

    pub fn taps(&self) -> usize {
        self.gate.count()
    }

    /// One entry per affirmation, true for those already revealed
    pub fn dots(&self) -> Vec<bool> {
        (0..self.gate.required()).map(|i| i < self.taps()).collect()
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlock.has_fired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmations_in_order() {
        let mut heart = HeartStage::new(5);
        let mut events = Vec::new();
        for i in 0..5 {
            assert!(heart.tap(i as f64 * 100.0, &mut events).is_accepted());
            assert_eq!(heart.shown(), Some(i));
        }
        let shown: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                StoryEvent::AffirmationShown { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![0, 1, 2, 3, 4]);
        assert_eq!(heart.dots(), vec![true; 5]);
    }

    #[test]
    fn test_extra_taps_ignored() {
        let mut heart = HeartStage::new(2);
        let mut events = Vec::new();
        heart.tap(0.0, &mut events);
        heart.tap(10.0, &mut events);
        assert_eq!(heart.tap(20.0, &mut events), Act::Ignored);
        assert_eq!(heart.taps(), 2);
        assert_eq!(heart.shown(), Some(1));
    }

    #[test]
    fn test_unlock_then_complete() {
        let mut heart = HeartStage::new(1);
        let mut events = Vec::new();
        heart.tap(0.0, &mut events);
        assert!(!heart.tick(1499.0, &mut events));
        assert!(!heart.is_unlocked());
        assert!(!heart.tick(1500.0, &mut events));
        assert!(heart.is_unlocked());
        assert!(events.contains(&StoryEvent::HeartUnlocked));
        assert_eq!(heart.deadline(), Some(HEART_DWELL_MS));
        assert!(heart.tick(2000.0, &mut events));
        assert!(!heart.tick(3000.0, &mut events));
    }

    #[test]
    fn test_ripples_expire() {
        let mut heart = HeartStage::new(3);
        let mut events = Vec::new();
        heart.tap(0.0, &mut events);
        heart.tap(600.0, &mut events);
        assert_eq!(heart.ripples().len(), 2);
        heart.tick(1000.0, &mut events);
        assert_eq!(heart.ripples().len(), 1);
        assert!((heart.ripples()[0].progress(1100.0) - 0.5).abs() < 1e-6);
        heart.tick(1600.0, &mut events);
        assert!(heart.ripples().is_empty());
    }
}
