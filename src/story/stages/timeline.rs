//! Relationship timeline: every chapter must be viewed

use crate::Millis;
use crate::consts::TIMELINE_DWELL_MS;
use crate::story::gate::{Act, CompletionGate};

#[derive(Debug, Clone)]
pub struct TimelineStage {
    ids: Vec<u32>,
    active: u32,
    gate: CompletionGate<u32>,
}

impl TimelineStage {
    /// Events in chronological order; the first one starts active and viewed
    pub fn new(ids: Vec<u32>, now: Millis) -> Self {
        let mut gate = CompletionGate::new(ids.iter().copied(), TIMELINE_DWELL_MS);
        let active = ids.first().copied().unwrap_or_default();
        gate.act(active, now);
        Self { ids, active, gate }
    }

    /// Make an event active; the first selection of an event counts it as viewed
    pub fn select(&mut self, id: u32, now: Millis) -> Act {
        if !self.ids.contains(&id) {
            log::debug!("Ignoring unknown timeline event {}", id);
            return Act::Ignored;
        }
        self.active = id;
        self.gate.act(id, now)
    }

    pub fn tick(&mut self, now: Millis) -> bool {
        self.gate.poll(now)
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.gate.deadline()
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    /// Position of the active event in display order
    pub fn active_index(&self) -> usize {
        self.ids
            .iter()
            .position(|&id| id == self.active)
            .unwrap_or(0)
    }

    pub fn is_viewed(&self, id: u32) -> bool {
        self.gate.is_acted(id)
    }

    pub fn progress(&self) -> f32 {
        self.gate.progress()
    }

    pub fn all_viewed(&self) -> bool {
        self.gate.is_saturated()
    }
}

/// Horizontal scroll that centers an element inside its container
pub fn scroll_to_center(container_width: f32, element_left: f32, element_width: f32) -> f32 {
    element_left - container_width / 2.0 + element_width / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_event_starts_viewed() {
        let timeline = TimelineStage::new(vec![1, 2, 3], 0.0);
        assert_eq!(timeline.active(), 1);
        assert!(timeline.is_viewed(1));
        assert!(!timeline.is_viewed(2));
    }

    #[test]
    fn test_revisit_changes_active_only() {
        let mut timeline = TimelineStage::new(vec![1, 2, 3], 0.0);
        assert!(timeline.select(3, 10.0).is_accepted());
        assert_eq!(timeline.select(1, 20.0), Act::Ignored);
        assert_eq!(timeline.active(), 1);
        assert_eq!(timeline.active_index(), 0);
        assert!(!timeline.all_viewed());
    }

    #[test]
    fn test_completion_after_dwell() {
        let mut timeline = TimelineStage::new(vec![5, 9], 0.0);
        timeline.select(9, 100.0);
        assert!(timeline.all_viewed());
        assert!(!timeline.tick(2099.0));
        assert!(timeline.tick(2100.0));
    }

    #[test]
    fn test_single_event_completes_on_mount() {
        let mut timeline = TimelineStage::new(vec![1], 0.0);
        assert!(timeline.all_viewed());
        assert!(timeline.tick(TIMELINE_DWELL_MS));
    }

    #[test]
    fn test_unknown_event_ignored() {
        let mut timeline = TimelineStage::new(vec![1, 2], 0.0);
        assert_eq!(timeline.select(7, 0.0), Act::Ignored);
        assert_eq!(timeline.active(), 1);
    }

    #[test]
    fn test_scroll_to_center() {
        assert_eq!(scroll_to_center(400.0, 600.0, 300.0), 550.0);
    }
}
