//! Stage order and the forward-only stage controller

use serde::{Deserialize, Serialize};

use super::timer::OneShot;
use crate::Millis;

/// One top-level phase of the story, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    Entry = 1,
    Heart = 2,
    Memory = 3,
    Timeline = 4,
    Reveal = 5,
    Celebration = 6,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Entry,
        Stage::Heart,
        Stage::Memory,
        Stage::Timeline,
        Stage::Reveal,
        Stage::Celebration,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// The stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Entry => Some(Stage::Heart),
            Stage::Heart => Some(Stage::Memory),
            Stage::Memory => Some(Stage::Timeline),
            Stage::Timeline => Some(Stage::Reveal),
            Stage::Reveal => Some(Stage::Celebration),
            Stage::Celebration => None,
        }
    }

    /// Ambient visuals switch to the dark palette only for the reveal
    pub fn is_dark(self) -> bool {
        self == Stage::Reveal
    }

    /// How long this stage takes to fade out once it completes
    pub fn exit_duration_ms(self) -> Millis {
        match self {
            Stage::Entry | Stage::Reveal => 1200.0,
            _ => 800.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Entry => "entry",
            Stage::Heart => "heart",
            Stage::Memory => "memory",
            Stage::Timeline => "timeline",
            Stage::Reveal => "reveal",
            Stage::Celebration => "celebration",
        }
    }
}

/// Sole writer of the current stage
///
/// Advancing flips `current` immediately; the outgoing stage then plays
/// its exit for a fixed duration before the incoming one is mounted.
/// The exit cannot be interrupted and no advance is accepted meanwhile.
#[derive(Debug, Clone)]
pub struct StageController {
    current: Stage,
    visited: Vec<Stage>,
    exiting: Option<Stage>,
    transition: OneShot,
}

impl Default for StageController {
    fn default() -> Self {
        Self::new()
    }
}

impl StageController {
    pub fn new() -> Self {
        Self {
            current: Stage::Entry,
            visited: vec![Stage::Entry],
            exiting: None,
            transition: OneShot::new(),
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Every stage entered so far, in order
    pub fn visited(&self) -> &[Stage] {
        &self.visited
    }

    /// Stage currently playing its exit, if a transition is in flight
    pub fn exiting(&self) -> Option<Stage> {
        self.exiting
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_armed()
    }

    /// Move to `target`, which must be the stage right after the current one
    ///
    /// Returns false (and changes nothing) for any other target or while a
    /// transition is still running.
    pub fn advance(&mut self, target: Stage, now: Millis) -> bool {
        if self.is_transitioning() {
            log::debug!("Ignoring advance to {} during transition", target.as_str());
            return false;
        }
        if self.current.next() != Some(target) {
            log::warn!(
                "Rejecting advance {} -> {}",
                self.current.as_str(),
                target.as_str()
            );
            return false;
        }

        let from = self.current;
        self.exiting = Some(from);
        self.transition.arm(now, from.exit_duration_ms());
        self.current = target;
        self.visited.push(target);
        log::info!("Stage {} -> {}", from.as_str(), target.as_str());
        true
    }

    /// Returns the stage to mount once the exit transition has finished
    pub fn poll(&mut self, now: Millis) -> Option<Stage> {
        if self.transition.fire(now) {
            self.exiting = None;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.transition.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Stage::Celebration.next(), None);
        assert_eq!(Stage::Entry.ordinal(), 1);
        assert_eq!(Stage::Celebration.ordinal(), 6);
    }

    #[test]
    fn test_only_reveal_is_dark() {
        let dark: Vec<_> = Stage::ALL.iter().filter(|s| s.is_dark()).collect();
        assert_eq!(dark, vec![&Stage::Reveal]);
    }

    #[test]
    fn test_advance_to_next() {
        let mut ctl = StageController::new();
        assert!(ctl.advance(Stage::Heart, 0.0));
        assert_eq!(ctl.current(), Stage::Heart);
        assert_eq!(ctl.exiting(), Some(Stage::Entry));
        assert!(ctl.is_transitioning());
        assert_eq!(ctl.poll(1199.0), None);
        assert_eq!(ctl.poll(1200.0), Some(Stage::Heart));
        assert!(!ctl.is_transitioning());
        assert_eq!(ctl.exiting(), None);
    }

    #[test]
    fn test_rejects_non_adjacent() {
        let mut ctl = StageController::new();
        assert!(!ctl.advance(Stage::Memory, 0.0));
        assert!(!ctl.advance(Stage::Entry, 0.0));
        assert_eq!(ctl.current(), Stage::Entry);
        assert_eq!(ctl.visited(), &[Stage::Entry]);
    }

    #[test]
    fn test_rejects_during_transition() {
        let mut ctl = StageController::new();
        assert!(ctl.advance(Stage::Heart, 0.0));
        assert!(!ctl.advance(Stage::Memory, 100.0));
        assert_eq!(ctl.current(), Stage::Heart);
        ctl.poll(2000.0);
        assert!(ctl.advance(Stage::Memory, 2000.0));
    }

    #[test]
    fn test_terminal_stage() {
        let mut ctl = StageController::new();
        let mut now = 0.0;
        for stage in &Stage::ALL[1..] {
            assert!(ctl.advance(*stage, now));
            now += 2000.0;
            ctl.poll(now);
        }
        assert_eq!(ctl.current(), Stage::Celebration);
        assert!(!ctl.advance(Stage::Celebration, now));
        assert_eq!(ctl.visited(), &Stage::ALL);
    }
}
