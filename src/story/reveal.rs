//! The final reveal: lines one by one, then the question
//!
//! ```text
//! Revealing(0) -> ... -> Revealing(n) -> QuestionPending -> QuestionShown -> Answered
//! ```
//!
//! Only "Yes" leaves `QuestionShown`. "No" just makes its button dodge and
//! flashes a short message; there is no path that accepts it.

use std::ops::Range;

use rand::Rng;

use super::StoryEvent;
use super::evasion::EvasionButton;
use super::timer::{OneShot, earliest};
use crate::Millis;
use crate::consts::*;

/// Reveal sequencing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// `i` lines are visible
    Revealing(usize),
    /// Question visible, choices not yet interactive
    QuestionPending,
    /// Choices interactive
    QuestionShown,
    Answered,
}

/// One rising sparkle of the celebration burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstParticle {
    /// Horizontal start, percent of width
    pub x_pct: f32,
    pub delay_ms: Millis,
    /// Starting opacity
    pub opacity: f32,
}

/// Where a burst particle is at a given moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSprite {
    pub x_pct: f32,
    /// Vertical position, percent of height (100 = bottom edge)
    pub y_pct: f32,
    pub alpha: f32,
}

impl BurstParticle {
    /// Position `elapsed` ms after the burst started; None before its delay or after it left
    pub fn sample(&self, elapsed: Millis) -> Option<BurstSprite> {
        let t = (elapsed - self.delay_ms) / BURST_DURATION_MS;
        if !(0.0..1.0).contains(&t) {
            return None;
        }
        let t = t as f32;
        // Ease out (quadratic)
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        Some(BurstSprite {
            x_pct: self.x_pct,
            y_pct: 100.0 - 120.0 * eased,
            alpha: self.opacity * (1.0 - eased),
        })
    }
}

/// Particles spawned when "Yes" is chosen; purely visual
#[derive(Debug, Clone)]
pub struct CelebrationBurst {
    started: Millis,
    particles: Vec<BurstParticle>,
}

impl CelebrationBurst {
    pub fn spawn<R: Rng>(rng: &mut R, count: usize, now: Millis) -> Self {
        let particles = (0..count)
            .map(|_| BurstParticle {
                x_pct: rng.random_range(0.0..100.0),
                delay_ms: rng.random_range(0.0..BURST_MAX_DELAY_MS),
                opacity: rng.random_range(0.4..0.8),
            })
            .collect();
        Self {
            started: now,
            particles,
        }
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    pub fn sprites(&self, now: Millis) -> Vec<BurstSprite> {
        let elapsed = now - self.started;
        self.particles
            .iter()
            .filter_map(|p| p.sample(elapsed))
            .collect()
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        now - self.started >= BURST_MAX_DELAY_MS + BURST_DURATION_MS
    }
}

/// Final reveal stage
#[derive(Debug, Clone)]
pub struct FinalReveal {
    line_count: usize,
    phase: RevealPhase,
    step: OneShot,
    no_button: EvasionButton,
    playful: OneShot,
    answer: OneShot,
    burst: Option<CelebrationBurst>,
}

impl FinalReveal {
    pub fn new(line_count: usize, now: Millis) -> Self {
        let mut step = OneShot::new();
        step.arm(now, Self::delay_after(RevealPhase::Revealing(0), line_count));
        Self {
            line_count,
            phase: RevealPhase::Revealing(0),
            step,
            no_button: EvasionButton::default(),
            playful: OneShot::new(),
            answer: OneShot::new(),
            burst: None,
        }
    }

    /// Time spent in `phase` before the automatic step out of it
    fn delay_after(phase: RevealPhase, line_count: usize) -> Millis {
        match phase {
            RevealPhase::Revealing(i) if i < line_count => REVEAL_LINE_MS,
            RevealPhase::Revealing(_) => QUESTION_DELAY_MS,
            RevealPhase::QuestionPending => CHOICES_DELAY_MS,
            RevealPhase::QuestionShown | RevealPhase::Answered => 0.0,
        }
    }

    /// Advance timers; returns true once when the reveal is done and the story should move on
    pub fn tick(&mut self, now: Millis, events: &mut Vec<StoryEvent>) -> bool {
        // Catch up every automatic step that is due, anchored to its own deadline
        while let Some(due) = self.step.deadline() {
            if !self.step.fire(now) {
                break;
            }
            self.phase = match self.phase {
                RevealPhase::Revealing(i) if i < self.line_count => {
                    events.push(StoryEvent::LineRevealed { index: i });
                    RevealPhase::Revealing(i + 1)
                }
                RevealPhase::Revealing(_) => {
                    events.push(StoryEvent::QuestionRevealed);
                    RevealPhase::QuestionPending
                }
                RevealPhase::QuestionPending => {
                    events.push(StoryEvent::ChoicesEnabled);
                    RevealPhase::QuestionShown
                }
                other => other,
            };
            if !matches!(
                self.phase,
                RevealPhase::QuestionShown | RevealPhase::Answered
            ) {
                self.step
                    .arm(due, Self::delay_after(self.phase, self.line_count));
            }
        }

        self.playful.fire(now);
        if self.burst.as_ref().is_some_and(|b| b.is_finished(now)) {
            self.burst = None;
        }
        self.answer.fire(now)
    }

    /// Hover or touch on "No": dodge and tease, never transition
    pub fn attempt_no<R: Rng>(
        &mut self,
        now: Millis,
        rng: &mut R,
        events: &mut Vec<StoryEvent>,
    ) -> bool {
        if self.phase != RevealPhase::QuestionShown {
            return false;
        }
        let offset = self.no_button.trigger(rng);
        self.playful.arm(now, PLAYFUL_MESSAGE_MS);
        events.push(StoryEvent::Evaded { offset });
        log::debug!(
            "No dodged to ({:.0}, {:.0}), attempt {}",
            offset.x,
            offset.y,
            self.no_button.triggers()
        );
        true
    }

    /// "Yes": the only way out
    pub fn choose_yes<R: Rng>(
        &mut self,
        now: Millis,
        rng: &mut R,
        events: &mut Vec<StoryEvent>,
    ) -> bool {
        if self.phase != RevealPhase::QuestionShown {
            return false;
        }
        self.phase = RevealPhase::Answered;
        self.playful.cancel();
        self.burst = Some(CelebrationBurst::spawn(rng, BURST_PARTICLES, now));
        self.answer.arm_once(now, ANSWER_DWELL_MS);
        events.push(StoryEvent::Answered);
        log::info!(
            "Answered yes after {} dodge(s)",
            self.no_button.triggers()
        );
        true
    }

    pub fn deadline(&self) -> Option<Millis> {
        earliest([
            self.step.deadline(),
            self.playful.deadline(),
            self.answer.deadline(),
        ])
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Indices of the lines currently on screen
    pub fn visible_lines(&self) -> Range<usize> {
        match self.phase {
            RevealPhase::Revealing(i) => 0..i,
            _ => 0..0,
        }
    }

    pub fn question_visible(&self) -> bool {
        matches!(
            self.phase,
            RevealPhase::QuestionPending | RevealPhase::QuestionShown
        )
    }

    pub fn choices_interactive(&self) -> bool {
        self.phase == RevealPhase::QuestionShown
    }

    pub fn is_answered(&self) -> bool {
        self.phase == RevealPhase::Answered
    }

    pub fn no_button(&self) -> &EvasionButton {
        &self.no_button
    }

    /// The dismissive message after a "No" attempt is on screen
    pub fn playful_visible(&self) -> bool {
        self.playful.is_armed()
    }

    pub fn burst(&self) -> Option<&CelebrationBurst> {
        self.burst.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_to_choices(reveal: &mut FinalReveal, events: &mut Vec<StoryEvent>) -> Millis {
        let mut now = 0.0;
        while !reveal.choices_interactive() {
            now += 100.0;
            reveal.tick(now, events);
        }
        now
    }

    #[test]
    fn test_line_timing() {
        let mut reveal = FinalReveal::new(2, 0.0);
        let mut events = Vec::new();
        assert_eq!(reveal.phase(), RevealPhase::Revealing(0));
        reveal.tick(1799.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::Revealing(0));
        reveal.tick(1800.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::Revealing(1));
        assert_eq!(reveal.visible_lines(), 0..1);
        reveal.tick(3600.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::Revealing(2));
        reveal.tick(4800.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::QuestionPending);
        assert!(reveal.question_visible());
        assert!(!reveal.choices_interactive());
        reveal.tick(5800.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::QuestionShown);
        assert_eq!(reveal.visible_lines(), 0..0);
    }

    #[test]
    fn test_large_jump_catches_up_in_order() {
        let mut reveal = FinalReveal::new(3, 0.0);
        let mut events = Vec::new();
        reveal.tick(100_000.0, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::QuestionShown);
        assert_eq!(
            events,
            vec![
                StoryEvent::LineRevealed { index: 0 },
                StoryEvent::LineRevealed { index: 1 },
                StoryEvent::LineRevealed { index: 2 },
                StoryEvent::QuestionRevealed,
                StoryEvent::ChoicesEnabled,
            ]
        );
    }

    #[test]
    fn test_zero_lines_goes_straight_to_question() {
        let mut reveal = FinalReveal::new(0, 0.0);
        let mut events = Vec::new();
        reveal.tick(QUESTION_DELAY_MS, &mut events);
        assert_eq!(reveal.phase(), RevealPhase::QuestionPending);
    }

    #[test]
    fn test_no_before_question_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut reveal = FinalReveal::new(4, 0.0);
        let mut events = Vec::new();
        assert!(!reveal.attempt_no(10.0, &mut rng, &mut events));
        assert!(!reveal.choose_yes(10.0, &mut rng, &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_never_answers_and_message_retriggers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut reveal = FinalReveal::new(1, 0.0);
        let mut events = Vec::new();
        let now = run_to_choices(&mut reveal, &mut events);

        for i in 0..50 {
            assert!(reveal.attempt_no(now + i as f64, &mut rng, &mut events));
        }
        assert_eq!(reveal.phase(), RevealPhase::QuestionShown);
        assert_eq!(reveal.no_button().triggers(), 50);

        let last = now + 49.0;
        reveal.tick(last + PLAYFUL_MESSAGE_MS - 1.0, &mut events);
        assert!(reveal.playful_visible());
        reveal.tick(last + PLAYFUL_MESSAGE_MS, &mut events);
        assert!(!reveal.playful_visible());
    }

    #[test]
    fn test_yes_answers_and_leaves_after_dwell() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut reveal = FinalReveal::new(1, 0.0);
        let mut events = Vec::new();
        let now = run_to_choices(&mut reveal, &mut events);

        assert!(reveal.choose_yes(now, &mut rng, &mut events));
        assert!(reveal.is_answered());
        assert!(events.contains(&StoryEvent::Answered));
        assert_eq!(reveal.burst().map(|b| b.particles().len()), Some(30));
        assert!(!reveal.choose_yes(now + 1.0, &mut rng, &mut events));
        assert!(!reveal.attempt_no(now + 1.0, &mut rng, &mut events));

        assert!(!reveal.tick(now + ANSWER_DWELL_MS - 1.0, &mut events));
        assert!(reveal.tick(now + ANSWER_DWELL_MS, &mut events));
        assert!(!reveal.tick(now + ANSWER_DWELL_MS + 1.0, &mut events));
    }

    #[test]
    fn test_burst_particles_rise_and_fade() {
        let mut rng = Pcg32::seed_from_u64(4);
        let burst = CelebrationBurst::spawn(&mut rng, 30, 0.0);
        for p in burst.particles() {
            assert!((0.0..100.0).contains(&p.x_pct));
            assert!((0.0..BURST_MAX_DELAY_MS).contains(&p.delay_ms));
            assert!((0.4..0.8).contains(&p.opacity));
        }

        let particle = BurstParticle {
            x_pct: 50.0,
            delay_ms: 100.0,
            opacity: 0.8,
        };
        assert!(particle.sample(50.0).is_none());
        let start = particle.sample(100.0).unwrap();
        assert!((start.y_pct - 100.0).abs() < 1e-4);
        assert!((start.alpha - 0.8).abs() < 1e-4);
        let mid = particle.sample(2100.0).unwrap();
        assert!(mid.y_pct < start.y_pct && mid.alpha < start.alpha);
        assert!(particle.sample(4100.0).is_none());

        assert!(!burst.is_finished(4499.0));
        assert!(burst.is_finished(4500.0));
    }
}
