//! The button that slips away from the pointer

use glam::Vec2;
use rand::Rng;

use crate::consts::EVASION_MAX_OFFSET;

/// Displacement of an affordance that dodges hover and touch
///
/// Each trigger replaces the offset with a fresh random vector; offsets
/// never accumulate and never reset on their own. The button stays
/// interactive wherever it lands.
#[derive(Debug, Clone, PartialEq)]
pub struct EvasionButton {
    offset: Vec2,
    max_offset: f32,
    triggers: u32,
}

impl Default for EvasionButton {
    fn default() -> Self {
        Self::new(EVASION_MAX_OFFSET)
    }
}

impl EvasionButton {
    pub fn new(max_offset: f32) -> Self {
        Self {
            offset: Vec2::ZERO,
            max_offset,
            triggers: 0,
        }
    }

    /// Jump to a new random offset within ±max on each axis
    pub fn trigger<R: Rng>(&mut self, rng: &mut R) -> Vec2 {
        let dx: f32 = rng.random_range(-1.0..=1.0);
        let dy: f32 = rng.random_range(-1.0..=1.0);
        self.offset = Vec2::new(dx, dy) * self.max_offset;
        self.triggers += 1;
        self.offset
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn max_offset(&self) -> f32 {
        self.max_offset
    }

    /// How many times the button has dodged
    pub fn triggers(&self) -> u32 {
        self.triggers
    }
}
