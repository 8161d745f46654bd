//! Terminal celebration screen
//!
//! Nothing here reacts to input; the layout is a pure function of the
//! heart index so the screen looks the same on every visit.

/// Number of decorative hearts drifting behind the closing message
pub const FLOATING_HEARTS: usize = 12;

/// Placement and animation timing of one floating heart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingHeart {
    /// Percent of viewport width
    pub left_pct: f32,
    /// Percent of viewport height
    pub top_pct: f32,
    /// Seconds
    pub delay_s: f32,
    /// Seconds per float cycle
    pub duration_s: f32,
    /// Glyph size in rem
    pub size_rem: f32,
}

impl FloatingHeart {
    pub fn at(index: usize) -> Self {
        let i = index as f32;
        Self {
            left_pct: (i * 8.3 + 5.0) % 100.0,
            top_pct: (i * 7.7 + 10.0) % 100.0,
            delay_s: (i * 0.4) % 5.0,
            duration_s: 6.0 + (index % 4) as f32,
            size_rem: 1.0 + (index % 3) as f32 * 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Celebration {
    hearts: Vec<FloatingHeart>,
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            hearts: (0..FLOATING_HEARTS).map(FloatingHeart::at).collect(),
        }
    }

    pub fn hearts(&self) -> &[FloatingHeart] {
        &self.hearts
    }
}
