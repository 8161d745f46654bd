//! Valentine - a staged interactive love letter
//!
//! Core modules:
//! - `story`: Deterministic stage logic (stage order, completion gating, final reveal)
//! - `ambient`: Continuous visuals (particle field, pointer-following light)
//! - `renderer`: 2D drawing surface abstraction and palette
//! - `config`: Static story content
//! - `app`: Top-level composition driven by the host

pub mod ambient;
pub mod app;
pub mod config;
pub mod renderer;
pub mod story;

pub use app::{Story, StoryInput};
pub use config::{ConfigError, StoryConfig};
pub use story::{Stage, StoryEvent};

/// Host timestamp in milliseconds (`performance.now()` on the web)
pub type Millis = f64;

/// Story timing and geometry constants
pub mod consts {
    use super::Millis;

    /// Dwell after the last heart tap before the stage completes
    pub const HEART_DWELL_MS: Millis = 2000.0;
    /// Delay after the last heart tap before the unlock message shows
    pub const HEART_UNLOCK_MS: Millis = 1500.0;
    /// Lifetime of a single tap ripple
    pub const RIPPLE_LIFETIME_MS: Millis = 1000.0;

    /// Dwell after the last envelope opens
    pub const NOTES_DWELL_MS: Millis = 2000.0;
    /// Dwell after the last memory card is revealed
    pub const MEMORY_DWELL_MS: Millis = 1500.0;
    /// Dwell after the last timeline event is viewed
    pub const TIMELINE_DWELL_MS: Millis = 2000.0;

    /// Time each reveal line holds before the next appears
    pub const REVEAL_LINE_MS: Millis = 1800.0;
    /// Pause after the last line before the question
    pub const QUESTION_DELAY_MS: Millis = 1200.0;
    /// Pause between the question and its choices becoming interactive
    pub const CHOICES_DELAY_MS: Millis = 1000.0;
    /// Celebration time between "Yes" and leaving the reveal stage
    pub const ANSWER_DWELL_MS: Millis = 2500.0;
    /// How long the dismissive message stays after a "No" attempt
    pub const PLAYFUL_MESSAGE_MS: Millis = 1500.0;

    /// Maximum displacement of the evasive button along each axis
    pub const EVASION_MAX_OFFSET: f32 = 150.0;

    /// Celebration burst size
    pub const BURST_PARTICLES: usize = 30;
    /// Rise duration of one burst particle
    pub const BURST_DURATION_MS: Millis = 4000.0;
    /// Maximum random start delay of a burst particle
    pub const BURST_MAX_DELAY_MS: Millis = 500.0;

    /// Ambient particle cap
    pub const MAX_AMBIENT_PARTICLES: usize = 30;
    /// Viewport area per ambient particle (px²)
    pub const AREA_PER_PARTICLE: f32 = 40_000.0;
    /// Phase advance per frame (radians)
    pub const PHASE_STEP: f32 = 0.01;
    /// Glow radius as a multiple of particle radius
    pub const GLOW_SCALE: f32 = 3.0;

    /// Pointer light spring stiffness
    pub const LIGHT_STIFFNESS: f32 = 50.0;
    /// Pointer light mass
    pub const LIGHT_MASS: f32 = 1.0;
    /// Radius at which the pointer light has faded out (px)
    pub const LIGHT_GLOW_RADIUS: f32 = 140.0;
    /// Nominal frame step used when the host has no previous timestamp
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame step fed to the spring (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
