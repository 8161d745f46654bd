//! Deterministic story logic
//!
//! Everything that decides what the reader sees lives here. This module
//! must stay pure and deterministic:
//! - Time is passed in explicitly, never read from a clock
//! - Randomness comes from a seeded RNG owned by the caller
//! - Timers are owned by the stage that armed them
//! - No rendering or platform dependencies

pub mod celebration;
pub mod evasion;
pub mod gate;
pub mod reveal;
pub mod stage;
pub mod stages;
pub mod timer;

use glam::Vec2;

pub use celebration::{Celebration, FloatingHeart};
pub use evasion::EvasionButton;
pub use gate::{Act, CompletionGate};
pub use reveal::{BurstParticle, BurstSprite, CelebrationBurst, FinalReveal, RevealPhase};
pub use stage::{Stage, StageController};
pub use stages::{
    CardVisual, EntryStage, GalleryStage, HeartStage, ImageStatus, NotesStage, Ripple, Tilt,
    TimelineStage, scroll_to_center,
};
pub use timer::{OneShot, earliest};

/// Events emitted by the story for the host to react to (text swaps, sounds, logs)
#[derive(Debug, Clone, PartialEq)]
pub enum StoryEvent {
    /// `current` moved to this stage; the previous one starts its exit
    StageEntered(Stage),
    /// The stage's content is mounted and accepts input
    StageMounted(Stage),
    /// The stage's completion signal fired
    StageCompleted(Stage),
    /// An envelope, memory card or timeline event was acted upon
    ItemActed {
        stage: Stage,
        id: u32,
        count: usize,
        required: usize,
    },
    AffirmationShown { index: usize },
    HeartUnlocked,
    LineRevealed { index: usize },
    QuestionRevealed,
    ChoicesEnabled,
    Evaded { offset: Vec2 },
    Answered,
}
