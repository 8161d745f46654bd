//! Interactive stage components
//!
//! Each component owns its gate and timers. `tick` returns true exactly
//! once, when the stage's dwell after saturation has elapsed.

pub mod entry;
pub mod gallery;
pub mod heart;
pub mod notes;
pub mod timeline;

pub use entry::EntryStage;
pub use gallery::{CardVisual, GalleryStage, ImageStatus, Tilt};
pub use heart::{HeartStage, Ripple};
pub use notes::NotesStage;
pub use timeline::{TimelineStage, scroll_to_center};
