//! Continuous ambient visuals
//!
//! Runs on the display refresh, independent of stage logic. The only
//! input it takes from the story is whether the dark palette is active.

pub mod light;
pub mod particles;

pub use light::{PointerLight, normalize_pointer};
pub use particles::{AmbientParticle, ParticleField, particle_count};
