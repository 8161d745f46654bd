//! 2D drawing surface abstraction
//!
//! The ambient layer draws soft radial glows only. `CanvasSurface` renders
//! them through the browser's Canvas 2D context; `RecordingSurface` keeps
//! the calls in memory for headless runs and tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

/// Straight-alpha colour, channels in 0-255 with alpha in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn transparent(self) -> Self {
        self.with_alpha(0.0)
    }

    /// CSS `rgba()` notation
    pub fn css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            self.a.clamp(0.0, 1.0)
        )
    }
}

/// Colours for the ambient layer
pub mod palette {
    use super::Rgba;

    /// Particles on the light stages
    pub const PARTICLE_LIGHT: Rgba = Rgba::rgb(122, 78, 87);
    /// Particles during the reveal
    pub const PARTICLE_DARK: Rgba = Rgba::rgb(216, 167, 177);
    /// Pointer light glow, both modes
    pub const POINTER_GLOW: Rgba = Rgba::rgb(216, 167, 177);
    /// Celebration burst sparkles
    pub const BURST: Rgba = Rgba::rgb(216, 167, 177);
}

/// The primitives the ambient layer needs from a host surface
pub trait DrawSurface {
    /// Wipe the whole surface
    fn clear(&mut self, width: f32, height: f32);

    /// Filled circle of `radius` whose colour fades from `inner` at the
    /// center to `outer` at the edge
    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear {
        width: f32,
        height: f32,
    },
    Glow {
        center: Vec2,
        radius: f32,
        inner: Rgba,
        outer: Rgba,
    },
}

/// In-memory surface that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Glows drawn since the last clear
    pub fn glows_since_clear(&self) -> usize {
        self.calls
            .iter()
            .rev()
            .take_while(|c| !matches!(c, DrawCall::Clear { .. }))
            .count()
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, width: f32, height: f32) {
        self.calls.push(DrawCall::Clear { width, height });
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, inner: Rgba, outer: Rgba) {
        self.calls.push(DrawCall::Glow {
            center,
            radius,
            inner,
            outer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css() {
        assert_eq!(
            palette::PARTICLE_DARK.with_alpha(0.25).css(),
            "rgba(216, 167, 177, 0.25)"
        );
        assert_eq!(palette::PARTICLE_LIGHT.transparent().css(), "rgba(122, 78, 87, 0)");
    }

    #[test]
    fn test_recording_counts_since_clear() {
        let mut surface = RecordingSurface::new();
        let c = palette::BURST;
        surface.radial_glow(Vec2::ZERO, 1.0, c, c.transparent());
        surface.clear(10.0, 10.0);
        surface.radial_glow(Vec2::ONE, 2.0, c, c.transparent());
        surface.radial_glow(Vec2::ONE, 3.0, c, c.transparent());
        assert_eq!(surface.glows_since_clear(), 2);
        assert_eq!(surface.calls().len(), 4);
    }
}
