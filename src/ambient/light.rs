//! Soft light that trails the pointer

use glam::Vec2;

use crate::consts::{LIGHT_GLOW_RADIUS, LIGHT_MASS, LIGHT_STIFFNESS, MAX_FRAME_DT};
use crate::renderer::{DrawSurface, palette};

/// Largest integration step; frames longer than this are substepped
const SUBSTEP: f32 = 1.0 / 120.0;

/// Pointer position in viewport pixels to normalized [0, 1] coordinates
pub fn normalize_pointer(client: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::splat(0.5);
    }
    (client / viewport).clamp(Vec2::ZERO, Vec2::ONE)
}

/// Critically damped spring following the last pointer position
///
/// Positions are normalized to the viewport. Integrated with
/// semi-implicit Euler so the follower never overshoots noticeably.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerLight {
    target: Vec2,
    pos: Vec2,
    vel: Vec2,
    stiffness: f32,
    damping: f32,
    mass: f32,
}

impl Default for PointerLight {
    fn default() -> Self {
        Self::new(LIGHT_STIFFNESS, LIGHT_MASS)
    }
}

impl PointerLight {
    pub fn new(stiffness: f32, mass: f32) -> Self {
        Self {
            target: Vec2::splat(0.5),
            pos: Vec2::splat(0.5),
            vel: Vec2::ZERO,
            stiffness,
            damping: 2.0 * (stiffness * mass).sqrt(),
            mass,
        }
    }

    /// New normalized target from a pointer move
    pub fn set_target(&mut self, target: Vec2) {
        self.target = target.clamp(Vec2::ZERO, Vec2::ONE);
    }

    /// Advance by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let mut remaining = dt.clamp(0.0, MAX_FRAME_DT);
        while remaining > 0.0 {
            let h = remaining.min(SUBSTEP);
            let force = -self.stiffness * (self.pos - self.target) - self.damping * self.vel;
            self.vel += force / self.mass * h;
            self.pos += self.vel * h;
            remaining -= h;
        }
    }

    /// Glow strength: brighter on the dark reveal stage
    pub fn intensity(dark: bool) -> f32 {
        if dark { 0.08 } else { 0.06 }
    }

    pub fn render<S: DrawSurface>(&self, surface: &mut S, viewport: Vec2, dark: bool) {
        let color = palette::POINTER_GLOW;
        surface.radial_glow(
            self.pos * viewport,
            LIGHT_GLOW_RADIUS,
            color.with_alpha(Self::intensity(dark)),
            color.transparent(),
        );
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_centered_at_rest() {
        let mut light = PointerLight::default();
        light.step(1.0 / 60.0);
        assert_eq!(light.position(), Vec2::splat(0.5));
        assert_eq!(light.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_critical_damping() {
        let light = PointerLight::new(50.0, 1.0);
        assert!((light.damping() - 2.0 * 50f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut light = PointerLight::default();
        light.set_target(Vec2::new(1.0, 0.0));
        let mut max_x = 0.0f32;
        for _ in 0..240 {
            light.step(1.0 / 60.0);
            max_x = max_x.max(light.position().x);
        }
        assert!((light.position() - Vec2::new(1.0, 0.0)).length() < 1e-3);
        assert!(max_x <= 1.0 + 1e-3);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut a = PointerLight::default();
        let mut b = PointerLight::default();
        a.set_target(Vec2::ONE);
        b.set_target(Vec2::ONE);
        a.step(5.0);
        b.step(MAX_FRAME_DT);
        assert_eq!(a.position(), b.position());
    }

    #[test]
    fn test_normalize_pointer() {
        let viewport = Vec2::new(800.0, 400.0);
        assert_eq!(normalize_pointer(Vec2::new(400.0, 100.0), viewport), Vec2::new(0.5, 0.25));
        assert_eq!(normalize_pointer(Vec2::new(-5.0, 900.0), viewport), Vec2::new(0.0, 1.0));
        assert_eq!(normalize_pointer(Vec2::ONE, Vec2::ZERO), Vec2::splat(0.5));
    }

    #[test]
    fn test_intensity() {
        assert_eq!(PointerLight::intensity(true), 0.08);
        assert_eq!(PointerLight::intensity(false), 0.06);
    }
}
