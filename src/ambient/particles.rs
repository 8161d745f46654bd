//! Drifting glow particles behind every stage

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{AREA_PER_PARTICLE, GLOW_SCALE, MAX_AMBIENT_PARTICLES, PHASE_STEP};
use crate::renderer::{DrawSurface, palette};

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientParticle {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub radius: f32,
    pub base_opacity: f32,
    /// Radians, kept in [0, 2π)
    pub phase: f32,
}

impl AmbientParticle {
    fn spawn(rng: &mut Pcg32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(
                wrap(rng.random_range(0.0..1.0) * width, width),
                wrap(rng.random_range(0.0..1.0) * height, height),
            ),
            vel: Vec2::new(
                rng.random_range(-0.15..=0.15),
                rng.random_range(-0.15..=0.15),
            ),
            radius: rng.random_range(1.0..3.0),
            base_opacity: rng.random_range(0.1..0.4),
            phase: rng.random_range(0.0..TAU),
        }
    }

    /// Pulsing opacity
    pub fn opacity(&self) -> f32 {
        self.base_opacity * (0.7 + 0.3 * self.phase.sin())
    }
}

/// Particle count for a viewport: one per 40 000 px², capped
pub fn particle_count(width: f32, height: f32) -> usize {
    let area = width.max(0.0) as f64 * height.max(0.0) as f64;
    let count = (area / AREA_PER_PARTICLE as f64).floor() as usize;
    count.min(MAX_AMBIENT_PARTICLES)
}

/// Keep `v` inside [0, extent)
fn wrap(v: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    let w = v.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if w >= extent { 0.0 } else { w }
}

/// Toroidal particle field owning its own RNG
#[derive(Debug, Clone)]
pub struct ParticleField {
    width: f32,
    height: f32,
    particles: Vec<AmbientParticle>,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut field = Self {
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        field.resize(width, height);
        field
    }

    /// Replace every particle for the new viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let count = particle_count(self.width, self.height);
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| AmbientParticle::spawn(rng, w, h))
            .collect();
        log::debug!("Particle field {}x{}: {} particles", w, h, count);
    }

    /// One frame of drift
    pub fn update(&mut self) {
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            p.pos += p.vel;
            p.pos.x = wrap(p.pos.x, w);
            p.pos.y = wrap(p.pos.y, h);
            p.phase = (p.phase + PHASE_STEP) % TAU;
        }
    }

    pub fn render<S: DrawSurface>(&self, surface: &mut S, dark: bool) {
        let color = if dark {
            palette::PARTICLE_DARK
        } else {
            palette::PARTICLE_LIGHT
        };
        for p in &self.particles {
            surface.radial_glow(
                p.pos,
                p.radius * GLOW_SCALE,
                color.with_alpha(p.opacity()),
                color.transparent(),
            );
        }
    }

    pub fn particles(&self) -> &[AmbientParticle] {
        &self.particles
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}
