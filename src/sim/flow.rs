//! Energy flow particle system
//!
//! A fixed-size point cloud streaming along the flow path. Each particle keeps
//! its seeded offset, speed, phase and spread; position, color and size are
//! recomputed every frame from closed-form sine/cosine terms of scene time.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use super::path::FlowPath;
use crate::fract;

/// Height of the arc bridging two planets
pub const ARC_LIFT: f32 = 0.35;
/// Base swirl angular rate
pub const SWIRL_RATE: f32 = 2.4;
/// Largest particle size (world units)
pub const BASE_SIZE: f32 = 0.06;

/// Range of per-particle path speeds (path fractions per second)
pub const SPEED_RANGE: (f32, f32) = (0.04, 0.10);
/// Range of per-particle swirl radii
pub const SPREAD_RANGE: (f32, f32) = (0.03, 0.12);

/// Seeded per-particle constants
#[derive(Debug, Clone, Copy)]
pub struct FlowParticle {
    /// Starting progress along the path, [0, 1)
    pub offset: f32,
    pub speed: f32,
    /// Phase of all oscillations, [0, TAU)
    pub phase: f32,
    /// Swirl radius around the path
    pub spread: f32,
}

impl FlowParticle {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            offset: rng.random::<f32>(),
            speed: rng.random_range(SPEED_RANGE.0..SPEED_RANGE.1),
            phase: rng.random::<f32>() * TAU,
            spread: rng.random_range(SPREAD_RANGE.0..SPREAD_RANGE.1),
        }
    }

    /// Progress along the path at scene time `t`
    #[inline]
    pub fn progress(&self, t: f32) -> f32 {
        fract(self.offset + t * self.speed)
    }
}

/// Fire ramp: deep red (cold) through orange to pale yellow (hot)
#[inline]
pub fn fire_color(heat: f32) -> [f32; 3] {
    let h = heat.clamp(0.0, 1.0);
    [1.0, 0.15 + 0.75 * h, 0.05 + 0.55 * h * h * h]
}

/// Particle system with per-frame output buffers
#[derive(Debug, Clone)]
pub struct EnergyFlow {
    particles: Vec<FlowParticle>,
    path: FlowPath,
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
    pub sizes: Vec<f32>,
}

impl EnergyFlow {
    /// Create `count` particles flowing through `points`
    pub fn new<R: Rng>(count: usize, points: &[Vec3], closed: bool, rng: &mut R) -> Self {
        let particles = (0..count).map(|_| FlowParticle::random(rng)).collect();
        Self::from_particles(particles, points, closed)
    }

    /// Flow with the given particles, buffers computed for time 0
    pub fn from_particles(particles: Vec<FlowParticle>, points: &[Vec3], closed: bool) -> Self {
        let count = particles.len();
        let mut flow = Self {
            particles,
            path: FlowPath::new(points, closed),
            positions: vec![Vec3::ZERO; count],
            colors: vec![[0.0; 3]; count],
            sizes: vec![0.0; count],
        };
        flow.update(0.0, points, 1.0);
        flow
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[FlowParticle] {
        &self.particles
    }

    pub fn path(&self) -> &FlowPath {
        &self.path
    }

    /// Recompute all buffers for scene time `t`.
    ///
    /// `closing_visibility` scales particles on the closing segment of a
    /// closed path (the ring fades its last link in as it forms).
    pub fn update(&mut self, t: f32, points: &[Vec3], closing_visibility: f32) {
        self.path.set_points(points);
        let closing_visibility = closing_visibility.clamp(0.0, 1.0);

        for (i, p) in self.particles.iter().enumerate() {
            let Some(sample) = self.path.sample(p.progress(t)) else {
                self.sizes[i] = 0.0;
                continue;
            };

            let visibility = if sample.closing { closing_visibility } else { 1.0 };
            let e = (PI * sample.local).sin();

            let theta = p.phase + t * SWIRL_RATE * (0.5 + p.speed * 5.0);
            let r = p.spread * (0.3 + 0.7 * e) * (1.0 + 0.3 * (3.0 * t + 2.0 * p.phase).sin());
            let flicker = 0.04 * e * (7.0 * t + 3.0 * p.phase).sin();

            self.positions[i] = sample.base
                + sample.up * (ARC_LIFT * e + r * theta.cos() + flicker)
                + Vec3::Z * (r * theta.sin());

            let heat = (0.5
                + 0.35 * (4.0 * t + p.phase + 6.0 * sample.local).sin()
                + 0.15 * (1.0 - e))
                .clamp(0.0, 1.0);
            let [cr, cg, cb] = fire_color(heat);
            self.colors[i] = [cr * visibility, cg * visibility, cb * visibility];

            self.sizes[i] = BASE_SIZE
                * (0.5 + 0.5 * e)
                * (0.75 + 0.25 * (6.0 * t + 2.0 * p.phase).sin())
                * visibility;
        }
    }
}
