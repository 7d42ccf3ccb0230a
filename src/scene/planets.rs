//! Planet factory and layout
//!
//! Five spheres start in a straight line. Variants with the transition enabled
//! ease them onto a ring which then keeps rotating.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use crate::consts::*;
use crate::{hex_to_rgb, smoothstep};

/// Surface parameters shared by every planet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetMaterial {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Default for PlanetMaterial {
    fn default() -> Self {
        Self {
            color: hex_to_rgb(0x0066ff),
            metalness: 0.2,
            roughness: 0.5,
            emissive: hex_to_rgb(0x002266),
            emissive_intensity: 0.3,
        }
    }
}

/// A planet sphere
#[derive(Debug, Clone)]
pub struct Planet {
    pub index: usize,
    pub position: Vec3,
    /// Euler angles (XYZ order)
    pub rotation: Vec3,
    pub radius: f32,
}

impl Planet {
    /// Advance the slow tumble
    pub fn spin(&mut self, dt: f32) {
        self.rotation.x = (self.rotation.x + PLANET_SPIN_RATE * dt) % TAU;
        self.rotation.y = (self.rotation.y + PLANET_SPIN_RATE * dt) % TAU;
    }
}

/// Planet centers along the X axis, centered on the origin
pub fn line_positions() -> [Vec3; PLANET_COUNT] {
    let start_x = -((PLANET_COUNT - 1) as f32) * PLANET_SPACING / 2.0;
    std::array::from_fn(|i| Vec3::new(start_x + i as f32 * PLANET_SPACING, 0.0, 0.0))
}

/// Planet centers on a ring in the XY plane. Planet 0 sits on the left at `angle = 0`.
pub fn circle_positions(radius: f32, angle: f32) -> [Vec3; PLANET_COUNT] {
    std::array::from_fn(|i| {
        let theta = PI - i as f32 * TAU / PLANET_COUNT as f32 + angle;
        Vec3::new(radius * theta.cos(), radius * theta.sin(), 0.0)
    })
}

/// Build the planets at their line positions with random initial rotation
pub fn create_planetary_system<R: Rng>(rng: &mut R) -> Vec<Planet> {
    line_positions()
        .into_iter()
        .enumerate()
        .map(|(index, position)| Planet {
            index,
            position,
            rotation: Vec3::new(
                rng.random::<f32>() * TAU,
                rng.random::<f32>() * TAU,
                rng.random::<f32>() * TAU,
            ),
            radius: PLANET_RADIUS,
        })
        .collect()
}

/// Arrangement phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutPhase {
    /// Straight line (line-only variants stay here)
    Line,
    /// Easing from line to ring, progress in [0, 1)
    Transitioning { progress: f32 },
    /// Closed ring
    Circle,
}

/// Drives planet positions over time
#[derive(Debug, Clone)]
pub struct PlanetLayout {
    pub phase: LayoutPhase,
    /// Ring rotation angle
    pub angle: f32,
    enabled: bool,
}

impl PlanetLayout {
    pub fn new(transition_enabled: bool) -> Self {
        Self {
            phase: LayoutPhase::Line,
            angle: 0.0,
            enabled: transition_enabled,
        }
    }

    /// Line (0) to circle (1) interpolation factor, eased
    pub fn blend(&self) -> f32 {
        match self.phase {
            LayoutPhase::Line => 0.0,
            LayoutPhase::Transitioning { progress } => smoothstep(progress),
            LayoutPhase::Circle => 1.0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.phase == LayoutPhase::Circle
    }

    /// Advance the layout to scene time `elapsed`
    pub fn update(&mut self, elapsed: f32, dt: f32) {
        if !self.enabled {
            return;
        }

        let progress = (elapsed - TRANSITION_START) / TRANSITION_DURATION;
        let next = if progress <= 0.0 {
            LayoutPhase::Line
        } else if progress < 1.0 {
            LayoutPhase::Transitioning { progress }
        } else {
            LayoutPhase::Circle
        };

        if next != self.phase {
            match next {
                LayoutPhase::Transitioning { .. } if self.phase == LayoutPhase::Line => {
                    log::info!("Planets leaving line formation");
                }
                LayoutPhase::Circle => log::info!("Planet ring closed"),
                _ => {}
            }
            self.phase = next;
        }

        // Ring spins up as it closes
        self.angle = (self.angle + LOOP_ANGULAR_SPEED * self.blend() * dt) % TAU;
    }

    /// Current planet centers
    pub fn positions(&self) -> [Vec3; PLANET_COUNT] {
        let line = line_positions();
        let blend = self.blend();
        if blend <= 0.0 {
            return line;
        }
        let ring = circle_positions(CIRCLE_RADIUS, self.angle);
        std::array::from_fn(|i| line[i].lerp(ring[i], blend))
    }

    /// Move planets to the current layout
    pub fn apply(&self, planets: &mut [Planet]) {
        let positions = self.positions();
        for planet in planets.iter_mut() {
            if let Some(pos) = positions.get(planet.index) {
                planet.position = *pos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_line_is_centered_and_evenly_spaced() {
        let line = line_positions();
        assert!((line[0].x + 3.0).abs() < 1e-6);
        assert!((line[4].x - 3.0).abs() < 1e-6);
        assert!(line[2].x.abs() < 1e-6);
        for pair in line.windows(2) {
            assert!((pair[1].x - pair[0].x - PLANET_SPACING).abs() < 1e-6);
        }
    }

    #[test]
    fn test_circle_starts_on_the_left() {
        let ring = circle_positions(CIRCLE_RADIUS, 0.0);
        assert!((ring[0].x + CIRCLE_RADIUS).abs() < 1e-5);
        assert!(ring[0].y.abs() < 1e-5);
        for p in ring {
            assert!((p.length() - CIRCLE_RADIUS).abs() < 1e-5);
        }
    }

    #[test]
    fn test_create_planetary_system() {
        let mut rng = Pcg32::seed_from_u64(7);
        let planets = create_planetary_system(&mut rng);
        assert_eq!(planets.len(), PLANET_COUNT);
        for (i, p) in planets.iter().enumerate() {
            assert_eq!(p.index, i);
            assert_eq!(p.radius, PLANET_RADIUS);
            assert!(p.rotation.x >= 0.0 && p.rotation.x < TAU);
        }
    }

    #[test]
    fn test_spin_advances_x_and_y_only() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut planet = create_planetary_system(&mut rng).remove(0);
        let before = planet.rotation;
        planet.spin(1.0 / 60.0);
        let d = planet.rotation - before;
        assert!(((d.x + TAU) % TAU - 0.005).abs() < 1e-4);
        assert!(((d.y + TAU) % TAU - 0.005).abs() < 1e-4);
        assert_eq!(d.z, 0.0);
    }

    #[test]
    fn test_line_only_layout_never_moves() {
        let mut layout = PlanetLayout::new(false);
        layout.update(100.0, 0.016);
        assert_eq!(layout.phase, LayoutPhase::Line);
        assert_eq!(layout.positions(), line_positions());
    }

    #[test]
    fn test_transition_phases() {
        let mut layout = PlanetLayout::new(true);
        layout.update(TRANSITION_START - 1.0, 0.016);
        assert_eq!(layout.phase, LayoutPhase::Line);
        assert_eq!(layout.angle, 0.0);

        layout.update(TRANSITION_START + TRANSITION_DURATION / 2.0, 0.016);
        assert!(matches!(layout.phase, LayoutPhase::Transitioning { .. }));
        assert!((layout.blend() - 0.5).abs() < 1e-4);

        layout.update(TRANSITION_START + TRANSITION_DURATION, 0.016);
        assert!(layout.is_closed());
        assert_eq!(layout.blend(), 1.0);
    }

    #[test]
    fn test_closed_ring_rotates() {
        let mut layout = PlanetLayout::new(true);
        layout.update(TRANSITION_START + TRANSITION_DURATION + 1.0, 0.0);
        let before = layout.positions();
        layout.update(TRANSITION_START + TRANSITION_DURATION + 2.0, 1.0);
        let after = layout.positions();
        assert!((layout.angle - LOOP_ANGULAR_SPEED).abs() < 1e-5);
        assert!(before[0].distance(after[0]) > 0.1);
        for p in after {
            assert!((p.length() - CIRCLE_RADIUS).abs() < 1e-4);
        }
    }
}
