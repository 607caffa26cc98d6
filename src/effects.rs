//! Overlay effects drawn alongside particles.
//!
//! - [`Beam`]: laser beams and lightning bolts, short-lived vertex paths
//! - [`MouseTrail`]: the last [`TRAIL_CAPACITY`] pointer positions
//! - [`constellation_edges`]: fading lines between nearby particles
//! - [`GridOverlay`]: static background grid

use std::collections::VecDeque;

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::particle::Particle;

/// Life lost by a beam each tick.
pub const BEAM_DECAY: f32 = 0.05;

/// Number of pointer positions kept by the trail.
pub const TRAIL_CAPACITY: usize = 50;

/// Maximum distance at which two particles are joined.
pub const CONSTELLATION_RADIUS: f32 = 150.0;

/// Number of segments in a lightning bolt.
pub const LIGHTNING_SEGMENTS: usize = 10;
/// Largest offset of a bolt's end from its start, per axis.
pub const LIGHTNING_REACH: f32 = 300.0;
/// Largest sideways jitter of a bolt's interior vertices, per axis.
pub const LIGHTNING_JITTER: f32 = 20.0;

/// Kind of beam; affects only how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamKind {
    Laser,
    Lightning,
}

/// A laser beam or lightning bolt.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub kind: BeamKind,
    /// Ordered vertex path.
    pub points: Vec<Vec2>,
    /// Remaining life in [0, 1]; also the draw alpha.
    pub life: f32,
    pub color: Vec3,
    pub width: f32,
}

impl Beam {
    /// Straight beam of `length` leaving `origin` at `angle` radians.
    pub fn laser(origin: Vec2, angle: f32, length: f32, color: Vec3, width: f32) -> Self {
        Self {
            kind: BeamKind::Laser,
            points: vec![origin, origin + Vec2::from_angle(angle) * length],
            life: 1.0,
            color,
            width,
        }
    }

    /// Jagged bolt from `start` to `end`.
    ///
    /// The path has [`LIGHTNING_SEGMENTS`] segments. Endpoints are exact;
    /// interior vertices sit on the straight line, offset by up to
    /// `jitter` on each axis.
    pub fn lightning<R: Rng + ?Sized>(
        start: Vec2,
        end: Vec2,
        jitter: f32,
        color: Vec3,
        width: f32,
        rng: &mut R,
    ) -> Self {
        let mut points = Vec::with_capacity(LIGHTNING_SEGMENTS + 1);
        points.push(start);
        for i in 1..LIGHTNING_SEGMENTS {
            let t = i as f32 / LIGHTNING_SEGMENTS as f32;
            let offset = if jitter > 0.0 {
                Vec2::new(
                    rng.gen_range(-jitter..jitter),
                    rng.gen_range(-jitter..jitter),
                )
            } else {
                Vec2::ZERO
            };
            points.push(start.lerp(end, t) + offset);
        }
        points.push(end);

        Self {
            kind: BeamKind::Lightning,
            points,
            life: 1.0,
            color,
            width,
        }
    }

    pub fn advance(&mut self) {
        self.life -= BEAM_DECAY;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Ring buffer of recent pointer positions.
#[derive(Debug, Clone, Default)]
pub struct MouseTrail {
    points: VecDeque<Vec2>,
}

impl MouseTrail {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    /// Record a position, evicting the oldest once full.
    pub fn push(&mut self, point: Vec2) {
        if self.points.len() == TRAIL_CAPACITY {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Positions from oldest to newest.
    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// A line between two particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Vec2,
    pub to: Vec2,
    /// `1 - distance / CONSTELLATION_RADIUS`, in (0, 1].
    pub alpha: f32,
    /// Color of the first particle.
    pub color: Vec3,
}

/// Every pair of live particles closer than [`CONSTELLATION_RADIUS`].
///
/// Quadratic in the particle count.
pub fn constellation_edges(particles: &[Particle]) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (i, a) in particles.iter().enumerate() {
        if !a.is_alive() {
            continue;
        }
        for b in &particles[i + 1..] {
            if !b.is_alive() {
                continue;
            }
            let distance = a.position.distance(b.position);
            if distance < CONSTELLATION_RADIUS {
                edges.push(Edge {
                    from: a.position,
                    to: b.position,
                    alpha: 1.0 - distance / CONSTELLATION_RADIUS,
                    color: a.color,
                });
            }
        }
    }
    edges
}

/// Evenly spaced background grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOverlay {
    pub spacing: f32,
    pub opacity: f32,
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            opacity: 0.1,
        }
    }
}

impl GridOverlay {
    /// Vertical then horizontal line segments covering `viewport`.
    pub fn lines(&self, viewport: Vec2) -> Vec<(Vec2, Vec2)> {
        if self.spacing <= 0.0 || !self.spacing.is_finite() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        let mut x = 0.0;
        while x <= viewport.x {
            lines.push((Vec2::new(x, 0.0), Vec2::new(x, viewport.y)));
            x += self.spacing;
        }
        let mut y = 0.0;
        while y <= viewport.y {
            lines.push((Vec2::new(0.0, y), Vec2::new(viewport.x, y)));
            y += self.spacing;
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_laser_geometry() {
        let beam = Beam::laser(Vec2::ZERO, 0.0, 100.0, Vec3::ONE, 2.0);
        assert_eq!(beam.points.len(), 2);
        assert!(beam.points[1].distance(Vec2::new(100.0, 0.0)) < 1e-4);
    }

    #[test]
    fn test_lightning_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let start = Vec2::new(10.0, 10.0);
        let end = Vec2::new(210.0, 110.0);
        let bolt = Beam::lightning(start, end, LIGHTNING_JITTER, Vec3::ONE, 2.0, &mut rng);

        assert_eq!(bolt.points.len(), LIGHTNING_SEGMENTS + 1);
        assert_eq!(bolt.points[0], start);
        assert_eq!(bolt.points[LIGHTNING_SEGMENTS], end);
        for (i, p) in bolt.points.iter().enumerate() {
            let on_line = start.lerp(end, i as f32 / LIGHTNING_SEGMENTS as f32);
            let offset = (*p - on_line).abs();
            assert!(offset.x <= LIGHTNING_JITTER && offset.y <= LIGHTNING_JITTER);
        }
    }

    #[test]
    fn test_beam_lives_twenty_ticks() {
        let mut beam = Beam::laser(Vec2::ZERO, 0.0, 10.0, Vec3::ONE, 1.0);
        let mut ticks = 0;
        while beam.is_alive() {
            beam.advance();
            ticks += 1;
        }
        assert!((20..=21).contains(&ticks));
    }

    #[test]
    fn test_trail_keeps_last_fifty() {
        let mut trail = MouseTrail::new();
        for i in 0..80 {
            trail.push(Vec2::splat(i as f32));
        }
        assert_eq!(trail.len(), TRAIL_CAPACITY);
        assert_eq!(trail.points().next(), Some(Vec2::splat(30.0)));
        assert_eq!(trail.points().last(), Some(Vec2::splat(79.0)));
    }

    #[test]
    fn test_constellation_edges() {
        let make = |x: f32| Particle::new(Vec2::new(x, 0.0), Vec2::ZERO, 2.0, Vec3::ONE);
        let particles = vec![make(0.0), make(75.0), make(400.0)];
        let edges = constellation_edges(&particles);

        assert_eq!(edges.len(), 1);
        assert!((edges[0].alpha - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_constellation_skips_dead() {
        let mut a = Particle::new(Vec2::ZERO, Vec2::ZERO, 2.0, Vec3::ONE);
        let b = Particle::new(Vec2::new(10.0, 0.0), Vec2::ZERO, 2.0, Vec3::ONE);
        a.life = 0.0;
        assert!(constellation_edges(&[a, b]).is_empty());
    }

    #[test]
    fn test_grid_lines() {
        let grid = GridOverlay::default();
        let lines = grid.lines(Vec2::new(100.0, 50.0));
        // x = 0, 50, 100 and y = 0, 50
        assert_eq!(lines.len(), 5);
        assert_eq!(grid.opacity, 0.1);
    }
}
