//! The particle: the engine's transient visual unit.

use glam::{Vec2, Vec3};

use crate::pattern::FractalKind;

/// Life lost per tick.
pub const LIFE_DECAY: f32 = 0.01;

/// Ticks during which a particle is kept even outside the viewport.
pub const YOUNG_TICKS: u32 = 10;

/// Extra border around the viewport inside which particles survive.
pub const VIEWPORT_MARGIN: f32 = 50.0;

/// Which generator produced a particle. Selects its draw shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Pattern {
    /// Plain particle, drawn with the configured shape.
    #[default]
    None,
    /// Mandelbrot burst sample; `intensity` is the escape value in [0, 1].
    Mandelbrot { intensity: f32 },
    Spiral,
    Sacred,
    Recursive,
    Sierpinski,
    Dragon,
}

impl Pattern {
    /// The fractal kind behind this tag, if any.
    pub fn kind(&self) -> Option<FractalKind> {
        match self {
            Pattern::None => None,
            Pattern::Mandelbrot { .. } => Some(FractalKind::Mandelbrot),
            Pattern::Spiral => Some(FractalKind::Spiral),
            Pattern::Sacred => Some(FractalKind::Sacred),
            Pattern::Recursive => Some(FractalKind::Recursive),
            Pattern::Sierpinski => Some(FractalKind::Sierpinski),
            Pattern::Dragon => Some(FractalKind::Dragon),
        }
    }

    /// Tag for a fractal kind. Mandelbrot starts at full intensity.
    pub fn from_kind(kind: FractalKind) -> Self {
        match kind {
            FractalKind::Mandelbrot => Pattern::Mandelbrot { intensity: 1.0 },
            FractalKind::Spiral => Pattern::Spiral,
            FractalKind::Sacred => Pattern::Sacred,
            FractalKind::Recursive => Pattern::Recursive,
            FractalKind::Sierpinski => Pattern::Sierpinski,
            FractalKind::Dragon => Pattern::Dragon,
        }
    }
}

/// A single particle in screen space (pixels, y down).
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Remaining life in [0, 1]. Starts at 1 and only ever decreases.
    pub life: f32,
    /// Ticks survived so far.
    pub age: u32,
    pub size: f32,
    pub color: Vec3,
    /// Heading used by orbit motion and draw rotation.
    pub angle: f32,
    pub speed: f32,
    pub pattern: Pattern,
}

impl Particle {
    /// A fresh particle at full life.
    pub fn new(position: Vec2, velocity: Vec2, size: f32, color: Vec3) -> Self {
        Self {
            position,
            velocity,
            life: 1.0,
            age: 0,
            size,
            color,
            angle: velocity.y.atan2(velocity.x),
            speed: velocity.length(),
            pattern: Pattern::None,
        }
    }

    /// Builder-style pattern tag.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Move by velocity, burn one tick of life and age by one.
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.life -= LIFE_DECAY;
        self.age = self.age.saturating_add(1);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn is_young(&self) -> bool {
        self.age < YOUNG_TICKS
    }

    /// Whether the particle lies within the viewport grown by [`VIEWPORT_MARGIN`].
    pub fn in_view(&self, viewport: Vec2) -> bool {
        let p = self.position;
        p.x >= -VIEWPORT_MARGIN
            && p.y >= -VIEWPORT_MARGIN
            && p.x <= viewport.x + VIEWPORT_MARGIN
            && p.y <= viewport.y + VIEWPORT_MARGIN
    }

    /// Retention predicate: alive, and either on screen or still young.
    pub fn should_keep(&self, viewport: Vec2) -> bool {
        self.is_alive() && (self.in_view(viewport) || self.is_young())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(Vec2::new(x, y), Vec2::new(1.0, 0.0), 4.0, Vec3::ONE)
    }

    #[test]
    fn test_advance_decays_life() {
        let mut p = particle_at(10.0, 10.0);
        p.advance();
        assert_eq!(p.position, Vec2::new(11.0, 10.0));
        assert!((p.life - 0.99).abs() < 1e-6);
        assert_eq!(p.age, 1);
    }

    #[test]
    fn test_dies_after_one_hundred_ticks() {
        let mut p = particle_at(10.0, 10.0);
        p.velocity = Vec2::ZERO;
        let mut ticks = 0;
        while p.is_alive() {
            p.advance();
            ticks += 1;
        }
        // float accumulation may land on either side of 100
        assert!((100..=101).contains(&ticks));
    }

    #[test]
    fn test_offscreen_young_particle_is_kept() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut p = particle_at(-500.0, 0.0);
        assert!(p.should_keep(viewport));
        p.age = YOUNG_TICKS;
        assert!(!p.should_keep(viewport));
    }

    #[test]
    fn test_margin_is_inclusive() {
        let viewport = Vec2::new(800.0, 600.0);
        let mut p = particle_at(850.0, 650.0);
        p.age = YOUNG_TICKS;
        assert!(p.should_keep(viewport));
        p.position.x = 851.0;
        assert!(!p.should_keep(viewport));
    }

    #[test]
    fn test_pattern_kind_roundtrip() {
        for kind in FractalKind::ALL {
            assert_eq!(Pattern::from_kind(kind).kind(), Some(kind));
        }
        assert_eq!(Pattern::None.kind(), None);
    }
}
