//! Spawn context for particle initialization.
//!
//! Emitters never touch the RNG or the palette directly; they go through the
//! helpers on [`SpawnContext`], which also applies the configured scale and
//! the mode's size range to every particle it builds.
//!
//! ```ignore
//! let mut ctx = SpawnContext::new(&mut rng, &palette, viewport, scale, SizeRange::STANDARD);
//! let velocity = ctx.random_direction() * ctx.random_range(1.0, 3.0);
//! let p = ctx.particle(cursor, velocity);
//! ```

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::particle::Particle;
use crate::pattern::scatter_points;
use crate::visuals::Palette;

/// Base size range of new particles, before scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    /// Sizes used by every mode except fractals.
    pub const STANDARD: SizeRange = SizeRange { min: 3.0, max: 9.0 };
    /// Smaller sizes for dense fractal bursts.
    pub const FRACTAL: SizeRange = SizeRange { min: 2.0, max: 6.0 };
}

/// Context handed to emitters with helpers for common spawn patterns.
pub struct SpawnContext<'a> {
    rng: &'a mut StdRng,
    palette: &'a Palette,
    /// Current viewport size in pixels.
    pub viewport: Vec2,
    /// Configured size multiplier.
    pub scale: f32,
    sizes: SizeRange,
}

impl<'a> SpawnContext<'a> {
    pub fn new(
        rng: &'a mut StdRng,
        palette: &'a Palette,
        viewport: Vec2,
        scale: f32,
        sizes: SizeRange,
    ) -> Self {
        Self {
            rng,
            palette,
            viewport,
            scale,
            sizes,
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `min..max`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// Random u32 in `min..=max`.
    #[inline]
    pub fn random_count(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max.max(min))
    }

    /// True with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Direct RNG access for generators that take `impl Rng`.
    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    // ========== Geometry helpers ==========

    /// Random angle in `0..2π`.
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Random unit vector.
    pub fn random_direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.random_angle())
    }

    /// Uniformly random point inside the viewport.
    pub fn random_in_viewport(&mut self) -> Vec2 {
        scatter_points(self.viewport, 1, &mut *self.rng)
            .pop()
            .unwrap_or(Vec2::ZERO)
    }

    /// Random offset with each axis in `-extent..extent`.
    pub fn random_offset(&mut self, extent: f32) -> Vec2 {
        Vec2::new(
            self.random_range(-extent, extent),
            self.random_range(-extent, extent),
        )
    }

    // ========== Appearance helpers ==========

    /// Random palette color.
    pub fn color(&mut self) -> Vec3 {
        self.palette.pick(&mut *self.rng)
    }

    /// Random size from the mode's range, times scale.
    pub fn size(&mut self) -> f32 {
        let base = self.random_range(self.sizes.min, self.sizes.max);
        base * self.scale
    }

    /// A fresh particle with random color and size.
    pub fn particle(&mut self, position: Vec2, velocity: Vec2) -> Particle {
        let size = self.size();
        let color = self.color();
        Particle::new(position, velocity, size, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Scheme;
    use rand::SeedableRng;

    #[test]
    fn test_size_is_scaled() {
        let mut rng = StdRng::seed_from_u64(1);
        let palette = Palette::default();
        let mut ctx = SpawnContext::new(
            &mut rng,
            &palette,
            Vec2::new(800.0, 600.0),
            2.0,
            SizeRange::FRACTAL,
        );
        for _ in 0..100 {
            let size = ctx.size();
            assert!((4.0..12.0).contains(&size));
        }
    }

    #[test]
    fn test_color_comes_from_palette() {
        let mut rng = StdRng::seed_from_u64(2);
        let palette = Scheme::Fire.palette();
        let mut ctx = SpawnContext::new(
            &mut rng,
            &palette,
            Vec2::new(800.0, 600.0),
            1.0,
            SizeRange::STANDARD,
        );
        for _ in 0..50 {
            let color = ctx.color();
            assert!(palette.colors().contains(&color));
        }
    }

    #[test]
    fn test_random_in_viewport() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette = Palette::default();
        let viewport = Vec2::new(320.0, 200.0);
        let mut ctx = SpawnContext::new(&mut rng, &palette, viewport, 1.0, SizeRange::STANDARD);
        for _ in 0..100 {
            let p = ctx.random_in_viewport();
            assert!(p.x >= 0.0 && p.x <= viewport.x);
            assert!(p.y >= 0.0 && p.y <= viewport.y);
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        let palette = Palette::default();
        let mut ctx = SpawnContext::new(&mut rng, &palette, Vec2::ZERO, 1.0, SizeRange::STANDARD);
        assert_eq!(ctx.random_range(5.0, 5.0), 5.0);
        assert_eq!(ctx.random_count(3, 3), 3);
        assert!(!ctx.chance(0.0));
        assert!(ctx.chance(1.0));
    }
}
