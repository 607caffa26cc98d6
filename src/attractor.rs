//! Hopalong attractor orbits.
//!
//! An [`Orbit`] is generated in two passes: the recurrence is iterated in
//! `f64` while tracking per-axis extents, then every point is rescaled into
//! `[-S, S]` using those extents. Colors are assigned afterwards from an
//! [`OrbitColoring`].
//!
//! ```ignore
//! let params = HopalongParams::random(&mut rng);
//! let orbit = generate_orbit(&params, 0, &OrbitSettings::default(), &coloring, &mut rng);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, warn};

use crate::visuals::{hsl_to_rgb, shift_hue, Palette};

/// Default half-extent of normalized orbit coordinates.
pub const DEFAULT_ORBIT_SCALE: f32 = 1500.0;

/// Hue offset between consecutive subsets in [`OrbitColoring::Hsl`].
pub const SUBSET_HUE_STEP: f32 = 0.1;

static NEXT_ORBIT_ID: AtomicU64 = AtomicU64::new(1);

/// The non-linearity applied inside the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// `√|v|`
    SquareRoot,
    /// `⁴√|v|`
    FourthRoot,
    /// `ln(2 + √|v|)`
    LogSqrt,
}

impl Formula {
    /// Map a choice value in [0, 1) to a formula: below 0.5 square root,
    /// below 0.75 fourth root, otherwise log.
    pub fn from_choice(choice: f64) -> Self {
        if choice < 0.5 {
            Formula::SquareRoot
        } else if choice < 0.75 {
            Formula::FourthRoot
        } else {
            Formula::LogSqrt
        }
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        let magnitude = v.abs();
        match self {
            Formula::SquareRoot => magnitude.sqrt(),
            Formula::FourthRoot => magnitude.sqrt().sqrt(),
            Formula::LogSqrt => (2.0 + magnitude.sqrt()).ln(),
        }
    }
}

/// The five recurrence scalars plus the formula they are used with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopalongParams {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub formula: Formula,
}

impl HopalongParams {
    /// Draw a random parameter set.
    ///
    /// a ∈ [-30, 30], b ∈ [0.2, 1.8], c ∈ [5, 17], d ∈ [0, 10], e ∈ [0, 12].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            a: rng.gen_range(-30.0..=30.0),
            b: rng.gen_range(0.2..=1.8),
            c: rng.gen_range(5.0..=17.0),
            d: rng.gen_range(0.0..=10.0),
            e: rng.gen_range(0.0..=12.0),
            formula: Formula::from_choice(rng.gen::<f64>()),
        }
    }

    /// One step of the recurrence from `(x, y)`.
    #[inline]
    pub fn step(&self, x: f64, y: f64) -> (f64, f64) {
        let z = self.d + self.formula.apply(self.b * x - self.c);
        let x1 = if x > 0.0 {
            y - z
        } else if x < 0.0 {
            y + z
        } else {
            y
        };
        (x1 + self.e, self.a - x)
    }
}

/// Point budget per orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    Low,
    #[default]
    Medium,
    High,
}

impl Tier {
    pub fn points(&self) -> usize {
        match self {
            Tier::Low => 40_000,
            Tier::Medium => 100_000,
            Tier::High => 200_000,
        }
    }
}

/// How many points each orbit has and how far they spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    /// Points per orbit (the subset size).
    pub points: usize,
    /// Half-extent `S` of normalized coordinates.
    pub scale: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self::from_tier(Tier::default())
    }
}

impl OrbitSettings {
    pub fn from_tier(tier: Tier) -> Self {
        Self {
            points: tier.points(),
            scale: DEFAULT_ORBIT_SCALE,
        }
    }

    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Color assignment for orbit points.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitColoring {
    /// Palette bands by progress through the orbit, hue rotated by
    /// `hue_shift` turns per subset index.
    Palette { palette: Palette, hue_shift: f32 },
    /// One color per layer; hue advances by [`SUBSET_HUE_STEP`] per subset.
    Hsl {
        hue: f32,
        saturation: f32,
        lightness: f32,
    },
}

impl Default for OrbitColoring {
    fn default() -> Self {
        OrbitColoring::Palette {
            palette: Palette::default(),
            hue_shift: 0.0,
        }
    }
}

impl OrbitColoring {
    fn colors(&self, subset_index: usize, count: usize) -> Vec<Vec3> {
        match self {
            OrbitColoring::Palette { palette, hue_shift } => {
                let shift = hue_shift * subset_index as f32;
                let shifted = if shift == 0.0 {
                    palette.clone()
                } else {
                    Palette::new(palette.colors().iter().map(|c| shift_hue(*c, shift)).collect())
                };
                let denom = count.max(1) as f32;
                (0..count)
                    .map(|i| shifted.at_progress(i as f32 / denom))
                    .collect()
            }
            OrbitColoring::Hsl {
                hue,
                saturation,
                lightness,
            } => {
                let color = hsl_to_rgb(
                    hue + subset_index as f32 * SUBSET_HUE_STEP,
                    *saturation,
                    *lightness,
                );
                vec![color; count]
            }
        }
    }
}

/// One generated layer of attractor geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    /// Unique, increasing generation id.
    pub id: u64,
    /// Normalized positions in `[-S, S]²`.
    pub positions: Vec<Vec2>,
    /// One color per position.
    pub colors: Vec<Vec3>,
    pub params: HopalongParams,
}

impl Orbit {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Iterate the recurrence and build a normalized, colored orbit.
pub fn generate_orbit<R: Rng + ?Sized>(
    params: &HopalongParams,
    subset_index: usize,
    settings: &OrbitSettings,
    coloring: &OrbitColoring,
    rng: &mut R,
) -> Orbit {
    let count = settings.points;
    let jitter = 0.001 * (subset_index as f64 + 1.0);
    let mut x = rng.gen_range(-1.0..=1.0) * jitter;
    let mut y = rng.gen_range(-1.0..=1.0) * jitter;

    let mut xs = Vec::with_capacity(count);
    let mut ys = Vec::with_capacity(count);
    for _ in 0..count {
        (x, y) = params.step(x, y);
        xs.push(x);
        ys.push(y);
    }

    let s = settings.scale;
    let rx = rescale(&xs, s);
    let ry = rescale(&ys, s);
    let positions: Vec<Vec2> = rx.into_iter().zip(ry).map(|(x, y)| Vec2::new(x, y)).collect();
    let colors = coloring.colors(subset_index, positions.len());

    let id = NEXT_ORBIT_ID.fetch_add(1, Ordering::Relaxed);
    debug!(id, subset_index, points = count, formula = ?params.formula, "orbit generated");

    Orbit {
        id,
        positions,
        colors,
        params: *params,
    }
}

/// Map values linearly into `[-s, s]` using their own finite extents.
///
/// A zero or non-finite span maps every value to `-s`. Non-finite inputs
/// also map to `-s`.
pub fn rescale(values: &[f64], s: f32) -> Vec<f32> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let s64 = s as f64;
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        if !values.is_empty() {
            warn!(points = values.len(), "degenerate orbit axis, collapsing to one value");
        }
        return vec![-s; values.len()];
    }

    let factor = 2.0 * s64 / span;
    values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                ((v - min) * factor - s64).clamp(-s64, s64) as f32
            } else {
                -s
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Scheme;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_settings() -> OrbitSettings {
        OrbitSettings::from_tier(Tier::Low).with_points(5_000)
    }

    #[test]
    fn test_formula_choice_thresholds() {
        assert_eq!(Formula::from_choice(0.0), Formula::SquareRoot);
        assert_eq!(Formula::from_choice(0.49), Formula::SquareRoot);
        assert_eq!(Formula::from_choice(0.5), Formula::FourthRoot);
        assert_eq!(Formula::from_choice(0.74), Formula::FourthRoot);
        assert_eq!(Formula::from_choice(0.75), Formula::LogSqrt);
    }

    #[test]
    fn test_formula_values() {
        assert!((Formula::SquareRoot.apply(-16.0) - 4.0).abs() < 1e-12);
        assert!((Formula::FourthRoot.apply(16.0) - 2.0).abs() < 1e-12);
        assert!((Formula::LogSqrt.apply(0.0) - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_random_params_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let p = HopalongParams::random(&mut rng);
            assert!((-30.0..=30.0).contains(&p.a));
            assert!((0.2..=1.8).contains(&p.b));
            assert!((5.0..=17.0).contains(&p.c));
            assert!((0.0..=10.0).contains(&p.d));
            assert!((0.0..=12.0).contains(&p.e));
        }
    }

    #[test]
    fn test_step_sign_branches() {
        let p = HopalongParams {
            a: 1.0,
            b: 1.0,
            c: 0.0,
            d: 0.0,
            e: 0.0,
            formula: Formula::SquareRoot,
        };
        // z = sqrt(|4|) = 2
        assert_eq!(p.step(4.0, 10.0), (8.0, -3.0));
        assert_eq!(p.step(-4.0, 10.0), (12.0, 5.0));
        assert_eq!(p.step(0.0, 10.0), (10.0, 1.0));
    }

    #[test]
    fn test_orbit_within_bounds() {
        let mut rng = StdRng::seed_from_u64(21);
        let settings = small_settings();
        let coloring = OrbitColoring::default();
        for subset in 0..4 {
            let params = HopalongParams::random(&mut rng);
            let orbit = generate_orbit(&params, subset, &settings, &coloring, &mut rng);
            assert_eq!(orbit.len(), settings.points);
            assert_eq!(orbit.colors.len(), settings.points);
            let s = settings.scale;
            for p in &orbit.positions {
                assert!(p.is_finite());
                assert!(p.x >= -s && p.x <= s && p.y >= -s && p.y <= s);
            }
        }
    }

    #[test]
    fn test_orbit_ids_increase() {
        let mut rng = StdRng::seed_from_u64(1);
        let settings = OrbitSettings::default().with_points(10);
        let params = HopalongParams::random(&mut rng);
        let first = generate_orbit(&params, 0, &settings, &OrbitColoring::default(), &mut rng);
        let second = generate_orbit(&params, 0, &settings, &OrbitColoring::default(), &mut rng);
        assert!(second.id > first.id);
    }

    #[test]
    fn test_rescale_degenerate_axis() {
        let out = rescale(&[3.0; 8], 100.0);
        assert!(out.iter().all(|&v| v == -100.0));

        let out = rescale(&[f64::NAN, f64::INFINITY], 100.0);
        assert!(out.iter().all(|&v| v == -100.0));
    }

    #[test]
    fn test_rescale_extents() {
        let out = rescale(&[-5.0, 0.0, 15.0], 10.0);
        assert_eq!(out, vec![-10.0, -5.0, 10.0]);
    }

    #[test]
    fn test_palette_coloring_bands() {
        let palette = Scheme::Rainbow.palette();
        let coloring = OrbitColoring::Palette {
            palette: palette.clone(),
            hue_shift: 0.0,
        };
        let colors = coloring.colors(3, 70);
        assert_eq!(colors[0], palette.get(0));
        assert_eq!(colors[69], palette.get(6));
    }

    #[test]
    fn test_hsl_coloring_offsets_by_subset() {
        let coloring = OrbitColoring::Hsl {
            hue: 0.0,
            saturation: 1.0,
            lightness: 0.5,
        };
        let first = coloring.colors(0, 4);
        let second = coloring.colors(1, 4);
        assert!(first.iter().all(|c| *c == first[0]));
        assert_ne!(first[0], second[0]);
    }
}
