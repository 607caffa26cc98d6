//! Fractal and geometric point generators.
//!
//! Every generator is a pure function returning screen-space points. The
//! recursive ones clamp their depth before recursing so a careless caller
//! cannot ask for an unbounded amount of output.
//!
//! | Generator | Output size |
//! |-----------|-------------|
//! | [`spiral_points`] | `count` |
//! | [`sacred_geometry_points`] | `(6 + complexity)²` |
//! | [`recursive_branch`] | `3 · (5^max_depth - 1) / 2` from depth 0 |
//! | [`sierpinski`] | `3 · 3^max_depth` from depth 0 |
//! | [`dragon_curve`] | `2^max_depth + 1` from depth 0 |

use std::f32::consts::{FRAC_PI_4, SQRT_2, TAU};

use glam::Vec2;
use rand::Rng;

/// Golden ratio φ.
pub const GOLDEN_RATIO: f32 = 1.618_034;

/// Golden angle in radians, `2π(1 - 1/φ)`.
pub const GOLDEN_ANGLE: f32 = TAU * (1.0 - 1.0 / GOLDEN_RATIO);

/// Distance between successive spiral rings, in pixels per √index.
pub const SPIRAL_SPACING: f32 = 5.0;

/// Deepest recursion accepted by [`recursive_branch`].
pub const MAX_BRANCH_DEPTH: u32 = 8;
/// Deepest recursion accepted by [`sierpinski`].
pub const MAX_SIERPINSKI_DEPTH: u32 = 10;
/// Deepest recursion accepted by [`dragon_curve`].
pub const MAX_DRAGON_DEPTH: u32 = 16;

const BRANCHES: u32 = 5;
const BRANCH_SHRINK: f32 = 0.6;
const BRANCH_TWIST: f32 = 0.5;

/// The six fractal burst generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FractalKind {
    Mandelbrot,
    Spiral,
    Sacred,
    Recursive,
    Sierpinski,
    Dragon,
}

impl FractalKind {
    pub const ALL: [FractalKind; 6] = [
        FractalKind::Mandelbrot,
        FractalKind::Spiral,
        FractalKind::Sacred,
        FractalKind::Recursive,
        FractalKind::Sierpinski,
        FractalKind::Dragon,
    ];

    /// Pick one kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Escape-time probe for the Mandelbrot set.
///
/// Iterates `z ← z² + c` from `z = 0` with `c = (x, y)`. Returns
/// `i / max_iter` for the first iteration `i` where `|z|² > 4`, or `1.0`
/// when the point never escapes.
pub fn mandelbrot_escape(x: f32, y: f32, max_iter: u32) -> f32 {
    if max_iter == 0 {
        return 1.0;
    }

    let (mut re, mut im) = (0.0_f32, 0.0_f32);
    for i in 0..max_iter {
        let next_re = re * re - im * im + x;
        im = 2.0 * re * im + y;
        re = next_re;
        if re * re + im * im > 4.0 {
            return i as f32 / max_iter as f32;
        }
    }
    1.0
}

/// Points on a golden-angle (phyllotaxis) spiral around `center`.
pub fn spiral_points(center: Vec2, count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * GOLDEN_ANGLE;
            let radius = (i as f32).sqrt() * SPIRAL_SPACING;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Flower-of-life tessellation.
///
/// `6 + complexity` outer centers on a circle of `radius`, each expanded into
/// `6 + complexity` points on a circle of `radius / 2`.
pub fn sacred_geometry_points(center: Vec2, radius: f32, complexity: u32) -> Vec<Vec2> {
    let circles = 6 + complexity;
    let step = TAU / circles as f32;
    let mut points = Vec::with_capacity((circles * circles) as usize);

    for i in 0..circles {
        let outer = center + Vec2::from_angle(step * i as f32) * radius;
        for j in 0..circles {
            points.push(outer + Vec2::from_angle(step * j as f32) * radius * 0.5);
        }
    }
    points
}

/// Five-way recursive branching.
///
/// Each non-terminal level emits its own point, then for each of five
/// children emits the child point and recurses into it. Children sit `size`
/// away, at angles evenly spread over a full turn and twisted by
/// `depth · 0.5` radians, and shrink by 0.6×. A call at `depth >= max_depth`
/// emits nothing.
pub fn recursive_branch(origin: Vec2, size: f32, depth: u32, max_depth: u32) -> Vec<Vec2> {
    let mut points = Vec::new();
    branch_into(&mut points, origin, size, depth, max_depth.min(MAX_BRANCH_DEPTH));
    points
}

fn branch_into(out: &mut Vec<Vec2>, at: Vec2, size: f32, depth: u32, max_depth: u32) {
    if depth >= max_depth {
        return;
    }

    out.push(at);
    for i in 0..BRANCHES {
        let angle = TAU * i as f32 / BRANCHES as f32 + depth as f32 * BRANCH_TWIST;
        let child = at + Vec2::from_angle(angle) * size;
        out.push(child);
        branch_into(out, child, size * BRANCH_SHRINK, depth + 1, max_depth);
    }
}

/// Sierpinski triangle corners.
///
/// At `max_depth` the triangle's three corners are returned; above it the
/// triangle is split at its edge midpoints and the three corner triangles are
/// recursed into (the middle one is dropped).
pub fn sierpinski(p1: Vec2, p2: Vec2, p3: Vec2, depth: u32, max_depth: u32) -> Vec<Vec2> {
    let mut points = Vec::new();
    sierpinski_into(&mut points, [p1, p2, p3], depth, max_depth.min(MAX_SIERPINSKI_DEPTH));
    points
}

fn sierpinski_into(out: &mut Vec<Vec2>, [a, b, c]: [Vec2; 3], depth: u32, max_depth: u32) {
    if depth >= max_depth {
        out.extend_from_slice(&[a, b, c]);
        return;
    }

    let ab = a.lerp(b, 0.5);
    let bc = b.lerp(c, 0.5);
    let ca = c.lerp(a, 0.5);
    sierpinski_into(out, [a, ab, ca], depth + 1, max_depth);
    sierpinski_into(out, [ab, b, bc], depth + 1, max_depth);
    sierpinski_into(out, [ca, bc, c], depth + 1, max_depth);
}

/// Heighway dragon curve as one connected path.
///
/// Each level replaces a segment by two segments of length `/√2`, turned
/// −45° then +45°, the second starting where the first ends. The junction is
/// emitted once, so a depth-0 call returns `2^max_depth + 1` points.
pub fn dragon_curve(start: Vec2, length: f32, angle: f32, depth: u32, max_depth: u32) -> Vec<Vec2> {
    let mut points = vec![start];
    dragon_into(&mut points, start, length, angle, depth, max_depth.min(MAX_DRAGON_DEPTH));
    points
}

/// Appends every point after `start` and returns the path's end.
fn dragon_into(
    out: &mut Vec<Vec2>,
    start: Vec2,
    length: f32,
    angle: f32,
    depth: u32,
    max_depth: u32,
) -> Vec2 {
    if depth >= max_depth {
        let end = start + Vec2::from_angle(angle) * length;
        out.push(end);
        return end;
    }

    let half = length / SQRT_2;
    let joint = dragon_into(out, start, half, angle - FRAC_PI_4, depth + 1, max_depth);
    dragon_into(out, joint, half, angle + FRAC_PI_4, depth + 1, max_depth)
}

/// One sample of a Lissajous figure in [-1, 1]².
pub fn lissajous_point(t: f32, a: f32, b: f32, delta: f32) -> Vec2 {
    Vec2::new((a * t + delta).sin(), (b * t).sin())
}

/// Uniformly scattered points inside a `size` rectangle anchored at the origin.
pub fn scatter_points<R: Rng + ?Sized>(size: Vec2, count: usize, rng: &mut R) -> Vec<Vec2> {
    (0..count)
        .map(|_| Vec2::new(rng.gen::<f32>() * size.x, rng.gen::<f32>() * size.y))
        .collect()
}
