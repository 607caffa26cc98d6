//! Particle emitters built from input events.
//!
//! Each input event becomes one [`Emitter`] value, which appends new
//! particles (and sometimes beams) to the simulation's live buffers.
//!
//! | Type | Trigger | Output |
//! |------|---------|--------|
//! | [`Emitter::Trail`] | pointer move | 1–3 slow particles |
//! | [`Emitter::Laser`] | pointer move, laser mode | one beam across the viewport |
//! | [`Emitter::Lightning`] | pointer move, lightning mode | one 10-segment bolt |
//! | [`Emitter::Burst`] | click | `count` radial particles |
//! | [`Emitter::Fractal`] | click, fractals mode | one generator's points |
//! | [`Emitter::Grid`] | click, grid mode | 11×11 radiating grid |
//! | [`Emitter::Scatter`] | key press | `count` particles at one random spot |

use std::f32::consts::TAU;

use glam::Vec2;

use crate::effects::{Beam, LIGHTNING_JITTER, LIGHTNING_REACH};
use crate::particle::{Particle, Pattern};
use crate::pattern::{
    dragon_curve, mandelbrot_escape, recursive_branch, sacred_geometry_points, sierpinski,
    spiral_points, FractalKind,
};
use crate::spawn::SpawnContext;

/// Particles per ordinary click burst.
pub const BURST_COUNT: u32 = 30;
/// Particles per firework click burst.
pub const FIREWORK_COUNT: u32 = 60;
/// Particles per key press.
pub const SCATTER_COUNT: u32 = 20;

/// Cells per side of the grid burst.
pub const GRID_CELLS: i32 = 11;
/// Grid burst spacing before scaling.
pub const GRID_SPACING: f32 = 20.0;

const TRAIL_SPEED: (f32, f32) = (1.0, 3.0);
const BURST_SPEED: (f32, f32) = (3.0, 8.0);
const GRID_SPEED: f32 = 2.0;

const MANDELBROT_SIDE: usize = 10;
const MANDELBROT_ITERATIONS: u32 = 20;
const MANDELBROT_ZOOM: f32 = 40.0;
const SPIRAL_COUNT: usize = 100;
const SACRED_RADIUS: f32 = 50.0;
const SACRED_COMPLEXITY: u32 = 2;
const BRANCH_SIZE: f32 = 40.0;
const BRANCH_DEPTH: u32 = 3;
const SIERPINSKI_SIDE: f32 = 200.0;
const SIERPINSKI_DEPTH: u32 = 4;
const DRAGON_LENGTH: f32 = 200.0;
const DRAGON_DEPTH: u32 = 8;

/// One emission request.
#[derive(Clone, Debug, PartialEq)]
pub enum Emitter {
    /// Pointer trail: 1–3 particles at `position`, random heading, speed 1–3.
    Trail { position: Vec2 },

    /// A laser beam from `origin` in a random direction, as long as the
    /// viewport diagonal.
    Laser { origin: Vec2 },

    /// A lightning bolt from `origin` to a point up to 300 px away per axis.
    Lightning { origin: Vec2 },

    /// Radial burst of `count` particles at evenly spaced angles, speed 3–8.
    Burst { position: Vec2, count: u32 },

    /// Run one fractal generator at `center`; every point becomes a tagged
    /// particle drifting outward.
    Fractal { center: Vec2, kind: FractalKind },

    /// 11×11 grid of particles centered on `center`, moving away from it.
    Grid { center: Vec2 },

    /// `count` particles at a single random viewport location.
    Scatter { count: u32 },
}

impl Emitter {
    /// Append this emitter's output to the live buffers.
    pub fn emit(&self, ctx: &mut SpawnContext<'_>, particles: &mut Vec<Particle>, beams: &mut Vec<Beam>) {
        match *self {
            Emitter::Trail { position } => {
                let count = ctx.random_count(1, 3);
                for _ in 0..count {
                    particles.push(wandering(ctx, position));
                }
            }
            Emitter::Laser { origin } => {
                let angle = ctx.random_angle();
                let length = ctx.viewport.length();
                let color = ctx.color();
                beams.push(Beam::laser(origin, angle, length, color, 2.0 * ctx.scale));
            }
            Emitter::Lightning { origin } => {
                let end = origin + ctx.random_offset(LIGHTNING_REACH);
                let color = ctx.color();
                let width = 2.0 * ctx.scale;
                beams.push(Beam::lightning(origin, end, LIGHTNING_JITTER, color, width, ctx.rng()));
            }
            Emitter::Burst { position, count } => {
                particles.reserve(count as usize);
                for i in 0..count {
                    let angle = TAU * i as f32 / count as f32;
                    let speed = ctx.random_range(BURST_SPEED.0, BURST_SPEED.1);
                    particles.push(ctx.particle(position, Vec2::from_angle(angle) * speed));
                }
            }
            Emitter::Fractal { center, kind } => emit_fractal(ctx, center, kind, particles),
            Emitter::Grid { center } => {
                let spacing = GRID_SPACING * ctx.scale;
                let half = GRID_CELLS / 2;
                for row in -half..=half {
                    for col in -half..=half {
                        let offset = Vec2::new(col as f32, row as f32) * spacing;
                        let direction = outward(ctx, offset);
                        particles.push(ctx.particle(center + offset, direction * GRID_SPEED));
                    }
                }
            }
            Emitter::Scatter { count } => {
                let position = ctx.random_in_viewport();
                for _ in 0..count {
                    particles.push(wandering(ctx, position));
                }
            }
        }
    }
}

/// Slow particle in a random direction.
fn wandering(ctx: &mut SpawnContext<'_>, position: Vec2) -> Particle {
    let speed = ctx.random_range(TRAIL_SPEED.0, TRAIL_SPEED.1);
    let direction = ctx.random_direction();
    ctx.particle(position, direction * speed)
}

/// Unit vector along `offset`, or a random one when `offset` is zero.
fn outward(ctx: &mut SpawnContext<'_>, offset: Vec2) -> Vec2 {
    match offset.try_normalize() {
        Some(direction) => direction,
        None => ctx.random_direction(),
    }
}

fn emit_fractal(ctx: &mut SpawnContext<'_>, center: Vec2, kind: FractalKind, out: &mut Vec<Particle>) {
    let scale = ctx.scale;

    if kind == FractalKind::Mandelbrot {
        // sample c on a grid over [-2, 1] x [-1.5, 1.5]
        let zoom = MANDELBROT_ZOOM * scale;
        for row in 0..MANDELBROT_SIDE {
            for col in 0..MANDELBROT_SIDE {
                let c = Vec2::new(
                    -2.0 + 3.0 * col as f32 / (MANDELBROT_SIDE - 1) as f32,
                    -1.5 + 3.0 * row as f32 / (MANDELBROT_SIDE - 1) as f32,
                );
                let intensity = mandelbrot_escape(c.x, c.y, MANDELBROT_ITERATIONS);
                let offset = (c + Vec2::new(0.5, 0.0)) * zoom;
                let direction = outward(ctx, offset);
                let velocity = direction * (0.5 + intensity);
                out.push(
                    ctx.particle(center + offset, velocity)
                        .with_pattern(Pattern::Mandelbrot { intensity }),
                );
            }
        }
        return;
    }

    let points = match kind {
        FractalKind::Spiral => spiral_points(center, SPIRAL_COUNT)
            .into_iter()
            .map(|p| center + (p - center) * scale)
            .collect(),
        FractalKind::Sacred => sacred_geometry_points(center, SACRED_RADIUS * scale, SACRED_COMPLEXITY),
        FractalKind::Recursive => recursive_branch(center, BRANCH_SIZE * scale, 0, BRANCH_DEPTH),
        FractalKind::Sierpinski => {
            let side = SIERPINSKI_SIDE * scale;
            let height = side * 3.0_f32.sqrt() / 2.0;
            let top = center + Vec2::new(0.0, -height * 2.0 / 3.0);
            let left = center + Vec2::new(-side / 2.0, height / 3.0);
            let right = center + Vec2::new(side / 2.0, height / 3.0);
            sierpinski(top, left, right, 0, SIERPINSKI_DEPTH)
        }
        FractalKind::Dragon => {
            let length = DRAGON_LENGTH * scale;
            let start = center - Vec2::new(length / 2.0, 0.0);
            dragon_curve(start, length, 0.0, 0, DRAGON_DEPTH)
        }
        FractalKind::Mandelbrot => Vec::new(),
    };

    let pattern = Pattern::from_kind(kind);
    out.reserve(points.len());
    for point in points {
        let direction = outward(ctx, point - center);
        let speed = ctx.random_range(0.5, 1.5);
        out.push(ctx.particle(point, direction * speed).with_pattern(pattern));
    }
}
