//! Render sinks and the draw policy.
//!
//! The engine never talks to a GPU directly. It issues draw calls on a
//! [`Surface2d`] (canvas scene) or a [`PointCloudSink`] (attractor scene).
//! The windowed front end implements both on wgpu; tests use [`DrawList`]
//! and [`CloudRecorder`], which just record what they are asked to draw.
//!
//! Colors passed to a surface are straight (non-premultiplied) RGBA.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::attractor::Orbit;
use crate::effects::{Beam, BeamKind, Edge, GridOverlay, MouseTrail};
use crate::particle::{Particle, Pattern};
use crate::visuals::{Background, ParticleShape};

/// A 2D raster surface with path primitives.
pub trait Surface2d {
    /// Fill the whole surface.
    fn clear(&mut self, color: Vec3);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Vec4);
    /// Fill a convex or star-shaped polygon.
    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4);
    /// Stroke a path, closing it back to the first point when `closed`.
    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Vec4);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4) {
        self.stroke_polyline(&[from, to], false, width, color);
    }
}

/// A 3D scene that draws one orbit per attractor layer.
pub trait PointCloudSink {
    /// Draw `orbit`'s points (z = 0 in model space) transformed by `model`.
    fn draw_layer(&mut self, model: Mat4, orbit: &Orbit);
}

/// One recorded 2D draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Vec3),
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Vec4,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        width: f32,
        color: Vec4,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Vec4,
    },
    StrokePolyline {
        points: Vec<Vec2>,
        closed: bool,
        width: f32,
        color: Vec4,
    },
}

/// A [`Surface2d`] that records every call.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl Surface2d for DrawList {
    fn clear(&mut self, color: Vec3) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Vec4) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Vec4) {
        self.commands.push(DrawCommand::StrokePolyline {
            points: points.to_vec(),
            closed,
            width,
            color,
        });
    }
}

/// A surface that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface2d for NullSurface {
    fn clear(&mut self, _color: Vec3) {}
    fn fill_circle(&mut self, _center: Vec2, _radius: f32, _color: Vec4) {}
    fn stroke_circle(&mut self, _center: Vec2, _radius: f32, _width: f32, _color: Vec4) {}
    fn fill_polygon(&mut self, _points: &[Vec2], _color: Vec4) {}
    fn stroke_polyline(&mut self, _points: &[Vec2], _closed: bool, _width: f32, _color: Vec4) {}
}

/// One recorded layer draw.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDraw {
    pub model: Mat4,
    pub orbit_id: u64,
    pub points: usize,
}

/// A [`PointCloudSink`] that records layer draws.
#[derive(Debug, Clone, Default)]
pub struct CloudRecorder {
    pub draws: Vec<LayerDraw>,
}

impl PointCloudSink for CloudRecorder {
    fn draw_layer(&mut self, model: Mat4, orbit: &Orbit) {
        self.draws.push(LayerDraw {
            model,
            orbit_id: orbit.id,
            points: orbit.len(),
        });
    }
}

// ========== Geometry ==========

/// Vertices of a regular polygon, first vertex at `rotation` radians.
pub fn regular_polygon(center: Vec2, radius: f32, sides: usize, rotation: f32) -> Vec<Vec2> {
    let sides = sides.max(3);
    (0..sides)
        .map(|i| center + Vec2::from_angle(rotation + TAU * i as f32 / sides as f32) * radius)
        .collect()
}

/// Vertices of a star alternating between `outer` and `inner` radius.
pub fn star_polygon(center: Vec2, outer: f32, inner: f32, tips: usize, rotation: f32) -> Vec<Vec2> {
    let tips = tips.max(2);
    let step = TAU / (tips * 2) as f32;
    (0..tips * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            center + Vec2::from_angle(rotation + step * i as f32) * radius
        })
        .collect()
}

// ========== Draw policy ==========

/// Per-frame drawing parameters shared by every particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleStyle {
    pub shape: ParticleShape,
    /// Draw plain particles as rotating pentagons.
    pub pentagons: bool,
    /// Add a soft halo behind each particle.
    pub glow: bool,
    /// Multiplies the particle's life to get its alpha.
    pub alpha: f32,
    /// Multiplies the particle's size.
    pub size: f32,
}

impl ParticleStyle {
    pub fn new(shape: ParticleShape, background: Background) -> Self {
        Self {
            shape,
            pentagons: false,
            glow: background.is_dark(),
            alpha: 1.0,
            size: 1.0,
        }
    }
}

const GLOW_RADIUS: f32 = 2.0;
const GLOW_ALPHA: f32 = 0.25;
const MANDELBROT_RAYS: usize = 6;

/// Draw one particle according to its pattern tag. Dead particles are skipped.
pub fn draw_particle<S: Surface2d + ?Sized>(surface: &mut S, particle: &Particle, style: &ParticleStyle) {
    let alpha = (particle.life * style.alpha).clamp(0.0, 1.0);
    let size = particle.size * style.size;
    if alpha <= 0.0 || size <= 0.0 || size.is_nan() || !particle.position.is_finite() {
        return;
    }

    let p = particle.position;
    let color = particle.color.extend(alpha);
    let stroke = (size * 0.25).max(1.0);

    if style.glow {
        surface.fill_circle(p, size * GLOW_RADIUS, particle.color.extend(alpha * GLOW_ALPHA));
    }

    match particle.pattern {
        Pattern::None if style.pentagons => {
            surface.fill_polygon(&regular_polygon(p, size, 5, particle.angle), color);
        }
        Pattern::None => draw_shape(surface, style.shape, p, size, color),
        Pattern::Mandelbrot { intensity } => {
            let length = size * (1.0 + 2.0 * intensity.clamp(0.0, 1.0));
            for i in 0..MANDELBROT_RAYS {
                let angle = particle.angle + TAU * i as f32 / MANDELBROT_RAYS as f32;
                surface.line(p, p + Vec2::from_angle(angle) * length, stroke, color);
            }
        }
        Pattern::Spiral => surface.stroke_circle(p, size, stroke, color),
        Pattern::Sacred => {
            surface.stroke_polyline(&regular_polygon(p, size, 6, particle.angle), true, stroke, color);
        }
        Pattern::Recursive => {
            for i in 0..3 {
                let angle = particle.angle + TAU * i as f32 / 3.0;
                surface.line(p, p + Vec2::from_angle(angle) * size * 1.5, stroke, color);
            }
        }
        Pattern::Sierpinski => {
            let corners = regular_polygon(p, size, 3, particle.angle - FRAC_PI_2);
            surface.stroke_polyline(&corners, true, stroke, color);
        }
        Pattern::Dragon => {
            let half = Vec2::from_angle(particle.angle) * size;
            surface.line(p - half, p + half, stroke, color);
        }
    }
}

fn draw_shape<S: Surface2d + ?Sized>(surface: &mut S, shape: ParticleShape, p: Vec2, size: f32, color: Vec4) {
    match shape {
        ParticleShape::Circle => surface.fill_circle(p, size, color),
        ParticleShape::Square => {
            surface.fill_polygon(&regular_polygon(p, size * std::f32::consts::SQRT_2, 4, FRAC_PI_4), color);
        }
        ParticleShape::Triangle => {
            surface.fill_polygon(&regular_polygon(p, size, 3, -FRAC_PI_2), color);
        }
        ParticleShape::Star => {
            surface.fill_polygon(&star_polygon(p, size, size * 0.5, 5, -FRAC_PI_2), color);
        }
        ParticleShape::Diamond => {
            let points = [
                p + Vec2::new(0.0, -size),
                p + Vec2::new(size * 0.7, 0.0),
                p + Vec2::new(0.0, size),
                p + Vec2::new(-size * 0.7, 0.0),
            ];
            surface.fill_polygon(&points, color);
        }
        ParticleShape::Hexagon => {
            surface.fill_polygon(&regular_polygon(p, size, 6, 0.0), color);
        }
    }
}

/// Draw a laser or lightning beam with alpha equal to its life.
pub fn draw_beam<S: Surface2d + ?Sized>(surface: &mut S, beam: &Beam, glow: bool) {
    let alpha = beam.life.clamp(0.0, 1.0);
    if alpha <= 0.0 || beam.points.len() < 2 {
        return;
    }

    if glow {
        surface.stroke_polyline(&beam.points, false, beam.width * 3.0, beam.color.extend(alpha * 0.3));
    }
    surface.stroke_polyline(&beam.points, false, beam.width, beam.color.extend(alpha));
    if beam.kind == BeamKind::Lightning {
        // bright core
        surface.stroke_polyline(&beam.points, false, beam.width * 0.5, Vec4::new(1.0, 1.0, 1.0, alpha));
    }
}

/// Draw the pointer trail, fading from oldest to newest.
pub fn draw_trail<S: Surface2d + ?Sized>(surface: &mut S, trail: &MouseTrail, color: Vec3, width: f32) {
    let points: Vec<Vec2> = trail.points().collect();
    let segments = points.len().saturating_sub(1);
    for (i, pair) in points.windows(2).enumerate() {
        let alpha = (i + 1) as f32 / segments as f32;
        surface.line(pair[0], pair[1], width, color.extend(alpha));
    }
}

pub fn draw_edges<S: Surface2d + ?Sized>(surface: &mut S, edges: &[Edge]) {
    for edge in edges {
        surface.line(edge.from, edge.to, 1.0, edge.color.extend(edge.alpha));
    }
}

/// Draw grid lines in the contrasting color of `background`.
pub fn draw_grid<S: Surface2d + ?Sized>(
    surface: &mut S,
    grid: &GridOverlay,
    viewport: Vec2,
    background: Background,
) {
    let ink = Vec3::ONE - background.color();
    for (from, to) in grid.lines(viewport) {
        surface.line(from, to, 1.0, ink.extend(grid.opacity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::FractalKind;

    fn particle(pattern: Pattern) -> Particle {
        Particle::new(Vec2::new(50.0, 50.0), Vec2::X, 4.0, Vec3::ONE).with_pattern(pattern)
    }

    fn flat_style() -> ParticleStyle {
        ParticleStyle::new(ParticleShape::Circle, Background::Light)
    }

    #[test]
    fn test_plain_particle_uses_shape() {
        let mut list = DrawList::new();
        draw_particle(&mut list, &particle(Pattern::None), &flat_style());
        assert!(matches!(list.commands[0], DrawCommand::FillCircle { radius, .. } if radius == 4.0));

        let mut list = DrawList::new();
        let style = ParticleStyle {
            shape: ParticleShape::Star,
            ..flat_style()
        };
        draw_particle(&mut list, &particle(Pattern::None), &style);
        assert!(matches!(&list.commands[0], DrawCommand::FillPolygon { points, .. } if points.len() == 10));
    }

    #[test]
    fn test_pentagon_override() {
        let mut list = DrawList::new();
        let style = ParticleStyle {
            pentagons: true,
            ..flat_style()
        };
        draw_particle(&mut list, &particle(Pattern::None), &style);
        assert!(matches!(&list.commands[0], DrawCommand::FillPolygon { points, .. } if points.len() == 5));
    }

    #[test]
    fn test_every_pattern_draws_something() {
        for kind in FractalKind::ALL {
            let mut list = DrawList::new();
            draw_particle(&mut list, &particle(Pattern::from_kind(kind)), &flat_style());
            assert!(!list.is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_pattern_draw_shapes() {
        let mut list = DrawList::new();
        draw_particle(&mut list, &particle(Pattern::Spiral), &flat_style());
        assert!(matches!(list.commands[0], DrawCommand::StrokeCircle { .. }));

        let mut list = DrawList::new();
        draw_particle(&mut list, &particle(Pattern::Recursive), &flat_style());
        assert_eq!(list.len(), 3);

        let mut list = DrawList::new();
        draw_particle(&mut list, &particle(Pattern::Sacred), &flat_style());
        assert!(matches!(&list.commands[0], DrawCommand::StrokePolyline { points, closed: true, .. } if points.len() == 6));
    }

    #[test]
    fn test_glow_adds_halo() {
        let mut list = DrawList::new();
        let style = ParticleStyle::new(ParticleShape::Circle, Background::Dark);
        draw_particle(&mut list, &particle(Pattern::None), &style);
        assert_eq!(list.len(), 2);
        assert!(matches!(list.commands[0], DrawCommand::FillCircle { radius, .. } if radius == 8.0));
    }

    #[test]
    fn test_dead_particle_skipped() {
        let mut p = particle(Pattern::None);
        p.life = 0.0;
        let mut list = DrawList::new();
        draw_particle(&mut list, &p, &flat_style());
        assert!(list.is_empty());
    }

    #[test]
    fn test_alpha_follows_life() {
        let mut p = particle(Pattern::None);
        p.life = 0.4;
        let mut list = DrawList::new();
        draw_particle(&mut list, &p, &flat_style());
        assert!(matches!(list.commands[0], DrawCommand::FillCircle { color, .. } if (color.w - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_trail_fades_in() {
        let mut trail = MouseTrail::new();
        for i in 0..5 {
            trail.push(Vec2::new(i as f32 * 10.0, 0.0));
        }
        let mut list = DrawList::new();
        draw_trail(&mut list, &trail, Vec3::ONE, 2.0);
        assert_eq!(list.len(), 4);
        let alphas: Vec<f32> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::StrokePolyline { color, .. } => Some(color.w),
                _ => None,
            })
            .collect();
        assert!(alphas.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(alphas[3], 1.0);
    }

    #[test]
    fn test_regular_polygon_radius() {
        let points = regular_polygon(Vec2::ZERO, 10.0, 6, 0.3);
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| (p.length() - 10.0).abs() < 1e-4));
    }
}
