//! CPU tessellation of canvas draw calls into a triangle list.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::render::Surface2d;

const MIN_CIRCLE_SEGMENTS: usize = 8;
const MAX_CIRCLE_SEGMENTS: usize = 48;

/// One canvas vertex, in pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CanvasVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl CanvasVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CanvasVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A [`Surface2d`] that turns each call into triangles for one frame.
#[derive(Debug, Clone)]
pub struct CanvasBatch {
    clear_color: Vec3,
    vertices: Vec<CanvasVertex>,
}

impl Default for CanvasBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasBatch {
    pub fn new() -> Self {
        Self {
            clear_color: Vec3::ZERO,
            vertices: Vec::new(),
        }
    }

    pub fn clear_color(&self) -> Vec3 {
        self.clear_color
    }

    pub fn vertices(&self) -> &[CanvasVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Vec4) {
        let color = color.to_array();
        for p in [a, b, c] {
            self.vertices.push(CanvasVertex {
                position: p.to_array(),
                color,
            });
        }
    }

    fn segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec4) {
        let Some(dir) = (to - from).try_normalize() else {
            return;
        };
        let n = dir.perp() * (width * 0.5);
        self.triangle(from + n, from - n, to + n, color);
        self.triangle(to + n, from - n, to - n, color);
    }
}

/// Segment count for a circle of `radius` pixels.
pub fn circle_segments(radius: f32) -> usize {
    ((radius.max(0.0).sqrt() * 4.0) as usize).clamp(MIN_CIRCLE_SEGMENTS, MAX_CIRCLE_SEGMENTS)
}

fn circle_points(center: Vec2, radius: f32) -> Vec<Vec2> {
    let n = circle_segments(radius);
    (0..n)
        .map(|i| center + Vec2::from_angle(TAU * i as f32 / n as f32) * radius)
        .collect()
}

impl Surface2d for CanvasBatch {
    fn clear(&mut self, color: Vec3) {
        self.clear_color = color;
        self.vertices.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        if radius > 0.0 {
            let points = circle_points(center, radius);
            self.fill_polygon(&points, color);
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Vec4) {
        if radius > 0.0 {
            let points = circle_points(center, radius);
            self.stroke_polyline(&points, true, width, color);
        }
    }

    // Fan around the centroid; fine for convex and star-shaped outlines.
    fn fill_polygon(&mut self, points: &[Vec2], color: Vec4) {
        if points.len() < 3 {
            return;
        }
        let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
        for i in 0..points.len() {
            let next = points[(i + 1) % points.len()];
            self.triangle(centroid, points[i], next, color);
        }
    }

    fn stroke_polyline(&mut self, points: &[Vec2], closed: bool, width: f32, color: Vec4) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], width, color);
        }
        if closed && points.len() > 2 {
            self.segment(points[points.len() - 1], points[0], width, color);
        }
    }
}
