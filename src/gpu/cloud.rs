//! Point-cloud upload and per-frame layer list for the attractor scene.
//!
//! Orbits are immutable once generated, so each one is uploaded once and
//! kept in an [`OrbitCache`] keyed by orbit id. Buffers for orbits no layer
//! drew this frame are dropped after the frame.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tracing::trace;
use wgpu::util::DeviceExt;

use crate::attractor::Orbit;
use crate::render::PointCloudSink;

/// One attractor point: model-space position (z = 0) and color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct OrbitVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl OrbitVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<OrbitVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave an orbit's positions and colors.
pub fn orbit_vertices(orbit: &Orbit) -> Vec<OrbitVertex> {
    orbit
        .positions
        .iter()
        .zip(&orbit.colors)
        .map(|(p, c)| OrbitVertex {
            position: [p.x, p.y, 0.0],
            color: c.to_array(),
        })
        .collect()
}

struct CachedOrbit {
    buffer: wgpu::Buffer,
    count: u32,
    last_used: u64,
}

/// GPU vertex buffers for recently drawn orbits.
#[derive(Default)]
pub struct OrbitCache {
    entries: HashMap<u64, CachedOrbit>,
    frame: u64,
}

impl OrbitCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, device: &wgpu::Device, orbit: &Orbit) {
        let frame = self.frame;
        self.entries
            .entry(orbit.id)
            .and_modify(|entry| entry.last_used = frame)
            .or_insert_with(|| {
                let vertices = orbit_vertices(orbit);
                trace!(orbit = orbit.id, points = vertices.len(), "uploading orbit");
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Orbit Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                CachedOrbit {
                    buffer,
                    count: vertices.len() as u32,
                    last_used: frame,
                }
            });
    }

    fn get(&self, id: u64) -> Option<(&wgpu::Buffer, u32)> {
        self.entries.get(&id).map(|entry| (&entry.buffer, entry.count))
    }

    /// Drop buffers not drawn this frame and start the next one.
    fn end_frame(&mut self) {
        let frame = self.frame;
        self.entries.retain(|_, entry| entry.last_used == frame);
        self.frame += 1;
    }
}

/// Layer draw recorded for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudDraw {
    pub orbit_id: u64,
    pub model: Mat4,
}

/// [`PointCloudSink`] that uploads orbits on first sight and records draws.
pub struct CloudFrame<'a> {
    device: &'a wgpu::Device,
    cache: &'a mut OrbitCache,
    draws: Vec<CloudDraw>,
}

impl<'a> CloudFrame<'a> {
    pub(crate) fn new(device: &'a wgpu::Device, cache: &'a mut OrbitCache) -> Self {
        Self {
            device,
            cache,
            draws: Vec::new(),
        }
    }

    pub fn draws(&self) -> &[CloudDraw] {
        &self.draws
    }

    pub(crate) fn into_draws(self) -> Vec<CloudDraw> {
        self.draws
    }
}

impl PointCloudSink for CloudFrame<'_> {
    fn draw_layer(&mut self, model: Mat4, orbit: &Orbit) {
        if orbit.is_empty() {
            return;
        }
        self.cache.touch(self.device, orbit);
        self.draws.push(CloudDraw {
            orbit_id: orbit.id,
            model,
        });
    }
}

/// Encode recorded draws into `pass`. Instance `i` selects model matrix `i`.
pub(crate) fn encode_draws(pass: &mut wgpu::RenderPass<'_>, cache: &OrbitCache, draws: &[CloudDraw]) {
    for (i, draw) in draws.iter().enumerate() {
        if let Some((buffer, count)) = cache.get(draw.orbit_id) {
            let instance = i as u32;
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..count, instance..instance + 1);
        }
    }
}

/// Flatten model matrices for the storage buffer.
pub fn pack_models(draws: &[CloudDraw]) -> Vec<[[f32; 4]; 4]> {
    draws.iter().map(|d| d.model.to_cols_array_2d()).collect()
}

pub(crate) fn finish_frame(cache: &mut OrbitCache) {
    cache.end_frame();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attractor::{Formula, HopalongParams};
    use glam::{Vec2, Vec3};

    fn orbit() -> Orbit {
        Orbit {
            id: 9,
            positions: vec![Vec2::new(1.0, 2.0), Vec2::new(-3.0, 4.0)],
            colors: vec![Vec3::X, Vec3::Y],
            params: HopalongParams {
                a: 1.0,
                b: 1.0,
                c: 1.0,
                d: 1.0,
                e: 1.0,
                formula: Formula::SquareRoot,
            },
        }
    }

    #[test]
    fn test_orbit_vertices_flat() {
        let vertices = orbit_vertices(&orbit());
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, [-3.0, 4.0, 0.0]);
        assert_eq!(vertices[1].color, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<OrbitVertex>(), 24);
        assert_eq!(OrbitVertex::layout().array_stride, 24);
    }

    #[test]
    fn test_pack_models_keeps_order() {
        let draws = [
            CloudDraw {
                orbit_id: 1,
                model: Mat4::IDENTITY,
            },
            CloudDraw {
                orbit_id: 2,
                model: Mat4::from_translation(Vec3::new(0.0, 0.0, -600.0)),
            },
        ];
        let packed = pack_models(&draws);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[1][3][2], -600.0);
    }
}
