//! Fixed camera for the attractor scene.

use glam::{Mat4, Vec3};

use crate::layers::LayerConfig;

/// Camera on the +z axis looking down −z at the layer stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Distance from the origin along +z.
    pub depth: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera that sees every layer of `config`, from the camera plane back to
    /// the deepest level.
    pub fn for_layers(config: &LayerConfig) -> Self {
        Self {
            depth: config.camera_depth,
            fov_y: 60.0_f32.to_radians(),
            near: 1.0,
            far: config.camera_depth + config.span() + config.level_depth,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.depth)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// Combined projection and view for a surface of the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far.max(self.near + 1.0));
        proj * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_layers(&LayerConfig::default())
    }
}
