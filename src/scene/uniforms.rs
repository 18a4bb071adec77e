//! Uniform buffer layouts shared with the shaders. Both follow std140 rules without implicit padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::Camera;

/// `offscreen.vert` uniforms.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct OffscreenUniforms {
    pub depth_mvp: Mat4,
}

/// Uniforms of `scene.vert`, `scene.frag` and `debug.frag`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
    pub light_space: Mat4,
    /// `w` is unused.
    pub light_pos: Vec4,
    pub z_near: f32,
    pub z_far: f32,
    pub _pad: [f32; 2],
}

impl SceneUniforms {
    /// `light_space` must be the same matrix the offscreen pass renders with. `z_near` and `z_far` are the
    /// planes of the light frustum, used to linearize shadow map depth for display.
    pub fn new(camera: &Camera, light_pos: Vec3, light_space: Mat4, z_near: f32, z_far: f32) -> Self {
        Self {
            projection: camera.projection(),
            view: camera.view(),
            model: Mat4::IDENTITY,
            light_space,
            light_pos: light_pos.extend(1.0),
            z_near,
            z_far,
            _pad: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_of_value(bytes: &[u8], value: f32) -> Option<usize> {
        let needle = value.to_ne_bytes();
        bytes.windows(4).position(|window| window == needle)
    }

    #[test]
    fn sizes_match_std140() {
        assert_eq!(std::mem::size_of::<OffscreenUniforms>(), 64);
        assert_eq!(std::mem::size_of::<SceneUniforms>(), 288);
    }

    #[test]
    fn scalar_members_follow_the_matrices() {
        let uniforms = SceneUniforms {
            light_pos: Vec4::new(3.0, 0.0, 0.0, 0.0),
            z_near: 7.0,
            z_far: 11.0,
            ..Zeroable::zeroed()
        };
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(offset_of_value(bytes, 3.0), Some(256));
        assert_eq!(offset_of_value(bytes, 7.0), Some(272));
        assert_eq!(offset_of_value(bytes, 11.0), Some(276));
    }

    #[test]
    fn model_matrix_is_identity() {
        let uniforms = SceneUniforms::new(&Camera::default(), Vec3::new(1.0, -2.0, 3.0), Mat4::IDENTITY, 1.0, 96.0);
        assert_eq!(uniforms.model, Mat4::IDENTITY);
        assert_eq!(uniforms.light_pos, Vec4::new(1.0, -2.0, 3.0, 1.0));
    }
}
