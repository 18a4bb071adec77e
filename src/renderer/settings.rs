//! Settings of the [`ShadowRenderer`](crate::ShadowRenderer).

use std::path::PathBuf;

use anyhow::Result;
use ash::vk;

use crate::{DepthBias, Error, LightFrustum, SceneMode};

/// Everything that configures the shadow renderer. Use [`RendererBuilder`] to create one.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Swapchain extent to use when the surface does not dictate one.
    pub extent: vk::Extent2D,
    /// Width and height of the square shadow map.
    pub shadow_map_size: u32,
    pub light: LightFrustum,
    pub depth_bias: DepthBias,
    /// Light orbits per second.
    pub timer_speed: f32,
    /// Starting point of the light orbit, in `[0, 1)`.
    pub initial_timer: f32,
    pub paused: bool,
    pub clear_color: [f32; 4],
    pub scene_mode: SceneMode,
    /// Directory holding the compiled SPIR-V shaders.
    pub shader_dir: PathBuf,
    /// OBJ model to render. The built-in demo scene is used if this is `None`.
    pub model: Option<PathBuf>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
            shadow_map_size: 1024,
            light: LightFrustum::default(),
            depth_bias: DepthBias::default(),
            timer_speed: 0.25,
            initial_timer: 0.0,
            paused: false,
            clear_color: [0.01, 0.01, 0.21, 1.0],
            scene_mode: SceneMode::Shaded,
            shader_dir: PathBuf::from("shaders"),
            model: None,
        }
    }
}

/// Builder for [`RendererSettings`].
/// # Example
/// ```
/// # use umbra::*;
/// # use anyhow::Result;
/// # fn settings() -> Result<RendererSettings> {
/// let settings = RendererBuilder::new()
///     .extent(1280, 720)
///     .shadow_map_size(2048)
///     .depth_bias(1.0, 1.5)
///     .display_shadow_map(true)
///     .build()?;
/// # Ok(settings)
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct RendererBuilder {
    inner: RendererSettings,
}

impl RendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(mut self, width: u32, height: u32) -> Self {
        self.inner.extent = vk::Extent2D {
            width,
            height,
        };
        self
    }

    pub fn shadow_map_size(mut self, size: u32) -> Self {
        self.inner.shadow_map_size = size;
        self
    }

    /// Field of view in degrees and clip planes of the light.
    pub fn light(mut self, fov: f32, z_near: f32, z_far: f32) -> Self {
        self.inner.light = LightFrustum {
            fov,
            z_near,
            z_far,
        };
        self
    }

    pub fn depth_bias(mut self, constant: f32, slope: f32) -> Self {
        self.inner.depth_bias = DepthBias {
            constant,
            slope,
        };
        self
    }

    pub fn timer_speed(mut self, speed: f32) -> Self {
        self.inner.timer_speed = speed;
        self
    }

    pub fn initial_timer(mut self, timer: f32) -> Self {
        self.inner.initial_timer = timer;
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.inner.paused = paused;
        self
    }

    pub fn clear_color(mut self, color: [f32; 4]) -> Self {
        self.inner.clear_color = color;
        self
    }

    /// Show the shadow map instead of the lit scene.
    pub fn display_shadow_map(mut self, display: bool) -> Self {
        self.inner.scene_mode = SceneMode::from_debug_flag(display);
        self
    }

    pub fn shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.shader_dir = dir.into();
        self
    }

    pub fn model(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.model = Some(path.into());
        self
    }

    /// # Errors
    /// Fails if the shadow map is empty, or the light frustum is degenerate.
    pub fn build(self) -> Result<RendererSettings> {
        let settings = self.inner;
        if settings.shadow_map_size == 0 {
            return Err(anyhow::Error::from(Error::Uncategorized("shadow map size must be positive")));
        }
        let light = settings.light;
        if !(light.z_near > 0.0 && light.z_near < light.z_far) {
            return Err(anyhow::Error::from(Error::Uncategorized("light clip planes must satisfy 0 < near < far")));
        }
        if !(light.fov > 0.0 && light.fov < 180.0) {
            return Err(anyhow::Error::from(Error::Uncategorized("light field of view must be between 0 and 180 degrees")));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = RendererBuilder::new().build().unwrap();
        assert_eq!(settings.shadow_map_size, 1024);
        assert_eq!(settings.light, LightFrustum::default());
        assert_eq!(settings.depth_bias.constant, 1.25);
        assert_eq!(settings.depth_bias.slope, 1.75);
        assert_eq!(settings.timer_speed, 0.25);
        assert_eq!(settings.clear_color, [0.01, 0.01, 0.21, 1.0]);
        assert_eq!(settings.scene_mode, SceneMode::Shaded);
        assert_eq!(settings.shader_dir, PathBuf::from("shaders"));
        assert!(settings.model.is_none());
    }

    #[test]
    fn debug_flag_switches_scene_mode() {
        let settings = RendererBuilder::new().display_shadow_map(true).build().unwrap();
        assert_eq!(settings.scene_mode, SceneMode::ShadowMapDebug);
    }

    #[test]
    fn degenerate_settings_are_rejected() {
        assert!(RendererBuilder::new().shadow_map_size(0).build().is_err());
        assert!(RendererBuilder::new().light(45.0, 10.0, 1.0).build().is_err());
        assert!(RendererBuilder::new().light(0.0, 1.0, 96.0).build().is_err());
    }
}
