//! Exposes all structs needed to store initialization parameters.

use ash::vk;

use crate::Window;

/// Minimum requirements for the GPU. This will be used to determine what physical device is selected.
/// # Example
/// ```
/// # use umbra::*;
/// let mut requirements = GPURequirements {
///     dedicated: false,
///     min_video_memory: 256 * 1024 * 1024,
///     ..Default::default()
/// };
/// // Enable an optional Vulkan feature.
/// requirements.features.sampler_anisotropy = vk::TRUE;
/// ```
#[derive(Default, Debug, Clone)]
pub struct GPURequirements {
    /// Whether a dedicated GPU is required. Setting this to true will discard integrated GPUs.
    pub dedicated: bool,
    /// Minimum amount of video memory required, in bytes. Note that this might count shared memory if RAM is shared.
    pub min_video_memory: usize,
    /// Optional Vulkan 1.0 features that are required from the physical device.
    pub features: vk::PhysicalDeviceFeatures,
    /// Vulkan device extensions that should be present and enabled, on top of `VK_KHR_swapchain`.
    pub device_extensions: Vec<String>,
}

/// Application settings used to initialize the Vulkan context.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct AppSettings<'a> {
    /// Application name. Possibly displayed in debugging tools, task manager, etc.
    pub name: String,
    /// Application version.
    pub version: (u32, u32, u32),
    /// Enable Vulkan validation layers for additional debug output. For developing this should almost always be on.
    pub enable_validation: bool,
    /// The window that we will use for rendering. Set to None for a headless context.
    #[derivative(Debug = "ignore")]
    pub window: Option<&'a dyn Window>,
    /// Optionally a preferred surface format. If set to None or unsupported, `{B8G8R8A8_SRGB, SRGB_NONLINEAR}` is used
    /// if available, and the first supported format otherwise.
    pub surface_format: Option<vk::SurfaceFormatKHR>,
    /// Optionally a preferred present mode. If set to None, `MAILBOX` is preferred. If the requested mode is
    /// not supported this falls back to `FIFO`, which is always available.
    pub present_mode: Option<vk::PresentModeKHR>,
    /// Minimum requirements the selected physical device should have.
    pub gpu_requirements: GPURequirements,
}

/// The app builder is a convenience struct to easily create [`AppSettings`].
///
/// For information about each of the fields, see [`AppSettings`]
/// # Example
/// ```
/// # use umbra::*;
/// let info = AppBuilder::new()
///     .name("My umbra application")
///     .present_mode(vk::PresentModeKHR::FIFO)
///     .validation(true)
///     .build();
/// ```
pub struct AppBuilder<'a> {
    inner: AppSettings<'a>,
}

impl<'a> Default for AppBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AppBuilder<'a> {
    /// Create a new app builder with default settings.
    pub fn new() -> Self {
        AppBuilder {
            inner: AppSettings {
                name: String::from(""),
                version: (0, 0, 0),
                enable_validation: false,
                window: None,
                surface_format: None,
                present_mode: None,
                gpu_requirements: GPURequirements::default(),
            },
        }
    }

    /// Sets the application name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    /// Sets the application version.
    pub fn version(mut self, ver: impl Into<(u32, u32, u32)>) -> Self {
        self.inner.version = ver.into();
        self
    }

    /// Enable the Vulkan validation layers.
    pub fn validation(mut self, val: bool) -> Self {
        self.inner.enable_validation = val;
        self
    }

    /// Sets the window to render to.
    pub fn window(mut self, window: &'a dyn Window) -> Self {
        self.inner.window = Some(window);
        self
    }

    /// Sets the preferred surface format.
    pub fn surface_format(mut self, format: vk::SurfaceFormatKHR) -> Self {
        self.inner.surface_format = Some(format);
        self
    }

    /// Sets the preferred present mode.
    pub fn present_mode(mut self, mode: vk::PresentModeKHR) -> Self {
        self.inner.present_mode = Some(mode);
        self
    }

    /// The gpu requirements that the physical device must satisfy.
    pub fn gpu(mut self, gpu: GPURequirements) -> Self {
        self.inner.gpu_requirements = gpu;
        self
    }

    /// Build the resulting application settings.
    pub fn build(self) -> AppSettings<'a> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_headless() {
        let settings = AppBuilder::new().name("headless").build();
        assert!(settings.window.is_none());
        assert!(!settings.enable_validation);
        assert!(settings.present_mode.is_none());
    }

    #[test]
    fn builder_records_preferences() {
        let settings = AppBuilder::new()
            .name("umbra")
            .version((1, 2, 3))
            .validation(true)
            .present_mode(vk::PresentModeKHR::IMMEDIATE)
            .build();
        assert_eq!(settings.name, "umbra");
        assert_eq!(settings.version, (1, 2, 3));
        assert!(settings.enable_validation);
        assert_eq!(settings.present_mode, Some(vk::PresentModeKHR::IMMEDIATE));
    }
}
