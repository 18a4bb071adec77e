//! The swapchain and the pure functions that pick its parameters.

use anyhow::Result;
use ash::vk;

use crate::{Device, Error, Image, ImageView, Instance, Semaphore, Surface};

/// A presentable image owned by the swapchain, with the view that scene framebuffers attach.
#[derive(Debug)]
pub struct SwapchainImage {
    // Declared first so the view is destroyed before the (unowned) image wrapper.
    pub view: ImageView,
    pub image: Image,
}

/// Preferences for the swapchain. Unsupported preferences fall back to defaults, see the `choose_*` functions.
#[derive(Debug, Default, Copy, Clone)]
pub struct SwapchainPreferences {
    pub surface_format: Option<vk::SurfaceFormatKHR>,
    pub present_mode: Option<vk::PresentModeKHR>,
}

/// Result of trying to acquire the next swapchain image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired. `suboptimal` signals that the swapchain should be recreated after this frame.
    Acquired { index: u32, suboptimal: bool },
    /// The swapchain no longer matches the surface and must be recreated before rendering.
    OutOfDate,
}

/// A swapchain is an abstraction of a presentation system. It handles buffering, VSync, and acquiring images
/// to render and present frames to.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Swapchain {
    handle: vk::SwapchainKHR,
    images: Vec<SwapchainImage>,
    format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    #[derivative(Debug = "ignore")]
    functions: ash::extensions::khr::Swapchain,
}

impl Swapchain {
    /// Create a new swapchain for the surface. When `old` is given, its handle is passed as `oldSwapchain` so the
    /// presentation engine can reuse its resources. The old swapchain must still be destroyed by the caller.
    pub fn new(
        instance: &Instance,
        device: Device,
        surface: &Surface,
        preferences: SwapchainPreferences,
        window_extent: vk::Extent2D,
        old: Option<&Swapchain>,
    ) -> Result<Self> {
        let capabilities = surface.capabilities();
        let format = choose_surface_format(surface.formats(), preferences.surface_format)?;
        let present_mode = choose_present_mode(surface.present_modes(), preferences.present_mode);
        let extent = choose_extent(capabilities, window_extent);
        let image_count = choose_image_count(capabilities);

        let info = vk::SwapchainCreateInfoKHR::builder()
            .surface(unsafe { surface.handle() })
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(choose_composite_alpha(capabilities))
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old.map(|old| old.handle).unwrap_or_default())
            .build();

        let functions = ash::extensions::khr::Swapchain::new(instance, &device);
        let handle = unsafe { functions.create_swapchain(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkSwapchainKHR {handle:p}");

        let images = unsafe { functions.get_swapchain_images(handle)? }
            .into_iter()
            .map(|image| -> Result<SwapchainImage> {
                let image = Image::new_managed(device.clone(), image, format.format, extent);
                let view = image.view(vk::ImageAspectFlags::COLOR)?;
                Ok(SwapchainImage {
                    view,
                    image,
                })
            })
            .collect::<Result<Vec<SwapchainImage>>>();
        let images = match images {
            Ok(images) => images,
            Err(err) => {
                unsafe { functions.destroy_swapchain(handle, None) };
                return Err(err);
            }
        };

        info!(
            "Created swapchain with {} images of {}x{} ({:?}, {:?})",
            images.len(),
            extent.width,
            extent.height,
            format.format,
            present_mode
        );

        Ok(Swapchain {
            handle,
            images,
            format,
            present_mode,
            extent,
            functions,
        })
    }

    /// Acquire the next image, signaling `image_available` when it is ready to be rendered to.
    pub fn acquire_next_image(&self, image_available: &Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.functions
                .acquire_next_image(self.handle, u64::MAX, image_available.handle(), vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => Ok(AcquireOutcome::Acquired {
                index,
                suboptimal,
            }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(err) => Err(err.into()),
        }
    }

    /// Swapchain extension functions, needed for presenting.
    pub fn functions(&self) -> &ash::extensions::khr::Swapchain {
        &self.functions
    }

    /// Get unsafe access to the underlying `VkSwapchainKHR` handle.
    /// # Safety
    /// The caller must not destroy the swapchain.
    pub unsafe fn handle(&self) -> vk::SwapchainKHR {
        self.handle
    }

    pub fn images(&self) -> &[SwapchainImage] {
        self.images.as_slice()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    pub fn present_mode(&self) -> vk::PresentModeKHR {
        self.present_mode
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        // Views reference the swapchain images, so they go first.
        self.images.clear();
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkSwapchainKHR {:p}", self.handle);
        unsafe {
            self.functions.destroy_swapchain(self.handle, None);
        }
    }
}

/// Use the preferred format if supported, then `{B8G8R8A8_SRGB, SRGB_NONLINEAR}`, then the first supported format.
pub fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
    preferred: Option<vk::SurfaceFormatKHR>,
) -> Result<vk::SurfaceFormatKHR> {
    const FALLBACK_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    if let Some(preferred) = preferred {
        if formats.contains(&preferred) {
            return Ok(preferred);
        }
    }
    if formats.contains(&FALLBACK_FORMAT) {
        return Ok(FALLBACK_FORMAT);
    }
    formats
        .first()
        .copied()
        .ok_or_else(|| anyhow::Error::from(Error::NoSurfaceFormat))
}

/// Use the preferred mode if supported, then `MAILBOX`, then `FIFO` which is always available.
pub fn choose_present_mode(modes: &[vk::PresentModeKHR], preferred: Option<vk::PresentModeKHR>) -> vk::PresentModeKHR {
    preferred
        .into_iter()
        .chain(std::iter::once(vk::PresentModeKHR::MAILBOX))
        .find(|mode| modes.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Use the surface's current extent if it is fixed, otherwise clamp the window size to the supported range.
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: window_extent
            .width
            .clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: window_extent
            .height
            .clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

/// One more than the minimum, clamped to the maximum if the surface has one.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count.saturating_add(1);
    if capabilities.max_image_count != 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

fn choose_composite_alpha(capabilities: &vk::SurfaceCapabilitiesKHR) -> vk::CompositeAlphaFlagsKHR {
    [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
    ]
    .into_iter()
    .find(|&alpha| capabilities.supported_composite_alpha.contains(alpha))
    .unwrap_or(vk::CompositeAlphaFlagsKHR::INHERIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNORM: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
        format: vk::Format::R8G8B8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };
    const SRGB: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    #[test]
    fn surface_format_prefers_requested() {
        assert_eq!(choose_surface_format(&[SRGB, UNORM], Some(UNORM)).unwrap(), UNORM);
    }

    #[test]
    fn surface_format_falls_back_to_bgra_srgb() {
        let unsupported = vk::SurfaceFormatKHR {
            format: vk::Format::R16G16B16A16_SFLOAT,
            color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        };
        assert_eq!(choose_surface_format(&[UNORM, SRGB], Some(unsupported)).unwrap(), SRGB);
        assert_eq!(choose_surface_format(&[UNORM], None).unwrap(), UNORM);
    }

    #[test]
    fn surface_without_formats_is_an_error() {
        let err = choose_surface_format(&[], None).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoSurfaceFormat)));
    }

    #[test]
    fn present_mode_prefers_requested_then_mailbox() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&modes, Some(vk::PresentModeKHR::IMMEDIATE)), vk::PresentModeKHR::IMMEDIATE);
        assert_eq!(choose_present_mode(&modes, None), vk::PresentModeKHR::MAILBOX);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&modes, Some(vk::PresentModeKHR::IMMEDIATE)), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn extent_uses_current_when_fixed() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1280,
                height: 720,
            },
            ..Default::default()
        };
        let chosen = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 1920,
                height: 1080,
            },
        );
        assert_eq!((chosen.width, chosen.height), (1280, 720));
    }

    #[test]
    fn extent_clamps_when_variable() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 640,
                height: 480,
            },
            max_image_extent: vk::Extent2D {
                width: 1920,
                height: 1080,
            },
            ..Default::default()
        };
        let chosen = choose_extent(
            &capabilities,
            vk::Extent2D {
                width: 4000,
                height: 200,
            },
        );
        assert_eq!((chosen.width, chosen.height), (1920, 480));
    }

    #[test]
    fn image_count_is_one_above_minimum() {
        let unbounded = vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&unbounded), 3);

        let bounded = vk::SurfaceCapabilitiesKHR {
            min_image_count: 3,
            max_image_count: 3,
            ..Default::default()
        };
        assert_eq!(choose_image_count(&bounded), 3);
    }

    #[test]
    fn composite_alpha_prefers_opaque() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            supported_composite_alpha: vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED | vk::CompositeAlphaFlagsKHR::OPAQUE,
            ..Default::default()
        };
        assert_eq!(choose_composite_alpha(&capabilities), vk::CompositeAlphaFlagsKHR::OPAQUE);
    }
}
