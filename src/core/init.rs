//! Initialization of all objects needed before anything can be rendered.

use anyhow::Result;

use crate::{AppSettings, DebugMessenger, DefaultAllocator, Device, Instance, PhysicalDevice, Queue, Surface, SwapchainPreferences};

/// All core Vulkan objects, created by [`initialize`].
///
/// Fields are dropped in declaration order, which is the reverse of creation order.
#[derive(Debug)]
pub struct VulkanContext {
    /// Surface format and present mode requested in the [`AppSettings`].
    pub swapchain_preferences: SwapchainPreferences,
    pub allocator: DefaultAllocator,
    pub queue: Queue,
    pub device: Device,
    pub physical_device: PhysicalDevice,
    /// `None` for a headless context.
    pub surface: Option<Surface>,
    pub debug_messenger: Option<DebugMessenger>,
    pub instance: Instance,
}

/// Initialize the instance, optional surface and debug messenger, physical device, device, graphics queue and allocator.
/// # Errors
/// Fails if the Vulkan loader is missing, or if no physical device satisfies the requirements in `settings`.
pub fn initialize(settings: &AppSettings) -> Result<VulkanContext> {
    let instance = Instance::new(settings)?;
    let debug_messenger = if settings.enable_validation {
        Some(DebugMessenger::new(&instance)?)
    } else {
        None
    };

    let mut surface = match settings.window {
        Some(window) => Some(Surface::new(&instance, window)?),
        None => None,
    };

    let physical_device = PhysicalDevice::select(&instance, surface.as_ref(), settings)?;
    if let Some(surface) = surface.as_mut() {
        surface.query_details(&physical_device)?;
    }

    let device = Device::new(&instance, &physical_device, settings)?;
    let queue = Queue::new(device.clone(), *physical_device.graphics_queue());
    let allocator = DefaultAllocator::new(&instance, &device, &physical_device)?;

    Ok(VulkanContext {
        swapchain_preferences: SwapchainPreferences {
            surface_format: settings.surface_format,
            present_mode: settings.present_mode,
        },
        allocator,
        queue,
        device,
        physical_device,
        surface,
        debug_messenger,
        instance,
    })
}
