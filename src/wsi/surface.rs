//! Wrapper around a `VkSurfaceKHR`

use std::ops::Deref;

use anyhow::Result;
use ash::vk;

use crate::{Instance, PhysicalDevice, Window};

/// Contains all information about a [`VkSurfaceKHR`](vk::SurfaceKHR)
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Surface {
    handle: vk::SurfaceKHR,
    /// Surface capabilities. The current extent changes when the window is resized, see [`Surface::query_details`].
    capabilities: vk::SurfaceCapabilitiesKHR,
    formats: Vec<vk::SurfaceFormatKHR>,
    present_modes: Vec<vk::PresentModeKHR>,
    #[derivative(Debug = "ignore")]
    functions: ash::extensions::khr::Surface,
}

impl Surface {
    /// Create a new surface for a window.
    pub fn new(instance: &Instance, window: &dyn Window) -> Result<Self> {
        let functions = ash::extensions::khr::Surface::new(unsafe { instance.loader() }, instance);
        let handle = unsafe {
            ash_window::create_surface(
                instance.loader(),
                instance,
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )?
        };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkSurfaceKHR {handle:p}");
        Ok(Surface {
            handle,
            functions,
            capabilities: Default::default(),
            formats: vec![],
            present_modes: vec![],
        })
    }

    /// Query capabilities, formats and present modes for this surface.
    /// Surface support varies per physical device, so this must be called after one is selected, and again before
    /// every swapchain recreation.
    pub fn query_details(&mut self, physical_device: &PhysicalDevice) -> Result<()> {
        unsafe {
            self.formats = self.get_physical_device_surface_formats(physical_device.handle(), self.handle)?;
            self.present_modes = self.get_physical_device_surface_present_modes(physical_device.handle(), self.handle)?;
            self.capabilities = self.get_physical_device_surface_capabilities(physical_device.handle(), self.handle)?;
        }
        Ok(())
    }

    /// Get unsafe access to the underlying `VkSurfaceKHR` object.
    /// # Safety
    /// Any vulkan calls that mutate the surface may put the system in an undefined state.
    pub unsafe fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    pub fn capabilities(&self) -> &vk::SurfaceCapabilitiesKHR {
        &self.capabilities
    }

    pub fn formats(&self) -> &[vk::SurfaceFormatKHR] {
        self.formats.as_slice()
    }

    pub fn present_modes(&self) -> &[vk::PresentModeKHR] {
        self.present_modes.as_slice()
    }
}

impl Deref for Surface {
    type Target = ash::extensions::khr::Surface;

    fn deref(&self) -> &Self::Target {
        &self.functions
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkSurfaceKHR {:p}", self.handle);
        unsafe {
            self.functions.destroy_surface(self.handle, None);
        }
    }
}
