//! Physical device selection and capability queries.

use std::ffi::CStr;

use anyhow::Result;
use ash::vk;

use crate::core::queue::QueueInfo;
use crate::resource::attachment::{choose_depth_format, DepthUsage};
use crate::util::string::wrap_c_str;
use crate::{AppSettings, Error, Instance, Surface};

/// A physical device abstracts away an actual device, like a graphics card or integrated graphics card.
#[derive(Default, Debug)]
pub struct PhysicalDevice {
    /// Handle to the [`VkPhysicalDevice`](vk::PhysicalDevice).
    handle: vk::PhysicalDevice,
    /// [`VkPhysicalDeviceProperties`](vk::PhysicalDeviceProperties) structure with properties of this physical device.
    properties: vk::PhysicalDeviceProperties,
    /// Memory types and heaps of the device.
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    /// Names of the available device extensions.
    extensions: Vec<String>,
    /// Properties of each queue family on the device.
    queue_families: Vec<vk::QueueFamilyProperties>,
    /// The queue used for both rendering and presentation.
    graphics_queue: QueueInfo,
}

impl PhysicalDevice {
    /// Selects the first physical device that satisfies the requirements in `settings` and, if a surface is
    /// given, has a graphics queue that can present to it.
    pub fn select(instance: &Instance, surface: Option<&Surface>, settings: &AppSettings) -> Result<Self> {
        let devices = unsafe { instance.enumerate_physical_devices()? };
        if devices.is_empty() {
            return Err(anyhow::Error::from(Error::NoGPU));
        }

        for device in devices {
            let mut physical_device = PhysicalDevice {
                handle: device,
                properties: unsafe { instance.get_physical_device_properties(device) },
                memory_properties: unsafe { instance.get_physical_device_memory_properties(device) },
                extensions: unsafe {
                    instance
                        .enumerate_device_extension_properties(device)?
                        .iter()
                        .map(|properties| wrap_c_str(properties.extension_name.as_ptr()))
                        .collect()
                },
                queue_families: unsafe { instance.get_physical_device_queue_family_properties(device) },
                ..Default::default()
            };

            let requirements = &settings.gpu_requirements;
            let swapchain_extension = ash::extensions::khr::Swapchain::name().to_string_lossy().into_owned();
            if requirements.dedicated && physical_device.properties.device_type != vk::PhysicalDeviceType::DISCRETE_GPU {
                continue;
            }
            if requirements.min_video_memory > total_video_memory(&physical_device) {
                continue;
            }
            let missing_extension = requirements
                .device_extensions
                .iter()
                .chain(surface.map(|_| &swapchain_extension))
                .any(|requested| !physical_device.extensions.iter().any(|ext| ext == requested));
            if missing_extension {
                continue;
            }

            let Some(queue) = find_graphics_queue(&physical_device, surface)? else {
                continue;
            };
            physical_device.graphics_queue = queue;

            let name = unsafe { CStr::from_ptr(physical_device.properties.device_name.as_ptr()) };
            info!(
                "Picked physical device {:?}, driver version {:?}.",
                name, physical_device.properties.driver_version
            );
            info!(
                "Device has {} bytes of available video memory. Using queue family {}.",
                total_video_memory(&physical_device),
                queue.family_index
            );
            return Ok(physical_device);
        }

        Err(anyhow::Error::from(Error::NoGPU))
    }

    /// Query the best supported depth format for a given usage. See [`DepthUsage`] for the fallback order.
    /// # Errors
    /// Fails with [`Error::NoDepthFormat`] if none of the candidates is supported.
    pub fn depth_format(&self, instance: &Instance, usage: DepthUsage) -> Result<vk::Format> {
        let format = choose_depth_format(usage, |format| unsafe {
            instance.get_physical_device_format_properties(self.handle, format)
        })?;
        info!("Using depth format {format:?} for {usage:?}");
        Ok(format)
    }

    /// Whether images of this format and optimal tiling can be sampled with a linear filter.
    pub fn supports_linear_filter(&self, instance: &Instance, format: vk::Format) -> bool {
        let properties = unsafe { instance.get_physical_device_format_properties(self.handle, format) };
        properties
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR)
    }

    /// Get the queue used for rendering and presentation.
    pub fn graphics_queue(&self) -> &QueueInfo {
        &self.graphics_queue
    }

    /// Get unsafe access to the physical device handle
    /// # Safety
    /// Any vulkan calls that mutate the physical device may put the system in an undefined state.
    pub unsafe fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn properties(&self) -> &vk::PhysicalDeviceProperties {
        &self.properties
    }
}

fn total_video_memory(device: &PhysicalDevice) -> usize {
    device
        .memory_properties
        .memory_heaps
        .iter()
        .take(device.memory_properties.memory_heap_count as usize)
        .map(|heap| heap.size as usize)
        .sum()
}

/// Finds a queue family with graphics support. If a surface is given the family must also be able to present to it.
fn find_graphics_queue(device: &PhysicalDevice, surface: Option<&Surface>) -> Result<Option<QueueInfo>> {
    for (index, family) in device.queue_families.iter().enumerate() {
        if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            continue;
        }
        let can_present = match surface {
            None => false,
            Some(surface) => unsafe {
                surface.get_physical_device_surface_support(device.handle, index as u32, surface.handle())?
            },
        };
        if surface.is_some() && !can_present {
            continue;
        }
        return Ok(Some(QueueInfo {
            family_index: index as u32,
            can_present,
            flags: family.queue_flags,
        }));
    }
    Ok(None)
}
