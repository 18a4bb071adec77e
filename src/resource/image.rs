//! Wrappers around [`VkImage`](vk::Image) and [`VkImageView`](vk::ImageView) objects.
//!
//! Images are either backed by an allocation (depth attachments) or owned by the presentation engine (swapchain images).
//! Only two-dimensional, single-layer, single-mip images are needed for rendering, so that is all this module creates.

use anyhow::Result;
use ash::vk;

use crate::{Allocation, Allocator, DefaultAllocator, Device, MemoryType};

/// Parameters for creating a new [`Image`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct ImageCreateInfo {
    pub extent: vk::Extent2D,
    pub format: vk::Format,
    pub usage: vk::ImageUsageFlags,
}

/// Wrapper around a [`VkImage`](vk::Image).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Image<A: Allocator = DefaultAllocator> {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Image,
    /// `None` for images owned by the swapchain.
    #[derivative(Debug = "ignore")]
    memory: Option<A::Allocation>,
    format: vk::Format,
    extent: vk::Extent2D,
}

unsafe impl<A: Allocator> Send for Image<A> {}

unsafe impl<A: Allocator> Sync for Image<A> {}

/// Owning wrapper around a [`VkImageView`](vk::ImageView) covering a whole 2D image.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ImageView {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::ImageView,
    image: vk::Image,
    format: vk::Format,
    aspect: vk::ImageAspectFlags,
    extent: vk::Extent2D,
}

impl<A: Allocator> Image<A> {
    /// Create a new device local image with optimal tiling, starting in `UNDEFINED` layout.
    pub fn new(device: Device, alloc: &mut A, info: ImageCreateInfo) -> Result<Self> {
        let create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .format(info.format)
            .extent(vk::Extent3D {
                width: info.extent.width,
                height: info.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(info.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .build();
        let handle = unsafe { device.create_image(&create_info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkImage {handle:p}");

        let requirements = unsafe { device.get_image_memory_requirements(handle) };
        let memory = match alloc.allocate("image", &requirements, MemoryType::GpuOnly) {
            Ok(memory) => memory,
            Err(err) => {
                unsafe { device.destroy_image(handle, None) };
                return Err(err);
            }
        };
        unsafe {
            device.bind_image_memory(handle, memory.memory(), memory.offset())?;
        }

        Ok(Self {
            device,
            handle,
            memory: Some(memory),
            format: info.format,
            extent: info.extent,
        })
    }

    /// Wrap an image owned by someone else, such as the swapchain. It will not be destroyed on drop.
    pub(crate) fn new_managed(device: Device, handle: vk::Image, format: vk::Format, extent: vk::Extent2D) -> Self {
        Self {
            device,
            handle,
            memory: None,
            format,
            extent,
        }
    }

    /// Create a view over the whole image with the given aspect.
    pub fn view(&self, aspect: vk::ImageAspectFlags) -> Result<ImageView> {
        let info = vk::ImageViewCreateInfo::builder()
            .image(self.handle)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(self.format)
            .components(vk::ComponentMapping::default())
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            })
            .build();
        let handle = unsafe { self.device.create_image_view(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkImageView {handle:p}");

        Ok(ImageView {
            device: self.device.clone(),
            handle,
            image: self.handle,
            format: self.format,
            aspect,
            extent: self.extent,
        })
    }

    /// Whether this image is owned by the swapchain instead of the application.
    pub fn is_owned(&self) -> bool {
        self.memory.is_some()
    }

    /// Get unsafe access to the underlying `VkImage` handle.
    /// # Safety
    /// The caller must not destroy the image.
    pub unsafe fn handle(&self) -> vk::Image {
        self.handle
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl<A: Allocator> Drop for Image<A> {
    fn drop(&mut self) {
        if self.is_owned() {
            #[cfg(feature = "log-objects")]
            trace!("Destroying VkImage {:p}", self.handle);
            unsafe {
                self.device.destroy_image(self.handle, None);
            }
        }
    }
}

impl ImageView {
    /// Get unsafe access to the underlying `VkImageView` handle.
    /// # Safety
    /// The caller must not destroy the view.
    pub unsafe fn handle(&self) -> vk::ImageView {
        self.handle
    }

    /// Handle of the image this view was created from.
    pub fn image(&self) -> vk::Image {
        self.image
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn aspect(&self) -> vk::ImageAspectFlags {
        self.aspect
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for ImageView {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkImageView {:p}", self.handle);
        unsafe {
            self.device.destroy_image_view(self.handle, None);
        }
    }
}
