//! Wrapper around a `VkCommandPool`.

use anyhow::Result;
use ash::vk;

use crate::Device;

/// Owning wrapper around a [`VkCommandPool`](vk::CommandPool). Command buffers allocated from it are freed together with the pool.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct CommandPool {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::CommandPool,
}

impl CommandPool {
    /// Create a pool whose command buffers can be reset individually and re-recorded every frame.
    pub fn new(device: Device, family: u32) -> Result<Self> {
        let info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(family)
            .build();
        let handle = unsafe { device.create_command_pool(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkCommandPool {handle:p}");
        Ok(CommandPool {
            device,
            handle,
        })
    }

    /// Allocate `count` primary command buffers.
    pub fn allocate(&self, count: u32) -> Result<Vec<vk::CommandBuffer>> {
        let info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.handle)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count)
            .build();
        Ok(unsafe { self.device.allocate_command_buffers(&info)? })
    }

    /// Return command buffers to the pool.
    pub fn free(&self, buffers: &[vk::CommandBuffer]) {
        if !buffers.is_empty() {
            unsafe { self.device.free_command_buffers(self.handle, buffers) };
        }
    }

    /// Get unsafe access to the underlying `VkCommandPool` handle.
    /// # Safety
    /// The caller must not destroy the pool.
    pub unsafe fn handle(&self) -> vk::CommandPool {
        self.handle
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkCommandPool {:p}", self.handle);
        unsafe {
            self.device.destroy_command_pool(self.handle, None);
        }
    }
}
