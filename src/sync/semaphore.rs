//! Wrapper around a `VkSemaphore`, used for GPU-GPU synchronization.

use anyhow::Result;
use ash::vk;

use crate::Device;

/// Owning wrapper around a binary [`VkSemaphore`](vk::Semaphore).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Semaphore {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Device) -> Result<Self> {
        let info = vk::SemaphoreCreateInfo::builder().build();
        let handle = unsafe { device.create_semaphore(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkSemaphore {handle:p}");
        Ok(Semaphore {
            device,
            handle,
        })
    }

    /// Get unsafe access to the underlying `VkSemaphore` handle.
    /// # Safety
    /// The caller must not destroy the semaphore.
    pub unsafe fn handle(&self) -> vk::Semaphore {
        self.handle
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkSemaphore {:p}", self.handle);
        unsafe {
            self.device.destroy_semaphore(self.handle, None);
        }
    }
}
