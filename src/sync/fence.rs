//! Wrapper around a `VkFence`, used for CPU-GPU synchronization.

use std::slice;

use anyhow::Result;
use ash::vk;

use crate::Device;

/// Owning wrapper around a [`VkFence`](vk::Fence).
///
/// Frame fences are created signaled, so that the first wait on a fresh frame slot returns immediately.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Fence {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Fence,
}

impl Fence {
    /// Create a new fence, optionally in the signaled state.
    pub fn new(device: Device, signaled: bool) -> Result<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let info = vk::FenceCreateInfo::builder().flags(flags).build();
        let handle = unsafe { device.create_fence(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkFence {handle:p}");
        Ok(Fence {
            device,
            handle,
        })
    }

    /// Block until the fence is signaled.
    pub fn wait(&self) -> Result<()> {
        unsafe { self.device.wait_for_fences(slice::from_ref(&self.handle), true, u64::MAX)? };
        Ok(())
    }

    /// Reset the fence to the unsignaled state.
    pub fn reset(&self) -> Result<()> {
        unsafe { self.device.reset_fences(slice::from_ref(&self.handle))? };
        Ok(())
    }

    /// Check whether the fence is signaled without blocking.
    pub fn is_signaled(&self) -> Result<bool> {
        Ok(unsafe { self.device.get_fence_status(self.handle)? })
    }

    /// Get unsafe access to the underlying `VkFence` handle.
    /// # Safety
    /// The caller must not destroy the fence.
    pub unsafe fn handle(&self) -> vk::Fence {
        self.handle
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkFence {:p}", self.handle);
        unsafe {
            self.device.destroy_fence(self.handle, None);
        }
    }
}
