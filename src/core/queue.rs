//! The graphics queue used for rendering and presentation.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use ash::vk;

use crate::{Device, Error, Fence};

/// Stores all information of a queue that was found on the physical device.
#[derive(Default, Debug, Copy, Clone)]
pub struct QueueInfo {
    /// The queue family index.
    pub family_index: u32,
    /// Whether this queue is capable of presenting to the window surface.
    pub can_present: bool,
    /// All supported operations on this queue.
    pub flags: vk::QueueFlags,
}

/// Physical VkQueue object.
#[derive(Debug)]
struct DeviceQueue {
    handle: vk::Queue,
}

/// Outcome of a successful present call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PresentResult {
    /// The image was queued for presentation and the swapchain still matches the surface.
    Presented,
    /// The image was queued for presentation, but the swapchain should be recreated.
    Suboptimal,
    /// The swapchain no longer matches the surface. Nothing was presented.
    OutOfDate,
}

/// Exposes a command queue on the device. Access to the `VkQueue` is externally synchronized through a mutex.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Queue {
    #[derivative(Debug = "ignore")]
    device: Device,
    queue: Arc<Mutex<DeviceQueue>>,
    /// Information about this queue, such as supported operations, family index, etc. See also [`QueueInfo`]
    info: QueueInfo,
}

impl Queue {
    /// Retrieve queue 0 of the family described in `info`. The device must have been created with this family.
    pub fn new(device: Device, info: QueueInfo) -> Self {
        let handle = unsafe { device.get_device_queue(info.family_index, 0) };
        Queue {
            device,
            queue: Arc::new(Mutex::new(DeviceQueue {
                handle,
            })),
            info,
        }
    }

    fn acquire_device_queue(&self) -> Result<MutexGuard<DeviceQueue>> {
        Ok(self.queue.lock().map_err(|_| Error::PoisonError)?)
    }

    /// Submits a batch of submissions to the queue, and signals the given fence when the
    /// submission is done.
    pub fn submit(&self, submits: &[vk::SubmitInfo], fence: Option<&Fence>) -> Result<()> {
        let fence = match fence {
            None => vk::Fence::null(),
            Some(fence) => unsafe { fence.handle() },
        };
        let queue = self.acquire_device_queue()?;
        unsafe { self.device.queue_submit(queue.handle, submits, fence)? };
        Ok(())
    }

    /// Queue an image for presentation. Stale swapchain results are reported through [`PresentResult`]
    /// instead of an error.
    pub fn present(&self, functions: &ash::extensions::khr::Swapchain, info: &vk::PresentInfoKHR) -> Result<PresentResult> {
        let queue = self.acquire_device_queue()?;
        match unsafe { functions.queue_present(queue.handle, info) } {
            Ok(false) => Ok(PresentResult::Presented),
            Ok(true) => Ok(PresentResult::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentResult::OutOfDate),
            Err(err) => Err(err.into()),
        }
    }

    pub fn info(&self) -> &QueueInfo {
        &self.info
    }
}
