//! Wrappers around Vulkan synchronization primitives.
//!
//! - [`fence`] wraps `VkFence` objects, used to know on the CPU when a submission is done with a frame's resources.
//! - [`semaphore`] wraps `VkSemaphore` objects, used to order acquire, render and present on the GPU.

pub mod fence;
pub mod semaphore;
