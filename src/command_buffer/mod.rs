//! Command buffers and the traits commands are recorded through.
//!
//! # Incomplete command buffers
//!
//! Vulkan command buffers need to call `vkEndCommandBuffer` before they can be submitted. The [`IncompleteCommandBuffer`] accepts
//! commands, and can only be turned into a submittable [`CommandBuffer`] with [`IncompleteCommandBuffer::finish`].
//!
//! # Commands
//! Commands are recorded through the [`GraphicsCmdBuffer`](traits::GraphicsCmdBuffer) trait. Besides the Vulkan implementation,
//! [`CommandLog`](command_log::CommandLog) implements it by storing every command, so frame recording can be inspected without a GPU.

use ash::vk;

use crate::Device;

pub mod command_log;
pub mod command_pool;
pub mod graphics;
pub mod incomplete;
pub mod traits;

/// A command buffer that is done recording and can be submitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandBuffer {
    handle: vk::CommandBuffer,
}

impl CommandBuffer {
    /// Get unsafe access to the underlying `VkCommandBuffer` handle.
    /// # Safety
    /// The command pool the buffer was allocated from must still be alive.
    pub unsafe fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }
}

/// A command buffer in the recording state.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct IncompleteCommandBuffer {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::CommandBuffer,
    /// Layout of the last bound pipeline, used to bind descriptor sets.
    current_pipeline_layout: vk::PipelineLayout,
}
