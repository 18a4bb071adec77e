use anyhow::Result;
use ash::vk;

use crate::command_buffer::{CommandBuffer, IncompleteCommandBuffer};
use crate::Device;

impl IncompleteCommandBuffer {
    /// Reset `handle` and start recording into it. The pool must have been created with `RESET_COMMAND_BUFFER`.
    pub fn begin(device: Device, handle: vk::CommandBuffer, flags: vk::CommandBufferUsageFlags) -> Result<Self> {
        unsafe {
            device.reset_command_buffer(handle, vk::CommandBufferResetFlags::empty())?;
            let begin_info = vk::CommandBufferBeginInfo::builder().flags(flags).build();
            device.begin_command_buffer(handle, &begin_info)?;
        }
        Ok(IncompleteCommandBuffer {
            device,
            handle,
            current_pipeline_layout: vk::PipelineLayout::null(),
        })
    }

    /// End recording.
    pub fn finish(self) -> Result<CommandBuffer> {
        unsafe { self.device.end_command_buffer(self.handle)? }
        Ok(CommandBuffer {
            handle: self.handle,
        })
    }

    /// Get unsafe access to the underlying `VkCommandBuffer` handle.
    /// # Safety
    /// Commands recorded through the handle bypass the pipeline layout tracking of this wrapper.
    pub unsafe fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }
}
