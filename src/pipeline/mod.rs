//! Graphics pipelines and the objects needed to build them.
//!
//! Use [`PipelineBuilder`](builder::PipelineBuilder) to describe the pipeline state, then build it against a
//! [`PipelineLayout`](layout::PipelineLayout) and the [`RenderPass`](crate::RenderPass) it will be used in.

use ash::vk;

use crate::Device;

pub mod builder;
pub mod layout;
pub mod shader;

/// A fully built graphics pipeline.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Pipeline {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Pipeline,
    name: String,
}

impl Pipeline {
    pub(crate) fn new(device: Device, handle: vk::Pipeline, name: String) -> Self {
        #[cfg(feature = "log-objects")]
        trace!("Created new VkPipeline {handle:p} ({name})");
        Self {
            device,
            handle,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get unsafe access to the underlying `VkPipeline` handle.
    /// # Safety
    /// The caller must not destroy the pipeline.
    pub unsafe fn handle(&self) -> vk::Pipeline {
        self.handle
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkPipeline {:p} ({})", self.handle, self.name);
        unsafe {
            self.device.destroy_pipeline(self.handle, None);
        }
    }
}
