//! The two render passes of a frame.
//!
//! * The [`offscreen`] pass renders the scene from the light into a depth-only shadow map.
//! * The [`scene`] pass renders the scene from the camera into a swapchain image, sampling the shadow map.
//!
//! Each pass owns its render pass object, attachments, framebuffers and pipelines. Uniform buffers and descriptor
//! sets are owned per frame in flight by the renderer.

use ash::vk;

pub mod offscreen;
pub mod render_pass;
pub mod scene;

/// Raw handles of a pipeline and the layout its descriptor sets are bound with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PipelineBinding {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
}
