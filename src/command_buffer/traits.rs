use anyhow::Result;
use ash::vk;

use crate::BufferView;

/// Clear value of a render pass attachment.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

impl From<ClearValue> for vk::ClearValue {
    fn from(value: ClearValue) -> Self {
        match value {
            ClearValue::Color(float32) => vk::ClearValue {
                color: vk::ClearColorValue {
                    float32,
                },
            },
            ClearValue::DepthStencil {
                depth,
                stencil,
            } => vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth,
                    stencil,
                },
            },
        }
    }
}

/// Everything needed to begin a render pass instance.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassBegin {
    pub render_pass: vk::RenderPass,
    pub framebuffer: vk::Framebuffer,
    /// The render area. Always starts at the origin.
    pub extent: vk::Extent2D,
    /// One clear value per attachment, in attachment order.
    pub clear_values: Vec<ClearValue>,
}

/// Commands for recording rendering work. Methods consume and return the command buffer so they can be chained.
pub trait GraphicsCmdBuffer {
    /// Begin a render pass instance with inline subpass contents.
    fn begin_render_pass(self, info: &RenderPassBegin) -> Result<Self>
    where
        Self: Sized;
    fn end_render_pass(self) -> Result<Self>
    where
        Self: Sized;
    /// Set the dynamic viewport.
    fn viewport(self, viewport: vk::Viewport) -> Result<Self>
    where
        Self: Sized;
    /// Set the dynamic scissor rectangle.
    fn scissor(self, scissor: vk::Rect2D) -> Result<Self>
    where
        Self: Sized;
    /// Set viewport and scissor to cover `extent` entirely.
    fn full_viewport_scissor(self, extent: vk::Extent2D) -> Result<Self>
    where
        Self: Sized,
    {
        self.viewport(vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        })?
        .scissor(vk::Rect2D {
            offset: vk::Offset2D::default(),
            extent,
        })
    }
    /// Set the dynamic depth bias factors.
    fn depth_bias(self, constant_factor: f32, clamp: f32, slope_factor: f32) -> Result<Self>
    where
        Self: Sized;
    /// Bind a graphics pipeline. `layout` is used by subsequent descriptor set binds.
    fn bind_graphics_pipeline(self, pipeline: vk::Pipeline, layout: vk::PipelineLayout) -> Result<Self>
    where
        Self: Sized;
    /// Bind a descriptor set at set index `index` of the currently bound pipeline's layout.
    fn bind_descriptor_set(self, index: u32, set: vk::DescriptorSet) -> Result<Self>
    where
        Self: Sized;
    fn bind_vertex_buffer(self, binding: u32, buffer: &BufferView) -> Result<Self>
    where
        Self: Sized;
    fn bind_index_buffer(self, buffer: &BufferView, ty: vk::IndexType) -> Result<Self>
    where
        Self: Sized;
    fn draw(self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<Self>
    where
        Self: Sized;
    fn draw_indexed(
        self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<Self>
    where
        Self: Sized;
}
