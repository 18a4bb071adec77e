use anyhow::Result;
use ash::vk;

use crate::command_buffer::IncompleteCommandBuffer;
use crate::{BufferView, Error, GraphicsCmdBuffer, RenderPassBegin};

impl GraphicsCmdBuffer for IncompleteCommandBuffer {
    fn begin_render_pass(self, info: &RenderPassBegin) -> Result<Self> {
        let clear_values = info
            .clear_values
            .iter()
            .map(|&value| vk::ClearValue::from(value))
            .collect::<Vec<_>>();
        let begin_info = vk::RenderPassBeginInfo::builder()
            .render_pass(info.render_pass)
            .framebuffer(info.framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D::default(),
                extent: info.extent,
            })
            .clear_values(&clear_values)
            .build();
        unsafe {
            self.device
                .cmd_begin_render_pass(self.handle, &begin_info, vk::SubpassContents::INLINE);
        }
        Ok(self)
    }

    fn end_render_pass(self) -> Result<Self> {
        unsafe {
            self.device.cmd_end_render_pass(self.handle);
        }
        Ok(self)
    }

    fn viewport(self, viewport: vk::Viewport) -> Result<Self> {
        unsafe {
            self.device
                .cmd_set_viewport(self.handle, 0, std::slice::from_ref(&viewport));
        }
        Ok(self)
    }

    fn scissor(self, scissor: vk::Rect2D) -> Result<Self> {
        unsafe {
            self.device.cmd_set_scissor(self.handle, 0, std::slice::from_ref(&scissor));
        }
        Ok(self)
    }

    fn depth_bias(self, constant_factor: f32, clamp: f32, slope_factor: f32) -> Result<Self> {
        unsafe {
            self.device
                .cmd_set_depth_bias(self.handle, constant_factor, clamp, slope_factor);
        }
        Ok(self)
    }

    fn bind_graphics_pipeline(mut self, pipeline: vk::Pipeline, layout: vk::PipelineLayout) -> Result<Self> {
        unsafe {
            self.device
                .cmd_bind_pipeline(self.handle, vk::PipelineBindPoint::GRAPHICS, pipeline);
        }
        self.current_pipeline_layout = layout;
        Ok(self)
    }

    /// # Errors
    /// Fails with [`Error::NoPipelineBound`] if no graphics pipeline was bound yet.
    fn bind_descriptor_set(self, index: u32, set: vk::DescriptorSet) -> Result<Self> {
        if self.current_pipeline_layout == vk::PipelineLayout::null() {
            return Err(anyhow::Error::from(Error::NoPipelineBound));
        }
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.handle,
                vk::PipelineBindPoint::GRAPHICS,
                self.current_pipeline_layout,
                index,
                std::slice::from_ref(&set),
                &[],
            );
        }
        Ok(self)
    }

    fn bind_vertex_buffer(self, binding: u32, buffer: &BufferView) -> Result<Self> {
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(self.handle, binding, &[buffer.handle()], &[buffer.offset()]);
        }
        Ok(self)
    }

    fn bind_index_buffer(self, buffer: &BufferView, ty: vk::IndexType) -> Result<Self> {
        unsafe {
            self.device
                .cmd_bind_index_buffer(self.handle, buffer.handle(), buffer.offset(), ty);
        }
        Ok(self)
    }

    fn draw(self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<Self> {
        unsafe {
            self.device
                .cmd_draw(self.handle, vertex_count, instance_count, first_vertex, first_instance);
        }
        Ok(self)
    }

    fn draw_indexed(
        self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<Self> {
        unsafe {
            self.device.cmd_draw_indexed(
                self.handle,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            );
        }
        Ok(self)
    }
}
