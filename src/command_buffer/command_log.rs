//! A command recorder that stores commands instead of sending them to a GPU.

use anyhow::Result;
use ash::vk;

use crate::{BufferView, ClearValue, Error, GraphicsCmdBuffer, RenderPassBegin};

/// A single recorded command.
#[derive(Debug, Clone)]
pub enum Command {
    BeginRenderPass {
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        extent: vk::Extent2D,
        clear_values: Vec<ClearValue>,
    },
    EndRenderPass,
    SetViewport(vk::Viewport),
    SetScissor(vk::Rect2D),
    SetDepthBias {
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    },
    BindPipeline(vk::Pipeline),
    BindDescriptorSet {
        layout: vk::PipelineLayout,
        index: u32,
        set: vk::DescriptorSet,
    },
    BindVertexBuffer {
        binding: u32,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
    },
    BindIndexBuffer {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        ty: vk::IndexType,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
}

impl Command {
    pub fn is_draw(&self) -> bool {
        matches!(self, Command::Draw { .. } | Command::DrawIndexed { .. })
    }
}

/// Records commands into a list. Validates render pass nesting and pipeline binding like a driver would.
///
/// # Example
/// ```
/// # use umbra::*;
/// # use anyhow::Result;
/// # fn record() -> Result<()> {
/// let log = CommandLog::new()
///     .full_viewport_scissor(vk::Extent2D { width: 64, height: 64 })?
///     .draw(3, 1, 0, 0)?;
/// assert_eq!(log.draw_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Vec<Command>,
    current_pipeline_layout: Option<vk::PipelineLayout>,
    inside_render_pass: bool,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        self.commands.as_slice()
    }

    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|command| command.is_draw()).count()
    }

    /// Whether every render pass that was begun has also ended.
    pub fn is_balanced(&self) -> bool {
        !self.inside_render_pass
    }

    /// Split the log into the commands of each render pass instance, without the begin and end commands.
    pub fn render_passes(&self) -> Vec<&[Command]> {
        let mut passes = Vec::new();
        let mut start = None;
        for (index, command) in self.commands.iter().enumerate() {
            match command {
                Command::BeginRenderPass {
                    ..
                } => start = Some(index + 1),
                Command::EndRenderPass => {
                    if let Some(first) = start.take() {
                        passes.push(&self.commands[first..index]);
                    }
                }
                _ => {}
            }
        }
        passes
    }

    fn push(mut self, command: Command) -> Result<Self> {
        self.commands.push(command);
        Ok(self)
    }
}

impl GraphicsCmdBuffer for CommandLog {
    /// # Errors
    /// Fails if a render pass is already active.
    fn begin_render_pass(mut self, info: &RenderPassBegin) -> Result<Self> {
        if self.inside_render_pass {
            return Err(anyhow::Error::from(Error::Uncategorized("render pass begun inside another render pass")));
        }
        self.inside_render_pass = true;
        self.push(Command::BeginRenderPass {
            render_pass: info.render_pass,
            framebuffer: info.framebuffer,
            extent: info.extent,
            clear_values: info.clear_values.clone(),
        })
    }

    /// # Errors
    /// Fails if no render pass is active.
    fn end_render_pass(mut self) -> Result<Self> {
        if !self.inside_render_pass {
            return Err(anyhow::Error::from(Error::Uncategorized("render pass ended without being begun")));
        }
        self.inside_render_pass = false;
        self.push(Command::EndRenderPass)
    }

    fn viewport(self, viewport: vk::Viewport) -> Result<Self> {
        self.push(Command::SetViewport(viewport))
    }

    fn scissor(self, scissor: vk::Rect2D) -> Result<Self> {
        self.push(Command::SetScissor(scissor))
    }

    fn depth_bias(self, constant_factor: f32, clamp: f32, slope_factor: f32) -> Result<Self> {
        self.push(Command::SetDepthBias {
            constant_factor,
            clamp,
            slope_factor,
        })
    }

    fn bind_graphics_pipeline(mut self, pipeline: vk::Pipeline, layout: vk::PipelineLayout) -> Result<Self> {
        self.current_pipeline_layout = Some(layout);
        self.push(Command::BindPipeline(pipeline))
    }

    fn bind_descriptor_set(self, index: u32, set: vk::DescriptorSet) -> Result<Self> {
        let layout = self.current_pipeline_layout.ok_or(Error::NoPipelineBound)?;
        self.push(Command::BindDescriptorSet {
            layout,
            index,
            set,
        })
    }

    fn bind_vertex_buffer(self, binding: u32, buffer: &BufferView) -> Result<Self> {
        self.push(Command::BindVertexBuffer {
            binding,
            buffer: unsafe { buffer.handle() },
            offset: buffer.offset(),
        })
    }

    fn bind_index_buffer(self, buffer: &BufferView, ty: vk::IndexType) -> Result<Self> {
        self.push(Command::BindIndexBuffer {
            buffer: unsafe { buffer.handle() },
            offset: buffer.offset(),
            ty,
        })
    }

    fn draw(self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<Self> {
        self.push(Command::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        })
    }

    fn draw_indexed(
        self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<Self> {
        self.push(Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;

    fn begin() -> RenderPassBegin {
        RenderPassBegin {
            render_pass: vk::RenderPass::from_raw(1),
            framebuffer: vk::Framebuffer::from_raw(2),
            extent: vk::Extent2D {
                width: 16,
                height: 16,
            },
            clear_values: vec![ClearValue::Color([0.0; 4])],
        }
    }

    #[test]
    fn nested_render_pass_is_rejected() {
        let log = CommandLog::new().begin_render_pass(&begin()).unwrap();
        assert!(log.begin_render_pass(&begin()).is_err());
    }

    #[test]
    fn descriptor_set_needs_pipeline() {
        let err = CommandLog::new()
            .bind_descriptor_set(0, vk::DescriptorSet::from_raw(3))
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoPipelineBound)));
    }

    #[test]
    fn render_passes_split_commands() {
        let log = CommandLog::new()
            .begin_render_pass(&begin())
            .unwrap()
            .draw(3, 1, 0, 0)
            .unwrap()
            .end_render_pass()
            .unwrap()
            .begin_render_pass(&begin())
            .unwrap()
            .end_render_pass()
            .unwrap();
        let passes = log.render_passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].len(), 1);
        assert!(passes[1].is_empty());
        assert!(log.is_balanced());
    }
}
