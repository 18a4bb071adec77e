//! Recording of a complete frame: the offscreen pass followed by the scene pass.

use anyhow::Result;
use ash::vk;

use crate::pass::PipelineBinding;
use crate::{DepthBias, Drawable, GraphicsCmdBuffer, RenderPassBegin, SceneMode};

/// Everything [`record_frame`] needs, as plain handles. The renderer fills this in for the current frame slot and
/// the acquired swapchain image.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCommands {
    pub offscreen: RenderPassBegin,
    pub offscreen_binding: PipelineBinding,
    pub offscreen_set: vk::DescriptorSet,
    pub depth_bias: DepthBias,
    pub scene: RenderPassBegin,
    /// Pipeline of the current scene mode.
    pub scene_binding: PipelineBinding,
    /// Descriptor set matching `scene_binding`.
    pub scene_set: vk::DescriptorSet,
    pub mode: SceneMode,
}

/// Record both passes of a frame into `cmd`. `scene` is drawn into the shadow map, and again into the scene pass
/// unless the shadow map is displayed instead.
pub fn record_frame<C: GraphicsCmdBuffer, D: Drawable + ?Sized>(cmd: C, frame: &FrameCommands, scene: &D) -> Result<C> {
    let cmd = cmd
        .begin_render_pass(&frame.offscreen)?
        .full_viewport_scissor(frame.offscreen.extent)?
        .depth_bias(frame.depth_bias.constant, 0.0, frame.depth_bias.slope)?
        .bind_graphics_pipeline(frame.offscreen_binding.pipeline, frame.offscreen_binding.layout)?
        .bind_descriptor_set(0, frame.offscreen_set)?;
    let cmd = scene
        .draw(cmd)?
        .end_render_pass()?
        .begin_render_pass(&frame.scene)?
        .full_viewport_scissor(frame.scene.extent)?
        .bind_graphics_pipeline(frame.scene_binding.pipeline, frame.scene_binding.layout)?
        .bind_descriptor_set(0, frame.scene_set)?;
    let cmd = match frame.mode {
        // Full screen triangle, generated in the vertex shader.
        SceneMode::ShadowMapDebug => cmd.draw(3, 1, 0, 0)?,
        SceneMode::Shaded => scene.draw(cmd)?,
    };
    cmd.end_render_pass()
}

#[cfg(test)]
mod tests {
    use ash::vk::Handle;

    use super::*;
    use crate::command_buffer::command_log::Command;
    use crate::{ClearValue, CommandLog};

    struct Nothing;

    impl Drawable for Nothing {
        fn draw<C: GraphicsCmdBuffer>(&self, cmd: C) -> Result<C> {
            Ok(cmd)
        }
    }

    fn begin(raw: u64, size: u32) -> RenderPassBegin {
        RenderPassBegin {
            render_pass: vk::RenderPass::from_raw(raw),
            framebuffer: vk::Framebuffer::from_raw(raw),
            extent: vk::Extent2D {
                width: size,
                height: size,
            },
            clear_values: vec![ClearValue::DepthStencil {
                depth: 1.0,
                stencil: 0,
            }],
        }
    }

    #[test]
    fn offscreen_state_is_set_before_scene_pass() {
        let binding = PipelineBinding {
            pipeline: vk::Pipeline::from_raw(5),
            layout: vk::PipelineLayout::from_raw(6),
        };
        let frame = FrameCommands {
            offscreen: begin(1, 1024),
            offscreen_binding: binding,
            offscreen_set: vk::DescriptorSet::from_raw(7),
            depth_bias: DepthBias::default(),
            scene: begin(2, 600),
            scene_binding: binding,
            scene_set: vk::DescriptorSet::from_raw(8),
            mode: SceneMode::Shaded,
        };
        let log = record_frame(CommandLog::new(), &frame, &Nothing).unwrap();
        let passes = log.render_passes();
        assert_eq!(passes.len(), 2);
        assert!(passes[0].iter().any(|command| matches!(
            command,
            Command::SetDepthBias { constant_factor, slope_factor, .. } if *constant_factor == 1.25 && *slope_factor == 1.75
        )));
        assert!(!passes[1].iter().any(|command| matches!(command, Command::SetDepthBias { .. })));
        assert!(matches!(
            passes[0][0],
            Command::SetViewport(viewport) if viewport.width == 1024.0
        ));
        assert!(log.is_balanced());
    }
}
