//! The offscreen pass renders the scene depth from the light's point of view into the shadow map.
//!
//! The shadow map has a fixed size that does not depend on the window, so this pass is never rebuilt when the
//! swapchain is recreated. It has exactly one framebuffer.

use std::path::Path;

use anyhow::Result;
use ash::vk;

use crate::pass::render_pass::RenderPassDescription;
use crate::pass::PipelineBinding;
use crate::{
    ClearValue, DefaultAllocator, DepthUsage, DescriptorSetLayout, Device, FrameBufferAttachment, Framebuffer, ImageView,
    Pipeline, PipelineBuilder, PipelineLayout, RenderPass, RenderPassBegin, Sampler, ShaderCreateInfo, Vertex,
};

/// File name of the SPIR-V vertex shader of the offscreen pipeline.
pub const VERTEX_SHADER: &str = "offscreen.vert.spv";

/// Depth bias factors applied while rendering the shadow map, to avoid shadow acne.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthBias {
    pub constant: f32,
    pub slope: f32,
}

impl Default for DepthBias {
    fn default() -> Self {
        Self {
            constant: 1.25,
            slope: 1.75,
        }
    }
}

/// A depth-only pass. The depth attachment ends in `DEPTH_STENCIL_READ_ONLY_OPTIMAL` so it can be sampled right after.
pub fn description(depth_format: vk::Format) -> RenderPassDescription {
    RenderPassDescription::default()
        .depth(depth_format, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL)
        // Reads of the previous frame's scene pass must finish before the map is cleared.
        .dependency(vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::FRAGMENT_SHADER,
            dst_stage_mask: vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            src_access_mask: vk::AccessFlags::SHADER_READ,
            dst_access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dependency_flags: vk::DependencyFlags::BY_REGION,
        })
        .dependency(vk::SubpassDependency {
            src_subpass: 0,
            dst_subpass: vk::SUBPASS_EXTERNAL,
            src_stage_mask: vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            dst_stage_mask: vk::PipelineStageFlags::FRAGMENT_SHADER,
            src_access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dst_access_mask: vk::AccessFlags::SHADER_READ,
            dependency_flags: vk::DependencyFlags::BY_REGION,
        })
}

/// Descriptor bindings of the offscreen set: the light-space matrix at binding 0.
pub fn set_layout_bindings() -> [vk::DescriptorSetLayoutBinding; 1] {
    [vk::DescriptorSetLayoutBinding::builder()
        .binding(0)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(1)
        .stage_flags(vk::ShaderStageFlags::VERTEX)
        .build()]
}

/// Vertex-only pipeline that reads positions from the interleaved [`Vertex`] buffer. Culling is disabled so all
/// geometry casts shadows. Depth bias factors are dynamic.
pub fn pipeline(vertex_shader: ShaderCreateInfo) -> Result<PipelineBuilder> {
    Ok(PipelineBuilder::new("offscreen")
        .vertex_input(0, vk::VertexInputRate::VERTEX)
        .vertex_attribute(0, 0, vk::Format::R32G32B32_SFLOAT)?
        .vertex_stride(0, Vertex::STRIDE)
        .attach_shader(vertex_shader)
        .depth(true, true, vk::CompareOp::LESS_OR_EQUAL)
        .depth_bias(true)
        .cull_mask(vk::CullModeFlags::NONE)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .dynamic_states(&[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR, vk::DynamicState::DEPTH_BIAS]))
}

/// Shadow map, render pass, framebuffer and pipeline of the offscreen pass.
#[derive(Debug)]
pub struct OffscreenPass {
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    set_layout: DescriptorSetLayout,
    framebuffer: Framebuffer,
    render_pass: RenderPass,
    sampler: Sampler,
    shadow_map: FrameBufferAttachment,
    depth_bias: DepthBias,
}

impl OffscreenPass {
    /// Create a `size`x`size` shadow map in `depth_format`. `linear_filter` selects the sampler filter and must only
    /// be set if the format supports linear filtering.
    /// # Errors
    /// Fails if the vertex shader cannot be loaded from `shader_dir`, or if any Vulkan object cannot be created.
    pub fn new(
        device: Device,
        alloc: &mut DefaultAllocator,
        depth_format: vk::Format,
        linear_filter: bool,
        size: u32,
        depth_bias: DepthBias,
        shader_dir: &Path,
    ) -> Result<Self> {
        let extent = vk::Extent2D {
            width: size,
            height: size,
        };
        let shadow_map = FrameBufferAttachment::new(device.clone(), alloc, extent, depth_format, DepthUsage::SampledAttachment)?;
        let sampler = Sampler::shadow_map(device.clone(), linear_filter)?;
        let render_pass = RenderPass::new(device.clone(), &description(depth_format))?;
        let framebuffer = Framebuffer::new(device.clone(), &render_pass, &[shadow_map.view()], extent)?;

        let set_layout = DescriptorSetLayout::new(device.clone(), &set_layout_bindings())?;
        let pipeline_layout = PipelineLayout::new(device.clone(), &[&set_layout])?;
        let vertex_shader = ShaderCreateInfo::load(shader_dir.join(VERTEX_SHADER), vk::ShaderStageFlags::VERTEX)?;
        let pipeline = pipeline(vertex_shader)?.build(device, &pipeline_layout, &render_pass)?;

        info!("Created {size}x{size} shadow map ({depth_format:?}, linear filtering: {linear_filter})");

        Ok(Self {
            pipeline,
            pipeline_layout,
            set_layout,
            framebuffer,
            render_pass,
            sampler,
            shadow_map,
            depth_bias,
        })
    }

    /// Begin info that clears the shadow map to the far plane.
    pub fn begin_info(&self) -> RenderPassBegin {
        RenderPassBegin {
            render_pass: unsafe { self.render_pass.handle() },
            framebuffer: unsafe { self.framebuffer.handle() },
            extent: self.extent(),
            clear_values: vec![ClearValue::DepthStencil {
                depth: 1.0,
                stencil: 0,
            }],
        }
    }

    pub fn binding(&self) -> PipelineBinding {
        PipelineBinding {
            pipeline: unsafe { self.pipeline.handle() },
            layout: unsafe { self.pipeline_layout.handle() },
        }
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.shadow_map.extent()
    }

    pub fn depth_bias(&self) -> DepthBias {
        self.depth_bias
    }

    /// View of the shadow map, for sampling in the scene pass.
    pub fn shadow_map(&self) -> &ImageView {
        self.shadow_map.view()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn set_layout(&self) -> &DescriptorSetLayout {
        &self.set_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_map_is_stored_for_sampling() {
        let description = description(vk::Format::D16_UNORM);
        assert!(description.color_attachments.is_empty());
        let depth = description.attachments[0];
        assert_eq!(depth.load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(depth.store_op, vk::AttachmentStoreOp::STORE);
        assert_eq!(depth.final_layout, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL);
    }

    #[test]
    fn dependencies_guard_both_directions() {
        let description = description(vk::Format::D16_UNORM);
        assert_eq!(description.dependencies.len(), 2);
        let incoming = description.dependencies[0];
        let outgoing = description.dependencies[1];
        assert_eq!((incoming.src_subpass, incoming.dst_subpass), (vk::SUBPASS_EXTERNAL, 0));
        assert_eq!((outgoing.src_subpass, outgoing.dst_subpass), (0, vk::SUBPASS_EXTERNAL));
        assert_eq!(outgoing.dst_access_mask, vk::AccessFlags::SHADER_READ);
        assert!(description
            .dependencies
            .iter()
            .all(|dependency| dependency.dependency_flags == vk::DependencyFlags::BY_REGION));
    }

    #[test]
    fn pipeline_writes_only_depth() {
        let shader = ShaderCreateInfo::from_spirv(vk::ShaderStageFlags::VERTEX, vec![0x0723_0203]);
        let builder = pipeline(shader).unwrap();
        assert_eq!(builder.color_attachment_count(), 0);
        assert_eq!(builder.shaders().len(), 1);
        assert_eq!(builder.rasterization().cull_mode, vk::CullModeFlags::NONE);
        assert_eq!(builder.rasterization().depth_bias_enable, vk::TRUE);
        assert!(builder.dynamic_state_list().contains(&vk::DynamicState::DEPTH_BIAS));
        assert_eq!(builder.vertex_bindings()[0].stride, Vertex::STRIDE);
        assert_eq!(builder.vertex_attributes().len(), 1);
    }
}
