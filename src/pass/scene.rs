//! The scene pass renders the camera view into a swapchain image.
//!
//! It has one framebuffer per swapchain image and a depth attachment sized to the swapchain extent, so it is rebuilt
//! whenever the swapchain is recreated. Its render pass and pipelines only depend on the formats and survive rebuilds.

use std::path::Path;

use anyhow::Result;
use ash::vk;

use crate::pass::render_pass::RenderPassDescription;
use crate::pass::PipelineBinding;
use crate::{
    rebuild_per_image, ClearValue, DefaultAllocator, DepthUsage, DescriptorSetLayout, Device, Error, FrameBufferAttachment,
    Framebuffer, Pipeline, PipelineBuilder, PipelineLayout, RenderPass, RenderPassBegin, ShaderCreateInfo, Swapchain,
};

pub const SCENE_VERTEX_SHADER: &str = "scene.vert.spv";
pub const SCENE_FRAGMENT_SHADER: &str = "scene.frag.spv";
pub const DEBUG_VERTEX_SHADER: &str = "debug.vert.spv";
pub const DEBUG_FRAGMENT_SHADER: &str = "debug.frag.spv";

/// What the scene pass draws.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SceneMode {
    /// The lit scene, with shadows from the shadow map.
    #[default]
    Shaded,
    /// The shadow map itself, as a full screen triangle.
    ShadowMapDebug,
}

impl SceneMode {
    pub fn from_debug_flag(display_shadow_map: bool) -> Self {
        if display_shadow_map {
            SceneMode::ShadowMapDebug
        } else {
            SceneMode::Shaded
        }
    }
}

/// One color attachment that is presented and one depth attachment.
pub fn description(color_format: vk::Format, depth_format: vk::Format) -> RenderPassDescription {
    RenderPassDescription::default()
        .color(color_format, vk::ImageLayout::PRESENT_SRC_KHR)
        .depth(depth_format, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
        // The depth attachment is shared between frames in flight.
        .dependency(vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            dst_stage_mask: vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS | vk::PipelineStageFlags::LATE_FRAGMENT_TESTS,
            src_access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            dst_access_mask: vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ,
            dependency_flags: vk::DependencyFlags::empty(),
        })
        // Wait for the acquire semaphore, which is waited on at the color output stage.
        .dependency(vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE | vk::AccessFlags::COLOR_ATTACHMENT_READ,
            dependency_flags: vk::DependencyFlags::empty(),
        })
}

/// Bindings shared by the scene and debug sets: scene uniforms at 0, the shadow map at 1.
pub fn set_layout_bindings() -> [vk::DescriptorSetLayoutBinding; 2] {
    [
        vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)
            .build(),
        vk::DescriptorSetLayoutBinding::builder()
            .binding(1)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::FRAGMENT)
            .build(),
    ]
}

fn common(name: &str) -> PipelineBuilder {
    PipelineBuilder::new(name)
        .blend_attachment_none()
        .depth(true, true, vk::CompareOp::LESS_OR_EQUAL)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .dynamic_states(&[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR])
}

/// Full screen triangle showing the shadow map. Vertices are generated in the vertex shader.
pub fn debug_pipeline(vertex_shader: ShaderCreateInfo, fragment_shader: ShaderCreateInfo) -> PipelineBuilder {
    common("shadow map debug")
        .cull_mask(vk::CullModeFlags::NONE)
        .attach_shader(vertex_shader)
        .attach_shader(fragment_shader)
}

/// The lit scene, reading every attribute of [`Vertex`](crate::Vertex).
pub fn shaded_pipeline(vertex_shader: ShaderCreateInfo, fragment_shader: ShaderCreateInfo) -> Result<PipelineBuilder> {
    Ok(common("scene")
        .cull_mask(vk::CullModeFlags::BACK)
        .vertex_input(0, vk::VertexInputRate::VERTEX)
        .vertex_attribute(0, 0, vk::Format::R32G32B32_SFLOAT)?
        .vertex_attribute(0, 1, vk::Format::R32G32_SFLOAT)?
        .vertex_attribute(0, 2, vk::Format::R32G32B32_SFLOAT)?
        .vertex_attribute(0, 3, vk::Format::R32G32B32_SFLOAT)?
        .attach_shader(vertex_shader)
        .attach_shader(fragment_shader))
}

/// The prebuilt pipelines of both scene modes.
#[derive(Debug)]
pub struct ScenePipelines {
    pub debug: Pipeline,
    pub shaded: Pipeline,
}

impl ScenePipelines {
    pub fn load(device: Device, layout: &PipelineLayout, render_pass: &RenderPass, shader_dir: &Path) -> Result<Self> {
        let load = |name: &str, stage| ShaderCreateInfo::load(shader_dir.join(name), stage);
        let debug = debug_pipeline(
            load(DEBUG_VERTEX_SHADER, vk::ShaderStageFlags::VERTEX)?,
            load(DEBUG_FRAGMENT_SHADER, vk::ShaderStageFlags::FRAGMENT)?,
        )
        .build(device.clone(), layout, render_pass)?;
        let shaded = shaded_pipeline(
            load(SCENE_VERTEX_SHADER, vk::ShaderStageFlags::VERTEX)?,
            load(SCENE_FRAGMENT_SHADER, vk::ShaderStageFlags::FRAGMENT)?,
        )?
        .build(device, layout, render_pass)?;
        Ok(Self {
            debug,
            shaded,
        })
    }

    pub fn get(&self, mode: SceneMode) -> &Pipeline {
        match mode {
            SceneMode::Shaded => &self.shaded,
            SceneMode::ShadowMapDebug => &self.debug,
        }
    }
}

/// Render pass, per-image framebuffers, depth attachment and pipelines of the scene pass.
#[derive(Debug)]
pub struct ScenePass {
    pipelines: ScenePipelines,
    pipeline_layout: PipelineLayout,
    set_layout: DescriptorSetLayout,
    framebuffers: Vec<Framebuffer>,
    depth: FrameBufferAttachment,
    render_pass: RenderPass,
    color_format: vk::Format,
    depth_format: vk::Format,
}

impl ScenePass {
    pub fn new(
        device: Device,
        alloc: &mut DefaultAllocator,
        swapchain: &Swapchain,
        depth_format: vk::Format,
        shader_dir: &Path,
    ) -> Result<Self> {
        let render_pass = RenderPass::new(device.clone(), &description(swapchain.format().format, depth_format))?;
        let depth = FrameBufferAttachment::new(device.clone(), alloc, swapchain.extent(), depth_format, DepthUsage::Attachment)?;
        let framebuffers = create_framebuffers(&device, &render_pass, &depth, swapchain)?;
        let set_layout = DescriptorSetLayout::new(device.clone(), &set_layout_bindings())?;
        let pipeline_layout = PipelineLayout::new(device.clone(), &[&set_layout])?;
        let pipelines = ScenePipelines::load(device, &pipeline_layout, &render_pass, shader_dir)?;
        Ok(Self {
            pipelines,
            pipeline_layout,
            set_layout,
            framebuffers,
            depth,
            render_pass,
            color_format: swapchain.format().format,
            depth_format,
        })
    }

    /// Whether [`ScenePass::rebuild`] is enough for `swapchain`. If not, the render pass and pipelines must be
    /// created again with [`ScenePass::new`].
    pub fn compatible_with(&self, swapchain: &Swapchain) -> bool {
        render_pass_compatible(self.color_format, swapchain.format())
    }

    /// Recreate the depth attachment and framebuffers for a new swapchain.
    /// The device must be idle and the swapchain must be [compatible](ScenePass::compatible_with).
    pub fn rebuild(&mut self, device: &Device, alloc: &mut DefaultAllocator, swapchain: &Swapchain) -> Result<()> {
        // Framebuffers reference the old depth view, so they go first.
        self.framebuffers.clear();
        self.depth = FrameBufferAttachment::new(device.clone(), alloc, swapchain.extent(), self.depth_format, DepthUsage::Attachment)?;
        self.framebuffers = create_framebuffers(device, &self.render_pass, &self.depth, swapchain)?;
        Ok(())
    }

    /// Begin info for rendering into the swapchain image at `image_index`. Color is cleared to `clear_color`,
    /// depth to the far plane.
    /// # Errors
    /// Fails if there is no framebuffer for `image_index`.
    pub fn begin_info(&self, image_index: u32, clear_color: [f32; 4]) -> Result<RenderPassBegin> {
        let framebuffer = self
            .framebuffers
            .get(image_index as usize)
            .ok_or(Error::Uncategorized("no scene framebuffer for the acquired image"))?;
        Ok(RenderPassBegin {
            render_pass: unsafe { self.render_pass.handle() },
            framebuffer: unsafe { framebuffer.handle() },
            extent: framebuffer.extent(),
            clear_values: vec![
                ClearValue::Color(clear_color),
                ClearValue::DepthStencil {
                    depth: 1.0,
                    stencil: 0,
                },
            ],
        })
    }

    pub fn binding(&self, mode: SceneMode) -> PipelineBinding {
        PipelineBinding {
            pipeline: unsafe { self.pipelines.get(mode).handle() },
            layout: unsafe { self.pipeline_layout.handle() },
        }
    }

    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.depth.extent()
    }

    pub fn set_layout(&self) -> &DescriptorSetLayout {
        &self.set_layout
    }
}

/// A render pass created for `pass_format` only accepts framebuffers with the same color format. The color space
/// is not part of the render pass.
pub fn render_pass_compatible(pass_format: vk::Format, surface_format: vk::SurfaceFormatKHR) -> bool {
    pass_format == surface_format.format
}

fn create_framebuffers(
    device: &Device,
    render_pass: &RenderPass,
    depth: &FrameBufferAttachment,
    swapchain: &Swapchain,
) -> Result<Vec<Framebuffer>> {
    let images = swapchain.images();
    rebuild_per_image(images.len(), |index| {
        Framebuffer::new(device.clone(), render_pass, &[&images[index].view, depth.view()], swapchain.extent())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader(stage: vk::ShaderStageFlags) -> ShaderCreateInfo {
        ShaderCreateInfo::from_spirv(stage, vec![0x0723_0203])
    }

    #[test]
    fn color_is_presented_and_depth_stays_attached() {
        let description = description(vk::Format::B8G8R8A8_SRGB, vk::Format::D32_SFLOAT);
        assert_eq!(description.attachments[0].final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
        assert_eq!(
            description.attachments[1].final_layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        );
        assert_eq!(description.attachments[1].stencil_load_op, vk::AttachmentLoadOp::CLEAR);
        assert_eq!(description.dependencies.len(), 2);
        assert!(description
            .dependencies
            .iter()
            .all(|dependency| dependency.src_subpass == vk::SUBPASS_EXTERNAL && dependency.dst_subpass == 0));
    }

    #[test]
    fn shadow_map_is_only_visible_to_fragments() {
        let bindings = set_layout_bindings();
        assert_eq!(bindings[1].descriptor_type, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
        assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::FRAGMENT);
        assert!(bindings[0].stage_flags.contains(vk::ShaderStageFlags::VERTEX));
    }

    #[test]
    fn debug_pipeline_has_no_vertex_input() {
        let builder = debug_pipeline(shader(vk::ShaderStageFlags::VERTEX), shader(vk::ShaderStageFlags::FRAGMENT));
        assert!(builder.vertex_bindings().is_empty());
        assert_eq!(builder.rasterization().cull_mode, vk::CullModeFlags::NONE);
        assert_eq!(builder.color_attachment_count(), 1);
    }

    #[test]
    fn shaded_pipeline_culls_back_faces() {
        let builder =
            shaded_pipeline(shader(vk::ShaderStageFlags::VERTEX), shader(vk::ShaderStageFlags::FRAGMENT)).unwrap();
        assert_eq!(builder.rasterization().cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(builder.vertex_attributes().len(), 4);
        assert_eq!(builder.vertex_bindings()[0].stride, crate::Vertex::STRIDE);
        assert_eq!(
            builder.dynamic_state_list(),
            &[vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR]
        );
    }

    #[test]
    fn new_surface_format_invalidates_render_pass() {
        let srgb = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let hdr = vk::SurfaceFormatKHR {
            format: vk::Format::A2B10G10R10_UNORM_PACK32,
            color_space: vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        };
        let before = crate::wsi::swapchain::choose_surface_format(&[srgb, hdr], None).unwrap();
        // The window moved to a monitor that no longer offers the old format.
        let after = crate::wsi::swapchain::choose_surface_format(&[hdr], None).unwrap();
        assert!(render_pass_compatible(before.format, before));
        assert!(!render_pass_compatible(before.format, after));
    }

    #[test]
    fn color_space_alone_keeps_render_pass() {
        let linear = vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        };
        let extended = vk::SurfaceFormatKHR {
            color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_NONLINEAR_EXT,
            ..linear
        };
        assert!(render_pass_compatible(linear.format, extended));
    }

    #[test]
    fn debug_flag_selects_mode() {
        assert_eq!(SceneMode::from_debug_flag(true), SceneMode::ShadowMapDebug);
        assert_eq!(SceneMode::from_debug_flag(false), SceneMode::Shaded);
        assert_eq!(SceneMode::default(), SceneMode::Shaded);
    }
}
