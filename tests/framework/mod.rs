#![allow(dead_code)]

use anyhow::Result;
use ash::vk;
use ash::vk::Handle;

use umbra::{
    AppBuilder, ClearValue, DepthBias, Drawable, FrameCommands, Geometry, GraphicsCmdBuffer, PipelineBinding, RenderPassBegin,
    SceneMode, VulkanContext,
};

/// Creates a headless context ready for automated tests. Needs a Vulkan driver.
pub fn make_context() -> Result<VulkanContext> {
    let settings = AppBuilder::new()
        .name("umbra test framework")
        .version((0, 0, 1))
        .validation(false)
        .build();
    umbra::initialize(&settings)
}

/// Creates a context that presents to `window`. Needs a Vulkan driver and a display.
pub fn make_window_context(window: &dyn umbra::Window) -> Result<VulkanContext> {
    let settings = AppBuilder::new()
        .name("umbra test framework")
        .version((0, 0, 1))
        .validation(false)
        .window(window)
        .build();
    umbra::initialize(&settings)
}

/// Directory with the compiled SPIR-V shaders of this crate.
pub fn shader_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders")
}

/// Raw handles that stand in for real Vulkan objects when recording into a `CommandLog`.
pub mod handles {
    pub const OFFSCREEN_PIPELINE: u64 = 0x10;
    pub const OFFSCREEN_LAYOUT: u64 = 0x11;
    pub const OFFSCREEN_SET: u64 = 0x12;
    pub const SCENE_PIPELINE: u64 = 0x20;
    pub const SCENE_LAYOUT: u64 = 0x21;
    pub const SCENE_SET: u64 = 0x22;
    pub const DEBUG_PIPELINE: u64 = 0x30;
    pub const DEBUG_SET: u64 = 0x32;
}

/// Frame commands as the renderer would build them, with fake handles.
pub fn frame_commands(mode: SceneMode) -> FrameCommands {
    let (pipeline, set) = match mode {
        SceneMode::Shaded => (handles::SCENE_PIPELINE, handles::SCENE_SET),
        SceneMode::ShadowMapDebug => (handles::DEBUG_PIPELINE, handles::DEBUG_SET),
    };
    FrameCommands {
        offscreen: RenderPassBegin {
            render_pass: vk::RenderPass::from_raw(1),
            framebuffer: vk::Framebuffer::from_raw(1),
            extent: vk::Extent2D {
                width: 1024,
                height: 1024,
            },
            clear_values: vec![ClearValue::DepthStencil {
                depth: 1.0,
                stencil: 0,
            }],
        },
        offscreen_binding: PipelineBinding {
            pipeline: vk::Pipeline::from_raw(handles::OFFSCREEN_PIPELINE),
            layout: vk::PipelineLayout::from_raw(handles::OFFSCREEN_LAYOUT),
        },
        offscreen_set: vk::DescriptorSet::from_raw(handles::OFFSCREEN_SET),
        depth_bias: DepthBias::default(),
        scene: RenderPassBegin {
            render_pass: vk::RenderPass::from_raw(2),
            framebuffer: vk::Framebuffer::from_raw(2),
            extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
            clear_values: vec![
                ClearValue::Color([0.01, 0.01, 0.21, 1.0]),
                ClearValue::DepthStencil {
                    depth: 1.0,
                    stencil: 0,
                },
            ],
        },
        scene_binding: PipelineBinding {
            pipeline: vk::Pipeline::from_raw(pipeline),
            layout: vk::PipelineLayout::from_raw(handles::SCENE_LAYOUT),
        },
        scene_set: vk::DescriptorSet::from_raw(set),
        mode,
    }
}

/// Host side geometry that records one indexed draw covering all of its indices.
pub struct TestMesh {
    pub geometry: Geometry,
}

impl TestMesh {
    pub fn triangle() -> Self {
        Self {
            geometry: Geometry::triangle(),
        }
    }
}

impl Drawable for TestMesh {
    fn draw<C: GraphicsCmdBuffer>(&self, cmd: C) -> Result<C> {
        cmd.draw_indexed(self.geometry.indices.len() as u32, 1, 0, 0, 0)
    }
}
