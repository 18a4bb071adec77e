pub use ash::vk;

pub use crate::core::app_info::*;
pub use crate::core::debug::DebugMessenger;
pub use crate::core::device::Device;
pub use crate::core::error::Error;
pub use crate::core::init::{initialize, VulkanContext};
pub use crate::core::instance::Instance;
pub use crate::core::physical_device::PhysicalDevice;
pub use crate::core::queue::{PresentResult, Queue, QueueInfo};

pub use crate::util::byte_size::ByteSize;

pub use crate::allocator::default_allocator;
pub use crate::allocator::default_allocator::DefaultAllocator;
pub use crate::allocator::memory_type::MemoryType;
pub use crate::allocator::traits::*;

pub use crate::resource::attachment::{DepthUsage, FrameBufferAttachment};
pub use crate::resource::buffer::{Buffer, BufferView};
pub use crate::resource::image::{Image, ImageCreateInfo, ImageView};
pub use crate::sampler::Sampler;

pub use crate::sync::fence::Fence;
pub use crate::sync::semaphore::Semaphore;

pub use crate::wsi::frame::{DeferredRelease, FrameCounter, FrameSync, FRAMES_IN_FLIGHT};
pub use crate::wsi::surface::Surface;
pub use crate::wsi::swapchain::{AcquireOutcome, Swapchain, SwapchainImage, SwapchainPreferences};
pub use crate::wsi::window::{Window, WindowSize};

pub use crate::pipeline::builder::PipelineBuilder;
pub use crate::pipeline::layout::{DescriptorSetLayout, PipelineLayout};
pub use crate::pipeline::shader::{Shader, ShaderCreateInfo};
pub use crate::pipeline::Pipeline;

pub use crate::descriptor::descriptor_pool::{DescriptorPool, DescriptorPoolSize};
pub use crate::descriptor::writer::DescriptorSetWriter;

pub use crate::command_buffer::command_log::CommandLog;
pub use crate::command_buffer::command_pool::CommandPool;
pub use crate::command_buffer::traits::*;
pub use crate::command_buffer::{CommandBuffer, IncompleteCommandBuffer};

pub use crate::pass::offscreen::{DepthBias, OffscreenPass};
pub use crate::pass::render_pass::{Framebuffer, RenderPass, RenderPassDescription};
pub use crate::pass::scene::{SceneMode, ScenePass};
pub use crate::pass::PipelineBinding;

pub use crate::scene::camera::{Camera, Movement};
pub use crate::scene::light::{advance_timer, light_position, LightAnimation, LightFrustum};
pub use crate::scene::mesh::{Drawable, Geometry, Mesh, Vertex};
pub use crate::scene::uniforms::{OffscreenUniforms, SceneUniforms};

pub use crate::renderer::per_image::rebuild_per_image;
pub use crate::renderer::recorder::{record_frame, FrameCommands};
pub use crate::renderer::settings::{RendererBuilder, RendererSettings};
pub use crate::renderer::shadow_renderer::{FrameOutcome, ShadowRenderer};
