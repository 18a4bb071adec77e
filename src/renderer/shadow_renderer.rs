//! The render loop of the shadow mapping renderer.
//!
//! # Frame protocol
//! Every call to [`ShadowRenderer::draw_frame`] uses the next frame slot and
//! 1. waits for the fence of the slot, so the slot's command buffer and uniform buffers are free again,
//! 2. acquires a swapchain image, signaling the slot's `image_available` semaphore,
//! 3. resets the fence, only after a successful acquire so an out of date swapchain never leaves it unsignaled,
//! 4. writes the slot's uniforms and re-records its command buffer for the acquired image,
//! 5. submits, waiting on `image_available` at the color output stage and signaling `render_finished` and the fence,
//! 6. presents, waiting on `render_finished`.
//!
//! An out of date or suboptimal swapchain, or a resize notification, recreates the swapchain instead of failing.
//! The previous synchronization set is kept alive for [`FRAMES_IN_FLIGHT`] more frames, since a present queued
//! before the recreation may still wait on its `render_finished` semaphore.

use std::mem::size_of;

use anyhow::Result;
use ash::vk;

use crate::command_buffer::IncompleteCommandBuffer;
use crate::descriptor::descriptor_pool::DescriptorPoolSize;
use crate::wsi::frame::{DeferredRelease, FrameCounter};
use crate::wsi::swapchain::AcquireOutcome;
use crate::{
    record_frame, Buffer, Camera, CommandPool, DepthUsage, DescriptorPool, DescriptorSetWriter, Error, FrameCommands,
    FrameSync, Geometry, LightAnimation, MemoryType, Mesh, OffscreenPass, OffscreenUniforms, PresentResult,
    RendererSettings, SceneMode, ScenePass, SceneUniforms, Swapchain, VulkanContext, WindowSize, FRAMES_IN_FLIGHT,
};

/// What happened to a frame passed to [`ShadowRenderer::draw_frame`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The frame was rendered and presented.
    Presented,
    /// The frame was presented, or could not be rendered, and the swapchain was recreated.
    Recreated,
    /// Nothing was rendered because the window is minimized.
    Skipped,
}

impl FrameOutcome {
    /// Outcome of a frame that tried to recreate the swapchain. `recreated` is false if the window was minimized
    /// and recreation was postponed.
    fn after_recreation(presented: bool, recreated: bool) -> Self {
        match (presented, recreated) {
            (_, true) => FrameOutcome::Recreated,
            (true, false) => FrameOutcome::Presented,
            (false, false) => FrameOutcome::Skipped,
        }
    }
}

/// Uniform buffers and descriptor sets of one frame in flight.
#[derive(Debug)]
struct FrameResources {
    offscreen_uniforms: Buffer,
    scene_uniforms: Buffer,
    offscreen_set: vk::DescriptorSet,
    scene_set: vk::DescriptorSet,
    debug_set: vk::DescriptorSet,
}

impl FrameResources {
    fn scene_set(&self, mode: SceneMode) -> vk::DescriptorSet {
        match mode {
            SceneMode::Shaded => self.scene_set,
            SceneMode::ShadowMapDebug => self.debug_set,
        }
    }
}

/// Renders a mesh with shadows from an animated light.
///
/// Owns the [`VulkanContext`]. Dropping the renderer waits for the device to become idle before anything is destroyed.
#[derive(Debug)]
pub struct ShadowRenderer {
    frames: Vec<FrameResources>,
    sync: Vec<FrameSync>,
    retired_sync: DeferredRelease<Vec<FrameSync>>,
    command_buffers: Vec<vk::CommandBuffer>,
    command_pool: CommandPool,
    descriptor_pool: DescriptorPool,
    mesh: Mesh,
    scene_pass: ScenePass,
    offscreen_pass: OffscreenPass,
    swapchain: Swapchain,
    camera: Camera,
    light: LightAnimation,
    settings: RendererSettings,
    counter: FrameCounter,
    resized: bool,
    // Declared last, everything above must be destroyed first.
    ctx: VulkanContext,
}

impl ShadowRenderer {
    /// Create all passes and per-frame resources. `ctx` must have been initialized with a window.
    /// # Errors
    /// Fails if the context has no surface, if no suitable depth format exists, if a shader or the model
    /// cannot be loaded, or if any Vulkan object cannot be created.
    pub fn new(mut ctx: VulkanContext, window: &dyn WindowSize, settings: RendererSettings) -> Result<Self> {
        let device = ctx.device.clone();
        let surface = ctx
            .surface
            .as_ref()
            .ok_or(Error::Uncategorized("the shadow renderer needs a context with a surface"))?;
        let swapchain = Swapchain::new(
            &ctx.instance,
            device.clone(),
            surface,
            ctx.swapchain_preferences,
            window_extent(window, &settings),
            None,
        )?;

        let scene_depth = ctx.physical_device.depth_format(&ctx.instance, DepthUsage::Attachment)?;
        let shadow_depth = ctx
            .physical_device
            .depth_format(&ctx.instance, DepthUsage::SampledAttachment)?;
        let linear_filter = ctx.physical_device.supports_linear_filter(&ctx.instance, shadow_depth);

        let offscreen_pass = OffscreenPass::new(
            device.clone(),
            &mut ctx.allocator,
            shadow_depth,
            linear_filter,
            settings.shadow_map_size,
            settings.depth_bias,
            &settings.shader_dir,
        )?;
        let scene_pass = ScenePass::new(device.clone(), &mut ctx.allocator, &swapchain, scene_depth, &settings.shader_dir)?;

        let geometry = match &settings.model {
            Some(path) => Geometry::from_obj(path)?,
            None => Geometry::demo_scene(),
        };
        let mesh = Mesh::new(device.clone(), &mut ctx.allocator, &geometry)?;

        // One offscreen set and two scene sets (shaded and debug) per frame in flight.
        let mut pool_size = DescriptorPoolSize::for_layout(offscreen_pass.set_layout().bindings(), FRAMES_IN_FLIGHT as u32);
        let scene_size = DescriptorPoolSize::for_layout(scene_pass.set_layout().bindings(), 2 * FRAMES_IN_FLIGHT as u32);
        for (ty, count) in scene_size.0 {
            *pool_size.0.entry(ty).or_insert(0) += count;
        }
        let descriptor_pool = DescriptorPool::new(device.clone(), &pool_size, 3 * FRAMES_IN_FLIGHT as u32)?;
        let offscreen_sets = descriptor_pool.allocate(offscreen_pass.set_layout(), FRAMES_IN_FLIGHT)?;
        let scene_sets = descriptor_pool.allocate(scene_pass.set_layout(), 2 * FRAMES_IN_FLIGHT)?;

        let mut frames = Vec::with_capacity(FRAMES_IN_FLIGHT);
        for slot in 0..FRAMES_IN_FLIGHT {
            let offscreen_uniforms = Buffer::new(
                device.clone(),
                &mut ctx.allocator,
                size_of::<OffscreenUniforms>() as vk::DeviceSize,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                MemoryType::CpuToGpu,
            )?;
            let scene_uniforms = Buffer::new(
                device.clone(),
                &mut ctx.allocator,
                size_of::<SceneUniforms>() as vk::DeviceSize,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                MemoryType::CpuToGpu,
            )?;
            let frame = FrameResources {
                offscreen_set: offscreen_sets[slot],
                scene_set: scene_sets[2 * slot],
                debug_set: scene_sets[2 * slot + 1],
                offscreen_uniforms,
                scene_uniforms,
            };

            DescriptorSetWriter::new(frame.offscreen_set)
                .uniform_buffer(0, frame.offscreen_uniforms.view_full())
                .write(&device);
            for set in [frame.scene_set, frame.debug_set] {
                DescriptorSetWriter::new(set)
                    .uniform_buffer(0, frame.scene_uniforms.view_full())
                    .combined_image_sampler(
                        1,
                        offscreen_pass.shadow_map(),
                        offscreen_pass.sampler(),
                        vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
                    )
                    .write(&device);
            }
            frames.push(frame);
        }

        let command_pool = CommandPool::new(device.clone(), ctx.queue.info().family_index)?;
        let command_buffers = command_pool.allocate(FRAMES_IN_FLIGHT as u32)?;
        let sync = FrameSync::create_set(&device)?;

        let extent = swapchain.extent();
        let camera = Camera::new(extent.width, extent.height);
        let light = LightAnimation::new(settings.timer_speed, settings.initial_timer, settings.paused);
        info!(
            "Shadow renderer ready: {} frames in flight, scene mode {:?}",
            FRAMES_IN_FLIGHT, settings.scene_mode
        );

        Ok(Self {
            frames,
            sync,
            retired_sync: DeferredRelease::default(),
            command_buffers,
            command_pool,
            descriptor_pool,
            mesh,
            scene_pass,
            offscreen_pass,
            swapchain,
            camera,
            light,
            settings,
            counter: FrameCounter::default(),
            resized: false,
            ctx,
        })
    }

    /// Advance the camera and light animation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.camera.update(dt);
        self.light.advance(dt);
    }

    /// Render and present one frame.
    /// # Errors
    /// Any failure other than a stale swapchain is returned and should be treated as fatal.
    pub fn draw_frame(&mut self, window: &dyn WindowSize) -> Result<FrameOutcome> {
        if window.is_minimized() {
            return Ok(FrameOutcome::Skipped);
        }
        if self.resized && !self.recreate(window)? {
            return Ok(FrameOutcome::Skipped);
        }

        let slot = self.counter.slot();
        self.sync[slot].in_flight.wait()?;
        self.retired_sync.release(self.counter.frames());
        let (image_index, suboptimal) = match self.swapchain.acquire_next_image(&self.sync[slot].image_available)? {
            AcquireOutcome::Acquired {
                index,
                suboptimal,
            } => (index, suboptimal),
            AcquireOutcome::OutOfDate => {
                return Ok(FrameOutcome::after_recreation(false, self.recreate(window)?));
            }
        };
        self.sync[slot].in_flight.reset()?;

        self.write_uniforms(slot)?;
        let frame = self.frame_commands(slot, image_index)?;
        let cmd = IncompleteCommandBuffer::begin(
            self.ctx.device.clone(),
            self.command_buffers[slot],
            vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT,
        )?;
        let cmd = record_frame(cmd, &frame, &self.mesh)?.finish()?;

        let sync = &self.sync[slot];
        let wait_semaphores = [unsafe { sync.image_available.handle() }];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [unsafe { sync.render_finished.handle() }];
        let command_buffers = [unsafe { cmd.handle() }];
        let submit = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores)
            .build();
        self.ctx.queue.submit(std::slice::from_ref(&submit), Some(&sync.in_flight))?;

        let swapchains = [unsafe { self.swapchain.handle() }];
        let image_indices = [image_index];
        let present = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices)
            .build();
        let result = self.ctx.queue.present(self.swapchain.functions(), &present)?;
        self.counter.advance();

        if suboptimal || result != PresentResult::Presented || self.resized {
            return Ok(FrameOutcome::after_recreation(true, self.recreate(window)?));
        }
        Ok(FrameOutcome::Presented)
    }

    /// Request swapchain recreation before the next frame.
    pub fn notify_resized(&mut self) {
        self.resized = true;
    }

    /// Recreate the swapchain and everything that depends on it. Returns `false` if the window is minimized, in
    /// which case recreation is retried on the next frame.
    pub fn recreate(&mut self, window: &dyn WindowSize) -> Result<bool> {
        if window.is_minimized() {
            self.resized = true;
            return Ok(false);
        }
        self.ctx.device.wait_idle()?;

        let surface = self
            .ctx
            .surface
            .as_mut()
            .ok_or(Error::Uncategorized("the shadow renderer needs a context with a surface"))?;
        // Formats can change too, for example when the window moved to another monitor.
        surface.query_details(&self.ctx.physical_device)?;
        let swapchain = Swapchain::new(
            &self.ctx.instance,
            self.ctx.device.clone(),
            surface,
            self.ctx.swapchain_preferences,
            window_extent(window, &self.settings),
            Some(&self.swapchain),
        )?;
        self.swapchain = swapchain;

        if !self.scene_pass.compatible_with(&self.swapchain) {
            info!("Surface format changed to {:?}, recreating the scene pass", self.swapchain.format().format);
            let depth_format = self.ctx.physical_device.depth_format(&self.ctx.instance, DepthUsage::Attachment)?;
            self.scene_pass = ScenePass::new(
                self.ctx.device.clone(),
                &mut self.ctx.allocator,
                &self.swapchain,
                depth_format,
                &self.settings.shader_dir,
            )?;
        } else {
            self.scene_pass
                .rebuild(&self.ctx.device, &mut self.ctx.allocator, &self.swapchain)?;
        }

        self.command_pool.free(&self.command_buffers);
        self.command_buffers = self.command_pool.allocate(FRAMES_IN_FLIGHT as u32)?;
        let previous = std::mem::replace(&mut self.sync, FrameSync::create_set(&self.ctx.device)?);
        self.retired_sync.retire(self.counter.frames(), previous);

        let extent = self.swapchain.extent();
        self.camera.set_aspect(extent.width, extent.height);
        self.resized = false;
        info!(
            "Recreated swapchain at {}x{} with {} images ({:?})",
            extent.width,
            extent.height,
            self.swapchain.image_count(),
            self.swapchain.present_mode()
        );
        Ok(true)
    }

    fn write_uniforms(&self, slot: usize) -> Result<()> {
        let frame = &self.frames[slot];
        let light = self.settings.light;
        let light_pos = self.light.position();
        let light_space = light.light_space_matrix(light_pos);
        frame.offscreen_uniforms.view_full().write(&[OffscreenUniforms {
            depth_mvp: light_space,
        }])?;
        frame.scene_uniforms.view_full().write(&[SceneUniforms::new(
            &self.camera,
            light_pos,
            light_space,
            light.z_near,
            light.z_far,
        )])?;
        Ok(())
    }

    fn frame_commands(&self, slot: usize, image_index: u32) -> Result<FrameCommands> {
        let mode = self.settings.scene_mode;
        Ok(FrameCommands {
            offscreen: self.offscreen_pass.begin_info(),
            offscreen_binding: self.offscreen_pass.binding(),
            offscreen_set: self.frames[slot].offscreen_set,
            depth_bias: self.offscreen_pass.depth_bias(),
            scene: self.scene_pass.begin_info(image_index, self.settings.clear_color)?,
            scene_binding: self.scene_pass.binding(mode),
            scene_set: self.frames[slot].scene_set(mode),
            mode,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn light(&self) -> &LightAnimation {
        &self.light
    }

    pub fn toggle_pause(&mut self) {
        self.light.toggle_pause();
    }

    pub fn scene_mode(&self) -> SceneMode {
        self.settings.scene_mode
    }

    pub fn set_scene_mode(&mut self, mode: SceneMode) {
        self.settings.scene_mode = mode;
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn scene_pass(&self) -> &ScenePass {
        &self.scene_pass
    }

    /// Number of frames submitted so far.
    pub fn frame_count(&self) -> u64 {
        self.counter.frames()
    }
}

impl Drop for ShadowRenderer {
    fn drop(&mut self) {
        if let Err(err) = self.ctx.device.wait_idle() {
            error!("Failed to wait for the device before destroying the renderer: {err}");
        }
    }
}

/// Extent of the window, or the configured fallback if the window reports none.
fn window_extent(window: &dyn WindowSize, settings: &RendererSettings) -> vk::Extent2D {
    if window.is_minimized() {
        settings.extent
    } else {
        vk::Extent2D {
            width: window.width(),
            height: window.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postponed_recreation_without_a_frame_is_skipped() {
        assert_eq!(FrameOutcome::after_recreation(false, false), FrameOutcome::Skipped);
        assert_eq!(FrameOutcome::after_recreation(false, true), FrameOutcome::Recreated);
    }

    #[test]
    fn presented_frame_stays_presented_until_recreated() {
        assert_eq!(FrameOutcome::after_recreation(true, false), FrameOutcome::Presented);
        assert_eq!(FrameOutcome::after_recreation(true, true), FrameOutcome::Recreated);
    }
}
