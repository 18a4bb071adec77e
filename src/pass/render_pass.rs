//! Wrappers around `VkRenderPass` and `VkFramebuffer` objects.
//!
//! Render passes are described by a [`RenderPassDescription`] first. The description is plain data, so the attachment
//! setup and the subpass dependencies of each pass can be inspected without creating anything on the GPU.

use anyhow::Result;
use ash::vk;

use crate::{Device, ImageView};

/// Attachments and dependencies of a render pass with a single graphics subpass.
#[derive(Debug, Clone, Default)]
pub struct RenderPassDescription {
    pub attachments: Vec<vk::AttachmentDescription>,
    /// Color attachment references of the subpass.
    pub color_attachments: Vec<vk::AttachmentReference>,
    pub depth_attachment: Option<vk::AttachmentReference>,
    pub dependencies: Vec<vk::SubpassDependency>,
}

impl RenderPassDescription {
    /// Add a color attachment that is cleared, stored and transitioned to `final_layout`.
    pub fn color(mut self, format: vk::Format, final_layout: vk::ImageLayout) -> Self {
        let index = self.attachments.len() as u32;
        self.attachments.push(
            vk::AttachmentDescription::builder()
                .format(format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(final_layout)
                .build(),
        );
        self.color_attachments.push(vk::AttachmentReference {
            attachment: index,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        });
        self
    }

    /// Set the depth attachment. Depth and stencil are both cleared. Depth is always stored.
    pub fn depth(mut self, format: vk::Format, final_layout: vk::ImageLayout) -> Self {
        let index = self.attachments.len() as u32;
        self.attachments.push(
            vk::AttachmentDescription::builder()
                .format(format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::CLEAR)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(final_layout)
                .build(),
        );
        self.depth_attachment = Some(vk::AttachmentReference {
            attachment: index,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        });
        self
    }

    pub fn dependency(mut self, dependency: vk::SubpassDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }
}

/// Owning wrapper around a [`VkRenderPass`](vk::RenderPass).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct RenderPass {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::RenderPass,
    attachment_count: usize,
}

impl RenderPass {
    pub fn new(device: Device, description: &RenderPassDescription) -> Result<Self> {
        let mut subpass = vk::SubpassDescription::builder()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&description.color_attachments);
        if let Some(depth) = description.depth_attachment.as_ref() {
            subpass = subpass.depth_stencil_attachment(depth);
        }
        let subpass = subpass.build();

        let info = vk::RenderPassCreateInfo::builder()
            .attachments(&description.attachments)
            .subpasses(std::slice::from_ref(&subpass))
            .dependencies(&description.dependencies)
            .build();
        let handle = unsafe { device.create_render_pass(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkRenderPass {handle:p}");
        Ok(Self {
            device,
            handle,
            attachment_count: description.attachments.len(),
        })
    }

    /// Number of attachments a framebuffer for this pass needs.
    pub fn attachment_count(&self) -> usize {
        self.attachment_count
    }

    /// Get unsafe access to the underlying `VkRenderPass` handle.
    /// # Safety
    /// The caller must not destroy the render pass.
    pub unsafe fn handle(&self) -> vk::RenderPass {
        self.handle
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkRenderPass {:p}", self.handle);
        unsafe {
            self.device.destroy_render_pass(self.handle, None);
        }
    }
}

/// Owning wrapper around a [`VkFramebuffer`](vk::Framebuffer). The attached views must outlive it.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Framebuffer {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Framebuffer,
    extent: vk::Extent2D,
}

impl Framebuffer {
    /// Create a framebuffer for `render_pass`. `attachments` are given in the attachment order of the pass.
    pub fn new(device: Device, render_pass: &RenderPass, attachments: &[&ImageView], extent: vk::Extent2D) -> Result<Self> {
        let views = attachments
            .iter()
            .map(|view| unsafe { view.handle() })
            .collect::<Vec<_>>();
        let info = vk::FramebufferCreateInfo::builder()
            .render_pass(unsafe { render_pass.handle() })
            .attachments(&views)
            .width(extent.width)
            .height(extent.height)
            .layers(1)
            .build();
        let handle = unsafe { device.create_framebuffer(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkFramebuffer {handle:p}");
        Ok(Self {
            device,
            handle,
            extent,
        })
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Get unsafe access to the underlying `VkFramebuffer` handle.
    /// # Safety
    /// The caller must not destroy the framebuffer.
    pub unsafe fn handle(&self) -> vk::Framebuffer {
        self.handle
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkFramebuffer {:p}", self.handle);
        unsafe {
            self.device.destroy_framebuffer(self.handle, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_indices_follow_insertion_order() {
        let description = RenderPassDescription::default()
            .color(vk::Format::B8G8R8A8_SRGB, vk::ImageLayout::PRESENT_SRC_KHR)
            .depth(vk::Format::D32_SFLOAT, vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);
        assert_eq!(description.attachments.len(), 2);
        assert_eq!(description.color_attachments[0].attachment, 0);
        assert_eq!(description.depth_attachment.map(|r| r.attachment), Some(1));
        assert_eq!(description.attachments[0].final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    }
}
