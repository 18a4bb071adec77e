//! Wrappers around `VkDescriptorSetLayout` and `VkPipelineLayout` objects.

use anyhow::Result;
use ash::vk;

use crate::Device;

/// Owning wrapper around a [`VkDescriptorSetLayout`](vk::DescriptorSetLayout).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorSetLayout {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::DescriptorSetLayout,
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayout {
    pub fn new(device: Device, bindings: &[vk::DescriptorSetLayoutBinding]) -> Result<Self> {
        let info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(bindings).build();
        let handle = unsafe { device.create_descriptor_set_layout(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkDescriptorSetLayout {handle:p}");
        Ok(Self {
            device,
            handle,
            bindings: bindings.to_vec(),
        })
    }

    /// The bindings this layout was created with.
    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding] {
        self.bindings.as_slice()
    }

    /// Get unsafe access to the underlying `VkDescriptorSetLayout` handle.
    /// # Safety
    /// The caller must not destroy the layout.
    pub unsafe fn handle(&self) -> vk::DescriptorSetLayout {
        self.handle
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkDescriptorSetLayout {:p}", self.handle);
        unsafe {
            self.device.destroy_descriptor_set_layout(self.handle, None);
        }
    }
}

/// Owning wrapper around a [`VkPipelineLayout`](vk::PipelineLayout).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct PipelineLayout {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Create a pipeline layout from descriptor set layouts, in set order. No push constants are used.
    pub fn new(device: Device, set_layouts: &[&DescriptorSetLayout]) -> Result<Self> {
        let handles = set_layouts
            .iter()
            .map(|layout| unsafe { layout.handle() })
            .collect::<Vec<_>>();
        let info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&handles).build();
        let handle = unsafe { device.create_pipeline_layout(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkPipelineLayout {handle:p}");
        Ok(Self {
            device,
            handle,
        })
    }

    /// Get unsafe access to the underlying `VkPipelineLayout` handle.
    /// # Safety
    /// The caller must not destroy the layout.
    pub unsafe fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkPipelineLayout {:p}", self.handle);
        unsafe {
            self.device.destroy_pipeline_layout(self.handle, None);
        }
    }
}
