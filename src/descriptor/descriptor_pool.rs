//! Wrapper around a fixed size `VkDescriptorPool`.

use std::collections::HashMap;

use anyhow::Result;
use ash::vk;

use crate::{DescriptorSetLayout, Device};

/// Number of descriptors of each type a pool can hand out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorPoolSize(pub HashMap<vk::DescriptorType, u32>);

impl DescriptorPoolSize {
    /// Size a pool for `sets` copies of a set with the given bindings.
    pub fn for_layout(bindings: &[vk::DescriptorSetLayoutBinding], sets: u32) -> Self {
        let mut sizes = HashMap::new();
        for binding in bindings {
            *sizes.entry(binding.descriptor_type).or_insert(0) += binding.descriptor_count * sets;
        }
        Self(sizes)
    }
}

/// Owning wrapper around a [`VkDescriptorPool`](vk::DescriptorPool). Sets allocated from it are freed together with the pool.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct DescriptorPool {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::DescriptorPool,
    max_sets: u32,
}

impl DescriptorPool {
    pub fn new(device: Device, size: &DescriptorPoolSize, max_sets: u32) -> Result<Self> {
        let pool_sizes = size
            .0
            .iter()
            .map(|(descriptor_type, count)| vk::DescriptorPoolSize {
                ty: *descriptor_type,
                descriptor_count: *count,
            })
            .collect::<Vec<_>>();
        let info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(max_sets)
            .pool_sizes(&pool_sizes)
            .build();
        let handle = unsafe { device.create_descriptor_pool(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkDescriptorPool {handle:p}");
        Ok(Self {
            device,
            handle,
            max_sets,
        })
    }

    /// Allocate `count` descriptor sets with the same layout.
    pub fn allocate(&self, layout: &DescriptorSetLayout, count: usize) -> Result<Vec<vk::DescriptorSet>> {
        let layouts = vec![unsafe { layout.handle() }; count];
        let info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.handle)
            .set_layouts(&layouts)
            .build();
        Ok(unsafe { self.device.allocate_descriptor_sets(&info)? })
    }

    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }

    /// Get unsafe access to the underlying `VkDescriptorPool` handle.
    /// # Safety
    /// The caller must not destroy the pool.
    pub unsafe fn handle(&self) -> vk::DescriptorPool {
        self.handle
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkDescriptorPool {:p}", self.handle);
        unsafe {
            self.device.destroy_descriptor_pool(self.handle, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_scales_with_set_count() {
        let bindings = [
            vk::DescriptorSetLayoutBinding::builder()
                .binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(1)
                .build(),
            vk::DescriptorSetLayoutBinding::builder()
                .binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(1)
                .build(),
        ];
        let size = DescriptorPoolSize::for_layout(&bindings, 6);
        assert_eq!(size.0.get(&vk::DescriptorType::UNIFORM_BUFFER), Some(&6));
        assert_eq!(size.0.get(&vk::DescriptorType::COMBINED_IMAGE_SAMPLER), Some(&6));
        assert_eq!(size.0.len(), 2);
    }
}
