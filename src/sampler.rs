//! Wrapper around a [`VkSampler`](vk::Sampler).

use anyhow::Result;
use ash::vk;

use crate::Device;

/// Owning wrapper around a [`VkSampler`](vk::Sampler).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Sampler {
    #[derivative(Debug = "ignore")]
    device: Device,
    handle: vk::Sampler,
}

impl Sampler {
    /// Create the sampler used to read the shadow map. Coordinates outside the map clamp to the edge, and the
    /// border is opaque white so that areas outside the light frustum read as unshadowed.
    ///
    /// Depth comparison is done in the fragment shader, so the sampler itself does not compare.
    /// Pass `linear = false` if the shadow map format does not support linear filtering.
    pub fn shadow_map(device: Device, linear: bool) -> Result<Self> {
        let filter = if linear { vk::Filter::LINEAR } else { vk::Filter::NEAREST };
        let info = vk::SamplerCreateInfo::builder()
            .mag_filter(filter)
            .min_filter(filter)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_v(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
            .mip_lod_bias(0.0)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .compare_enable(false)
            .compare_op(vk::CompareOp::NEVER)
            .min_lod(0.0)
            .max_lod(1.0)
            .border_color(vk::BorderColor::FLOAT_OPAQUE_WHITE)
            .unnormalized_coordinates(false)
            .build();
        Self::new(device, &info)
    }

    /// Create a sampler from a raw create info.
    pub fn new(device: Device, info: &vk::SamplerCreateInfo) -> Result<Self> {
        let handle = unsafe { device.create_sampler(info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkSampler {handle:p}");
        Ok(Self {
            device,
            handle,
        })
    }

    /// Get unsafe access to the underlying `VkSampler` handle.
    /// # Safety
    /// The caller must not destroy the sampler.
    pub unsafe fn handle(&self) -> vk::Sampler {
        self.handle
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkSampler {:p}", self.handle);
        unsafe {
            self.device.destroy_sampler(self.handle, None);
        }
    }
}
