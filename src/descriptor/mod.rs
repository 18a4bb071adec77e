//! Descriptor pools and descriptor set writes.
//!
//! The renderer allocates all of its descriptor sets once from a single [`DescriptorPool`](descriptor_pool::DescriptorPool)
//! and fills them with a [`DescriptorSetWriter`](writer::DescriptorSetWriter).
//!
//! # Example
//! ```
//! # use umbra::*;
//! # use anyhow::Result;
//! # fn bind(device: &Device, set: vk::DescriptorSet, uniforms: BufferView, shadow_map: &ImageView, sampler: &Sampler) {
//! DescriptorSetWriter::new(set)
//!     // layout(binding = 0) uniform UBO { ... };
//!     .uniform_buffer(0, uniforms)
//!     // layout(binding = 1) uniform sampler2D shadowMap;
//!     .combined_image_sampler(1, shadow_map, sampler, vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL)
//!     .write(device);
//! # }
//! ```

pub mod descriptor_pool;
pub mod writer;
