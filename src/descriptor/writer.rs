//! Collects descriptor writes for a single descriptor set.

use ash::vk;

use crate::{BufferView, Device, ImageView, Sampler};

#[derive(Debug, Copy, Clone)]
enum Contents {
    Buffer(vk::DescriptorBufferInfo),
    Image(vk::DescriptorImageInfo),
}

/// A pending write of one descriptor.
#[derive(Debug, Copy, Clone)]
pub struct DescriptorWrite {
    pub binding: u32,
    pub ty: vk::DescriptorType,
    contents: Contents,
}

/// Builder for the writes to a descriptor set. Nothing is written until [`DescriptorSetWriter::write`] is called.
#[derive(Debug, Clone)]
pub struct DescriptorSetWriter {
    set: vk::DescriptorSet,
    writes: Vec<DescriptorWrite>,
}

impl DescriptorSetWriter {
    pub fn new(set: vk::DescriptorSet) -> Self {
        Self {
            set,
            writes: vec![],
        }
    }

    /// Bind a range of a buffer as a uniform buffer.
    pub fn uniform_buffer(mut self, binding: u32, buffer: BufferView) -> Self {
        self.writes.push(DescriptorWrite {
            binding,
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            contents: Contents::Buffer(buffer.descriptor_info()),
        });
        self
    }

    /// Bind an image view and sampler pair. `layout` is the layout the image is in when the set is used.
    pub fn combined_image_sampler(mut self, binding: u32, view: &ImageView, sampler: &Sampler, layout: vk::ImageLayout) -> Self {
        self.writes.push(DescriptorWrite {
            binding,
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            contents: Contents::Image(vk::DescriptorImageInfo {
                sampler: unsafe { sampler.handle() },
                image_view: unsafe { view.handle() },
                image_layout: layout,
            }),
        });
        self
    }

    pub fn writes(&self) -> &[DescriptorWrite] {
        self.writes.as_slice()
    }

    /// Perform all collected writes.
    pub fn write(self, device: &Device) {
        let vk_writes = self
            .writes
            .iter()
            .map(|write| {
                let builder = vk::WriteDescriptorSet::builder()
                    .dst_set(self.set)
                    .dst_binding(write.binding)
                    .dst_array_element(0)
                    .descriptor_type(write.ty);
                match &write.contents {
                    Contents::Buffer(info) => builder.buffer_info(std::slice::from_ref(info)).build(),
                    Contents::Image(info) => builder.image_info(std::slice::from_ref(info)).build(),
                }
            })
            .collect::<Vec<_>>();
        unsafe { device.update_descriptor_sets(&vk_writes, &[]) };
    }
}
