use std::mem::size_of;

use ash::vk;

/// Size in bytes of one element of a format, as used in vertex attribute layouts.
pub trait ByteSize {
    /// Returns `None` for formats that are not used as vertex attributes.
    fn byte_size(&self) -> Option<usize>;
}

impl ByteSize for vk::Format {
    fn byte_size(&self) -> Option<usize> {
        match *self {
            vk::Format::R32_SFLOAT => Some(size_of::<f32>()),
            vk::Format::R32G32_SFLOAT => Some(2 * size_of::<f32>()),
            vk::Format::R32G32B32_SFLOAT => Some(3 * size_of::<f32>()),
            vk::Format::R32G32B32A32_SFLOAT => Some(4 * size_of::<f32>()),
            vk::Format::R8G8B8A8_UNORM => Some(4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_vectors() {
        assert_eq!(vk::Format::R32G32_SFLOAT.byte_size(), Some(8));
        assert_eq!(vk::Format::R32G32B32_SFLOAT.byte_size(), Some(12));
    }

    #[test]
    fn depth_formats_are_not_vertex_formats() {
        assert_eq!(vk::Format::D32_SFLOAT.byte_size(), None);
    }
}
