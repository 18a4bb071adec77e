//! Memory types that determine where allocations live.

/// Where an allocation should live. The renderer keeps attachments in [`MemoryType::GpuOnly`]
/// and writes uniform and geometry data through persistently mapped [`MemoryType::CpuToGpu`] memory.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MemoryType {
    /// Device local memory that the host cannot access.
    GpuOnly,
    /// Host visible memory used for uploads and uniform buffers.
    CpuToGpu,
    /// Host visible memory used for readback.
    GpuToCpu,
}

impl MemoryType {
    /// Whether allocations of this type can be mapped on the host.
    pub fn is_host_visible(self) -> bool {
        !matches!(self, MemoryType::GpuOnly)
    }
}

impl From<MemoryType> for gpu_allocator::MemoryLocation {
    fn from(value: MemoryType) -> Self {
        match value {
            MemoryType::GpuOnly => gpu_allocator::MemoryLocation::GpuOnly,
            MemoryType::CpuToGpu => gpu_allocator::MemoryLocation::CpuToGpu,
            MemoryType::GpuToCpu => gpu_allocator::MemoryLocation::GpuToCpu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gpu_only_memory_is_hidden_from_host() {
        assert!(!MemoryType::GpuOnly.is_host_visible());
        assert!(MemoryType::CpuToGpu.is_host_visible());
        assert!(MemoryType::GpuToCpu.is_host_visible());
    }

    #[test]
    fn maps_to_gpu_allocator_locations() {
        assert_eq!(gpu_allocator::MemoryLocation::from(MemoryType::GpuOnly), gpu_allocator::MemoryLocation::GpuOnly);
        assert_eq!(gpu_allocator::MemoryLocation::from(MemoryType::CpuToGpu), gpu_allocator::MemoryLocation::CpuToGpu);
    }
}
