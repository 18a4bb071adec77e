//! Traits that an allocator backend must implement to be usable with buffers and images.

use std::ffi::c_void;
use std::ptr::NonNull;

use anyhow::Result;
use ash::vk;

use crate::allocator::memory_type::MemoryType;

/// An allocator hands out suballocations of device memory. Implementations are cheap to clone and shareable across threads.
pub trait Allocator: Clone + Send + Sync {
    /// Allocation type returned by [`Allocator::allocate`].
    type Allocation: Allocation;

    /// Allocate memory satisfying `requirements` in the given memory type. `name` is only used for debugging.
    fn allocate(&mut self, name: &'static str, requirements: &vk::MemoryRequirements, ty: MemoryType) -> Result<Self::Allocation>;
    /// Free an allocation. Dropping the allocation has the same effect.
    fn free(&mut self, allocation: Self::Allocation) -> Result<()>;
}

/// A single suballocation of device memory.
pub trait Allocation: Default {
    /// Get the memory block this allocation lives in. Always use together with [`Allocation::offset`].
    /// # Safety
    /// The memory must not be freed, and only the range owned by this allocation may be accessed.
    unsafe fn memory(&self) -> vk::DeviceMemory;
    /// Offset of this allocation into its memory block.
    fn offset(&self) -> vk::DeviceSize;
    /// Pointer to the start of this allocation, if the memory is host visible.
    fn mapped_ptr(&self) -> Option<NonNull<c_void>>;
}
