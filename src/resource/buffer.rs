//! Wrappers for `VkBuffer` objects.
//!
//! [`Buffer`] owns the Vulkan buffer and its memory. [`BufferView`] refers to a range inside a buffer and can be freely
//! copied around as long as the owning [`Buffer`] lives.
//!
//! All buffers the renderer creates live in [`MemoryType::CpuToGpu`] memory and stay persistently mapped, so uniform
//! and geometry data is written directly through [`BufferView::write`].
//!
//! # Example
//! ```
//! # use umbra::*;
//! # use anyhow::Result;
//! fn upload_color(device: Device, alloc: &mut DefaultAllocator) -> Result<Buffer> {
//!     let buffer = Buffer::new(device, alloc, 16u64, vk::BufferUsageFlags::UNIFORM_BUFFER, MemoryType::CpuToGpu)?;
//!     buffer.view_full().write(&[1.0f32, 0.0, 1.0, 1.0])?;
//!     Ok(buffer)
//! }
//! ```

use std::ffi::c_void;
use std::ptr::NonNull;

use anyhow::Result;
use ash::vk;
use bytemuck::Pod;

use crate::{Allocation, Allocator, DefaultAllocator, Device, Error, MemoryType};

/// Wrapper around a [`VkBuffer`](vk::Buffer).
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Buffer<A: Allocator = DefaultAllocator> {
    #[derivative(Debug = "ignore")]
    device: Device,
    #[derivative(Debug = "ignore")]
    #[allow(dead_code)]
    memory: A::Allocation,
    pointer: Option<NonNull<c_void>>,
    handle: vk::Buffer,
    size: vk::DeviceSize,
}

// SAFETY: The mapped pointer points into device memory, which is not dropped by moving the buffer to another thread.
unsafe impl<A: Allocator> Send for Buffer<A> {}

/// View into a range of a [`Buffer`]. Does not own the Vulkan buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferView {
    handle: vk::Buffer,
    pointer: Option<NonNull<c_void>>,
    offset: vk::DeviceSize,
    size: vk::DeviceSize,
}

// SAFETY: See `Buffer`.
unsafe impl Send for BufferView {}

impl<A: Allocator> Buffer<A> {
    /// Allocate a new buffer of `size` bytes. Host visible memory types are mapped for the lifetime of the buffer.
    pub fn new(
        device: Device,
        allocator: &mut A,
        size: impl Into<vk::DeviceSize>,
        usage: vk::BufferUsageFlags,
        location: MemoryType,
    ) -> Result<Self> {
        let size = size.into();
        let info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .build();
        let handle = unsafe { device.create_buffer(&info, None)? };
        #[cfg(feature = "log-objects")]
        trace!("Created new VkBuffer {handle:p} (size = {size} bytes)");

        let requirements = unsafe { device.get_buffer_memory_requirements(handle) };
        let memory = match allocator.allocate("buffer", &requirements, location) {
            Ok(memory) => memory,
            Err(err) => {
                unsafe { device.destroy_buffer(handle, None) };
                return Err(err);
            }
        };

        unsafe { device.bind_buffer_memory(handle, memory.memory(), memory.offset())? };

        Ok(Self {
            device,
            pointer: memory.mapped_ptr(),
            memory,
            handle,
            size,
        })
    }

    /// Allocate a host visible buffer that is exactly large enough for `data`, and fill it.
    /// # Errors
    /// Fails with [`Error::EmptyGeometry`] if `data` is empty, since zero-sized buffers are invalid.
    pub fn with_data<T: Pod>(device: Device, allocator: &mut A, data: &[T], usage: vk::BufferUsageFlags) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.is_empty() {
            return Err(anyhow::Error::from(Error::EmptyGeometry));
        }
        let buffer = Self::new(device, allocator, bytes.len() as vk::DeviceSize, usage, MemoryType::CpuToGpu)?;
        buffer.view_full().write(data)?;
        Ok(buffer)
    }

    /// Get a view into a subrange of this buffer.
    /// # Errors
    /// Fails with [`Error::BufferViewOutOfRange`] if the range does not fit inside the buffer.
    pub fn view(&self, offset: impl Into<vk::DeviceSize>, size: impl Into<vk::DeviceSize>) -> Result<BufferView> {
        let offset = offset.into();
        let size = size.into();
        check_range(offset, size, self.size)?;
        Ok(BufferView {
            handle: self.handle,
            pointer: self
                .pointer
                .and_then(|p| NonNull::new(unsafe { p.as_ptr().cast::<u8>().add(offset as usize) }.cast::<c_void>())),
            offset,
            size,
        })
    }

    /// Get a view of the entire buffer.
    pub fn view_full(&self) -> BufferView {
        BufferView {
            handle: self.handle,
            pointer: self.pointer,
            offset: 0,
            size: self.size,
        }
    }

    /// True if this buffer has a host mapping.
    pub fn is_mapped(&self) -> bool {
        self.pointer.is_some()
    }

    /// Get unsafe access to the underlying `VkBuffer` handle.
    /// # Safety
    /// The caller must not destroy the buffer, and must not use the handle after `self` is dropped.
    pub unsafe fn handle(&self) -> vk::Buffer {
        self.handle
    }

    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl<A: Allocator> Drop for Buffer<A> {
    fn drop(&mut self) {
        #[cfg(feature = "log-objects")]
        trace!("Destroying VkBuffer {:p}", self.handle);
        unsafe {
            self.device.destroy_buffer(self.handle, None);
        }
    }
}

/// Validate that `size` bytes starting at `offset` lie inside a buffer of `total` bytes.
fn check_range(offset: vk::DeviceSize, size: vk::DeviceSize, total: vk::DeviceSize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= total => Ok(()),
        _ => Err(anyhow::Error::from(Error::BufferViewOutOfRange)),
    }
}

impl BufferView {
    /// Interpret the mapped range as a mutable slice of `T`. Trailing bytes that do not fit a whole `T` are left out.
    /// # Errors
    /// * Fails with [`Error::UnmappableBuffer`] if the buffer is not host visible.
    /// * Fails with [`Error::UnalignedBufferView`] if the view starts at an address that is misaligned for `T`.
    pub fn mapped_slice<T: Pod>(&mut self) -> Result<&mut [T]> {
        let Some(pointer) = self.pointer else {
            return Err(anyhow::Error::from(Error::UnmappableBuffer));
        };
        let element = std::mem::size_of::<T>();
        let len = if element == 0 {
            0
        } else {
            self.size as usize / element * element
        };
        let bytes = unsafe { std::slice::from_raw_parts_mut(pointer.cast::<u8>().as_ptr(), len) };
        bytemuck::try_cast_slice_mut(bytes)
            .map_err(|_| anyhow::Error::from(Error::UnalignedBufferView(std::mem::align_of::<T>())))
    }

    /// Copy `data` into the start of this view.
    /// # Errors
    /// * Fails with [`Error::UnmappableBuffer`] if the buffer is not host visible.
    /// * Fails with [`Error::BufferViewOutOfRange`] if `data` is larger than the view.
    pub fn write<T: Pod>(&self, data: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let Some(pointer) = self.pointer else {
            return Err(anyhow::Error::from(Error::UnmappableBuffer));
        };
        if bytes.len() as vk::DeviceSize > self.size {
            return Err(anyhow::Error::from(Error::BufferViewOutOfRange));
        }
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), pointer.cast::<u8>().as_ptr(), bytes.len());
        }
        Ok(())
    }

    /// Get unsafe access to the underlying `VkBuffer` handle.
    /// # Safety
    /// The owning [`Buffer`] must still be alive.
    pub unsafe fn handle(&self) -> vk::Buffer {
        self.handle
    }

    pub fn offset(&self) -> vk::DeviceSize {
        self.offset
    }

    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Descriptor info for binding this range as a uniform buffer.
    pub fn descriptor_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo {
            buffer: self.handle,
            offset: self.offset,
            range: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_must_fit_inside_buffer() {
        assert!(check_range(0, 64, 64).is_ok());
        assert!(check_range(16, 48, 64).is_ok());
        assert!(check_range(64, 0, 64).is_ok());
        assert!(check_range(16, 49, 64).is_err());
        assert!(check_range(65, 0, 64).is_err());
    }

    #[test]
    fn overflowing_range_is_rejected() {
        let err = check_range(8, u64::MAX, 64).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::BufferViewOutOfRange)));
        assert!(check_range(u64::MAX, 1, 64).is_err());
    }

    fn host_view(memory: &mut [u32; 4], byte_offset: usize, size: vk::DeviceSize) -> BufferView {
        let base = memory.as_mut_ptr().cast::<u8>();
        BufferView {
            handle: vk::Buffer::null(),
            pointer: NonNull::new(unsafe { base.add(byte_offset) }.cast::<c_void>()),
            offset: byte_offset as vk::DeviceSize,
            size,
        }
    }

    #[test]
    fn unaligned_view_cannot_be_mapped_as_words() {
        let mut memory = [0u32; 4];
        let mut view = host_view(&mut memory, 1, 8);
        let err = view.mapped_slice::<u32>().unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnalignedBufferView(4))));
        assert_eq!(view.mapped_slice::<u8>().unwrap().len(), 8);
    }

    #[test]
    fn mapped_slice_drops_partial_elements() {
        let mut memory = [0u32; 4];
        let mut view = host_view(&mut memory, 0, 10);
        let words = view.mapped_slice::<u32>().unwrap();
        assert_eq!(words.len(), 2);
        words[1] = 7;
        assert_eq!(memory[1], 7);
    }

    #[test]
    fn unmapped_view_is_an_error() {
        let mut view = BufferView {
            handle: vk::Buffer::null(),
            pointer: None,
            offset: 0,
            size: 16,
        };
        let err = view.mapped_slice::<u32>().unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnmappableBuffer)));
    }
}
