//! Allocator backed by the [`gpu_allocator`] crate.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use ash::vk;
use gpu_allocator::vulkan as vk_alloc;
use gpu_allocator::vulkan::AllocationScheme;

use crate::allocator::memory_type::MemoryType;
use crate::allocator::traits;
use crate::{Allocator, Device, Error, Instance, PhysicalDevice};

#[derive(Derivative)]
#[derivative(Debug)]
struct AllocatorInner {
    #[derivative(Debug = "ignore")]
    alloc: Mutex<vk_alloc::Allocator>,
    // Keeps the device alive until the last allocation is returned.
    #[derivative(Debug = "ignore")]
    _device: Device,
}

/// The default allocator. Internal state lives behind an `Arc<Mutex<_>>`, so this is cheap to clone
/// and can be handed to every resource that allocates.
///
/// # Example
/// ```
/// # use umbra::*;
/// # use anyhow::Result;
/// fn uniform_memory(allocator: &mut DefaultAllocator, requirements: &vk::MemoryRequirements) -> Result<default_allocator::Allocation> {
///     allocator.allocate("uniforms", requirements, MemoryType::CpuToGpu)
/// }
/// ```
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct DefaultAllocator {
    inner: Arc<AllocatorInner>,
}

/// Allocation returned from the [`DefaultAllocator`]. Freed automatically on drop.
#[derive(Derivative)]
#[derivative(Default, Debug)]
pub struct Allocation {
    // Both are `Some` until the allocation is freed.
    allocator: Option<DefaultAllocator>,
    allocation: Option<vk_alloc::Allocation>,
}

impl DefaultAllocator {
    /// Create a new default allocator.
    pub fn new(instance: &Instance, device: &Device, physical_device: &PhysicalDevice) -> Result<Self> {
        let alloc = vk_alloc::Allocator::new(&vk_alloc::AllocatorCreateDesc {
            instance: (*instance).clone(),
            device: unsafe { device.handle() },
            physical_device: unsafe { physical_device.handle() },
            debug_settings: Default::default(),
            buffer_device_address: false,
        })?;
        Ok(Self {
            inner: Arc::new(AllocatorInner {
                alloc: Mutex::new(alloc),
                _device: device.clone(),
            }),
        })
    }

    fn free_impl(&mut self, allocation: &mut Allocation) -> Result<()> {
        if let Some(memory) = allocation.allocation.take() {
            let mut alloc = self.inner.alloc.lock().map_err(|_| Error::PoisonError)?;
            alloc.free(memory)?;
        }
        Ok(())
    }
}

impl Allocator for DefaultAllocator {
    type Allocation = Allocation;

    fn allocate(&mut self, name: &'static str, requirements: &vk::MemoryRequirements, ty: MemoryType) -> Result<Self::Allocation> {
        let mut alloc = self.inner.alloc.lock().map_err(|_| Error::PoisonError)?;
        let allocation = alloc.allocate(&vk_alloc::AllocationCreateDesc {
            name,
            requirements: *requirements,
            location: gpu_allocator::MemoryLocation::from(ty),
            linear: false,
            allocation_scheme: AllocationScheme::GpuAllocatorManaged,
        })?;

        Ok(Allocation {
            allocator: Some(self.clone()),
            allocation: Some(allocation),
        })
    }

    fn free(&mut self, mut allocation: Self::Allocation) -> Result<()> {
        self.free_impl(&mut allocation)
    }
}

impl traits::Allocation for Allocation {
    /// # Safety
    /// The memory must not be freed, and only the range owned by this allocation may be accessed.
    unsafe fn memory(&self) -> vk::DeviceMemory {
        match self.allocation.as_ref() {
            Some(allocation) => allocation.memory(),
            None => vk::DeviceMemory::null(),
        }
    }

    fn offset(&self) -> vk::DeviceSize {
        self.allocation.as_ref().map(|allocation| allocation.offset()).unwrap_or_default()
    }

    fn mapped_ptr(&self) -> Option<NonNull<c_void>> {
        self.allocation.as_ref().and_then(|allocation| allocation.mapped_ptr())
    }
}

impl Drop for Allocation {
    fn drop(&mut self) {
        let Some(mut allocator) = self.allocator.take() else {
            return;
        };
        if let Err(err) = allocator.free_impl(self) {
            error!("Failed to free allocation: {err}");
        }
    }
}
