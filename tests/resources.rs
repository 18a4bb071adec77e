use anyhow::Result;
use ash::vk;
use ash::vk::Handle;

use umbra::{Allocation, Allocator, Buffer, Geometry, MemoryType, Mesh, OffscreenUniforms, SceneUniforms};

mod framework;

#[test]
#[ignore = "needs a Vulkan driver"]
pub fn cpu_to_gpu_is_mappable() -> Result<()> {
    let context = framework::make_context()?;
    let mut allocator = context.allocator.clone();
    let allocation = allocator.allocate(
        "allocation",
        &vk::MemoryRequirements {
            size: 1024,
            alignment: 1,
            // Assume all memory types are valid for this allocation
            memory_type_bits: 0xFFFFFFFF,
        },
        MemoryType::CpuToGpu,
    )?;
    assert_ne!(unsafe { allocation.memory().as_raw() }, 0);
    assert!(allocation.mapped_ptr().is_some(), "Memory allocated with CpuToGpu should be mappable");
    allocator.free(allocation)?;
    Ok(())
}

#[test]
#[ignore = "needs a Vulkan driver"]
pub fn uniform_buffer_roundtrip() -> Result<()> {
    let mut context = framework::make_context()?;
    let buffer = Buffer::new(
        context.device.clone(),
        &mut context.allocator,
        std::mem::size_of::<SceneUniforms>() as vk::DeviceSize,
        vk::BufferUsageFlags::UNIFORM_BUFFER,
        MemoryType::CpuToGpu,
    )?;
    let uniforms = OffscreenUniforms {
        depth_mvp: glam::Mat4::from_scale(glam::Vec3::splat(2.0)),
    };
    let mut view = buffer.view(0u64, std::mem::size_of::<OffscreenUniforms>() as u64)?;
    view.write(&[uniforms])?;
    assert_eq!(view.mapped_slice::<OffscreenUniforms>()?[0].depth_mvp, uniforms.depth_mvp);
    // A view past the end of the buffer is rejected.
    assert!(buffer.view(buffer.size(), 1u64).is_err());
    Ok(())
}

#[test]
#[ignore = "needs a Vulkan driver"]
pub fn mesh_upload() -> Result<()> {
    let mut context = framework::make_context()?;
    let geometry = Geometry::triangle();
    let mesh = Mesh::new(context.device.clone(), &mut context.allocator, &geometry)?;
    assert_eq!(mesh.index_count(), 3);
    Ok(())
}
