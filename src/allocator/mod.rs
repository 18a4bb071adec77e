//! GPU memory allocation.
//!
//! The [`Allocator`](traits::Allocator) and [`Allocation`](traits::Allocation) traits describe what resources need from
//! an allocator. [`DefaultAllocator`](default_allocator::DefaultAllocator) implements them on top of the `gpu_allocator` crate,
//! and is what the renderer uses for its uniform buffers, vertex buffers and depth attachments.

pub mod default_allocator;
pub mod memory_type;
pub mod traits;
