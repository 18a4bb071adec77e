//! Exposes the umbra error type

use std::ffi::NulError;
use std::path::PathBuf;
use std::sync::PoisonError;

use ash;
use ash::vk;
use gpu_allocator::AllocationError;
use thiserror::Error;

use crate::resource::attachment::DepthUsage;

/// Error type that umbra can return.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load the Vulkan library.
    #[error("Failed to load Vulkan.")]
    LoadFailed(ash::LoadingError),
    /// Could not convert rust string to C-String because it has null bytes
    #[error("Invalid C string")]
    InvalidString(NulError),
    /// Generic Vulkan error type.
    #[error("Vulkan error: `{0}`")]
    VkError(vk::Result),
    /// No suitable GPU found.
    #[error("No physical device found matching requirements.")]
    NoGPU,
    /// No supported surface formats found.
    #[error("No supported surface formats found.")]
    NoSurfaceFormat,
    /// No queue was found that supports both graphics and presentation.
    #[error("No queue found that supports graphics and presentation to the window surface.")]
    NoPresentQueue,
    /// None of the depth format candidates for this usage is supported by the device.
    #[error("No supported depth format for usage {0:?}.")]
    NoDepthFormat(DepthUsage),
    /// Vulkan allocation error.
    #[error("Vulkan allocation error: `{0}`")]
    AllocationError(AllocationError),
    /// Poisoned mutex
    #[error("Poisoned mutex")]
    PoisonError,
    /// Buffer view out of range of original buffer
    #[error("Buffer view is not a valid range in the parent buffer.")]
    BufferViewOutOfRange,
    /// Mappable buffer expected
    #[error("Requested mappable buffer, but buffer does not have a memory map")]
    UnmappableBuffer,
    /// The mapped range does not start at a suitable address for the requested element type.
    #[error("Mapped buffer range is not aligned to {0} bytes")]
    UnalignedBufferView(usize),
    /// A descriptor set was bound before any pipeline.
    #[error("Cannot bind a descriptor set before binding a pipeline.")]
    NoPipelineBound,
    /// Tried to add a vertex attribute to a vertex binding that does not exist.
    #[error("Tried to add a vertex attribute to a vertex binding that does not exist.")]
    NoVertexBinding,
    /// A SPIR-V binary could not be read or is not valid SPIR-V.
    #[error("Failed to load shader `{path}`: {source}")]
    ShaderLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A model file could not be parsed into triangle geometry.
    #[error("Failed to load model `{path}`: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    /// Geometry without any triangles cannot be uploaded.
    #[error("Geometry contains no triangles.")]
    EmptyGeometry,
    /// Uncategorized error.
    #[error("Uncategorized error: `{0}`")]
    Uncategorized(&'static str),
}

impl From<ash::LoadingError> for Error {
    fn from(value: ash::LoadingError) -> Self {
        Error::LoadFailed(value)
    }
}

impl From<NulError> for Error {
    fn from(value: NulError) -> Self {
        Error::InvalidString(value)
    }
}

impl From<vk::Result> for Error {
    fn from(value: vk::Result) -> Self {
        Error::VkError(value)
    }
}

impl From<AllocationError> for Error {
    fn from(value: AllocationError) -> Self {
        Error::AllocationError(value)
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::PoisonError
    }
}

impl From<(Vec<vk::Pipeline>, vk::Result)> for Error {
    fn from(value: (Vec<vk::Pipeline>, vk::Result)) -> Self {
        Error::VkError(value.1)
    }
}
