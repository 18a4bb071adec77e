//! Host side scene state: the camera, the animated light, geometry and the uniform data derived from them.
//!
//! The world uses the Vulkan convention: +Y points down. The ground plane lies at `y = 0` and everything above it
//! has a negative Y coordinate.

pub mod camera;
pub mod light;
pub mod mesh;
pub mod uniforms;
