//! The shadow mapping renderer: frame recording, the render loop and swapchain recreation.

pub mod per_image;
pub mod recorder;
pub mod settings;
pub mod shadow_renderer;
