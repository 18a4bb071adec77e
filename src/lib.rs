//! Two-pass Vulkan shadow mapping renderer.
//!
//! Every frame the scene is first rendered from the point of view of a light into a depth-only shadow map
//! (the offscreen pass), then rendered from the camera into a swapchain image while sampling that shadow map to
//! decide which fragments are lit (the scene pass). Alternatively the shadow map itself can be displayed.
//!
//! All types are re-exported at the crate root through the [`prelude`].
//!
//! # Example
//! ```no_run
//! use umbra::*;
//! use winit::event_loop::EventLoop;
//! use winit::window::WindowBuilder;
//!
//! # fn main() -> anyhow::Result<()> {
//! let event_loop = EventLoop::new();
//! let window = WindowBuilder::new().with_title("umbra").build(&event_loop)?;
//! // Vulkan context with a surface for the window.
//! let app = AppBuilder::new()
//!     .name("umbra")
//!     .validation(true)
//!     .window(&window)
//!     .present_mode(vk::PresentModeKHR::FIFO)
//!     .build();
//! let ctx = initialize(&app)?;
//! // Renderer configuration, then the renderer itself.
//! let settings = RendererBuilder::new().shadow_map_size(2048).build()?;
//! let mut renderer = ShadowRenderer::new(ctx, &window, settings)?;
//! renderer.update(1.0 / 60.0);
//! renderer.draw_frame(&window)?;
//! # Ok(())
//! # }
//! ```
//! For further details, see the following modules
//! - [`core`] for context initialization.
//! - [`wsi`] for the swapchain and frame synchronization.
//! - [`pass`] for the offscreen and scene passes.
//! - [`scene`] for the camera, the light and geometry.
//! - [`renderer`] for frame recording and the render loop.

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate log;

pub mod prelude;
pub use crate::prelude::*;

pub mod allocator;
pub mod command_buffer;
pub mod core;
pub mod descriptor;
pub mod pass;
pub mod pipeline;
pub mod renderer;
pub mod resource;
pub mod sampler;
pub mod scene;
pub mod sync;
pub mod util;
pub mod wsi;
