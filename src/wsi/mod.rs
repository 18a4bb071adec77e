//! The wsi module provides utilities for interacting with the window and presenting frames.
//! A headless context only needs [`window`] for its traits.

pub mod frame;
pub mod surface;
pub mod swapchain;
pub mod window;
