//! Abstraction over the window that is rendered to.

use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

/// Exposes the size of the drawable area of a window, in pixels.
pub trait WindowSize {
    /// Get the width of the drawable area
    fn width(&self) -> u32;
    /// Get the height of the drawable area
    fn height(&self) -> u32;

    /// A minimized window has a zero-sized drawable area. Nothing can be presented to it.
    fn is_minimized(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

#[cfg(feature = "winit")]
impl WindowSize for winit::window::Window {
    fn width(&self) -> u32 {
        self.inner_size().width
    }

    fn height(&self) -> u32 {
        self.inner_size().height
    }
}

/// Anything that has a raw window handle and a size can be rendered to.
pub trait Window: WindowSize + HasRawDisplayHandle + HasRawWindowHandle {}
impl<T: WindowSize + HasRawDisplayHandle + HasRawWindowHandle> Window for T {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Size(u32, u32);

    impl WindowSize for Size {
        fn width(&self) -> u32 {
            self.0
        }

        fn height(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn zero_sized_window_is_minimized() {
        assert!(Size(0, 600).is_minimized());
        assert!(Size(800, 0).is_minimized());
        assert!(!Size(800, 600).is_minimized());
    }
}
