//! Frame pacing and the synchronization primitives owned by each frame in flight.
//!
//! A frame slot moves through three states:
//! * idle: its fence is signaled and the host may reuse everything the slot owns.
//! * submitted: the fence is unsignaled, the GPU waits on `image_available` before writing color output.
//! * presented: `render_finished` is signaled and the presentation engine owns the image.
//!
//! Fences start out signaled, so the first wait on a fresh slot returns immediately.

use anyhow::Result;

use crate::{Device, Fence, Semaphore};

/// The number of frames in flight. With two frames in flight the host can prepare a frame while the GPU
/// renders the previous one.
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Synchronization primitives of a single frame slot.
#[derive(Debug)]
pub struct FrameSync {
    /// Signaled by the GPU when the submission of this slot finished.
    pub in_flight: Fence,
    /// Signaled when the acquired swapchain image is ready to be rendered to.
    pub image_available: Semaphore,
    /// Signaled when rendering is done. Presentation waits on this.
    pub render_finished: Semaphore,
}

impl FrameSync {
    pub fn new(device: Device) -> Result<Self> {
        Ok(Self {
            in_flight: Fence::new(device.clone(), true)?,
            image_available: Semaphore::new(device.clone())?,
            render_finished: Semaphore::new(device)?,
        })
    }

    /// Create the synchronization set for every frame in flight.
    pub fn create_set(device: &Device) -> Result<Vec<FrameSync>> {
        (0..FRAMES_IN_FLIGHT).map(|_| FrameSync::new(device.clone())).collect()
    }
}

/// Cycles through the frame slots.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameCounter {
    current: usize,
    frames: u64,
}

impl FrameCounter {
    /// Index of the frame slot to use for the next frame.
    pub fn slot(&self) -> usize {
        self.current
    }

    /// Total number of frames that were submitted.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Move to the next slot after a frame was submitted.
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % FRAMES_IN_FLIGHT;
        self.frames += 1;
    }
}

/// Objects the presentation engine may still be using after the swapchain was recreated, such as the
/// `render_finished` semaphores of the previous [`FrameSync`] set. Each entry is kept alive until
/// [`FRAMES_IN_FLIGHT`] more frames were submitted, at which point the fence waits of those frames cover the
/// presents that used it.
#[derive(Debug)]
pub struct DeferredRelease<T> {
    pending: Vec<(u64, T)>,
}

impl<T> Default for DeferredRelease<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredRelease<T> {
    /// Keep `item` alive until `frame + FRAMES_IN_FLIGHT` frames were submitted.
    pub fn retire(&mut self, frame: u64, item: T) {
        self.pending.push((frame, item));
    }

    /// Drop everything retired at least [`FRAMES_IN_FLIGHT`] frames before `frame`. Must only be called after
    /// waiting on the fence of the current slot.
    pub fn release(&mut self, frame: u64) {
        self.pending
            .retain(|(retired, _)| frame < retired + FRAMES_IN_FLIGHT as u64);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn retired_items_outlive_the_frames_in_flight() {
        let dropped = Rc::new(Cell::new(0));
        let mut deferred = DeferredRelease::default();
        deferred.retire(5, Tracked(dropped.clone()));
        for frame in 5..5 + FRAMES_IN_FLIGHT as u64 {
            deferred.release(frame);
            assert_eq!(dropped.get(), 0, "released too early at frame {frame}");
        }
        deferred.release(5 + FRAMES_IN_FLIGHT as u64);
        assert_eq!(dropped.get(), 1);
        assert!(deferred.is_empty());
    }

    #[test]
    fn release_keeps_newer_items() {
        let dropped = Rc::new(Cell::new(0));
        let mut deferred = DeferredRelease::default();
        deferred.retire(0, Tracked(dropped.clone()));
        deferred.retire(1, Tracked(dropped.clone()));
        deferred.release(FRAMES_IN_FLIGHT as u64);
        assert_eq!(dropped.get(), 1);
        assert_eq!(deferred.len(), 1);
        drop(deferred);
        assert_eq!(dropped.get(), 2);
    }

    #[test]
    fn counter_cycles_through_all_slots() {
        let mut counter = FrameCounter::default();
        let mut seen = Vec::new();
        for _ in 0..FRAMES_IN_FLIGHT * 2 {
            seen.push(counter.slot());
            counter.advance();
        }
        assert_eq!(&seen[..FRAMES_IN_FLIGHT], &seen[FRAMES_IN_FLIGHT..]);
        assert!(seen.iter().all(|&slot| slot < FRAMES_IN_FLIGHT));
        assert_eq!(counter.frames(), (FRAMES_IN_FLIGHT * 2) as u64);
        assert_eq!(counter.slot(), 0);
    }
}
