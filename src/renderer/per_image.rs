use anyhow::Result;

/// Create one object per swapchain image. Stops at the first error, dropping the objects created so far.
pub fn rebuild_per_image<T>(count: usize, create: impl FnMut(usize) -> Result<T>) -> Result<Vec<T>> {
    (0..count).map(create).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::Error;

    struct Tracked<'a> {
        live: &'a Cell<usize>,
    }

    impl<'a> Tracked<'a> {
        fn new(live: &'a Cell<usize>) -> Self {
            live.set(live.get() + 1);
            Self {
                live,
            }
        }
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    #[test]
    fn resizing_twice_keeps_one_object_per_image() {
        let live = Cell::new(0);
        let mut framebuffers = rebuild_per_image(3, |_| Ok(Tracked::new(&live))).unwrap();
        for _ in 0..2 {
            framebuffers.clear();
            framebuffers = rebuild_per_image(3, |_| Ok(Tracked::new(&live))).unwrap();
            assert_eq!(framebuffers.len(), 3);
            assert_eq!(live.get(), 3);
        }
    }

    #[test]
    fn image_count_change_is_followed() {
        let created = rebuild_per_image(2, Ok).unwrap();
        assert_eq!(created, vec![0, 1]);
        let created = rebuild_per_image(4, Ok).unwrap();
        assert_eq!(created, vec![0, 1, 2, 3]);
    }

    #[test]
    fn failure_releases_partial_results() {
        let live = Cell::new(0);
        let result = rebuild_per_image(3, |index| {
            if index == 2 {
                Err(anyhow::Error::from(Error::Uncategorized("framebuffer creation failed")))
            } else {
                Ok(Tracked::new(&live))
            }
        });
        assert!(result.is_err());
        assert_eq!(live.get(), 0);
    }
}
