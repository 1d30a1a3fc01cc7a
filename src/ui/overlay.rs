//! Ownership of the single open secondary view (map viewer, detail panel,
//! marker popup). Whoever manages overlay stacking holds an [`OverlaySlot`];
//! there is no process-wide "currently open" handle.

/// Something that can be shown on top of the page and must release its
/// resources when closed
pub trait Overlay {
    fn id(&self) -> &str;

    /// Release everything the overlay owns. Called exactly once, before drop.
    fn teardown(&mut self);
}

/// Holds at most one open overlay
pub struct OverlaySlot<T: Overlay> {
    current: Option<T>,
}

impl<T: Overlay> OverlaySlot<T> {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Opens `overlay`, tearing the previous one down first
    pub fn open(&mut self, overlay: T) -> &mut T {
        self.close();
        log::debug!("overlay {} opened", overlay.id());
        self.current.insert(overlay)
    }

    /// Tears down and drops the open overlay; returns whether one was open
    pub fn close(&mut self) -> bool {
        match self.current.take() {
            Some(mut overlay) => {
                overlay.teardown();
                log::debug!("overlay {} closed", overlay.id());
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

impl<T: Overlay> Default for OverlaySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Overlay> Drop for OverlaySlot<T> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct TrackedOverlay {
        id: String,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Overlay for TrackedOverlay {
        fn id(&self) -> &str {
            &self.id
        }

        fn teardown(&mut self) {
            self.log.borrow_mut().push(format!("teardown {}", self.id));
        }
    }

    impl Drop for TrackedOverlay {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop {}", self.id));
        }
    }

    fn tracked(id: &str, log: &Rc<RefCell<Vec<String>>>) -> TrackedOverlay {
        TrackedOverlay {
            id: id.to_string(),
            log: Rc::clone(log),
        }
    }

    #[test]
    fn test_open_tears_down_previous_before_drop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut slot = OverlaySlot::new();
        slot.open(tracked("a", &log));
        slot.open(tracked("b", &log));

        assert_eq!(slot.current().map(|o| o.id()), Some("b"));
        assert_eq!(*log.borrow(), vec!["teardown a", "drop a"]);
    }

    #[test]
    fn test_close_and_drop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let mut slot = OverlaySlot::new();
            assert!(!slot.close());
            slot.open(tracked("a", &log));
            assert!(slot.close());
            assert!(!slot.is_open());
            slot.open(tracked("b", &log));
        }
        assert_eq!(
            *log.borrow(),
            vec!["teardown a", "drop a", "teardown b", "drop b"]
        );
    }
}
