use tracing::{debug, warn};

use super::DisplayServer;
use crate::capture::Result;

/// Holds the pointer grab for as long as it lives.
///
/// The grab is released exactly once: either through [`PointerGrab::release`],
/// which reports failures, or on drop, which only logs them.
pub struct PointerGrab<'a, D: DisplayServer + ?Sized> {
    display: &'a mut D,
    released: bool,
}

impl<'a, D: DisplayServer + ?Sized> PointerGrab<'a, D> {
    pub fn acquire(display: &'a mut D) -> Result<Self> {
        display.grab_pointer()?;
        debug!("Pointer grabbed");
        Ok(Self {
            display,
            released: false,
        })
    }

    pub fn display(&mut self) -> &mut D {
        &mut *self.display
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.display.ungrab_pointer()?;
        debug!("Pointer released");
        Ok(())
    }
}

impl<D: DisplayServer + ?Sized> Drop for PointerGrab<'_, D> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.display.ungrab_pointer() {
            Ok(()) => debug!("Pointer released on early exit"),
            Err(e) => warn!("Failed to release pointer grab: {}", e),
        }
    }
}
