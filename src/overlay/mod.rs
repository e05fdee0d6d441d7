//! Direct drawing and pointer control on the root window.
//!
//! Everything here talks to the display server through [`DisplayServer`],
//! so the selection state machine can be driven by a fake in tests.

mod grab;
mod rubber_band;
mod x11;

pub use grab::PointerGrab;
pub use rubber_band::RubberBand;
pub use x11::X11Display;

use crate::capture::{Rectangle, Result};
use crate::wininfo::WindowId;

/// Pointer input delivered while a grab is held. Coordinates are root-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    ButtonPress {
        x: i32,
        y: i32,
        /// Top-level child of the root under the pointer, if any.
        child: Option<WindowId>,
    },
    Motion {
        x: i32,
        y: i32,
    },
    ButtonRelease {
        x: i32,
        y: i32,
    },
    Other,
}

pub trait DisplayServer {
    /// Route all pointer motion and button events to us, with a crosshair cursor.
    fn grab_pointer(&mut self) -> Result<()>;

    fn ungrab_pointer(&mut self) -> Result<()>;

    /// Blocks until the next event arrives.
    fn next_event(&mut self) -> Result<PointerEvent>;

    /// Draws an outline with an inverting function; drawing it again erases it.
    fn draw_inverted_rect(&mut self, rect: &Rectangle) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}
