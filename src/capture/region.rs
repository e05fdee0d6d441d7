use tracing::{debug, warn};

use super::{Rectangle, Result};
use crate::overlay::{DisplayServer, PointerEvent, PointerGrab, RubberBand};

/// Pointer state while a selection is in progress.
#[derive(Debug, Clone, Copy, Default)]
struct DragState {
    pressed: bool,
    anchor_x: i32,
    anchor_y: i32,
    current_x: i32,
    current_y: i32,
}

impl DragState {
    fn press(x: i32, y: i32) -> Self {
        Self {
            pressed: true,
            anchor_x: x,
            anchor_y: y,
            current_x: x,
            current_y: y,
        }
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.current_x = x;
        self.current_y = y;
    }

    fn rectangle(&self) -> Rectangle {
        Rectangle::normalize(self.anchor_x, self.anchor_y, self.current_x, self.current_y)
    }
}

/// Drag-to-select on the root window with a live XOR outline.
pub struct RegionSelector;

impl RegionSelector {
    /// Grabs the pointer and blocks until a button is released.
    ///
    /// The grab is released on every return path. A zero-sized drag is
    /// returned as is.
    pub fn select<D: DisplayServer + ?Sized>(display: &mut D) -> Result<Rectangle> {
        let mut grab = PointerGrab::acquire(display)?;
        let mut band = RubberBand::default();

        let result = Self::track(grab.display(), &mut band);
        if let Err(e) = band.erase(grab.display()) {
            warn!("Failed to erase selection outline: {}", e);
        }
        let rect = result?;

        grab.release()?;
        debug!("Selected region {}", rect);
        Ok(rect)
    }

    fn track<D: DisplayServer + ?Sized>(display: &mut D, band: &mut RubberBand) -> Result<Rectangle> {
        let mut drag = DragState::default();
        loop {
            match display.next_event()? {
                PointerEvent::ButtonPress { x, y, .. } => {
                    band.erase(display)?;
                    drag = DragState::press(x, y);
                }
                PointerEvent::Motion { x, y } if drag.pressed => {
                    drag.move_to(x, y);
                    band.show(display, drag.rectangle())?;
                }
                PointerEvent::ButtonRelease { x, y } => {
                    if !drag.pressed {
                        drag = DragState::press(x, y);
                    }
                    return Ok(drag.rectangle());
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;
    use crate::overlay::testing::FakeDisplay;

    fn press(x: i32, y: i32) -> PointerEvent {
        PointerEvent::ButtonPress { x, y, child: None }
    }

    fn motion(x: i32, y: i32) -> PointerEvent {
        PointerEvent::Motion { x, y }
    }

    fn release(x: i32, y: i32) -> PointerEvent {
        PointerEvent::ButtonRelease { x, y }
    }

    #[test]
    fn test_drag_normalizes_direction() {
        let mut display =
            FakeDisplay::with_events([press(5, 5), motion(2, 2), motion(10, 1), release(10, 1)]);
        let rect = RegionSelector::select(&mut display).unwrap();
        assert_eq!(rect, Rectangle::new(5, 1, 5, 4));
    }

    #[test]
    fn test_each_motion_erases_previous_outline() {
        let mut display =
            FakeDisplay::with_events([press(5, 5), motion(2, 2), motion(10, 1), release(10, 1)]);
        RegionSelector::select(&mut display).unwrap();

        let first = Rectangle::new(2, 2, 3, 3);
        let second = Rectangle::new(5, 1, 5, 4);
        assert_eq!(display.draws, vec![first, first, second, second]);
        assert_eq!(display.flushes, 4);
    }

    #[test]
    fn test_no_outline_left_after_selection() {
        let mut display = FakeDisplay::with_events([
            press(40, 40),
            motion(60, 70),
            motion(20, 90),
            motion(35, 10),
            release(35, 10),
        ]);
        RegionSelector::select(&mut display).unwrap();
        assert!(display.surface.is_empty());
    }

    #[test]
    fn test_motion_before_press_is_ignored() {
        let mut display = FakeDisplay::with_events([
            motion(1, 1),
            PointerEvent::Other,
            press(10, 10),
            motion(14, 13),
            release(14, 13),
        ]);
        let rect = RegionSelector::select(&mut display).unwrap();
        assert_eq!(rect, Rectangle::new(10, 10, 4, 3));
        assert_eq!(display.draws.len(), 2);
    }

    #[test]
    fn test_zero_sized_drag_is_passed_through() {
        let mut display = FakeDisplay::with_events([press(7, 9), release(7, 9)]);
        let rect = RegionSelector::select(&mut display).unwrap();
        assert_eq!(rect, Rectangle::new(7, 9, 0, 0));
        assert!(display.draws.is_empty());
    }

    #[test]
    fn test_release_keeps_last_drawn_rectangle() {
        let mut display = FakeDisplay::with_events([press(0, 0), motion(30, 20), release(31, 22)]);
        let rect = RegionSelector::select(&mut display).unwrap();
        assert_eq!(rect, Rectangle::new(0, 0, 30, 20));
    }

    #[test]
    fn test_grab_released_once_on_success() {
        let mut display = FakeDisplay::with_events([press(1, 1), motion(3, 3), release(3, 3)]);
        RegionSelector::select(&mut display).unwrap();
        assert_eq!(display.grabs, 1);
        assert_eq!(display.releases, 1);
    }

    #[test]
    fn test_grab_released_once_on_error() {
        let mut display = FakeDisplay::with_events([press(1, 1), motion(8, 6)]);
        let result = RegionSelector::select(&mut display);
        assert!(matches!(result, Err(CaptureError::Display(_))));
        assert_eq!(display.grabs, 1);
        assert_eq!(display.releases, 1);
        assert!(display.surface.is_empty());
    }

    #[test]
    fn test_grab_denied_skips_event_loop() {
        let mut display = FakeDisplay::denying_grab();
        display.events.push_back(press(1, 1));
        let result = RegionSelector::select(&mut display);
        assert!(matches!(result, Err(CaptureError::GrabDenied(_))));
        assert_eq!(display.events.len(), 1);
        assert_eq!(display.releases, 0);
    }
}
