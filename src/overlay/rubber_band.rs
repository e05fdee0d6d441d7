use super::DisplayServer;
use crate::capture::{Rectangle, Result};

/// XOR outline that follows the pointer during a drag.
#[derive(Debug, Default)]
pub struct RubberBand {
    shown: Option<Rectangle>,
}

impl RubberBand {
    /// Inverts the outline of `rect` and flushes. Self-inverse.
    pub fn draw<D: DisplayServer + ?Sized>(display: &mut D, rect: &Rectangle) -> Result<()> {
        display.draw_inverted_rect(rect)?;
        display.flush()
    }

    /// Erases the outline currently on screen, then shows `rect`.
    pub fn show<D: DisplayServer + ?Sized>(&mut self, display: &mut D, rect: Rectangle) -> Result<()> {
        self.erase(display)?;
        Self::draw(display, &rect)?;
        self.shown = Some(rect);
        Ok(())
    }

    pub fn erase<D: DisplayServer + ?Sized>(&mut self, display: &mut D) -> Result<()> {
        if let Some(rect) = self.shown.take() {
            Self::draw(display, &rect)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::FakeDisplay;

    #[test]
    fn test_draw_twice_restores_surface() {
        let mut display = FakeDisplay::default();
        let rect = Rectangle::new(3, 4, 20, 10);

        RubberBand::draw(&mut display, &rect).unwrap();
        assert!(!display.surface.is_empty());
        RubberBand::draw(&mut display, &rect).unwrap();
        assert!(display.surface.is_empty());
        assert_eq!(display.flushes, 2);
    }

    #[test]
    fn test_show_replaces_previous_outline() {
        let mut display = FakeDisplay::default();
        let mut band = RubberBand::default();

        band.show(&mut display, Rectangle::new(0, 0, 5, 5)).unwrap();
        band.show(&mut display, Rectangle::new(10, 10, 3, 3)).unwrap();

        let mut only_second = FakeDisplay::default();
        RubberBand::draw(&mut only_second, &Rectangle::new(10, 10, 3, 3)).unwrap();
        assert_eq!(display.surface, only_second.surface);

        band.erase(&mut display).unwrap();
        assert!(display.surface.is_empty());
    }

    #[test]
    fn test_erase_without_outline_draws_nothing() {
        let mut display = FakeDisplay::default();
        let mut band = RubberBand::default();
        band.erase(&mut display).unwrap();
        assert!(display.draws.is_empty());
    }
}
