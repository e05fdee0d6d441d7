use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    self, ConnectionExt as _, CreateGCAux, EventMask, GrabMode, GrabStatus, SubwindowMode, GX,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::{DisplayServer, PointerEvent};
use crate::capture::{CaptureError, Rectangle, Result};

/// `XC_crosshair` in the standard cursor font; the mask glyph follows it.
const XC_CROSSHAIR: u16 = 34;

/// X11 connection with the resources needed to draw on the root window.
pub struct X11Display {
    conn: RustConnection,
    root: xproto::Window,
    gc: xproto::Gcontext,
    cursor: xproto::Cursor,
}

impl X11Display {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| CaptureError::Display(format!("screen {} not found", screen_num)))?;

        let font = conn.generate_id()?;
        conn.open_font(font, b"cursor")?;
        let cursor = conn.generate_id()?;
        conn.create_glyph_cursor(
            cursor,
            font,
            font,
            XC_CROSSHAIR,
            XC_CROSSHAIR + 1,
            0,
            0,
            0,
            0xffff,
            0xffff,
            0xffff,
        )?;
        conn.close_font(font)?;

        let gc = conn.generate_id()?;
        conn.create_gc(
            gc,
            root,
            &CreateGCAux::new()
                .function(GX::INVERT)
                .subwindow_mode(SubwindowMode::INCLUDE_INFERIORS)
                .line_width(1),
        )?;
        conn.flush()?;

        debug!("Connected to X server, screen {} root 0x{:x}", screen_num, root);
        Ok(Self {
            conn,
            root,
            gc,
            cursor,
        })
    }

    pub fn connection(&self) -> &RustConnection {
        &self.conn
    }

    pub fn root(&self) -> xproto::Window {
        self.root
    }
}

impl DisplayServer for X11Display {
    fn grab_pointer(&mut self) -> Result<()> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::POINTER_MOTION | EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                self.cursor,
                x11rb::CURRENT_TIME,
            )?
            .reply()?;
        if reply.status != GrabStatus::SUCCESS {
            return Err(CaptureError::GrabDenied(format!("{:?}", reply.status)));
        }
        Ok(())
    }

    fn ungrab_pointer(&mut self) -> Result<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        self.conn.sync()?;
        Ok(())
    }

    fn next_event(&mut self) -> Result<PointerEvent> {
        let event = match self.conn.wait_for_event()? {
            Event::ButtonPress(e) => PointerEvent::ButtonPress {
                x: e.root_x.into(),
                y: e.root_y.into(),
                child: (e.child != x11rb::NONE).then_some(e.child),
            },
            Event::MotionNotify(e) => PointerEvent::Motion {
                x: e.root_x.into(),
                y: e.root_y.into(),
            },
            Event::ButtonRelease(e) => PointerEvent::ButtonRelease {
                x: e.root_x.into(),
                y: e.root_y.into(),
            },
            _ => PointerEvent::Other,
        };
        Ok(event)
    }

    fn draw_inverted_rect(&mut self, rect: &Rectangle) -> Result<()> {
        let outline = xproto::Rectangle {
            x: clamp_coord(rect.x),
            y: clamp_coord(rect.y),
            width: u16::try_from(rect.width).unwrap_or(u16::MAX),
            height: u16::try_from(rect.height).unwrap_or(u16::MAX),
        };
        self.conn.poly_rectangle(self.root, self.gc, &[outline])?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }
}

impl Drop for X11Display {
    fn drop(&mut self) {
        let _ = self.conn.free_gc(self.gc);
        let _ = self.conn.free_cursor(self.cursor);
        let _ = self.conn.flush();
    }
}

fn clamp_coord(v: i32) -> i16 {
    v.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_coord() {
        assert_eq!(clamp_coord(120), 120);
        assert_eq!(clamp_coord(-40), -40);
        assert_eq!(clamp_coord(100_000), i16::MAX);
        assert_eq!(clamp_coord(-100_000), i16::MIN);
    }
}
