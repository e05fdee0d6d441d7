use std::collections::VecDeque;
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    Atom, AtomEnum, ClientMessageEvent, ConnectionExt as _, EventMask, Window,
};

use super::{FrameExtentsLookup, WindowId, WindowInfoSource};
use crate::capture::{FrameExtents, Rectangle, Result, WindowGeometryRaw};
use crate::overlay::{DisplayServer, PointerEvent, PointerGrab, X11Display};

/// Deepest level searched below a frame window for the client it wraps.
const MAX_CLIENT_SEARCH_DEPTH: usize = 4;

/// `_NET_ACTIVE_WINDOW` source indication used by pagers and similar tools.
const SOURCE_INDICATION_PAGER: u32 = 2;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        WM_STATE,
        _NET_FRAME_EXTENTS,
        _NET_ACTIVE_WINDOW,
    }
}

/// Window queries answered by the X server itself.
pub struct X11Backend {
    display: X11Display,
    atoms: Atoms,
}

impl X11Backend {
    pub fn connect() -> Result<Self> {
        let display = X11Display::connect()?;
        let atoms = Atoms::new(display.connection())?.reply()?;
        Ok(Self { display, atoms })
    }

    fn has_wm_state(&self, window: Window) -> Result<bool> {
        let reply = self
            .display
            .connection()
            .get_property(false, window, self.atoms.WM_STATE, AtomEnum::ANY, 0, 0)?
            .reply()?;
        Ok(reply.type_ != x11rb::NONE)
    }

    /// Finds the client window managed inside `frame`, the way `xdotool
    /// selectwindow` does: the nearest descendant carrying `WM_STATE`.
    fn client_window(&self, frame: Window) -> Result<Window> {
        let conn = self.display.connection();
        let mut queue = VecDeque::from([(frame, 0usize)]);
        while let Some((window, depth)) = queue.pop_front() {
            if self.has_wm_state(window)? {
                return Ok(window);
            }
            if depth < MAX_CLIENT_SEARCH_DEPTH {
                let tree = conn.query_tree(window)?.reply()?;
                queue.extend(tree.children.into_iter().map(|child| (child, depth + 1)));
            }
        }
        Ok(frame)
    }

    /// Walks up to the direct child of the root, which is the WM frame for
    /// reparenting window managers and the window itself otherwise.
    fn toplevel(&self, window: Window) -> Result<Window> {
        let conn = self.display.connection();
        let mut current = window;
        loop {
            let tree = conn.query_tree(current)?.reply()?;
            if tree.parent == tree.root || tree.parent == x11rb::NONE {
                return Ok(current);
            }
            current = tree.parent;
        }
    }
}

impl WindowInfoSource for X11Backend {
    fn pick_window(&mut self) -> Result<WindowId> {
        let root = self.display.root();
        let mut grab = PointerGrab::acquire(&mut self.display)?;
        let mut picked = None;
        loop {
            match grab.display().next_event()? {
                PointerEvent::ButtonPress { child, .. } => picked = Some(child.unwrap_or(root)),
                PointerEvent::ButtonRelease { .. } if picked.is_some() => break,
                _ => {}
            }
        }
        grab.release()?;

        let frame = picked.unwrap_or(root);
        let window = if frame == root {
            root
        } else {
            self.client_window(frame)?
        };
        debug!("Picked window 0x{:x} (frame 0x{:x})", window, frame);
        Ok(window)
    }

    fn content_geometry(&mut self, window: WindowId) -> Result<WindowGeometryRaw> {
        let conn = self.display.connection();
        let geometry = conn.get_geometry(window)?.reply()?;
        let border = i16::try_from(geometry.border_width).unwrap_or(i16::MAX);
        let origin = conn
            .translate_coordinates(window, self.display.root(), -border, -border)?
            .reply()?;
        Ok(WindowGeometryRaw {
            x: origin.dst_x.into(),
            y: origin.dst_y.into(),
            width: geometry.width.into(),
            height: geometry.height.into(),
        })
    }

    fn frame_extents(&mut self, window: WindowId) -> Result<FrameExtentsLookup> {
        let conn = self.display.connection();
        let properties = conn.list_properties(window)?.reply()?;
        if properties.atoms.is_empty() {
            return Ok(FrameExtentsLookup::NoData);
        }
        if !properties.atoms.contains(&self.atoms._NET_FRAME_EXTENTS) {
            return Ok(FrameExtentsLookup::Missing);
        }

        let reply = conn
            .get_property(false, window, self.atoms._NET_FRAME_EXTENTS, AtomEnum::CARDINAL, 0, 4)?
            .reply()?;
        let values: Vec<u32> = reply.value32().map(|v| v.collect()).unwrap_or_default();
        Ok(match values[..] {
            [left, right, top, bottom] => FrameExtentsLookup::Found(FrameExtents {
                left,
                right,
                top,
                bottom,
            }),
            _ => {
                debug!("Ignoring malformed _NET_FRAME_EXTENTS on 0x{:x}: {:?}", window, values);
                FrameExtentsLookup::Missing
            }
        })
    }

    fn whole_window_geometry(&mut self, window: WindowId) -> Result<Rectangle> {
        let toplevel = self.toplevel(window)?;
        let geometry = self.display.connection().get_geometry(toplevel)?.reply()?;
        let border = u32::from(geometry.border_width) * 2;
        Ok(Rectangle::new(
            geometry.x.into(),
            geometry.y.into(),
            u32::from(geometry.width) + border,
            u32::from(geometry.height) + border,
        ))
    }

    fn focus_window(&mut self, window: WindowId) -> Result<()> {
        let conn = self.display.connection();
        let event = activate_request(window, self.atoms._NET_ACTIVE_WINDOW);
        conn.send_event(
            false,
            self.display.root(),
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        conn.flush()?;
        Ok(())
    }
}

/// EWMH activation message; the window manager raises and focuses `window`.
fn activate_request(window: Window, net_active_window: Atom) -> ClientMessageEvent {
    ClientMessageEvent::new(
        32,
        window,
        net_active_window,
        [SOURCE_INDICATION_PAGER, x11rb::CURRENT_TIME, 0, 0, 0],
    )
}
