mod error;
mod region;
mod window;

pub use error::{CaptureError, Result};
pub use region::RegionSelector;
pub use window::WindowGeometryResolver;

use std::fmt;
use tracing::info;

use crate::overlay::DisplayServer;
use crate::wininfo::{WindowId, WindowInfoSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Window,
    Region,
}

/// Area handed to the recorder, in root-window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Axis-aligned box spanned by two corners, in any drag direction.
    pub fn normalize(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        let x = start_x.min(end_x);
        let y = start_y.min(end_y);
        let width = (start_x - end_x).unsigned_abs();
        let height = (start_y - end_y).unsigned_abs();
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Formats as `WxH+X+Y`, the X geometry string convention.
impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

/// Content-area geometry of a window, excluding decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometryRaw {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Decoration thickness the window manager adds around a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameExtents {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl FrameExtents {
    /// Grows `raw` outward so the frame's top-left becomes the origin.
    pub fn expand(&self, raw: &WindowGeometryRaw) -> Rectangle {
        Rectangle {
            x: raw.x.saturating_sub_unsigned(self.left),
            y: raw.y.saturating_sub_unsigned(self.top),
            width: raw.width.saturating_add(self.left).saturating_add(self.right),
            height: raw.height.saturating_add(self.top).saturating_add(self.bottom),
        }
    }
}

/// Outcome of one acquisition: the area, plus the picked window if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    pub rect: Rectangle,
    pub window: Option<WindowId>,
}

/// One geometry acquisition, bound to the collaborator its mode needs.
pub enum GeometryRequest<'a> {
    WindowPick(&'a mut dyn WindowInfoSource),
    DragSelect(&'a mut dyn DisplayServer),
}

impl GeometryRequest<'_> {
    pub fn mode(&self) -> CaptureMode {
        match self {
            GeometryRequest::WindowPick(_) => CaptureMode::Window,
            GeometryRequest::DragSelect(_) => CaptureMode::Region,
        }
    }

    pub fn acquire(self) -> Result<Acquisition> {
        info!("Acquiring {:?} geometry", self.mode());
        match self {
            GeometryRequest::WindowPick(source) => {
                let window = source.pick_window()?;
                let rect = WindowGeometryResolver::new(source).resolve(window)?;
                Ok(Acquisition {
                    rect,
                    window: Some(window),
                })
            }
            GeometryRequest::DragSelect(display) => {
                let rect = RegionSelector::select(display)?;
                Ok(Acquisition { rect, window: None })
            }
        }
    }
}
