//! Sources of window geometry and decoration metadata.
//!
//! Two interchangeable backends implement [`WindowInfoSource`]: one shells out
//! to the usual X utilities (`xdotool`, `xwininfo`, `xprop`), the other asks
//! the X server directly.

mod tools;
mod x11;

pub use tools::ToolsBackend;
pub use x11::X11Backend;

use serde::{Deserialize, Serialize};

use crate::capture::{FrameExtents, Rectangle, Result, WindowGeometryRaw};

pub type WindowId = u32;

/// What the frame-metadata query found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameExtentsLookup {
    /// The query returned nothing at all for the window.
    NoData,
    /// The window has metadata, but no usable `_NET_FRAME_EXTENTS`.
    Missing,
    Found(FrameExtents),
}

pub trait WindowInfoSource {
    /// Lets the user click a window and returns its id.
    fn pick_window(&mut self) -> Result<WindowId>;

    /// Position and size of the content area, decorations excluded.
    fn content_geometry(&mut self, window: WindowId) -> Result<WindowGeometryRaw>;

    fn frame_extents(&mut self, window: WindowId) -> Result<FrameExtentsLookup>;

    /// Position and size with decorations already included.
    fn whole_window_geometry(&mut self, window: WindowId) -> Result<Rectangle>;

    fn focus_window(&mut self, window: WindowId) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Tools,
    X11,
}

impl Backend {
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Tools => "xdotool/xwininfo/xprop",
            Backend::X11 => "X11 protocol",
        }
    }

    pub fn open(&self) -> Result<Box<dyn WindowInfoSource>> {
        Ok(match self {
            Backend::Tools => Box::new(ToolsBackend::new()),
            Backend::X11 => Box::new(X11Backend::connect()?),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::capture::CaptureError;

    /// Scripted answers for one window.
    pub struct FakeWindowInfo {
        pub window: WindowId,
        pub geometry: Option<WindowGeometryRaw>,
        pub extents: Option<FrameExtentsLookup>,
        pub whole: Option<Rectangle>,
        pub whole_queries: usize,
        pub focused: Vec<WindowId>,
    }

    impl FakeWindowInfo {
        pub fn new(window: WindowId) -> Self {
            Self {
                window,
                geometry: None,
                extents: None,
                whole: None,
                whole_queries: 0,
                focused: Vec::new(),
            }
        }

        pub fn with_geometry(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
            self.geometry = Some(WindowGeometryRaw {
                x,
                y,
                width,
                height,
            });
            self
        }

        pub fn with_extents(mut self, extents: FrameExtentsLookup) -> Self {
            self.extents = Some(extents);
            self
        }

        pub fn with_whole(mut self, rect: Rectangle) -> Self {
            self.whole = Some(rect);
            self
        }
    }

    impl WindowInfoSource for FakeWindowInfo {
        fn pick_window(&mut self) -> Result<WindowId> {
            Ok(self.window)
        }

        fn content_geometry(&mut self, _window: WindowId) -> Result<WindowGeometryRaw> {
            self.geometry
                .ok_or_else(|| CaptureError::UnparsableOutput("can't find 'x' position".to_string()))
        }

        fn frame_extents(&mut self, _window: WindowId) -> Result<FrameExtentsLookup> {
            self.extents
                .ok_or_else(|| CaptureError::SourceUnavailable("xprop not found".to_string()))
        }

        fn whole_window_geometry(&mut self, _window: WindowId) -> Result<Rectangle> {
            self.whole_queries += 1;
            self.whole
                .ok_or_else(|| CaptureError::UnparsableOutput("can't find Position".to_string()))
        }

        fn focus_window(&mut self, window: WindowId) -> Result<()> {
            self.focused.push(window);
            Ok(())
        }
    }
}
