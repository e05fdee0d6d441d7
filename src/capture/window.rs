use tracing::{debug, info, warn};

use super::{CaptureError, FrameExtents, Rectangle, Result};
use crate::wininfo::{FrameExtentsLookup, WindowId, WindowInfoSource};

/// Reconciles a window's content geometry with its frame extents.
///
/// Fallback order when the frame metadata is unreliable:
/// 1. no metadata at all (or the query itself failed): ask for the whole
///    window geometry, which already includes decorations;
/// 2. metadata without `_NET_FRAME_EXTENTS`: assume zero decoration;
/// 3. otherwise grow the content area by the reported extents.
pub struct WindowGeometryResolver<'a, S: WindowInfoSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: WindowInfoSource + ?Sized> WindowGeometryResolver<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        Self { source }
    }

    pub fn resolve(&mut self, window: WindowId) -> Result<Rectangle> {
        let raw = self.source.content_geometry(window)?;
        debug!("Window 0x{:x} content geometry: {:?}", window, raw);

        let extents = match self.source.frame_extents(window) {
            Ok(FrameExtentsLookup::Found(extents)) => extents,
            Ok(FrameExtentsLookup::Missing) => {
                info!("Window manager does not report frame extents, capturing without frame");
                FrameExtents::default()
            }
            Ok(FrameExtentsLookup::NoData) => {
                info!("No window properties for 0x{:x}, using whole window geometry", window);
                return self.whole_window(window);
            }
            Err(e) => {
                warn!("Frame extents query failed ({}), using whole window geometry", e);
                return self.whole_window(window);
            }
        };

        non_empty(extents.expand(&raw), window)
    }

    fn whole_window(&mut self, window: WindowId) -> Result<Rectangle> {
        let rect = self.source.whole_window_geometry(window)?;
        non_empty(rect, window)
    }
}

fn non_empty(rect: Rectangle, window: WindowId) -> Result<Rectangle> {
    if rect.is_empty() {
        return Err(CaptureError::UnparsableOutput(format!(
            "window 0x{:x} has an empty geometry: {}",
            window, rect
        )));
    }
    Ok(rect)
}
