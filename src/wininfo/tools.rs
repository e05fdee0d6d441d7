use std::process::Command;
use tracing::debug;

use super::{FrameExtentsLookup, WindowId, WindowInfoSource};
use crate::capture::{CaptureError, FrameExtents, Rectangle, Result, WindowGeometryRaw};

const FRAME_EXTENTS_LABEL: &str = "_NET_FRAME_EXTENTS(CARDINAL) =";

/// Window queries answered by `xdotool`, `xwininfo` and `xprop`.
#[derive(Debug, Default)]
pub struct ToolsBackend;

impl ToolsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl WindowInfoSource for ToolsBackend {
    fn pick_window(&mut self) -> Result<WindowId> {
        let output = run_tool("xdotool", &["selectwindow"])?;
        parse_window_id(&output)
    }

    fn content_geometry(&mut self, window: WindowId) -> Result<WindowGeometryRaw> {
        let output = run_tool("xwininfo", &["-id", &window.to_string()])?;
        parse_wininfo(&output)
    }

    fn frame_extents(&mut self, window: WindowId) -> Result<FrameExtentsLookup> {
        let output = run_tool("xprop", &["-id", &window.to_string()])?;
        Ok(parse_frame_extents(&output))
    }

    fn whole_window_geometry(&mut self, window: WindowId) -> Result<Rectangle> {
        let output = run_tool("xdotool", &["getwindowgeometry", &window.to_string()])?;
        parse_window_geometry(&output)
    }

    fn focus_window(&mut self, window: WindowId) -> Result<()> {
        run_tool("xdotool", &["windowactivate", &window.to_string()])?;
        Ok(())
    }
}

/// Runs `tool` and returns its stdout. Spawn failures and non-zero exits both
/// mean the source is unavailable.
fn run_tool(tool: &str, args: &[&str]) -> Result<String> {
    debug!("Running {} {}", tool, args.join(" "));
    let output = Command::new(tool).args(args).output().map_err(|e| {
        CaptureError::SourceUnavailable(format!("Failed to run {}: {}", tool, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::SourceUnavailable(format!(
            "{} exited with {}: {}",
            tool,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Returns the text following `label` on the first line that starts with it.
fn field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.trim_start().strip_prefix(label))
        .map(str::trim)
}

fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}

fn parse_field<T: std::str::FromStr>(text: &str, label: &str, tool: &str) -> Result<T> {
    let value = field(text, label).ok_or_else(|| {
        CaptureError::UnparsableOutput(format!("can't find '{}' in {} output", label, tool))
    })?;
    first_token(value).parse().map_err(|_| {
        CaptureError::UnparsableOutput(format!("invalid '{}' value in {} output: {}", label, tool, value))
    })
}

/// Parses the id printed by `xdotool selectwindow`. Hex ids are accepted too.
pub(crate) fn parse_window_id(output: &str) -> Result<WindowId> {
    let text = output.trim();
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => WindowId::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| CaptureError::UnparsableOutput(format!("invalid window id: '{}'", text)))
}

/// Parses the absolute position and content size from `xwininfo -id`.
pub(crate) fn parse_wininfo(output: &str) -> Result<WindowGeometryRaw> {
    Ok(WindowGeometryRaw {
        x: parse_field(output, "Absolute upper-left X:", "xwininfo")?,
        y: parse_field(output, "Absolute upper-left Y:", "xwininfo")?,
        width: parse_field(output, "Width:", "xwininfo")?,
        height: parse_field(output, "Height:", "xwininfo")?,
    })
}

/// Classifies `xprop -id` output.
///
/// Empty output happens on some desktops (LXDE) and means no data at all.
/// A missing or malformed `_NET_FRAME_EXTENTS` line happens on window managers
/// that do not set it (i3) and is reported as `Missing`.
pub(crate) fn parse_frame_extents(output: &str) -> FrameExtentsLookup {
    if output.trim().is_empty() {
        return FrameExtentsLookup::NoData;
    }

    let Some(value) = field(output, FRAME_EXTENTS_LABEL) else {
        return FrameExtentsLookup::Missing;
    };

    let values: Vec<u32> = value
        .split(',')
        .map(|v| v.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .unwrap_or_default();

    match values[..] {
        [left, right, top, bottom] => FrameExtentsLookup::Found(FrameExtents {
            left,
            right,
            top,
            bottom,
        }),
        _ => {
            debug!("Ignoring malformed _NET_FRAME_EXTENTS value: {}", value);
            FrameExtentsLookup::Missing
        }
    }
}

/// Parses `xdotool getwindowgeometry`, whose numbers include the frame.
pub(crate) fn parse_window_geometry(output: &str) -> Result<Rectangle> {
    let position = field(output, "Position:").map(first_token).ok_or_else(|| {
        CaptureError::UnparsableOutput(format!("can't find Position: {}", output.trim()))
    })?;
    let (x, y) = position
        .split_once(',')
        .and_then(|(x, y)| Some((x.parse::<i32>().ok()?, y.parse::<i32>().ok()?)))
        .ok_or_else(|| CaptureError::UnparsableOutput(format!("invalid Position: {}", position)))?;

    let geometry = field(output, "Geometry:").map(first_token).ok_or_else(|| {
        CaptureError::UnparsableOutput(format!("can't find Geometry: {}", output.trim()))
    })?;
    let (width, height) = geometry
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
        .ok_or_else(|| CaptureError::UnparsableOutput(format!("invalid Geometry: {}", geometry)))?;

    Ok(Rectangle::new(x, y, width, height))
}
