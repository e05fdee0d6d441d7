mod capture;
mod config;
mod overlay;
mod recording;
mod wininfo;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use capture::{Acquisition, CaptureMode, GeometryRequest};
use config::Config;
use overlay::X11Display;
use recording::{ByzanzRecorder, RecordingSettings};
use wininfo::{Backend, WindowInfoSource};

#[derive(Parser)]
#[command(name = "byzanz-window")]
#[command(about = "Record a window or a selected screen region to a GIF with byzanz-record")]
#[command(version)]
struct Cli {
    /// Capture duration in seconds
    #[arg(short, long)]
    duration: Option<u32>,

    /// Delay before recording starts, in seconds
    #[arg(long)]
    delay: Option<u32>,

    /// Record the mouse cursor
    #[arg(short, long)]
    cursor: bool,

    /// Record audio
    #[arg(short, long)]
    audio: bool,

    /// Drag a rectangle instead of picking a window
    #[arg(short, long)]
    rectangle: bool,

    /// How window geometry is queried
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Print the selected geometry as WxH+X+Y and exit without recording
    #[arg(long)]
    print_geometry: bool,

    /// Output GIF file (defaults to a timestamped file in the configured directory)
    output: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(duration) = self.duration {
            config.recording.duration_secs = duration;
        }
        if let Some(delay) = self.delay {
            config.recording.delay_secs = delay;
        }
        config.recording.cursor |= self.cursor;
        config.recording.audio |= self.audio;
        if let Some(backend) = self.backend {
            config.geometry.backend = backend;
        }
    }

    /// Window mode brings the picked window to the front before recording,
    /// unless only the geometry is wanted.
    fn wants_focus(&self, config: &Config) -> bool {
        self.mode() == CaptureMode::Window && config.geometry.focus_window && !self.print_geometry
    }

    fn mode(&self) -> CaptureMode {
        if self.rectangle {
            CaptureMode::Region
        } else {
            CaptureMode::Window
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {:#}", e);
        Config::default()
    });
    cli.apply(&mut config);
    config.validate()?;

    let rect = match cli.mode() {
        CaptureMode::Region => drag_rectangle()?,
        CaptureMode::Window => pick_window(config.geometry.backend, cli.wants_focus(&config))?,
    };

    if cli.print_geometry {
        println!("{}", rect);
        return Ok(());
    }

    let output = match cli.output {
        Some(path) => path,
        None => {
            config.ensure_output_dir()?;
            config.output_path()
        }
    };

    let settings = RecordingSettings::from_config(&config.recording, output);
    ByzanzRecorder::new(config.recording.recorder.as_str()).record(&rect, &settings)
}

fn drag_rectangle() -> Result<capture::Rectangle> {
    let mut display = X11Display::connect()?;
    let Acquisition { rect, .. } = GeometryRequest::DragSelect(&mut display).acquire()?;
    Ok(rect)
}

fn pick_window(backend: Backend, focus: bool) -> Result<capture::Rectangle> {
    info!("Querying windows through {}", backend.display_name());
    let mut source = backend.open()?;
    let acquisition = pick_and_focus(
        source.as_mut(),
        focus,
        &mut io::stdin().lock(),
        &mut io::stderr(),
    )?;
    Ok(acquisition.rect)
}

/// Lets the user pick a window, then optionally waits for enter and brings
/// the window to the front. Prompts go to `prompt`, never to stdout.
fn pick_and_focus(
    source: &mut dyn WindowInfoSource,
    focus: bool,
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> Result<Acquisition> {
    writeln!(prompt, "Select the window which you like to capture.")?;
    let acquisition = GeometryRequest::WindowPick(&mut *source).acquire()?;

    if let (true, Some(window)) = (focus, acquisition.window) {
        writeln!(prompt, "Press enter when you are ready to capture.")?;
        prompt.flush()?;
        let mut line = String::new();
        input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        source.focus_window(window)?;
    }

    Ok(acquisition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameExtents, Rectangle};
    use crate::wininfo::testing::FakeWindowInfo;
    use crate::wininfo::FrameExtentsLookup;

    const WINDOW: u32 = 0x3a00007;

    fn source() -> FakeWindowInfo {
        FakeWindowInfo::new(WINDOW)
            .with_geometry(100, 100, 300, 200)
            .with_extents(FrameExtentsLookup::Found(FrameExtents {
                left: 2,
                right: 2,
                top: 24,
                bottom: 2,
            }))
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("byzanz-window").chain(args.iter().copied()))
    }

    #[test]
    fn test_focus_after_enter() {
        let mut source = source();
        let mut prompt = Vec::new();
        let acquisition =
            pick_and_focus(&mut source, true, &mut &b"\n"[..], &mut prompt).unwrap();

        assert_eq!(acquisition.rect, Rectangle::new(98, 76, 304, 226));
        assert_eq!(source.focused, vec![WINDOW]);
        let prompt = String::from_utf8(prompt).unwrap();
        assert!(prompt.contains("Select the window"));
        assert!(prompt.contains("Press enter"));
    }

    #[test]
    fn test_no_focus_when_disabled() {
        let mut source = source();
        let mut prompt = Vec::new();
        pick_and_focus(&mut source, false, &mut &b""[..], &mut prompt).unwrap();

        assert!(source.focused.is_empty());
        assert!(!String::from_utf8(prompt).unwrap().contains("Press enter"));
    }

    #[test]
    fn test_failed_pick_focuses_nothing() {
        let mut source = FakeWindowInfo::new(WINDOW);
        let result = pick_and_focus(&mut source, true, &mut &b"\n"[..], &mut Vec::new());
        assert!(result.is_err());
        assert!(source.focused.is_empty());
    }

    #[test]
    fn test_wants_focus() {
        let config = Config::default();
        assert!(parse(&[]).wants_focus(&config));
        assert!(!parse(&["--print-geometry"]).wants_focus(&config));
        assert!(!parse(&["-r"]).wants_focus(&config));

        let mut no_focus = Config::default();
        no_focus.geometry.focus_window = false;
        assert!(!parse(&[]).wants_focus(&no_focus));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = Config::default();
        parse(&["-d", "30", "--delay", "0", "-c", "--backend", "x11", "out.gif"]).apply(&mut config);
        assert_eq!(config.recording.duration_secs, 30);
        assert_eq!(config.recording.delay_secs, 0);
        assert!(config.recording.cursor);
        assert!(!config.recording.audio);
        assert_eq!(config.geometry.backend, Backend::X11);
    }
}
