use anyhow::{anyhow, Context, Result};
use std::ffi::OsString;
use std::process::Command;
use tracing::info;

use super::RecordingSettings;
use crate::capture::Rectangle;

/// Runs `byzanz-record` (or a compatible binary) on a screen area.
pub struct ByzanzRecorder {
    program: String,
}

impl ByzanzRecorder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(&self, rect: &Rectangle, settings: &RecordingSettings) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if settings.cursor {
            args.push("-c".into());
        }
        if settings.audio {
            args.push("-a".into());
        }

        let numeric = [
            ("-x", rect.x.to_string()),
            ("-y", rect.y.to_string()),
            ("-w", rect.width.to_string()),
            ("-h", rect.height.to_string()),
            ("-d", settings.duration.as_secs().to_string()),
            ("--delay", settings.delay.as_secs().to_string()),
        ];
        for (flag, value) in numeric {
            args.push(flag.into());
            args.push(value.into());
        }

        args.push(settings.output.clone().into_os_string());
        args
    }

    /// Blocks until the recorder exits.
    pub fn record(&self, rect: &Rectangle, settings: &RecordingSettings) -> Result<()> {
        let args = self.args(rect, settings);
        info!(
            "Recording {} for {}s to {}",
            rect,
            settings.duration.as_secs(),
            settings.output.display()
        );

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to start {}", self.program))?;

        if !status.success() {
            return Err(anyhow!("{} exited with {}", self.program, status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn settings() -> RecordingSettings {
        RecordingSettings {
            duration: Duration::from_secs(10),
            delay: Duration::from_secs(1),
            cursor: false,
            audio: false,
            output: PathBuf::from("out.gif"),
        }
    }

    fn as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_args_order() {
        let recorder = ByzanzRecorder::new("byzanz-record");
        let args = as_strings(recorder.args(&Rectangle::new(98, 76, 304, 226), &settings()));
        assert_eq!(
            args,
            [
                "-x", "98", "-y", "76", "-w", "304", "-h", "226", "-d", "10", "--delay", "1",
                "out.gif"
            ]
        );
    }

    #[test]
    fn test_args_flags_first() {
        let recorder = ByzanzRecorder::new("byzanz-record");
        let settings = RecordingSettings {
            cursor: true,
            audio: true,
            ..settings()
        };
        let args = as_strings(recorder.args(&Rectangle::new(-5, 0, 10, 10), &settings));
        assert_eq!(&args[..4], ["-c", "-a", "-x", "-5"]);
        assert_eq!(args.last().map(String::as_str), Some("out.gif"));
    }

    #[test]
    fn test_missing_recorder_is_error() {
        let recorder = ByzanzRecorder::new("byzanz-record-does-not-exist");
        let result = recorder.record(&Rectangle::new(0, 0, 10, 10), &settings());
        assert!(result.is_err());
    }
}
