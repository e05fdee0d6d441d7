mod byzanz;

pub use byzanz::ByzanzRecorder;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::RecordingConfig;

/// Options passed through to the recorder untouched.
#[derive(Debug, Clone)]
pub struct RecordingSettings {
    pub duration: Duration,
    pub delay: Duration,
    pub cursor: bool,
    pub audio: bool,
    pub output: PathBuf,
}

impl RecordingSettings {
    pub fn from_config(config: &RecordingConfig, output: PathBuf) -> Self {
        Self {
            duration: Duration::from_secs(config.duration_secs.into()),
            delay: Duration::from_secs(config.delay_secs.into()),
            cursor: config.cursor,
            audio: config.audio,
            output,
        }
    }
}
