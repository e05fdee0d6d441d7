use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::wininfo::Backend;

const MAX_DURATION_SECS: u32 = 3600;
const MAX_DELAY_SECS: u32 = 300;
const MAX_FILENAME_TEMPLATE_LEN: usize = 128;
const MAX_RECORDER_LEN: usize = 256;
const DEFAULT_FILENAME_TEMPLATE: &str = "byzanz_%Y%m%d_%H%M%S";
const DEFAULT_RECORDER: &str = "byzanz-record";
const GIF_SUFFIX: &str = ".gif";
const MAX_STEM_LEN: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordingConfig {
    pub duration_secs: u32,
    pub delay_secs: u32,
    pub cursor: bool,
    pub audio: bool,
    /// Recorder binary, looked up in `PATH` unless absolute.
    pub recorder: String,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10,
            delay_secs: 1,
            cursor: false,
            audio: false,
            recorder: DEFAULT_RECORDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub filename_template: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let videos_dir = directories::UserDirs::new()
            .and_then(|d| d.video_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| {
                directories::BaseDirs::new()
                    .map(|b| b.home_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            });

        Self {
            directory: videos_dir,
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    pub backend: Backend,
    /// Activate the picked window before recording starts.
    pub focus_window: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Tools,
            focus_window: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.recording.duration_secs == 0 || self.recording.duration_secs > MAX_DURATION_SECS {
            return Err(anyhow!("duration_secs must be between 1 and {}", MAX_DURATION_SECS));
        }
        if self.recording.delay_secs > MAX_DELAY_SECS {
            return Err(anyhow!("delay_secs must be <= {}", MAX_DELAY_SECS));
        }
        if self.recording.recorder.trim().is_empty() {
            return Err(anyhow!("recorder must not be empty"));
        }
        if self.recording.recorder.len() > MAX_RECORDER_LEN {
            return Err(anyhow!("recorder path too long"));
        }
        if self.output.filename_template.len() > MAX_FILENAME_TEMPLATE_LEN {
            return Err(anyhow!("filename_template too long"));
        }
        if self.output.filename_template.contains('/')
            || self.output.filename_template.contains('\\')
            || self.output.filename_template.contains("..")
        {
            return Err(anyhow!("filename_template contains invalid path characters"));
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        self.recording.duration_secs = self.recording.duration_secs.clamp(1, MAX_DURATION_SECS);
        self.recording.delay_secs = self.recording.delay_secs.min(MAX_DELAY_SECS);

        if self.recording.recorder.trim().is_empty() {
            self.recording.recorder = DEFAULT_RECORDER.to_string();
        }

        if self.output.filename_template.len() > MAX_FILENAME_TEMPLATE_LEN
            || self.output.filename_template.contains('/')
            || self.output.filename_template.contains('\\')
            || self.output.filename_template.contains("..")
        {
            self.output.filename_template = DEFAULT_FILENAME_TEMPLATE.to_string();
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "byzanz-window", "byzanz-window")
            .map(|p| p.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                return Self::from_toml(&content);
            }
        }
        Ok(Config::default())
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.output.directory;
        if dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory path is empty"));
        }
        fs::create_dir_all(dir)?;
        Ok(())
    }

    /// Recording file name: the template expanded with the local time,
    /// reduced to a safe stem, with the `.gif` extension byzanz-record
    /// picks its encoder from. A trailing `.gif` in the template is accepted.
    pub fn generate_filename(&self) -> String {
        let now = chrono::Local::now();
        let template = self.output.filename_template.as_str();
        let template = template.strip_suffix(GIF_SUFFIX).unwrap_or(template);

        let mut expanded = String::new();
        if write!(expanded, "{}", now.format(template)).is_err() {
            warn!("Invalid filename_template {:?}, using default", template);
            expanded.clear();
        }
        let stem: String = expanded
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
            .take(MAX_STEM_LEN)
            .collect();

        if stem.is_empty() {
            format!("{}{}", now.format(DEFAULT_FILENAME_TEMPLATE), GIF_SUFFIX)
        } else {
            format!("{}{}", stem, GIF_SUFFIX)
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.directory.join(self.generate_filename())
    }
}
