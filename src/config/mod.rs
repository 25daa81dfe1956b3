use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::core::error::ConfigError;
use crate::core::timestamp::{SECS_PER_HOUR, hours};
use crate::recorder::{FailurePolicy, RecorderConfig};

// ---------- Stream ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    pub url: String,
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

// ---------- Recorder ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecorderSection {
    pub directory: PathBuf,
    #[serde(default = "default_segment_duration_secs")]
    pub segment_duration_secs: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_raw_extension")]
    pub raw_extension: String,
    #[serde(default)]
    pub on_error: FailurePolicy,
}

// ---------- Transcoder ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_program")]
    pub program: PathBuf,
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            video_codec: default_video_codec(),
            pixel_format: default_pixel_format(),
            output_extension: default_output_extension(),
        }
    }
}

// ---------- Retention ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default = "default_recordings_hours")]
    pub recordings_hours: u64,
    #[serde(default = "default_recordings_extensions")]
    pub recordings_extensions: Vec<String>,
    #[serde(default = "default_raw_hours")]
    pub raw_hours: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            recordings_hours: default_recordings_hours(),
            recordings_extensions: default_recordings_extensions(),
            raw_hours: default_raw_hours(),
        }
    }
}

// ---------- Logging ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------- Root ----------
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub stream: StreamConfig,
    pub recorder: RecorderSection,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_read_timeout_secs() -> u64 {
    30
}
fn default_segment_duration_secs() -> u64 {
    60
}
fn default_chunk_size() -> usize {
    8192
}
fn default_raw_extension() -> String {
    "mjpeg".to_string()
}
fn default_program() -> PathBuf {
    PathBuf::from("ffmpeg")
}
fn default_video_codec() -> String {
    "libx264".to_string()
}
fn default_pixel_format() -> String {
    "yuv420p".to_string()
}
fn default_output_extension() -> String {
    "mp4".to_string()
}
fn default_recordings_hours() -> u64 {
    14 * 24
}
fn default_recordings_extensions() -> Vec<String> {
    vec!["mp4".to_string(), "mkv".to_string(), "avi".to_string()]
}
fn default_raw_hours() -> u64 {
    2
}
fn default_log_level() -> String {
    "info".to_string()
}

// ---------- Loader ----------
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = parse(&txt).with_context(|| format!("loading {}", path.display()))?;
    Ok(cfg)
}

pub fn parse(txt: &str) -> Result<Config, ConfigError> {
    let cfg: Config = toml::from_str(txt).map_err(|e| ConfigError::with_context("invalid toml", e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.trim().is_empty() {
        return Err(ConfigError::message(format!("{} must not be empty", field)));
    }
    if ext.starts_with('.') {
        return Err(ConfigError::message(format!(
            "{} '{}' must be given without the leading dot",
            field, ext
        )));
    }
    Ok(())
}

fn check_hours(field: &str, value: u64) -> Result<(), ConfigError> {
    if value.checked_mul(SECS_PER_HOUR).is_none() {
        return Err(ConfigError::message(format!("{} = {} is out of range", field, value)));
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.stream.url.trim();
        if url.is_empty() {
            return Err(ConfigError::message("stream.url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::message(format!(
                "stream.url '{}' must use http:// or https://",
                url
            )));
        }
        if self.stream.login.trim().is_empty() {
            return Err(ConfigError::message("stream.login must not be empty"));
        }
        if self.stream.connect_timeout_secs == 0 || self.stream.read_timeout_secs == 0 {
            return Err(ConfigError::message("stream timeouts must be > 0"));
        }

        if self.recorder.directory.as_os_str().is_empty() {
            return Err(ConfigError::message("recorder.directory must not be empty"));
        }
        if self.recorder.segment_duration_secs == 0 {
            return Err(ConfigError::message("recorder.segment_duration_secs must be > 0"));
        }
        if self.recorder.chunk_size == 0 {
            return Err(ConfigError::message("recorder.chunk_size must be > 0"));
        }

        check_extension("recorder.raw_extension", &self.recorder.raw_extension)?;
        check_extension("transcoder.output_extension", &self.transcoder.output_extension)?;
        for ext in &self.retention.recordings_extensions {
            check_extension("retention.recordings_extensions", ext)?;
        }

        check_hours("retention.recordings_hours", self.retention.recordings_hours)?;
        check_hours("retention.raw_hours", self.retention.raw_hours)?;

        if self.recorder.raw_extension == self.transcoder.output_extension {
            return Err(ConfigError::message(
                "recorder.raw_extension and transcoder.output_extension must differ",
            ));
        }
        if self.retention.recordings_extensions.contains(&self.recorder.raw_extension) {
            return Err(ConfigError::message(format!(
                "raw extension '{}' must not be in retention.recordings_extensions",
                self.recorder.raw_extension
            )));
        }

        Ok(())
    }

    pub fn recorder_config(&self) -> RecorderConfig {
        let mut cfg = RecorderConfig::new(self.recorder.directory.clone());
        cfg.segment_duration = Duration::from_secs(self.recorder.segment_duration_secs);
        cfg.chunk_size = self.recorder.chunk_size;
        cfg.raw_extension = self.recorder.raw_extension.clone();
        cfg.transcoded_extension = self.transcoder.output_extension.clone();
        cfg.on_error = self.recorder.on_error;
        cfg
    }

    pub fn recordings_max_age(&self) -> Duration {
        hours(self.retention.recordings_hours)
    }

    pub fn raw_max_age(&self) -> Duration {
        hours(self.retention.raw_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [stream]
        url = "http://camera.local/video.mjpg"
        login = "admin"
        password = "secret"

        [recorder]
        directory = "/srv/camera"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse(MINIMAL).unwrap();

        assert_eq!(cfg.stream.connect_timeout_secs, 5);
        assert_eq!(cfg.stream.read_timeout_secs, 30);
        assert_eq!(cfg.recorder.segment_duration_secs, 60);
        assert_eq!(cfg.recorder.chunk_size, 8192);
        assert_eq!(cfg.recorder.raw_extension, "mjpeg");
        assert_eq!(cfg.recorder.on_error, FailurePolicy::Retry);
        assert_eq!(cfg.transcoder.program, PathBuf::from("ffmpeg"));
        assert_eq!(cfg.transcoder.video_codec, "libx264");
        assert_eq!(cfg.transcoder.pixel_format, "yuv420p");
        assert_eq!(cfg.transcoder.output_extension, "mp4");
        assert_eq!(cfg.retention.recordings_hours, 336);
        assert_eq!(cfg.retention.recordings_extensions, vec!["mp4", "mkv", "avi"]);
        assert_eq!(cfg.retention.raw_hours, 2);
        assert_eq!(cfg.logging.level, "info");

        assert_eq!(cfg.recordings_max_age(), Duration::from_secs(336 * 3600));
        assert_eq!(cfg.raw_max_age(), Duration::from_secs(7200));
    }

    #[test]
    fn recorder_config_mirrors_sections() {
        let txt = format!("{}\n segment_duration_secs = 300\n on_error = \"exit\"\n", MINIMAL);
        let cfg = parse(&txt).unwrap();
        let rc = cfg.recorder_config();

        assert_eq!(rc.directory, PathBuf::from("/srv/camera"));
        assert_eq!(rc.segment_duration, Duration::from_secs(300));
        assert_eq!(rc.on_error, FailurePolicy::Exit);
        assert_eq!(rc.raw_extension, "mjpeg");
        assert_eq!(rc.transcoded_extension, "mp4");
    }

    #[test]
    fn rejects_bad_url() {
        let txt = MINIMAL.replace("http://camera.local", "rtsp://camera.local");
        let err = parse(&txt).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn rejects_zero_duration() {
        let txt = format!("{}\n segment_duration_secs = 0\n", MINIMAL);
        assert!(parse(&txt).is_err());
    }

    #[test]
    fn rejects_dotted_extension() {
        let txt = format!("{}\n raw_extension = \".mjpeg\"\n", MINIMAL);
        let err = parse(&txt).unwrap_err();
        assert!(err.to_string().contains("leading dot"));
    }

    #[test]
    fn rejects_raw_extension_in_long_retention() {
        let txt = format!(
            "{}\n[retention]\nrecordings_extensions = [\"mp4\", \"mjpeg\"]\n",
            MINIMAL
        );
        assert!(parse(&txt).is_err());
    }

    #[test]
    fn rejects_retention_hours_that_overflow() {
        let txt = format!("{}\n[retention]\nrecordings_hours = 10000000000000000\n", MINIMAL);
        let err = parse(&txt).unwrap_err();
        assert!(err.to_string().contains("retention.recordings_hours"));

        let txt = format!("{}\n[retention]\nraw_hours = 9223372036854775807\n", MINIMAL);
        assert!(parse(&txt).is_err());

        let txt = format!("{}\n[retention]\nrecordings_hours = 876000\n", MINIMAL);
        let cfg = parse(&txt).unwrap();
        assert_eq!(cfg.recordings_max_age(), Duration::from_secs(876_000 * 3600));
    }

    #[test]
    fn missing_section_is_a_toml_error() {
        let err = parse("[stream]\nurl = \"http://x\"\nlogin = \"a\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Context { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load("/nonexistent/mjpeg-archiver.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/mjpeg-archiver.toml"));
    }
}
