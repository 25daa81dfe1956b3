// src/recorder/config.rs
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What the loop does when one iteration fails to connect or to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log, back off, try the next segment.
    #[default]
    Retry,
    /// Return the error from `run`.
    Exit,
}

#[derive(Debug, Clone)]
pub struct RecorderConfig {
    pub directory: PathBuf,
    pub segment_duration: Duration,
    pub chunk_size: usize,
    pub raw_extension: String,
    pub transcoded_extension: String,
    pub on_error: FailurePolicy,
    pub retry_backoff: Duration,
    pub max_retry_backoff: Duration,
}

impl RecorderConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            segment_duration: Duration::from_secs(60),
            chunk_size: 8192,
            raw_extension: "mjpeg".to_string(),
            transcoded_extension: "mp4".to_string(),
            on_error: FailurePolicy::Retry,
            retry_backoff: Duration::from_secs(1),
            max_retry_backoff: Duration::from_secs(30),
        }
    }
}
