// src/recorder/mod.rs

use std::io::{Read, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::core::error::CaptureResult;

pub trait StreamSource: Send {
    /// Opens one session. The returned reader yields the body verbatim.
    fn open(&mut self) -> CaptureResult<Box<dyn Read + Send>>;
    fn describe(&self) -> String;
}

/// Fire-and-forget: implementations must not block and never report back.
pub trait SegmentTranscoder: Send {
    fn submit(&self, raw: &Path, output: &Path);
}

/// Where raw segments are written. Picks the final (disambiguated) name.
pub trait SegmentStore: Send {
    fn create(&mut self, stem: &str) -> CaptureResult<(SegmentPaths, Box<dyn Write + Send>)>;
}

pub trait RetentionPolicy: Send {
    fn run(&mut self, now: SystemTime) -> SweepStats;
}

pub mod config;
pub mod recorder;
pub mod retention_fs;
pub mod segment;
pub mod transcode;

pub use config::{FailurePolicy, RecorderConfig};
pub use recorder::{Segment, SegmentEnd, SegmentRecorder};
pub use retention_fs::{FsRetention, SweepStats, sweep, sweep_with};
pub use segment::{FsSegmentStore, SegmentPaths, create_segment_file, segment_stem};
pub use transcode::FfmpegTranscoder;
