// src/recorder/segment.rs
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::core::error::{CaptureError, CaptureResult};
use crate::recorder::SegmentStore;

pub const STEM_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const MAX_NAME_ATTEMPTS: usize = 100;

pub fn segment_stem<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(STEM_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentPaths {
    pub stem: String,
    pub raw: PathBuf,
    pub transcoded: PathBuf,
}

impl SegmentPaths {
    pub fn new(dir: &Path, stem: &str, raw_ext: &str, transcoded_ext: &str) -> Self {
        Self {
            stem: stem.to_string(),
            raw: dir.join(format!("{}.{}", stem, raw_ext)),
            transcoded: dir.join(format!("{}.{}", stem, transcoded_ext)),
        }
    }
}

/// Creates the raw file with create-new semantics. A stem already taken (two
/// rotations in the same second, or the local clock stepping back) becomes
/// `<stem>_1`, `<stem>_2`, ... until neither the raw nor the transcoded name
/// exists.
pub fn create_segment_file(
    dir: &Path,
    stem: &str,
    raw_ext: &str,
    transcoded_ext: &str,
) -> CaptureResult<(SegmentPaths, File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            stem.to_string()
        } else {
            format!("{}_{}", stem, attempt)
        };
        let paths = SegmentPaths::new(dir, &candidate, raw_ext, transcoded_ext);

        if paths.transcoded.exists() {
            continue;
        }

        match OpenOptions::new().write(true).create_new(true).open(&paths.raw) {
            Ok(file) => return Ok((paths, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(CaptureError::Create {
                    path: paths.raw,
                    source: e,
                });
            }
        }
    }

    Err(CaptureError::NameExhausted {
        stem: stem.to_string(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

/// Plain files in one flat directory.
pub struct FsSegmentStore {
    dir: PathBuf,
    raw_ext: String,
    transcoded_ext: String,
}

impl FsSegmentStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        raw_ext: impl Into<String>,
        transcoded_ext: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            raw_ext: raw_ext.into(),
            transcoded_ext: transcoded_ext.into(),
        }
    }
}

impl SegmentStore for FsSegmentStore {
    fn create(&mut self, stem: &str) -> CaptureResult<(SegmentPaths, Box<dyn Write + Send>)> {
        let (paths, file) =
            create_segment_file(&self.dir, stem, &self.raw_ext, &self.transcoded_ext)?;
        Ok((paths, Box::new(file)))
    }
}
