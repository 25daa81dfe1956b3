use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::core::error::{CaptureError, CaptureResult};
use crate::core::timestamp::Clock;
use crate::recorder::{FsSegmentStore, SegmentPaths, SegmentStore, SegmentTranscoder, StreamSource};

/// Clock that only moves when told to. Wall time stays at `wall`.
pub struct ManualClock {
    wall: DateTime<Local>,
    elapsed_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(wall: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self {
            wall,
            elapsed_ms: AtomicU64::new(0),
        })
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn wall_now(&self) -> DateTime<Local> {
        self.wall
    }

    fn monotonic(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
pub enum Session {
    /// `count` chunks of `size` bytes, the clock advances `interval` per chunk.
    Chunks {
        count: usize,
        size: usize,
        interval: Duration,
    },
    /// Like `Chunks`, then the read fails.
    BrokenAfter {
        count: usize,
        size: usize,
        interval: Duration,
    },
    /// Server answered with a non-success status.
    Status(u16),
    Refused,
}

/// Plays back a fixed list of sessions. When the script runs out it clears
/// `running` so a `run` loop under test stops.
pub struct ScriptedSource {
    sessions: VecDeque<Session>,
    clock: Arc<ManualClock>,
    running: Arc<AtomicBool>,
    opened: Arc<AtomicU64>,
}

impl ScriptedSource {
    pub fn new(sessions: Vec<Session>, clock: Arc<ManualClock>, running: Arc<AtomicBool>) -> Self {
        Self {
            sessions: sessions.into(),
            clock,
            running,
            opened: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn opened_counter(&self) -> Arc<AtomicU64> {
        self.opened.clone()
    }
}

impl StreamSource for ScriptedSource {
    fn open(&mut self) -> CaptureResult<Box<dyn Read + Send>> {
        self.opened.fetch_add(1, Ordering::SeqCst);

        let session = match self.sessions.pop_front() {
            Some(s) => s,
            None => {
                self.running.store(false, Ordering::SeqCst);
                return Err(CaptureError::connect(self.describe(), "script exhausted"));
            }
        };

        match session {
            Session::Chunks { count, size, interval } => Ok(Box::new(TimedReader {
                remaining: count,
                size,
                interval,
                fail_at_end: false,
                clock: self.clock.clone(),
            })),
            Session::BrokenAfter { count, size, interval } => Ok(Box::new(TimedReader {
                remaining: count,
                size,
                interval,
                fail_at_end: true,
                clock: self.clock.clone(),
            })),
            Session::Status(status) => Err(CaptureError::Status {
                url: self.describe(),
                status,
                status_text: "scripted".to_string(),
            }),
            Session::Refused => Err(CaptureError::connect(self.describe(), "connection refused")),
        }
    }

    fn describe(&self) -> String {
        "scripted://camera".to_string()
    }
}

struct TimedReader {
    remaining: usize,
    size: usize,
    interval: Duration,
    fail_at_end: bool,
    clock: Arc<ManualClock>,
}

impl Read for TimedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            if self.fail_at_end {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
            }
            return Ok(0);
        }
        self.remaining -= 1;
        self.clock.advance(self.interval);

        let n = self.size.min(buf.len());
        buf[..n].fill(0xFF);
        Ok(n)
    }
}

/// Remembers every submission instead of launching anything.
pub struct RecordingTranscoder {
    submitted: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
}

impl RecordingTranscoder {
    pub fn new_with_shared() -> (Self, Arc<Mutex<Vec<(PathBuf, PathBuf)>>>) {
        let submitted = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                submitted: submitted.clone(),
            },
            submitted,
        )
    }
}

impl SegmentTranscoder for RecordingTranscoder {
    fn submit(&self, raw: &Path, output: &Path) {
        if let Ok(mut list) = self.submitted.lock() {
            list.push((raw.to_path_buf(), output.to_path_buf()));
        }
    }
}

/// Real files on disk, but the first `failures` segments get a writer that
/// rejects every write, like a full disk.
pub struct FailingStore {
    inner: FsSegmentStore,
    failures_left: usize,
}

impl FailingStore {
    pub fn new(dir: &Path, failures: usize) -> Self {
        Self {
            inner: FsSegmentStore::new(dir, "mjpeg", "mp4"),
            failures_left: failures,
        }
    }
}

impl SegmentStore for FailingStore {
    fn create(&mut self, stem: &str) -> CaptureResult<(SegmentPaths, Box<dyn Write + Send>)> {
        let (paths, sink) = self.inner.create(stem)?;
        if self.failures_left == 0 {
            return Ok((paths, sink));
        }
        self.failures_left -= 1;
        Ok((paths, Box::new(FullDisk)))
    }
}

struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
