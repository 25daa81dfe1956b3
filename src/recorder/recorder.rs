// src/recorder/recorder.rs

use std::fs;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

use crate::core::error::{CaptureError, CaptureResult};
use crate::core::logging::{ComponentLogger, LogContext};
use crate::core::timestamp::Clock;

use super::segment::{FsSegmentStore, segment_stem};
use super::{
    FailurePolicy, RecorderConfig, RetentionPolicy, SegmentStore, SegmentTranscoder, StreamSource,
};

const BACKOFF_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    DurationElapsed,
    StreamEnded,
    ReadFailed,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub stem: String,
    pub raw_path: PathBuf,
    pub transcoded_path: PathBuf,
    pub bytes: u64,
    pub end: SegmentEnd,
}

pub struct SegmentRecorder {
    cfg: RecorderConfig,
    source: Box<dyn StreamSource>,
    store: Box<dyn SegmentStore>,
    transcoder: Box<dyn SegmentTranscoder>,
    retentions: Vec<Box<dyn RetentionPolicy>>,
    clock: Arc<dyn Clock>,
    log: LogContext,
}

impl ComponentLogger for SegmentRecorder {
    fn log_context(&self) -> &LogContext {
        &self.log
    }
}

impl SegmentRecorder {
    pub fn new(
        cfg: RecorderConfig,
        source: Box<dyn StreamSource>,
        transcoder: Box<dyn SegmentTranscoder>,
        retentions: Vec<Box<dyn RetentionPolicy>>,
        clock: Arc<dyn Clock>,
        log: LogContext,
    ) -> Self {
        let store = FsSegmentStore::new(
            cfg.directory.clone(),
            cfg.raw_extension.clone(),
            cfg.transcoded_extension.clone(),
        );

        Self {
            cfg,
            source,
            store: Box::new(store),
            transcoder,
            retentions,
            clock,
            log,
        }
    }

    /// Replaces the default file store in `cfg.directory`.
    pub fn with_store(mut self, store: Box<dyn SegmentStore>) -> Self {
        self.store = store;
        self
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.cfg
    }

    /// Runs rotations until `running` is cleared. Iteration failures follow
    /// `cfg.on_error`.
    pub fn run(&mut self, running: &AtomicBool) -> anyhow::Result<()> {
        self.info(&format!(
            "recording {} into {} ({}s segments)",
            self.source.describe(),
            self.cfg.directory.display(),
            self.cfg.segment_duration.as_secs_f64()
        ));

        let mut backoff = self.cfg.retry_backoff;

        while running.load(Ordering::Relaxed) {
            match self.rotate(running) {
                Ok(_) => backoff = self.cfg.retry_backoff,
                Err(e) => {
                    self.error(&format!("segment failed: {}", e));

                    if self.cfg.on_error == FailurePolicy::Exit {
                        return Err(e.into());
                    }

                    self.warn(&format!("retry in {:.1}s", backoff.as_secs_f64()));
                    sleep_while_running(backoff, running);
                    backoff = (backoff * 2).min(self.cfg.max_retry_backoff);
                }
            }
        }

        self.info("stopped");
        Ok(())
    }

    /// One full iteration: capture, hand off to the transcoder, sweep.
    pub fn rotate(&mut self, running: &AtomicBool) -> CaptureResult<Segment> {
        let segment = self.capture_segment(running)?;

        self.transcoder.submit(&segment.raw_path, &segment.transcoded_path);

        let now = SystemTime::now();
        for r in self.retentions.iter_mut() {
            r.run(now);
        }

        Ok(segment)
    }

    /// Writes one raw segment. The file is closed on every path out of here.
    pub fn capture_segment(&mut self, running: &AtomicBool) -> CaptureResult<Segment> {
        let stem = segment_stem(&self.clock.wall_now());
        let url = self.source.describe();

        let mut body = self.source.open()?;
        let started = self.clock.monotonic();

        let (paths, sink) = self.store.create(&stem)?;
        let log = self.log.clone().with_segment(&paths.stem);
        log.info(&format!("starting {}", paths.raw.display()));

        let mut out = BufWriter::new(sink);
        let mut buf = vec![0u8; self.cfg.chunk_size.max(1)];
        let mut bytes: u64 = 0;

        let end = loop {
            let n = match body.read(&mut buf) {
                Ok(0) => break SegmentEnd::StreamEnded,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log.warn(&format!("read failed after {} bytes: {}", bytes, e));
                    break SegmentEnd::ReadFailed;
                }
            };

            out.write_all(&buf[..n]).map_err(|e| CaptureError::Write {
                path: paths.raw.clone(),
                source: e,
            })?;
            bytes += n as u64;

            if self.clock.monotonic().saturating_sub(started) > self.cfg.segment_duration {
                break SegmentEnd::DurationElapsed;
            }
            if !running.load(Ordering::Relaxed) {
                break SegmentEnd::Shutdown;
            }
        };

        out.flush().map_err(|e| CaptureError::Write {
            path: paths.raw.clone(),
            source: e,
        })?;
        drop(out);
        drop(body);

        if bytes == 0 {
            if let Err(e) = fs::remove_file(&paths.raw) {
                log.warn(&format!("could not remove empty segment: {}", e));
            }
            return Err(CaptureError::EmptyStream { url });
        }

        log.info(&format!("closed after {} bytes ({:?})", bytes, end));

        Ok(Segment {
            stem: paths.stem,
            raw_path: paths.raw,
            transcoded_path: paths.transcoded,
            bytes,
            end,
        })
    }
}

fn sleep_while_running(total: Duration, running: &AtomicBool) {
    let mut left = total;
    while !left.is_zero() && running.load(Ordering::Relaxed) {
        let step = left.min(BACKOFF_STEP);
        thread::sleep(step);
        left -= step;
    }
}
