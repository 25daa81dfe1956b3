use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::info;

use crate::config::Config;
use crate::core::logging::LogContext;
use crate::core::timestamp::SystemClock;
use crate::io::http_in::{Credentials, HttpSource};
use crate::recorder::{FfmpegTranscoder, FsRetention, RetentionPolicy, SegmentRecorder};

/// Wires the capture loop from a validated config. Creates the output
/// directory if needed.
pub fn build_recorder(cfg: &Config) -> anyhow::Result<SegmentRecorder> {
    let dir = cfg.recorder.directory.clone();
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let source = HttpSource::new(
        cfg.stream.url.clone(),
        Credentials::new(cfg.stream.login.clone(), cfg.stream.password.clone()),
        Duration::from_secs(cfg.stream.connect_timeout_secs),
        Duration::from_secs(cfg.stream.read_timeout_secs),
    );

    let transcoder = FfmpegTranscoder::new(
        cfg.transcoder.program.clone(),
        cfg.transcoder.video_codec.clone(),
        cfg.transcoder.pixel_format.clone(),
        LogContext::new("transcoder", &cfg.transcoder.output_extension),
    );

    let retentions: Vec<Box<dyn RetentionPolicy>> = vec![
        Box::new(FsRetention::new(
            dir.clone(),
            cfg.retention.recordings_extensions.clone(),
            cfg.recordings_max_age(),
            LogContext::new("retention", "recordings"),
        )),
        Box::new(FsRetention::new(
            dir.clone(),
            vec![cfg.recorder.raw_extension.clone()],
            cfg.raw_max_age(),
            LogContext::new("retention", "raw"),
        )),
    ];

    info!(
        "[bootstrap] retention: {:?} {}h, {} {}h",
        cfg.retention.recordings_extensions,
        cfg.retention.recordings_hours,
        cfg.recorder.raw_extension,
        cfg.retention.raw_hours
    );

    Ok(SegmentRecorder::new(
        cfg.recorder_config(),
        Box::new(source),
        Box::new(transcoder),
        retentions,
        Arc::new(SystemClock::new()),
        LogContext::new("recorder", host_of(&cfg.stream.url)),
    ))
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let authority = rest.split('/').next().unwrap_or(rest);
    authority.rsplit('@').next().unwrap_or(authority)
}
