// src/recorder/transcode.rs
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use crate::core::logging::{ComponentLogger, LogContext};
use crate::recorder::SegmentTranscoder;

/// Runs `<program> -i <raw> -vcodec <codec> -pix_fmt <format> <output>` as a
/// detached task: no completion report, no output check, no retry, no bound
/// on how many run at once.
pub struct FfmpegTranscoder {
    program: PathBuf,
    video_codec: String,
    pixel_format: String,
    log: LogContext,
}

impl FfmpegTranscoder {
    pub fn new(
        program: impl Into<PathBuf>,
        video_codec: impl Into<String>,
        pixel_format: impl Into<String>,
        log: LogContext,
    ) -> Self {
        Self {
            program: program.into(),
            video_codec: video_codec.into(),
            pixel_format: pixel_format.into(),
            log,
        }
    }

    pub fn command_args(&self, raw: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            raw.as_os_str().to_owned(),
            "-vcodec".into(),
            self.video_codec.clone().into(),
            "-pix_fmt".into(),
            self.pixel_format.clone().into(),
            output.as_os_str().to_owned(),
        ]
    }

    fn command_line(&self, args: &[OsString]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn detach(&self, mut child: Child, output: &Path) {
        let log = self.log.clone();
        let output = output.to_path_buf();
        let pid = child.id();

        let reaper = thread::Builder::new()
            .name(format!("transcode-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => {
                    log.debug(&format!("pid {} finished {}", pid, output.display()));
                }
                Ok(status) => {
                    log.warn(&format!("pid {} exited with {} for {}", pid, status, output.display()));
                }
                Err(e) => {
                    log.warn(&format!("pid {} could not be awaited: {}", pid, e));
                }
            });

        if let Err(e) = reaper {
            self.warn(&format!("no reaper thread for pid {}: {}", pid, e));
        }
    }
}

impl ComponentLogger for FfmpegTranscoder {
    fn log_context(&self) -> &LogContext {
        &self.log
    }
}

impl SegmentTranscoder for FfmpegTranscoder {
    fn submit(&self, raw: &Path, output: &Path) {
        let args = self.command_args(raw, output);
        self.info(&self.command_line(&args));

        let spawned = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => self.detach(child, output),
            Err(e) => self.error(&format!(
                "failed to launch {} for {}: {}",
                self.program.display(),
                raw.display(),
                e
            )),
        }
    }
}
