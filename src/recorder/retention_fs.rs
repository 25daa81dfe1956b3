// src/recorder/retention_fs.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::core::logging::{ComponentLogger, LogContext};
use crate::recorder::RetentionPolicy;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes top-level files of `dir` whose extension is in `extensions` and
/// whose mtime is older than `now - max_age`. Best effort per file.
pub fn sweep(
    dir: &Path,
    extensions: &[String],
    max_age: Duration,
    now: SystemTime,
    log: &LogContext,
) -> SweepStats {
    sweep_with(dir, extensions, max_age, now, log, |path| fs::remove_file(path))
}

/// `sweep` with the deletion step supplied by the caller. A failing `remove`
/// is counted and logged, the remaining candidates are still visited.
pub fn sweep_with<F>(
    dir: &Path,
    extensions: &[String],
    max_age: Duration,
    now: SystemTime,
    log: &LogContext,
    mut remove: F,
) -> SweepStats
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut stats = SweepStats::default();

    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(err) => {
            log.warn(&format!("cannot list {}: {}", dir.display(), err));
            return stats;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if !matches {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        stats.scanned += 1;

        let modified = match metadata.modified() {
            Ok(t) => t,
            Err(err) => {
                log.warn(&format!("no mtime for {}: {}", path.display(), err));
                continue;
            }
        };

        // mtime in the future: duration_since fails, file is kept
        let expired = now
            .duration_since(modified)
            .map(|age| age > max_age)
            .unwrap_or(false);
        if !expired {
            continue;
        }

        match remove(&path) {
            Ok(()) => {
                stats.deleted += 1;
                log.info(&format!("deleted {}", path.display()));
            }
            Err(err) => {
                stats.failed += 1;
                log.warn(&format!("failed to delete {}: {}", path.display(), err));
            }
        }
    }

    stats
}

pub struct FsRetention {
    base_dir: PathBuf,
    extensions: Vec<String>,
    max_age: Duration,
    log: LogContext,
}

impl FsRetention {
    pub fn new(base_dir: PathBuf, extensions: Vec<String>, max_age: Duration, log: LogContext) -> Self {
        Self {
            base_dir,
            extensions,
            max_age,
            log,
        }
    }
}

impl ComponentLogger for FsRetention {
    fn log_context(&self) -> &LogContext {
        &self.log
    }
}

impl RetentionPolicy for FsRetention {
    fn run(&mut self, now: SystemTime) -> SweepStats {
        let stats = sweep(&self.base_dir, &self.extensions, self.max_age, now, &self.log);
        if stats.deleted > 0 || stats.failed > 0 {
            self.debug(&format!(
                "sweep done: scanned={} deleted={} failed={}",
                stats.scanned, stats.deleted, stats.failed
            ));
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mjpeg-archiver-retention-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(dir: &Path, name: &str, mtime: SystemTime) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(mtime).unwrap();
        path
    }

    #[test]
    fn future_mtime_is_kept() {
        let dir = scratch_dir("future");
        let now = SystemTime::now();
        let path = touch(&dir, "clock-skew.mp4", now + Duration::from_secs(3600));

        let stats = sweep(&dir, &["mp4".to_string()], Duration::ZERO, now, &LogContext::new("retention", "test"));

        assert_eq!(stats.deleted, 0);
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn matching_directory_is_skipped() {
        let dir = scratch_dir("subdir");
        let sub = dir.join("nested.mp4");
        fs::create_dir_all(&sub).unwrap();
        let inner = touch(&sub, "deep.mp4", SystemTime::now() - Duration::from_secs(10 * 3600));

        let mut retention = FsRetention::new(
            dir.clone(),
            vec!["mp4".to_string()],
            Duration::from_secs(3600),
            LogContext::new("retention", "test"),
        );
        let stats = retention.run(SystemTime::now());

        assert_eq!(stats, SweepStats::default());
        assert!(sub.is_dir());
        assert!(inner.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
