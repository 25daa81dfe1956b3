use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Time source for the capture loop. Wall time names segments, the monotonic
/// reading drives the duration cutoff.
pub trait Clock: Send + Sync {
    fn wall_now(&self) -> DateTime<Local>;
    fn monotonic(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn wall_now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

pub const SECS_PER_HOUR: u64 = 3600;

/// Saturates instead of overflowing; config validation rejects such values.
pub fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(SECS_PER_HOUR))
}
