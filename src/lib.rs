// src/lib.rs
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod io;
pub mod recorder;
/// Test doubles for the recorder seams. Not part of the supported API.
#[doc(hidden)]
pub mod testing;

// Re-export die wichtigsten Typen
pub use crate::core::{CaptureError, Clock, ComponentLogger, LogContext, SystemClock};
pub use crate::recorder::{Segment, SegmentEnd, SegmentRecorder};
