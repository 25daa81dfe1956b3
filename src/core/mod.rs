pub mod error;
pub mod logging;
pub mod timestamp;

pub use error::{CaptureError, CaptureResult, ConfigError};
pub use logging::{ComponentLogger, LogContext};
pub use timestamp::{Clock, SystemClock};
