// src/core/logging.rs
//
// Every component gets its own LogContext at construction time and logs
// through it. The backend (env_logger) is installed exactly once by `init`.

use std::io::Write;

#[derive(Debug, Clone)]
pub struct LogContext {
    pub component: String,
    pub instance_id: String,
    pub segment: Option<String>,
}

impl LogContext {
    pub fn new(component: &str, instance_id: &str) -> Self {
        Self {
            component: component.to_string(),
            instance_id: instance_id.to_string(),
            segment: None,
        }
    }

    pub fn with_segment(mut self, stem: &str) -> Self {
        self.segment = Some(stem.to_string());
        self
    }

    pub fn format(&self, message: &str) -> String {
        let segment_info = match &self.segment {
            Some(stem) => format!(" segment={}", stem),
            None => String::new(),
        };

        format!(
            "[{}:{}{}] {}",
            self.component, self.instance_id, segment_info, message
        )
    }

    pub fn debug(&self, message: &str) {
        log::debug!("{}", self.format(message));
    }

    pub fn info(&self, message: &str) {
        log::info!("{}", self.format(message));
    }

    pub fn warn(&self, message: &str) {
        log::warn!("{}", self.format(message));
    }

    pub fn error(&self, message: &str) {
        log::error!("{}", self.format(message));
    }
}

// Helper Trait für einheitliches Logging
pub trait ComponentLogger {
    fn log_context(&self) -> &LogContext;

    fn debug(&self, message: &str) {
        self.log_context().debug(message);
    }

    fn info(&self, message: &str) {
        self.log_context().info(message);
    }

    fn warn(&self, message: &str) {
        self.log_context().warn(message);
    }

    fn error(&self, message: &str) {
        self.log_context().error(message);
    }
}

/// Installs the process-wide backend. `RUST_LOG` wins over `default_level`.
pub fn init(default_level: &str) {
    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();

    if let Err(e) = result {
        eprintln!("[logging] backend already installed: {}", e);
    }
}

pub fn shutdown() {
    log::logger().flush();
    let _ = std::io::stderr().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new("recorder", "cam");

        assert_eq!(ctx.component, "recorder");
        assert_eq!(ctx.instance_id, "cam");
        assert!(ctx.segment.is_none());
    }

    #[test]
    fn test_log_formatting() {
        let ctx = LogContext::new("retention", "mp4");
        assert_eq!(ctx.format("deleted old.mp4"), "[retention:mp4] deleted old.mp4");

        let ctx = ctx.with_segment("2026-10-19_12-00-00");
        let formatted = ctx.format("starting");
        assert!(formatted.contains("segment=2026-10-19_12-00-00"));
        assert!(formatted.ends_with("starting"));
    }

    #[test]
    fn test_component_logger_trait() {
        struct MockComponent {
            log: LogContext,
        }

        impl ComponentLogger for MockComponent {
            fn log_context(&self) -> &LogContext {
                &self.log
            }
        }

        let component = MockComponent {
            log: LogContext::new("Mock", "test_001"),
        };
        component.info("hello");

        assert_eq!(component.log_context().component, "Mock");
        assert_eq!(component.log_context().instance_id, "test_001");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init("debug");
        init("info");
        shutdown();
    }
}
