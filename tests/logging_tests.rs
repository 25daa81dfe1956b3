use mjpeg_archiver::{ComponentLogger, LogContext};

#[test]
fn test_log_context_creation() {
    let ctx = LogContext::new("recorder", "camera.local");

    assert_eq!(ctx.component, "recorder");
    assert_eq!(ctx.instance_id, "camera.local");
    assert!(ctx.segment.is_none());
}

#[test]
fn test_log_context_with_segment() {
    let ctx = LogContext::new("recorder", "cam").with_segment("2026-10-19_12-00-00");

    assert_eq!(ctx.segment, Some("2026-10-19_12-00-00".to_string()));
}

#[test]
fn test_log_formatting() {
    let ctx = LogContext::new("retention", "raw");
    let formatted = ctx.format("deleted /srv/cam/a.mjpeg");

    assert!(formatted.contains("[retention:raw]"));
    assert!(formatted.contains("deleted /srv/cam/a.mjpeg"));

    // Mit Segment
    let with_segment = ctx.with_segment("2026-10-19_12-00-00");
    assert!(with_segment.format("starting").contains("segment=2026-10-19_12-00-00"));
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
    component.warn("just checking");

    assert_eq!(component.log_context().component, "Mock");
    assert_eq!(component.log_context().instance_id, "test_001");
}
