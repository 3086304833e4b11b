//! The game layer stacked on top of the base application.
use crate::{
    error::ErrorInfo,
    expected::Expected,
    lifecycle::LifecycleHooks,
    logging::{Logger, Severity},
    platform::PlatformEvent,
};

/// Counts frames and events; reports its own init and teardown.
#[derive(Debug, Default)]
pub struct GameLayer {
    frames: u64,
    events: u64,
}

impl GameLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of idle passes the event loop made.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn events(&self) -> u64 {
        self.events
    }
}

impl LifecycleHooks for GameLayer {
    fn on_init(&mut self, logger: &Logger) -> Expected<()> {
        let _ = logger.info("Game initialization was successful.");
        Expected::success(())
    }

    fn on_event(&mut self, logger: &Logger, event: &PlatformEvent) {
        self.events += 1;
        if let PlatformEvent::Resize { width, height } = event {
            let _ = logger.log_args(
                Severity::Debug,
                format_args!("Game viewport resized to {width}x{height}."),
            );
        }
    }

    fn on_update(&mut self, _logger: &Logger) -> Expected<()> {
        self.frames += 1;
        Expected::success(())
    }

    fn on_shutdown(&mut self, logger: &Logger, error: Option<&ErrorInfo>) {
        let _ = logger.log_args(
            Severity::Debug,
            format_args!(
                "Game layer stopping after {} frames and {} events (error: {}).",
                self.frames,
                self.events,
                error.is_some()
            ),
        );
    }
}
