//! Application lifecycle: init, run, shutdown.
//!
//! ```text
//! Uninitialized --init--> Initialized --run--> Running --shutdown--> ShutDown
//!        \_______________________shutdown_____________________________/
//! ```
//!
//! `shutdown` is accepted from every state and is idempotent. Specialised
//! applications plug in through [`LifecycleHooks`]; the base work always
//! happens first on init and last on shutdown, so resources are released in
//! the reverse order of acquisition.
use std::{fmt, sync::Arc, thread, time::Duration};

use strum_macros::AsRefStr;
use tracing::debug;

use crate::{
    config::{AppConfig, WindowConfig},
    error::{ErrorInfo, ErrorKind},
    expected::Expected,
    logging::{Logger, Severity},
    platform::{Platform, PlatformEvent, WindowHandle},
    propagate,
    registry::ServiceRegistry,
};

/// Exit code returned when initialization fails.
pub const INIT_FAILURE_EXIT_CODE: i32 = -1;

/// Exit code returned when the event loop ends with an error.
pub const RUN_FAILURE_EXIT_CODE: i32 = -1;

/// Message of the failure reported when the platform cannot create the
/// main window.
pub const MAIN_WINDOW_FAILURE: &str = "unable to create main window";

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AppState {
    Uninitialized,
    Initialized,
    Running,
    ShutDown,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Extension points for a specialised application.
///
/// `on_init` runs after the base initialization succeeded; `on_shutdown`
/// runs before the base releases its window.
pub trait LifecycleHooks {
    fn on_init(&mut self, _logger: &Logger) -> Expected<()> {
        Expected::success(())
    }

    /// Called for every platform event other than `Quit`.
    fn on_event(&mut self, _logger: &Logger, _event: &PlatformEvent) {}

    /// Called once per pass of the event loop that found the queue empty.
    fn on_update(&mut self, _logger: &Logger) -> Expected<()> {
        Expected::success(())
    }

    fn on_shutdown(&mut self, _logger: &Logger, _error: Option<&ErrorInfo>) {}
}

impl LifecycleHooks for () {}

pub struct Application<P: Platform, H: LifecycleHooks = ()> {
    state: AppState,
    platform: P,
    hooks: H,
    window: Option<WindowHandle>,
    window_config: WindowConfig,
    idle_interval: Duration,
    logger: Arc<Logger>,
}

impl<P: Platform> Application<P> {
    pub fn new(platform: P, logger: Arc<Logger>) -> Self {
        Application::with_hooks(platform, (), logger)
    }
}

impl<P: Platform, H: LifecycleHooks> Application<P, H> {
    pub fn with_hooks(platform: P, hooks: H, logger: Arc<Logger>) -> Self {
        let defaults = AppConfig::default();
        let idle_interval = defaults.idle_interval();
        Self {
            state: AppState::Uninitialized,
            platform,
            hooks,
            window: None,
            window_config: defaults.window,
            idle_interval,
            logger,
        }
    }

    /// Builds an application whose logger (and, if provided, configuration)
    /// come from `registry`.
    pub fn from_registry(platform: P, hooks: H, registry: &ServiceRegistry) -> Expected<Self> {
        let logger = propagate!(registry.logger());
        let app = Application::with_hooks(platform, hooks, logger);
        match registry.get::<AppConfig>() {
            Expected::Success(config) => Expected::success(app.configure(&config)),
            Expected::Failure(_) => Expected::success(app),
        }
    }

    /// Applies window and event-loop settings from `config`.
    pub fn configure(mut self, config: &AppConfig) -> Self {
        self.window_config = config.window.clone();
        self.idle_interval = config.idle_interval();
        self
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    /// Creates the main window, then runs the specialised layer's `on_init`.
    ///
    /// On failure the state stays `Uninitialized` and nothing stays acquired.
    pub fn init(&mut self) -> Expected<()> {
        if self.state != AppState::Uninitialized {
            return Expected::failure(ErrorInfo::with_kind(
                ErrorKind::InvalidState,
                format!("init() is not valid in state '{}'", self.state),
            ));
        }

        let window = propagate!(self.platform.create_window(&self.window_config).context(
            ErrorKind::ResourceCreationFailure,
            MAIN_WINDOW_FAILURE
        ));
        self.window = Some(window);
        let _ = self.logger.info("The main window was created.");

        if let Expected::Failure(err) = self.hooks.on_init(&self.logger) {
            self.release_window();
            let kind = err.kind().unwrap_or(ErrorKind::ResourceCreationFailure);
            return Expected::failure(
                ErrorInfo::with_kind(kind, "application layer failed to initialize").caused_by(err),
            );
        }

        self.state = AppState::Initialized;
        let _ = self
            .logger
            .info("The application initialization was successful.");
        Expected::success(())
    }

    /// Drains platform events until a quit arrives and returns its code.
    ///
    /// Blocks the calling thread. Only valid from `Initialized`.
    pub fn run(&mut self) -> Expected<i32> {
        if self.state != AppState::Initialized {
            return Expected::failure(ErrorInfo::with_kind(
                ErrorKind::InvalidState,
                format!(
                    "run() requires an initialized application, state is '{}'",
                    self.state
                ),
            ));
        }

        self.state = AppState::Running;
        let _ = self.logger.debug("Entering the main event loop.");

        loop {
            match self.platform.poll_event() {
                Some(PlatformEvent::Quit(code)) => {
                    let _ = self.logger.log_args(
                        Severity::Debug,
                        format_args!("Quit requested with exit code {code}."),
                    );
                    return Expected::success(code);
                }
                Some(event) => {
                    debug!("Dispatching platform event {event:?}");
                    self.hooks.on_event(&self.logger, &event);
                }
                None => {
                    propagate!(self.hooks.on_update(&self.logger));
                    if self.idle_interval.is_zero() {
                        thread::yield_now();
                    } else {
                        thread::sleep(self.idle_interval);
                    }
                }
            }
        }
    }

    /// Releases everything and moves to `ShutDown`.
    ///
    /// With an error, that error and its whole causal chain are logged at
    /// critical severity. A repeated call releases nothing and only logs an
    /// acknowledgement (or the new error).
    pub fn shutdown(&mut self, error: Option<&ErrorInfo>) {
        if self.state == AppState::ShutDown {
            match error {
                Some(err) => self.log_shutdown_error(err),
                None => {
                    let _ = self
                        .logger
                        .info("Shutdown was already completed; nothing left to release.");
                }
            }
            return;
        }

        self.hooks.on_shutdown(&self.logger, error);
        self.release_window();
        self.state = AppState::ShutDown;

        match error {
            Some(err) => self.log_shutdown_error(err),
            None => {
                let _ = self.logger.info("The application was shut down successfully.");
            }
        }
    }

    /// Shuts down with whatever `outcome` carries.
    pub fn shutdown_with<T>(&mut self, outcome: &Expected<T>) {
        self.shutdown(outcome.failure_info());
    }

    fn log_shutdown_error(&self, err: &ErrorInfo) {
        let _ = self.logger.log_args(
            Severity::Critical,
            format_args!(
                "The application is shutting down with a critical error: {}",
                err.report()
            ),
        );
    }

    fn release_window(&mut self) {
        if let Some(window) = self.window.take() {
            self.platform.destroy_window(window);
        }
    }
}

impl<P: Platform, H: LifecycleHooks> Drop for Application<P, H> {
    fn drop(&mut self) {
        if self.state != AppState::ShutDown {
            self.shutdown(None);
        }
    }
}

/// Drives one complete lifecycle and returns the process exit code.
///
/// `run` is only attempted after a successful `init`; `shutdown` always
/// receives the last outcome.
pub fn execute<P: Platform, H: LifecycleHooks>(app: &mut Application<P, H>) -> i32 {
    let initialized = app.init();
    if let Expected::Failure(err) = &initialized {
        app.shutdown(Some(err));
        return INIT_FAILURE_EXIT_CODE;
    }

    let ran = app.run();
    app.shutdown_with(&ran);
    match ran {
        Expected::Success(code) => code,
        Expected::Failure(_) => RUN_FAILURE_EXIT_CODE,
    }
}
