use std::sync::Arc;

use appframe::{
    config::AppConfig,
    error::ErrorKind,
    expected::Expected,
    game::GameLayer,
    lifecycle::{AppState, Application, INIT_FAILURE_EXIT_CODE, MAIN_WINDOW_FAILURE, execute},
    logging::{Logger, MemorySink},
    platform::{HeadlessPlatform, PlatformEvent},
    registry::ServiceRegistry,
};

fn registry_with_memory_logger() -> (ServiceRegistry, MemorySink) {
    let sink = MemorySink::new();
    let registry = ServiceRegistry::new();
    let logger = Logger::new(Box::new(sink.clone()));
    logger.register_thread_label("mainThread");
    assert!(registry.provide(Arc::new(logger)).is_success());
    assert!(
        registry
            .provide(Arc::new(AppConfig {
                idle_interval_ms: 0,
                ..AppConfig::default()
            }))
            .is_success()
    );
    (registry, sink)
}

#[test]
fn window_failure_ends_in_one_critical_message_and_minus_one() {
    let (registry, sink) = registry_with_memory_logger();
    let platform = HeadlessPlatform::new().refusing_windows();
    let mut app = Application::from_registry(platform, GameLayer::new(), &registry).into_value();

    let initialized = app.init();
    assert!(initialized.is_failure());
    assert_eq!(initialized.error().message(), MAIN_WINDOW_FAILURE);
    assert_eq!(app.state(), AppState::Uninitialized);

    app.shutdown_with(&initialized);

    let critical = sink.matching("CRITICAL");
    assert_eq!(critical.len(), 1);
    assert!(critical[0].contains(MAIN_WINDOW_FAILURE));
    assert!(sink.matching("Game initialization").is_empty());
}

#[test]
fn execute_maps_window_failure_to_minus_one() {
    let (registry, _sink) = registry_with_memory_logger();
    let platform = HeadlessPlatform::new().refusing_windows();
    let mut app = Application::from_registry(platform, GameLayer::new(), &registry).into_value();

    assert_eq!(execute(&mut app), INIT_FAILURE_EXIT_CODE);
    assert_eq!(INIT_FAILURE_EXIT_CODE, -1);
    assert_eq!(app.state(), AppState::ShutDown);
}

#[test]
fn quit_event_with_42_ends_in_one_info_shutdown_and_exit_42() {
    let (registry, sink) = registry_with_memory_logger();
    let platform = HeadlessPlatform::new().with_events([PlatformEvent::Quit(42)]);
    let mut app = Application::from_registry(platform, GameLayer::new(), &registry).into_value();

    assert!(app.init().is_success());
    let ran = app.run();
    assert_eq!(ran, Expected::success(42));

    app.shutdown_with(&ran);

    let shutdown = sink.matching("shut down successfully");
    assert_eq!(shutdown.len(), 1);
    assert!(shutdown[0].contains("INFO"));
    assert!(sink.matching("CRITICAL").is_empty());
    assert_eq!(ran.into_value(), 42);
}

#[test]
fn lifecycle_logging_goes_through_the_registered_logger() {
    let (registry, sink) = registry_with_memory_logger();
    let platform = HeadlessPlatform::new().with_events([PlatformEvent::Quit(0)]);
    let mut app = Application::from_registry(platform, GameLayer::new(), &registry).into_value();

    assert_eq!(execute(&mut app), 0);
    assert!(Arc::ptr_eq(app.logger(), &registry.logger().into_value()));
    assert!(sink.lines().iter().all(|line| line.contains("[mainThread]")));
}

#[test]
fn run_is_rejected_after_shutdown() {
    let (registry, _sink) = registry_with_memory_logger();
    let mut app =
        Application::from_registry(HeadlessPlatform::new(), GameLayer::new(), &registry).into_value();

    assert!(app.init().is_success());
    app.shutdown(None);

    let ran = app.run();
    assert_eq!(ran.error().kind(), Some(ErrorKind::InvalidState));
    assert_eq!(app.platform().windows_destroyed(), 1);
}
