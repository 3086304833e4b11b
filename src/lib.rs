//! appframe is a minimal application scaffold: it creates a window, runs an
//! event loop and shuts down. Every fallible step returns an
//! [`Expected`](expected::Expected), every lifecycle transition is reported
//! to a thread-safe logger, and services are reached through a process-wide
//! registry.

/// CLI interface.
pub mod cli;

/// Configuration management.
pub mod config;

/// Error handling.
pub mod error;

/// The `Expected<T>` result type.
pub mod expected;

/// The game layer built on the base application.
pub mod game;

/// Application lifecycle state machine.
pub mod lifecycle;

/// Thread-safe logging service and sinks.
pub mod logging;

/// Window and event-queue collaborator.
pub mod platform;

/// Service registry.
pub mod registry;

#[doc(hidden)]
pub mod test_utils;
