//! Window and event-queue collaborator.
//!
//! The lifecycle only needs three things from a platform: create a window,
//! destroy it, and hand out pending events. [`HeadlessPlatform`] provides
//! them without a display server.
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::{
    config::WindowConfig,
    error::{ErrorInfo, ErrorKind},
    expected::Expected,
};

/// Opaque identifier of a platform window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// An event drained from the platform queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The application should leave its event loop with this exit code.
    Quit(i32),
    Resize { width: u32, height: u32 },
    Input(String),
}

/// The services the lifecycle consumes from the windowing layer.
pub trait Platform {
    fn create_window(&mut self, config: &WindowConfig) -> Expected<WindowHandle>;

    fn destroy_window(&mut self, handle: WindowHandle);

    /// Returns the next pending event, or `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<PlatformEvent>;
}

/// Cloneable handle for pushing events into a [`HeadlessPlatform`] from any
/// thread.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<PlatformEvent>);

impl EventSender {
    /// Queues `event`. Returns `false` once the platform is gone.
    pub fn send(&self, event: PlatformEvent) -> bool {
        self.0.send(event).is_ok()
    }

    pub fn quit(&self, code: i32) -> bool {
        self.send(PlatformEvent::Quit(code))
    }
}

/// A platform without a display: windows are bookkeeping entries and events
/// arrive through an in-process queue.
#[derive(Debug)]
pub struct HeadlessPlatform {
    sender: Sender<PlatformEvent>,
    events: Receiver<PlatformEvent>,
    refuse_windows: bool,
    next_id: u64,
    created: usize,
    destroyed: usize,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            sender,
            events,
            refuse_windows: false,
            next_id: 1,
            created: 0,
            destroyed: 0,
        }
    }

    /// Makes every `create_window` call fail.
    pub fn refusing_windows(mut self) -> Self {
        self.refuse_windows = true;
        self
    }

    /// Queues `events` ahead of anything sent later.
    pub fn with_events(self, events: impl IntoIterator<Item = PlatformEvent>) -> Self {
        for event in events {
            let _ = self.sender.send(event);
        }
        self
    }

    pub fn event_sender(&self) -> EventSender {
        EventSender(self.sender.clone())
    }

    pub fn windows_created(&self) -> usize {
        self.created
    }

    pub fn windows_destroyed(&self) -> usize {
        self.destroyed
    }
}

impl Platform for HeadlessPlatform {
    fn create_window(&mut self, config: &WindowConfig) -> Expected<WindowHandle> {
        if self.refuse_windows {
            return Expected::failure(ErrorInfo::with_kind(
                ErrorKind::ResourceCreationFailure,
                format!("headless backend refused window '{}'", config.title),
            ));
        }

        let handle = WindowHandle(self.next_id);
        self.next_id += 1;
        self.created += 1;
        debug!(
            "Created headless window #{} '{}' ({}x{})",
            handle.id(),
            config.title,
            config.width,
            config.height
        );
        Expected::success(handle)
    }

    fn destroy_window(&mut self, handle: WindowHandle) {
        self.destroyed += 1;
        debug!("Destroyed headless window #{}", handle.id());
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.events.try_recv().ok()
    }
}
