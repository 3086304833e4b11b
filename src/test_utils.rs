//! Helpers shared by unit and integration tests.
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::logging::{Logger, MemorySink};

/// Serialises tests that read or modify environment variables.
pub static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A logger writing into a fresh [`MemorySink`], plus a handle to inspect it.
pub fn memory_logger() -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    (Logger::new(Box::new(sink.clone())), sink)
}
