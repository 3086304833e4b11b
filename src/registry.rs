//! Process-wide service registry.
//!
//! Every service kind owns a write-once slot. Slots are allocated when the
//! registry is built, so a lookup never takes a lock; the first successful
//! [`ServiceRegistry::provide`] happens-before every [`ServiceRegistry::get`]
//! that observes it.
use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::{
    config::AppConfig,
    error::{ErrorInfo, ErrorKind},
    expected::Expected,
    logging::Logger,
};

/// The kinds of service the registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ServiceKind {
    Logger,
    Config,
}

/// A type that can be stored in the registry under a fixed kind.
pub trait Service: Any + Send + Sync {
    const KIND: ServiceKind;
}

impl Service for Logger {
    const KIND: ServiceKind = ServiceKind::Logger;
}

impl Service for AppConfig {
    const KIND: ServiceKind = ServiceKind::Config;
}

impl ServiceKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

type Slot = OnceLock<Arc<dyn Any + Send + Sync>>;

/// Holds at most one instance of each [`ServiceKind`].
pub struct ServiceRegistry {
    slots: HashMap<ServiceKind, Slot>,
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self {
            slots: ServiceKind::iter().map(|kind| (kind, Slot::new())).collect(),
        }
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let provided: Vec<&'static str> = ServiceKind::iter()
            .filter(|kind| self.is_provided(*kind))
            .map(ServiceKind::name)
            .collect();
        f.debug_struct("ServiceRegistry")
            .field("provided", &provided)
            .finish()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static ServiceRegistry {
        static GLOBAL: OnceLock<ServiceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ServiceRegistry::new)
    }

    fn slot(&self, kind: ServiceKind) -> &Slot {
        // Every kind gets a slot in `default()`.
        &self.slots[&kind]
    }

    /// Registers `instance` under `S::KIND`. A kind can be provided once;
    /// later attempts fail with `AlreadyRegistered` and leave the first
    /// instance in place.
    pub fn provide<S: Service>(&self, instance: Arc<S>) -> Expected<()> {
        let instance: Arc<dyn Any + Send + Sync> = instance;
        match self.slot(S::KIND).set(instance) {
            Ok(()) => Expected::success(()),
            Err(_) => Expected::failure(ErrorInfo::with_kind(
                ErrorKind::AlreadyRegistered,
                format!("service '{}' is already registered", S::KIND.name()),
            )),
        }
    }

    /// Returns a shared handle to the instance registered under `S::KIND`.
    pub fn get<S: Service>(&self) -> Expected<Arc<S>> {
        let not_available = || {
            ErrorInfo::with_kind(
                ErrorKind::ServiceNotAvailable,
                format!("service '{}' is not available", S::KIND.name()),
            )
        };

        match self.slot(S::KIND).get() {
            Some(instance) => Arc::clone(instance)
                .downcast::<S>()
                .map_err(|_| not_available())
                .into(),
            None => Expected::failure(not_available()),
        }
    }

    pub fn is_provided(&self, kind: ServiceKind) -> bool {
        self.slot(kind).get().is_some()
    }

    /// Shorthand for `get::<Logger>()`.
    pub fn logger(&self) -> Expected<Arc<Logger>> {
        self.get::<Logger>()
    }
}
