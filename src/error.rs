//! Error handling for appframe.
use std::fmt;

use strum_macros::{AsRefStr, EnumString};
use thiserror::Error;

/// Broad classification of every failure the scaffold can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A platform resource (e.g. the main window) could not be created.
    ResourceCreationFailure,
    /// An `Expected` was queried for the variant it does not hold.
    InvalidAccess,
    /// A service lookup happened before the service was provided.
    ServiceNotAvailable,
    /// A service kind was provided twice.
    AlreadyRegistered,
    /// The log sink refused a write or flush.
    SinkWriteFailure,
    /// A lifecycle operation was invoked from the wrong state.
    InvalidState,
    /// The configuration could not be loaded.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// A captured failure: a message, an optional kind and an optional cause.
///
/// Causes nest, so a low-level failure can be re-wrapped into a higher-level
/// one without losing the original text. The chain is exposed through
/// [`std::error::Error::source`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ErrorInfo {
    message: String,
    kind: Option<ErrorKind>,
    #[source]
    cause: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    /// Creates an error without a kind or a cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            cause: None,
        }
    }

    /// Creates an error tagged with `kind`.
    pub fn with_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: Some(kind),
            cause: None,
        }
    }

    /// Attaches `cause` as the underlying failure of `self`.
    pub fn caused_by(mut self, cause: ErrorInfo) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Captures any standard error together with its whole `source()` chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut messages = vec![err.to_string()];
        let mut next = err.source();
        while let Some(source) = next {
            messages.push(source.to_string());
            next = source.source();
        }

        let mut captured: Option<ErrorInfo> = None;
        for message in messages.into_iter().rev() {
            let mut info = ErrorInfo::new(message);
            info.cause = captured.map(Box::new);
            captured = Some(info);
        }
        captured.unwrap_or_else(|| ErrorInfo::new(err.to_string()))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn cause(&self) -> Option<&ErrorInfo> {
        self.cause.as_deref()
    }

    /// Iterates over `self` followed by every nested cause.
    pub fn chain(&self) -> impl Iterator<Item = &ErrorInfo> {
        std::iter::successors(Some(self), |info| info.cause())
    }

    /// Renders the full causal chain as `message: cause: cause`.
    pub fn report(&self) -> String {
        self.chain()
            .map(ErrorInfo::message)
            .collect::<Vec<_>>()
            .join(": ")
    }
}

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error reading the configuration file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing YAML configuration.
    #[error("Invalid YAML format: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A `${VAR}` reference named a variable that is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

impl From<ConfigError> for ErrorInfo {
    fn from(err: ConfigError) -> Self {
        ErrorInfo::with_kind(ErrorKind::Configuration, "unable to load configuration")
            .caused_by(ErrorInfo::from_error(&err))
    }
}
