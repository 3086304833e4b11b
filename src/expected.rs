//! The `Expected<T>` result type used at every fallible boundary.
use crate::error::{ErrorInfo, ErrorKind};

/// Either a successful payload or a captured [`ErrorInfo`].
///
/// Expected failure modes (a window that cannot be created, a service that
/// is not available yet) travel through this type. Misusing it, i.e. asking
/// a `Failure` for its payload, is a bug in the caller and panics.
#[must_use = "an Expected must be checked, propagated or logged"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected<T> {
    Success(T),
    Failure(ErrorInfo),
}

/// Returns early with the failure held by an `Expected`, or evaluates to its
/// payload.
///
/// Usable inside any function returning `Expected<U>`.
#[macro_export]
macro_rules! propagate {
    ($expr:expr) => {
        match $expr {
            $crate::expected::Expected::Success(value) => value,
            $crate::expected::Expected::Failure(err) => {
                return $crate::expected::Expected::Failure(err);
            }
        }
    };
}

impl<T> Expected<T> {
    pub fn success(value: T) -> Self {
        Expected::Success(value)
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Expected::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Expected::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Expected::Failure(_))
    }

    /// Returns the payload, or an `InvalidAccess` error if this is a failure.
    pub fn try_value(&self) -> Result<&T, ErrorInfo> {
        match self {
            Expected::Success(value) => Ok(value),
            Expected::Failure(err) => Err(invalid_access("value", "failure").caused_by(err.clone())),
        }
    }

    /// Returns the error, or an `InvalidAccess` error if this is a success.
    pub fn try_error(&self) -> Result<&ErrorInfo, ErrorInfo> {
        match self {
            Expected::Success(_) => Err(invalid_access("error", "success")),
            Expected::Failure(err) => Ok(err),
        }
    }

    /// Returns the payload.
    ///
    /// # Panics
    /// Panics with an `invalid access` message when called on a failure.
    #[track_caller]
    pub fn value(&self) -> &T {
        match self.try_value() {
            Ok(value) => value,
            Err(err) => panic!("{}", err.report()),
        }
    }

    /// Consumes `self` and returns the payload.
    ///
    /// # Panics
    /// Panics with an `invalid access` message when called on a failure.
    #[track_caller]
    pub fn into_value(self) -> T {
        match self {
            Expected::Success(value) => value,
            Expected::Failure(err) => {
                panic!("{}", invalid_access("value", "failure").caused_by(err).report())
            }
        }
    }

    /// Returns the captured error.
    ///
    /// # Panics
    /// Panics with an `invalid access` message when called on a success.
    #[track_caller]
    pub fn error(&self) -> &ErrorInfo {
        match self.try_error() {
            Ok(err) => err,
            Err(err) => panic!("{}", err.report()),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        self.into()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Expected<U> {
        match self {
            Expected::Success(value) => Expected::Success(f(value)),
            Expected::Failure(err) => Expected::Failure(err),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Expected<U>) -> Expected<U> {
        match self {
            Expected::Success(value) => f(value),
            Expected::Failure(err) => Expected::Failure(err),
        }
    }

    /// Re-wraps a failure into a higher-level one; the original error becomes
    /// its cause.
    pub fn context(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        match self {
            Expected::Success(value) => Expected::Success(value),
            Expected::Failure(err) => {
                Expected::Failure(ErrorInfo::with_kind(kind, message).caused_by(err))
            }
        }
    }

    /// Drops the payload, keeping only the success/failure outcome.
    pub fn discard(self) -> Expected<()> {
        self.map(|_| ())
    }

    pub fn as_ref(&self) -> Expected<&T> {
        match self {
            Expected::Success(value) => Expected::Success(value),
            Expected::Failure(err) => Expected::Failure(err.clone()),
        }
    }

    /// The error if this is a failure.
    pub fn failure_info(&self) -> Option<&ErrorInfo> {
        match self {
            Expected::Success(_) => None,
            Expected::Failure(err) => Some(err),
        }
    }
}

fn invalid_access(requested: &str, held: &str) -> ErrorInfo {
    ErrorInfo::with_kind(
        ErrorKind::InvalidAccess,
        format!("invalid access: requested the {requested} of a {held}"),
    )
}

impl<T, E> From<Result<T, E>> for Expected<T>
where
    E: Into<ErrorInfo>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Expected::Success(value),
            Err(err) => Expected::Failure(err.into()),
        }
    }
}

impl<T> From<Expected<T>> for Result<T, ErrorInfo> {
    fn from(expected: Expected<T>) -> Self {
        match expected {
            Expected::Success(value) => Ok(value),
            Expected::Failure(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_port(raw: &str) -> Expected<u16> {
        raw.parse::<u16>()
            .map_err(|e| ErrorInfo::new(format!("bad port '{raw}'")).caused_by(ErrorInfo::from_error(&e)))
            .into()
    }

    fn sum_ports(a: &str, b: &str) -> Expected<u32> {
        let a = propagate!(parse_port(a));
        let b = propagate!(parse_port(b));
        Expected::success(u32::from(a) + u32::from(b))
    }

    #[test]
    fn success_holds_its_value() {
        let expected = Expected::success(7);
        assert!(expected.is_success());
        assert!(!expected.is_failure());
        assert_eq!(*expected.value(), 7);
    }

    #[test]
    fn failure_holds_its_error() {
        let err = ErrorInfo::with_kind(ErrorKind::ResourceCreationFailure, "no window");
        let expected: Expected<i32> = Expected::failure(err.clone());
        assert!(expected.is_failure());
        assert_eq!(expected.error(), &err);
    }

    #[test]
    fn try_value_on_failure_reports_invalid_access() {
        let expected: Expected<i32> = Expected::failure(ErrorInfo::new("boom"));
        let err = expected.try_value().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidAccess));
        assert!(err.report().contains("boom"));
    }

    #[test]
    fn try_error_on_success_reports_invalid_access() {
        let expected = Expected::success("ok");
        let err = expected.try_error().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvalidAccess));
    }

    #[test]
    #[should_panic(expected = "invalid access")]
    fn value_on_failure_panics() {
        let expected: Expected<i32> = Expected::failure(ErrorInfo::new("boom"));
        let _ = expected.value();
    }

    #[test]
    #[should_panic(expected = "invalid access")]
    fn error_on_success_panics() {
        let _ = Expected::success(1).error();
    }

    #[test]
    fn propagate_returns_first_failure_unchanged() {
        assert_eq!(sum_ports("80", "443"), Expected::success(523));

        let first = sum_ports("eighty", "nope");
        assert_eq!(first.error().message(), "bad port 'eighty'");
    }

    #[test]
    fn context_keeps_the_original_as_cause() {
        let wrapped: Expected<()> = Expected::failure(ErrorInfo::new("disk full"))
            .context(ErrorKind::SinkWriteFailure, "could not write log line");

        let err = wrapped.error();
        assert_eq!(err.kind(), Some(ErrorKind::SinkWriteFailure));
        assert_eq!(err.report(), "could not write log line: disk full");
    }

    #[test]
    fn and_then_stops_at_the_first_failure() {
        let mut called = false;
        let failed: Expected<u16> = Expected::failure(ErrorInfo::new("first"));
        let chained = failed.and_then(|port| {
            called = true;
            Expected::success(port + 1)
        });

        assert!(!called);
        assert_eq!(chained, Expected::failure(ErrorInfo::new("first")));
        assert_eq!(parse_port("80").and_then(|port| Expected::success(port + 1)), Expected::success(81));
    }

    #[test]
    fn into_result_works_with_question_mark() {
        fn doubled(raw: &str) -> Result<u32, ErrorInfo> {
            let port = parse_port(raw).into_result()?;
            Ok(u32::from(port) * 2)
        }

        assert_eq!(doubled("21"), Ok(42));
        assert_eq!(doubled("nope").unwrap_err().message(), "bad port 'nope'");
    }

    #[test]
    fn as_ref_keeps_the_variant_without_consuming() {
        let owned = Expected::success(String::from("window"));
        assert_eq!(owned.as_ref().map(|s| s.len()), Expected::success(6));
        assert_eq!(owned.value(), "window");

        let failed: Expected<String> = Expected::failure(ErrorInfo::new("gone"));
        assert_eq!(failed.as_ref().error().message(), "gone");
        assert!(failed.is_failure());
    }

    #[test]
    fn discard_preserves_the_outcome() {
        assert!(Expected::success(42).discard().is_success());
        let failed: Expected<i32> = Expected::failure(ErrorInfo::new("x"));
        assert_eq!(failed.discard().error().message(), "x");
    }
}
