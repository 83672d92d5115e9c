//! Span and event helpers shared by controllers and services.

use tracing::Span;

/// Span for a business operation.
///
/// ```ignore
/// let span = business_span!("enrollment.commit", course.id = %course_id);
/// ```
#[macro_export]
macro_rules! business_span {
    ($operation:expr) => {
        tracing::info_span!(
            $operation,
            span.status = tracing::field::Empty,
            error.message = tracing::field::Empty
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            $operation,
            span.status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Span for credential and role checks.
#[macro_export]
macro_rules! auth_span {
    ($event:expr, $($field:tt)*) => {
        tracing::info_span!(
            "auth",
            auth.event = $event,
            auth.success = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Security-relevant event at WARN level (rejected credentials, denials).
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {
        tracing::warn!(
            security.event = $event,
            $($field)*
        )
    };
}

/// Audit event at INFO level (role changes, moderation, enrollments).
#[macro_export]
macro_rules! audit_event {
    ($action:expr, $resource:expr, $($field:tt)*) => {
        tracing::info!(
            audit.action = $action,
            audit.resource = $resource,
            $($field)*
        )
    };
}

pub fn record_success() {
    Span::current().record("span.status", "OK");
}

pub fn record_error(message: &str) {
    let span = Span::current();
    span.record("span.status", "ERROR");
    span.record("error.message", message);
}

pub fn record_auth_result(success: bool) {
    Span::current().record("auth.success", success);
}

/// Logs the error (if any) and hands the result back unchanged.
pub trait ErrorExt {
    fn log_error(self, context: &str) -> Self;
}

impl<T, E: std::fmt::Display> ErrorExt for Result<T, E> {
    fn log_error(self, context: &str) -> Self {
        if let Err(ref e) = self {
            tracing::error!(error = %e, context = context, "Operation failed");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_helpers_without_span() {
        record_success();
        record_error("test error");
        record_auth_result(false);
    }

    #[test]
    fn test_log_error_passes_result_through() {
        let ok: Result<u8, String> = Ok(3);
        assert_eq!(ok.log_error("ctx"), Ok(3));

        let err: Result<u8, String> = Err("boom".to_string());
        assert_eq!(err.log_error("ctx"), Err("boom".to_string()));
    }
}
