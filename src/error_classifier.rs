use crate::api::error::ApiError;
use crate::logging::LogLevel;

#[derive(Debug, Clone)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Log level for a failed backend call.
    pub fn classify_fetch_error(&self, error: &ApiError) -> LogLevel {
        // Authentication errors - critical
        if error.is_auth_failure() {
            return LogLevel::Error;
        }
        match error {
            // Rate limiting - low priority
            ApiError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            ApiError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Expected user-facing outcomes
            ApiError::Validation(_) => LogLevel::Info,
            ApiError::SampleModeReadOnly(_) => LogLevel::Info,

            // Backend answered with something we cannot read
            ApiError::Decode(_) => LogLevel::Error,

            // Network issues and remaining client errors
            _ => LogLevel::Warn,
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::Mutation;

    fn http(status: u16) -> ApiError {
        ApiError::Http {
            status,
            message: "x".to_string(),
        }
    }

    #[test]
    fn classifies_by_status_and_kind() {
        let classifier = ErrorClassifier::new();
        assert_eq!(classifier.classify_fetch_error(&http(429)), LogLevel::Debug);
        assert_eq!(classifier.classify_fetch_error(&http(503)), LogLevel::Warn);
        assert_eq!(classifier.classify_fetch_error(&http(401)), LogLevel::Error);
        assert_eq!(classifier.classify_fetch_error(&http(403)), LogLevel::Error);
        assert_eq!(classifier.classify_fetch_error(&http(404)), LogLevel::Warn);
        assert_eq!(
            classifier.classify_fetch_error(&ApiError::SampleModeReadOnly(Mutation::DeleteTip)),
            LogLevel::Info
        );
        assert_eq!(
            classifier.classify_fetch_error(&ApiError::Validation(vec!["bad".into()])),
            LogLevel::Info
        );
    }
}
