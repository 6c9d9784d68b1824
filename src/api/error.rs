//! Error handling for the backend API

use crate::models::ErrorBody;
use thiserror::Error;

/// Mutations that are refused while the dashboard shows sample data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display)]
pub enum Mutation {
    #[strum(to_string = "create tip")]
    CreateTip,
    #[strum(to_string = "delete tip")]
    DeleteTip,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the backend's `error` field when present.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Field errors reported by the backend for a tip submission.
    #[error("Validation errors: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Mutation attempted while in sample mode; rejected before any request.
    #[error("Operation not permitted in sample mode: {0}")]
    SampleModeReadOnly(Mutation),

    /// The response body did not match the expected payload.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub const UNKNOWN_ERROR: &str = "Unknown error";

impl ApiError {
    pub async fn from_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::from_status_and_body(status, &body)
    }

    /// Interprets a failed response body: `{errors: [...]}` on a 4xx is a validation
    /// failure, otherwise `{error}` becomes the message.
    pub fn from_status_and_body(status: u16, body: &str) -> ApiError {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            if (400..=499).contains(&status) {
                return ApiError::Validation(errors);
            }
            return ApiError::Http {
                status,
                message: errors.join(", "),
            };
        }

        let message = parsed
            .error
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        ApiError::Http { status, message }
    }

    /// Text suitable for showing to the user without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Network(e) => e.to_string(),
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Validation(errors) => errors.join(", "),
            ApiError::SampleModeReadOnly(mutation) => {
                format!("cannot {} in sample mode", mutation)
            }
            ApiError::Decode(e) => e.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 401 or 403 from the backend.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}
