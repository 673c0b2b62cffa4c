//! Mapping of gateway errors onto HTTP responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::Error;

/// Error returned by API handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    /// Status code and client-facing message for the wrapped error
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::MalformedRequest(msg) => {
                (StatusCode::BAD_REQUEST, format!("invalid request body: {msg}"))
            }
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Upstream(_) | Error::Http(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream request failed".to_string(),
            ),
            Error::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();

        if self.0.is_client_error() {
            tracing::debug!(error = %self.0, "rejected request");
        } else {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(ErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Validation("message is required".into()), StatusCode::BAD_REQUEST),
            (Error::MalformedRequest("eof".into()), StatusCode::BAD_REQUEST),
            (Error::Config("API key not configured".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Upstream("invalid API response".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_and_message().0, expected);
        }
    }

    #[test]
    fn test_upstream_details_are_hidden() {
        let (_, message) =
            ApiError(Error::Upstream("API error: 401 - bad key sk-123".into())).status_and_message();
        assert_eq!(message, "upstream request failed");
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let (_, message) =
            ApiError(Error::Validation("message is required".into())).status_and_message();
        assert_eq!(message, "message is required");
    }
}
