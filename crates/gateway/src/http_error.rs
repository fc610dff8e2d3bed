//! HTTP error handling
//!
//! Every failure leaves the gateway as `{ message, code }` with the status
//! derived from the code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use shared::OkrError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "UNAUTHENTICATED" | "INVALID_CREDENTIALS" => StatusCode::UNAUTHORIZED,
            "PERMISSION_DENIED" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" | "PERIOD_CLOSED" => StatusCode::CONFLICT,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "TOO_MANY_ATTEMPTS" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        }
        (status, Json(self)).into_response()
    }
}

impl From<OkrError> for HttpError {
    fn from(err: OkrError) -> Self {
        HttpError::new(err.to_string(), err.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_per_error() {
        let cases = [
            (OkrError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (OkrError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (OkrError::not_found("User", "x"), StatusCode::NOT_FOUND),
            (OkrError::conflict("User", "x"), StatusCode::CONFLICT),
            (OkrError::PeriodClosed("HK0".to_string()), StatusCode::CONFLICT),
            (OkrError::validation("bad"), StatusCode::BAD_REQUEST),
            (
                OkrError::TooManyAttempts {
                    email: "a@b.vn".to_string(),
                    retry_after_secs: 60,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (OkrError::Storage("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(HttpError::from(OkrError::not_found("Class", "10A9"))).unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Class '10A9' not found");
    }
}
