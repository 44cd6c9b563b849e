use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ValidationError;
use common::models::SignalKind;
use relay::RelayError;
use serde_json::json;
use thiserror::Error;

use super::timestamp;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("{0} signal was not executed")]
    NotExecuted(SignalKind),
    #[error("Endpoint not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Relay(_) | Self::NotExecuted(_) | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Validation(ValidationError::MissingFields(fields)) => json!({
                "error": self.to_string(),
                "missing_fields": fields,
                "timestamp": timestamp(),
            }),
            Self::Validation(e) => json!({
                "error": e.to_string(),
                "timestamp": timestamp(),
            }),
            other => json!({
                "status": "error",
                "message": other.to_string(),
                "timestamp": timestamp(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode as RemoteStatus;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::UnsupportedPair("X/Y".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(RelayError::Remote {
                status: RemoteStatus::BAD_GATEWAY,
                body: String::new()
            })
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotExecuted(SignalKind::Buy).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::Internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
