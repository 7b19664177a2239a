//! Maps application errors onto HTTP responses. Domain outcomes keep their
//! message; persistence and configuration failures are logged and replaced
//! with a generic body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use puente_core::errors::{ApplicationError, DomainError};
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub ApplicationError);

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error)
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(ApplicationError::Domain(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ApplicationError::Domain(DomainError::Validation(_))
            | ApplicationError::Domain(DomainError::State(_)) => StatusCode::BAD_REQUEST,
            ApplicationError::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApplicationError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            ApplicationError::Persistence(detail) | ApplicationError::Configuration(detail) => {
                error!(event_name = "request_failed_internally", detail = %detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorBody { error: self.0.user_message() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use puente_core::errors::{ApplicationError, DomainError};

    use super::ApiError;

    #[test]
    fn domain_variants_map_onto_client_status_codes() {
        let cases = [
            (DomainError::Validation("too short".to_string()), StatusCode::BAD_REQUEST),
            (DomainError::State("expired".to_string()), StatusCode::BAD_REQUEST),
            (DomainError::not_found("request", "RQ-404"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("already accepted".to_string()), StatusCode::CONFLICT),
        ];

        for (error, expected) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn persistence_failures_become_opaque_500s() {
        let response =
            ApiError(ApplicationError::Persistence("disk full".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
