use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;

const INTERNAL_MESSAGE: &str = "The request could not be completed and nothing was saved. Please retry.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A rejected order submission. Always a 500, message shown as-is.
    #[error("{0}")]
    SubmissionFailed(String),
}

impl AppError {
    /// Submission reports every failure as a 500; store failures keep their
    /// generic message.
    pub fn into_submission_failure(self) -> AppError {
        match self {
            e @ (AppError::Internal(_) | AppError::SubmissionFailed(_)) => e,
            other => AppError::SubmissionFailed(other.to_string()),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            e @ DomainError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
            e @ (DomainError::DuplicateOrderNumber(_) | DomainError::Persistence(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::SubmissionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("Request failed: {}", detail);
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::OrderStatus;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(err.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_display() {
        assert_eq!(AppError::NotFound.to_string(), "Not found");
    }

    #[test]
    fn internal_error_display() {
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }

    #[test]
    fn domain_not_found_maps_to_app_not_found() {
        let app_err: AppError = DomainError::NotFound.into();
        assert!(matches!(app_err, AppError::NotFound));
    }

    #[test]
    fn domain_validation_maps_to_bad_request() {
        let app_err: AppError = DomainError::validation("bad value").into();
        assert!(matches!(app_err, AppError::BadRequest(ref m) if m == "bad value"));
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn domain_invalid_transition_maps_to_conflict() {
        let app_err: AppError = DomainError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        }
        .into();
        assert!(matches!(app_err, AppError::Conflict(_)));
        assert_eq!(app_err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn domain_store_failures_map_to_internal() {
        let dup: AppError = DomainError::DuplicateOrderNumber("ORD202405170001".to_string()).into();
        let db: AppError = DomainError::Persistence("connection refused".to_string()).into();
        assert!(matches!(dup, AppError::Internal(_)));
        assert!(matches!(db, AppError::Internal(_)));
    }

    #[test]
    fn submission_failures_are_500_and_keep_the_reason() {
        let err = AppError::BadRequest("order must contain at least one item".to_string())
            .into_submission_failure();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "order must contain at least one item");

        let err = AppError::Internal("deadlock detected".to_string()).into_submission_failure();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[actix_web::test]
    async fn error_body_hides_internal_details() {
        let resp = AppError::Internal("password authentication failed".to_string()).error_response();
        let body = to_bytes(resp.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[actix_web::test]
    async fn error_body_carries_validation_message() {
        let resp = AppError::BadRequest("order must contain at least one item".to_string())
            .error_response();
        let body = to_bytes(resp.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "order must contain at least one item");
    }
}
