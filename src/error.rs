use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::{model::vacation_request::RequestError, store::StoreError};

#[derive(Debug, Display)]
pub enum AppError {
    /// Malformed or missing fields, dangling references.
    #[display(fmt = "{}", _0)]
    Validation(String),
    /// Bad credentials, missing or invalid token.
    #[display(fmt = "{}", _0)]
    Authentication(String),
    /// Role or location mismatch.
    #[display(fmt = "{}", _0)]
    Authorization(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// Store failure; the message is logged, never returned.
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal server error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AppError::Conflict(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::InvalidRange => AppError::Validation(err.to_string()),
            RequestError::NotPending(_) => AppError::Conflict(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vacation_request::VacationStatus;

    #[actix_web::test]
    async fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::unauthenticated("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(StoreError::Duplicate("email")).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(RequestError::NotPending(VacationStatus::Denied)).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn internal_errors_hide_details() {
        let resp = AppError::from(StoreError::Unavailable("lock poisoned".into())).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal Server Error");
    }
}
