use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(ValidationErrors),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("CSRF token missing or invalid")]
    Csrf,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found")]
    NotFound,
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("External error: {0}")]
    External(String),
    #[error("Rate limited by external provider")]
    RateLimited,
}

/// Every error leaves the handler boundary as an `{"errors": [...]}` JSON
/// body; nothing propagates to the client as an unhandled fault.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errors": errors.into_messages() })),
            )
                .into_response(),
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [message] })),
            )
                .into_response(),
            AppError::Csrf => (
                StatusCode::FORBIDDEN,
                Json(json!({ "errors": ["The CSRF token is missing or invalid."] })),
            )
                .into_response(),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "errors": ["Unauthorized"] })),
            )
                .into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "errors": ["Not found"] })),
            )
                .into_response(),
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    headers,
                    Json(json!({ "errors": ["Rate limited, try again shortly."] })),
                )
                    .into_response()
            }
            AppError::External(msg) => {
                tracing::error!("External provider failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "errors": ["Market data is temporarily unavailable."] })),
                )
                    .into_response()
            }
            AppError::Db(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": ["Internal server error"] })),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "errors": ["Internal server error"] })),
                )
                    .into_response()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(value: ValidationErrors) -> Self {
        AppError::Validation(value)
    }
}

/// `Json` body extractor whose rejections keep the `{"errors": [...]}`
/// shape. The stock extractor answers malformed bodies with plain-text
/// 415/422 responses, which the frontend's error handling cannot parse.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_flatten_into_401_body() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "This field is required.");

        let response = AppError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "errors": ["email : This field is required."] }));
    }

    #[tokio::test]
    async fn bad_request_bodies_keep_the_error_shape() {
        let response = AppError::BadRequest("Expected request body to be JSON.".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({ "errors": ["Expected request body to be JSON."] })
        );
    }

    #[tokio::test]
    async fn csrf_failures_are_forbidden() {
        let response = AppError::Csrf.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({ "errors": ["The CSRF token is missing or invalid."] })
        );
    }

    #[tokio::test]
    async fn unauthorized_payload_matches_the_guard_contract() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "errors": ["Unauthorized"] }));
    }
}
