use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::repository::RepoError;

/// ErrorBody
///
/// The one JSON shape every failed request answers with, the auth gate's 403 included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub status: bool,
    pub status_code: u16,
    pub message: String,
}

/// ApiError
///
/// Everything a handler can fail with, mapped onto an HTTP status in `into_response`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("Invalid fields: {0}")]
    Validation(String),
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error("Internal server error")]
    Password(#[from] argon2::password_hash::Error),
    #[error("Internal server error")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        ApiError::Validation(fields.join(", "))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::Repo(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Repo(RepoError::Conflict(_)) => StatusCode::BAD_REQUEST,
            ApiError::Repo(RepoError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Password(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Repo(RepoError::Internal(e)) => {
                tracing::error!(error = %e, "storage failure");
            }
            ApiError::Password(e) => {
                tracing::error!(error = %e, "password hashing failure");
            }
            ApiError::Task(e) => {
                tracing::error!(error = %e, "blocking task failed");
            }
            _ => {}
        }

        let body = ErrorBody {
            status: false,
            status_code: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Entity;
    use axum::body::to_bytes;

    async fn assert_error(error: ApiError, expected_status: StatusCode, expected_message: &str) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert!(!body.status);
        assert_eq!(body.status_code, expected_status.as_u16());
        assert_eq!(body.message, expected_message);
    }

    #[tokio::test]
    async fn unauthorized_is_forbidden() {
        assert_error(ApiError::Unauthorized, StatusCode::FORBIDDEN, "Unauthorized").await;
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        assert_error(
            RepoError::NotFound(Entity::UserRole).into(),
            StatusCode::NOT_FOUND,
            "User role not found",
        )
        .await;
    }

    #[tokio::test]
    async fn conflict_is_bad_request() {
        assert_error(
            RepoError::Conflict(Entity::User).into(),
            StatusCode::BAD_REQUEST,
            "User already exists",
        )
        .await;
    }

    #[tokio::test]
    async fn internal_hides_details() {
        assert_error(
            RepoError::Internal(sqlx::Error::PoolTimedOut).into(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
        .await;
    }

    #[tokio::test]
    async fn panicked_task_is_internal() {
        let join_error = tokio::task::spawn_blocking::<_, ()>(|| panic!("boom"))
            .await
            .unwrap_err();
        assert_error(
            join_error.into(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
        .await;
    }

    #[tokio::test]
    async fn validation_lists_fields() {
        assert_error(
            ApiError::Validation("email, username".to_string()),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid fields: email, username",
        )
        .await;
    }
}
