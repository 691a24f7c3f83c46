use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    custom_field::CustomFieldError, custom_field_sync::SyncReport, entity::EntityError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    CustomField(#[from] CustomFieldError),
    #[error(transparent)]
    Entity(#[from] EntityError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::CustomField(err) => match err {
                CustomFieldError::Validation(_) => StatusCode::BAD_REQUEST,
                CustomFieldError::DuplicateField(_) => StatusCode::CONFLICT,
                CustomFieldError::NotFound => StatusCode::NOT_FOUND,
                CustomFieldError::PartialCleanup(_) | CustomFieldError::Database(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Entity(err) => match err {
                EntityError::Validation(_) => StatusCode::BAD_REQUEST,
                EntityError::NotFound(_) => StatusCode::NOT_FOUND,
                EntityError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %message, status = status.as_u16(), "Request rejected");
        }

        match self {
            ApiError::CustomField(CustomFieldError::PartialCleanup(report)) => {
                let body = ApiResponse::<(), SyncReport>::error_with_data(&message, report);
                (status, Json(body)).into_response()
            }
            _ => {
                let body = ApiResponse::<()>::error(&message);
                (status, Json(body)).into_response()
            }
        }
    }
}
