//! Response envelope and error mapping for the user endpoints.
//!
//! Every body is `{"success": bool, "data"?: T, "error"?: ErrorResponse}`.
//! Errors take their status and code from [`AccountError`]; a unique
//! conflict also names the column that collided so clients can point at
//! the right form field.

use crate::router::USERS_PATH;
use accounts_core::{AccountError, ErrorResponse, FieldError};
use accounts_service::UserResponse;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(error: ErrorResponse) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Handler error. Wraps the service error so `?` works in handlers.
#[derive(Debug)]
pub struct AppError(pub AccountError);

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        Self(err)
    }
}

impl AppError {
    fn body(&self) -> ErrorResponse {
        let body = ErrorResponse::from_error(&self.0);
        match &self.0 {
            AccountError::AlreadyExists(field) => body.with_details(vec![FieldError {
                field: field.as_str().to_string(),
                message: format!("{} is already taken", field),
                code: "unique".to_string(),
            }]),
            _ => body,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (status, Json(ApiResponse::failure(self.body()))).into_response()
    }
}

/// Result type for handlers answering `200` with a body.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// `201 Created` for a new user, with `Location` pointing at its resource.
#[derive(Debug)]
pub struct CreatedUser(pub UserResponse);

impl CreatedUser {
    pub fn location(&self) -> String {
        format!("{}/{}", USERS_PATH, self.0.id)
    }
}

impl IntoResponse for CreatedUser {
    fn into_response(self) -> Response {
        let location = self.location();
        (
            StatusCode::CREATED,
            [(header::LOCATION, location)],
            Json(ApiResponse::success(self.0)),
        )
            .into_response()
    }
}
