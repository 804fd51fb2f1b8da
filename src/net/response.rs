use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::DirectoryError;

pub struct ResponseError(Response);

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        self.0
    }
}

impl<E> From<E> for ResponseError
where
    E: Into<color_eyre::eyre::Error>,
{
    fn from(value: E) -> Self {
        let report = Into::<color_eyre::eyre::Error>::into(value);
        let status = match report.downcast_ref::<DirectoryError>() {
            Some(DirectoryError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(DirectoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => {
                error!("request failed: {report:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::with_status(status, report.to_string())
    }
}

impl ResponseError {
    pub fn with_status(status_code: StatusCode, message: impl ToString) -> Self {
        ResponseError(
            (
                status_code,
                Json(json!({ "error": message.to_string() })),
            )
                .into_response(),
        )
    }

    pub fn bad_request(message: impl ToString) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl ToString) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, message)
    }
}

pub type Result<T, E = ResponseError> = axum::response::Result<T, E>;
