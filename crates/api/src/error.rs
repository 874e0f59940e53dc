//! API error rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};
use wallet_core::wallet::WalletError;
use wallet_shared::AppError;

/// Error returned by handlers.
///
/// Renders as `{ "error": CODE, "message": text }` with the status of the
/// wrapped [`AppError`].
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    /// The transport-facing error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        Self(AppError::from(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(code = self.0.error_code(), message = self.0.message(), "Request failed");
        } else {
            debug!(code = self.0.error_code(), message = self.0.message(), "Request rejected");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.message(),
            })),
        )
            .into_response()
    }
}
