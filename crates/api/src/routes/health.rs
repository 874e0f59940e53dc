//! Health check endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;
use wallet_core::wallet::LedgerStore;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'static str>,
}

/// Health check handler. Healthy only when the ledger store answers.
async fn health_check<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.coordinator.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version: Some(env!("CARGO_PKG_VERSION")),
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Ledger store unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    version: None,
                }),
            )
        }
    }
}

/// Creates health check routes.
pub fn routes<S: LedgerStore + 'static>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health_check::<S>))
}
