//! Wallet routes.
//!
//! - `POST /wallet` applies a deposit or withdrawal
//! - `GET /wallets/{wallet_id}` returns the last committed balance

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};
use tracing::debug;
use wallet_core::wallet::{
    LedgerStore, OperationRequest, ValidationError, WalletError, WalletSnapshot,
};
use wallet_shared::{AppError, types::WalletId};

use crate::{AppState, error::ApiError};

/// Creates the wallet routes.
pub fn routes<S: LedgerStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/wallet", post(apply_operation::<S>))
        .route("/wallets/{wallet_id}", get(get_balance::<S>))
}

async fn apply_operation<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<WalletSnapshot>, ApiError> {
    // Undecodable bodies are validation failures, rendered like any other.
    let Json(request) = payload.map_err(|rejection| {
        WalletError::from(ValidationError::Malformed(rejection.body_text()))
    })?;

    let snapshot = state.coordinator.execute(&request).await?;
    Ok(Json(snapshot))
}

async fn get_balance<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> Result<Json<WalletSnapshot>, ApiError> {
    let wallet_id: WalletId = raw_id.parse().map_err(|_| {
        debug!(wallet_id = %raw_id, "Rejected malformed wallet id");
        AppError::Validation(format!("invalid wallet id: {raw_id}"))
    })?;

    let snapshot = state.coordinator.balance(wallet_id).await?;
    Ok(Json(snapshot))
}
