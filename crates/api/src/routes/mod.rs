//! API route definitions.

use axum::Router;
use wallet_core::wallet::LedgerStore;

use crate::AppState;

pub mod health;
pub mod wallets;

/// Creates the API router with all routes.
pub fn api_routes<S: LedgerStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .merge(health::routes::<S>())
        .merge(wallets::routes::<S>())
}
