//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The wallet REST routes under `/api/v1`
//! - Transport middleware (tracing, request ids, panic recovery, timeouts)
//! - Error rendering as `{ "error": CODE, "message": text }`

pub mod error;
pub mod routes;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use wallet_core::wallet::{LedgerStore, TransactionCoordinator};

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across handlers.
pub struct AppState<S> {
    /// Coordinator owning the ledger store.
    pub coordinator: Arc<TransactionCoordinator<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<S: LedgerStore> AppState<S> {
    /// Wraps a coordinator.
    #[must_use]
    pub fn new(coordinator: TransactionCoordinator<S>) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: LedgerStore + 'static>(
    state: AppState<S>,
    request_timeout: Duration,
) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/api/v1", routes::api_routes::<S>())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CatchPanicLayer::new())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
