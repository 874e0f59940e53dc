//! Wallet API Server
//!
//! Main entry point for the wallet service.

use std::sync::Arc;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_api::{AppState, create_router};
use wallet_core::wallet::TransactionCoordinator;
use wallet_db::{PgLedgerStore, connect, migration::Migrator};
use wallet_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
        info!("Migrations applied");
    }

    // Create application state
    let store = Arc::new(PgLedgerStore::new(db));
    let coordinator =
        TransactionCoordinator::new(store).with_timeout(config.wallet.operation_timeout());
    let state = AppState::new(coordinator);

    // Create router
    let app = create_router(state, config.server.request_timeout());

    // Start server
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
