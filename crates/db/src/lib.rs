//! Database layer with `SeaORM` entities and the PostgreSQL ledger store.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for `wallets` and `transactions`
//! - [`PgLedgerStore`], the production implementation of the ledger store port
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{PgLedgerStore, PgUnitOfWork};

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;
use wallet_shared::DatabaseConfig;

/// Opens the connection pool described by `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .max_lifetime(config.max_lifetime())
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(db)
}
