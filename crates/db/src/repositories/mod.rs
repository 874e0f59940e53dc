//! Repository abstractions for data access.
//!
//! Repositories hide the `SeaORM` implementation details from the rest of the
//! application; callers only see the ledger store port from `wallet-core`.

pub mod ledger;

pub use ledger::{PgLedgerStore, PgUnitOfWork};
