//! Wallet balance-mutation protocol.
//!
//! This module implements the core wallet functionality:
//! - Request validation
//! - Balance policy (pure arithmetic)
//! - The ledger store port and its unit of work
//! - The transaction coordinator that ties them together
//! - An in-process ledger store with row-lock semantics

pub mod coordinator;
pub mod error;
pub mod memory;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod policy_props;

pub use coordinator::{Stage, TransactionCoordinator};
pub use error::{PolicyError, StoreError, ValidationError, WalletError};
pub use memory::{InMemoryLedgerStore, MemoryUnitOfWork};
pub use policy::BalancePolicy;
pub use store::{LedgerStore, UnitOfWork};
pub use types::{
    AuditRecord, OperationRequest, OperationType, Wallet, WalletOperation, WalletSnapshot,
};
pub use validation::validate_request;
