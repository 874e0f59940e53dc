//! Ledger store port.
//!
//! The coordinator reaches storage only through these traits. A store hands
//! out units of work; every mutating call takes the unit of work explicitly
//! so nothing is written outside the caller's atomic transaction.

use async_trait::async_trait;
use wallet_shared::types::WalletId;

use super::error::StoreError;
use super::types::{AuditRecord, OperationType, Wallet};

/// An open atomic unit of work.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] must
/// discard its writes and release its row locks, exactly like
/// [`UnitOfWork::rollback`]. This is what makes cancellation safe.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    /// Makes every write of this unit of work durable and releases its locks.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discards every write of this unit of work and releases its locks.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Persistence boundary for wallets and their audit trail.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Unit-of-work handle issued by this store.
    type Uow: UnitOfWork;

    /// Opens a unit of work.
    async fn begin(&self) -> Result<Self::Uow, StoreError>;

    /// Reads a wallet under an exclusive row lock held until `uow` ends.
    ///
    /// Blocks while another unit of work holds the lock. Returns `None` when
    /// the wallet does not exist.
    async fn locked_get(
        &self,
        uow: &mut Self::Uow,
        wallet_id: WalletId,
    ) -> Result<Option<Wallet>, StoreError>;

    /// Inserts a new wallet inside `uow`.
    ///
    /// Fails with [`StoreError::Duplicate`] if the wallet already exists or
    /// is being created by another open unit of work.
    async fn create(
        &self,
        uow: &mut Self::Uow,
        wallet_id: WalletId,
        initial_balance: i64,
    ) -> Result<Wallet, StoreError>;

    /// Sets the balance and `updated_at` of a wallet inside `uow`.
    async fn persist_balance(
        &self,
        uow: &mut Self::Uow,
        wallet_id: WalletId,
        new_balance: i64,
    ) -> Result<(), StoreError>;

    /// Appends one immutable audit record inside `uow`.
    async fn append_audit(
        &self,
        uow: &mut Self::Uow,
        wallet_id: WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> Result<AuditRecord, StoreError>;

    /// Reads the last committed balance without taking any lock.
    async fn unlocked_balance(&self, wallet_id: WalletId) -> Result<Option<i64>, StoreError>;

    /// Returns the committed audit trail of a wallet in commit order.
    async fn audit_trail(&self, wallet_id: WalletId) -> Result<Vec<AuditRecord>, StoreError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
