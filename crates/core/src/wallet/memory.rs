//! In-process ledger store.
//!
//! Honours the same contract as the PostgreSQL store: one exclusive lock
//! per wallet row held by a unit of work until it ends, writes invisible to
//! other readers until commit, and duplicate detection for wallets that are
//! being created by another open unit of work. Used by tests and by
//! deployments that do not need durability.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use wallet_shared::types::{AuditRecordId, WalletId};

use super::error::StoreError;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{AuditRecord, OperationType, Wallet};

/// Committed state.
#[derive(Debug, Default)]
struct Tables {
    wallets: HashMap<WalletId, Wallet>,
    audit: Vec<AuditRecord>,
}

#[derive(Debug, Default)]
struct Shared {
    /// Row locks, one per committed wallet or wallet being created.
    rows: DashMap<WalletId, Arc<Mutex<()>>>,
    tables: RwLock<Tables>,
    fail_audit: AtomicBool,
}

/// A thread-safe in-memory ledger store.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    shared: Arc<Shared>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: makes every subsequent `append_audit` fail until turned off
    /// again. Not meant for production callers.
    #[doc(hidden)]
    pub fn fail_audit_appends(&self, fail: bool) {
        self.shared.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Test hook: number of committed wallets.
    #[doc(hidden)]
    pub async fn wallet_count(&self) -> usize {
        self.shared.tables.read().await.wallets.len()
    }
}

/// Unit of work issued by [`InMemoryLedgerStore`].
///
/// Writes are buffered here and applied on commit; dropping it releases the
/// held row locks and any wallet reservations.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    locks: HashMap<WalletId, OwnedMutexGuard<()>>,
    reserved: Vec<WalletId>,
    wallets: HashMap<WalletId, Wallet>,
    audit: Vec<AuditRecord>,
}

impl MemoryUnitOfWork {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            locks: HashMap::new(),
            reserved: Vec::new(),
            wallets: HashMap::new(),
            audit: Vec::new(),
        }
    }

    /// Wallet as seen from inside this unit of work.
    async fn visible(&self, wallet_id: WalletId) -> Option<Wallet> {
        if let Some(wallet) = self.wallets.get(&wallet_id) {
            return Some(wallet.clone());
        }
        self.shared.tables.read().await.wallets.get(&wallet_id).cloned()
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        for wallet_id in self.reserved.drain(..) {
            self.shared.rows.remove(&wallet_id);
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(mut self) -> Result<(), StoreError> {
        let mut tables = self.shared.tables.write().await;
        tables.wallets.extend(self.wallets.drain());
        tables.audit.append(&mut self.audit);
        drop(tables);

        // Reserved rows are real rows now; locks are released when `self` drops.
        self.reserved.clear();
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    type Uow = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        Ok(MemoryUnitOfWork::new(Arc::clone(&self.shared)))
    }

    async fn locked_get(
        &self,
        uow: &mut MemoryUnitOfWork,
        wallet_id: WalletId,
    ) -> Result<Option<Wallet>, StoreError> {
        if uow.locks.contains_key(&wallet_id) {
            return Ok(uow.visible(wallet_id).await);
        }

        loop {
            let row = self
                .shared
                .rows
                .get(&wallet_id)
                .map(|entry| Arc::clone(entry.value()));
            let Some(row) = row else {
                return Ok(None);
            };

            let guard = Arc::clone(&row).lock_owned().await;

            // A rolled-back reservation leaves its mutex orphaned, and a new
            // creator may have registered a fresh one under the same id.
            let current = self
                .shared
                .rows
                .get(&wallet_id)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &row));
            if !current {
                drop(guard);
                continue;
            }

            let committed = self.shared.tables.read().await.wallets.get(&wallet_id).cloned();
            if committed.is_some() {
                uow.locks.insert(wallet_id, guard);
            }
            return Ok(committed);
        }
    }

    async fn create(
        &self,
        uow: &mut MemoryUnitOfWork,
        wallet_id: WalletId,
        initial_balance: i64,
    ) -> Result<Wallet, StoreError> {
        if initial_balance < 0 {
            return Err(StoreError::Backend(
                "balance check constraint violated".to_string(),
            ));
        }

        let guard = match self.shared.rows.entry(wallet_id) {
            Entry::Occupied(_) => return Err(StoreError::Duplicate(wallet_id)),
            Entry::Vacant(slot) => {
                let row = Arc::new(Mutex::new(()));
                let guard = Arc::clone(&row)
                    .try_lock_owned()
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                slot.insert(row);
                guard
            }
        };

        let now = Utc::now();
        let wallet = Wallet {
            id: wallet_id,
            balance: initial_balance,
            created_at: now,
            updated_at: now,
        };

        uow.reserved.push(wallet_id);
        uow.locks.insert(wallet_id, guard);
        uow.wallets.insert(wallet_id, wallet.clone());
        Ok(wallet)
    }

    async fn persist_balance(
        &self,
        uow: &mut MemoryUnitOfWork,
        wallet_id: WalletId,
        new_balance: i64,
    ) -> Result<(), StoreError> {
        if !uow.locks.contains_key(&wallet_id) {
            return Err(StoreError::Backend(format!(
                "wallet {wallet_id} is not locked by this unit of work"
            )));
        }
        if new_balance < 0 {
            return Err(StoreError::Backend(
                "balance check constraint violated".to_string(),
            ));
        }

        let mut wallet = uow
            .visible(wallet_id)
            .await
            .ok_or(StoreError::Missing(wallet_id))?;
        wallet.balance = new_balance;
        wallet.updated_at = Utc::now();
        uow.wallets.insert(wallet_id, wallet);
        Ok(())
    }

    async fn append_audit(
        &self,
        uow: &mut MemoryUnitOfWork,
        wallet_id: WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> Result<AuditRecord, StoreError> {
        if self.shared.fail_audit.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("audit append rejected".to_string()));
        }
        if amount <= 0 {
            return Err(StoreError::Backend(
                "amount check constraint violated".to_string(),
            ));
        }
        if uow.visible(wallet_id).await.is_none() {
            return Err(StoreError::Missing(wallet_id));
        }

        let record = AuditRecord {
            id: AuditRecordId::generate(),
            wallet_id,
            operation_type,
            amount,
            timestamp: Utc::now(),
        };
        uow.audit.push(record.clone());
        Ok(record)
    }

    async fn unlocked_balance(&self, wallet_id: WalletId) -> Result<Option<i64>, StoreError> {
        let tables = self.shared.tables.read().await;
        Ok(tables.wallets.get(&wallet_id).map(|wallet| wallet.balance))
    }

    async fn audit_trail(&self, wallet_id: WalletId) -> Result<Vec<AuditRecord>, StoreError> {
        let tables = self.shared.tables.read().await;
        Ok(tables
            .audit
            .iter()
            .filter(|record| record.wallet_id == wallet_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
