//! PostgreSQL ledger store.
//!
//! Each unit of work is one database transaction. `locked_get` issues
//! `SELECT ... FOR UPDATE`, so the row lock lives until the transaction
//! commits or rolls back. A `DatabaseTransaction` that is dropped without
//! commit is rolled back by `SeaORM`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone,
};
use tracing::debug;
use wallet_core::wallet::{
    AuditRecord, LedgerStore, OperationType, StoreError, UnitOfWork, Wallet,
};
use wallet_shared::types::{AuditRecordId, WalletId};

use crate::entities::{wallet_transactions, wallets};

/// Ledger store backed by a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// A unit of work: one open database transaction.
#[derive(Debug)]
pub struct PgUnitOfWork {
    txn: DatabaseTransaction,
}

impl PgUnitOfWork {
    /// Returns the underlying transaction.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(backend)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(backend)
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Uow = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let txn = self.db.begin().await.map_err(backend)?;
        Ok(PgUnitOfWork { txn })
    }

    async fn locked_get(
        &self,
        uow: &mut PgUnitOfWork,
        wallet_id: WalletId,
    ) -> Result<Option<Wallet>, StoreError> {
        let model = wallets::Entity::find_by_id(wallet_id.into_inner())
            .lock_exclusive()
            .one(&uow.txn)
            .await
            .map_err(backend)?;
        Ok(model.map(to_wallet))
    }

    async fn create(
        &self,
        uow: &mut PgUnitOfWork,
        wallet_id: WalletId,
        initial_balance: i64,
    ) -> Result<Wallet, StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let wallet = wallets::ActiveModel {
            id: Set(wallet_id.into_inner()),
            balance: Set(initial_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // A concurrent insert of the same id blocks here until the other
        // transaction ends, then fails with a unique violation if it committed.
        match wallet.insert(&uow.txn).await {
            Ok(model) => {
                debug!(wallet_id = %wallet_id, "Inserted wallet row");
                Ok(to_wallet(model))
            }
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(StoreError::Duplicate(wallet_id)),
                _ => Err(backend(err)),
            },
        }
    }

    async fn persist_balance(
        &self,
        uow: &mut PgUnitOfWork,
        wallet_id: WalletId,
        new_balance: i64,
    ) -> Result<(), StoreError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = wallets::Entity::update_many()
            .col_expr(wallets::Column::Balance, Expr::value(new_balance))
            .col_expr(wallets::Column::UpdatedAt, Expr::value(now))
            .filter(wallets::Column::Id.eq(wallet_id.into_inner()))
            .exec(&uow.txn)
            .await
            .map_err(backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::Missing(wallet_id));
        }
        Ok(())
    }

    async fn append_audit(
        &self,
        uow: &mut PgUnitOfWork,
        wallet_id: WalletId,
        operation_type: OperationType,
        amount: i64,
    ) -> Result<AuditRecord, StoreError> {
        let record = wallet_transactions::ActiveModel {
            id: Set(AuditRecordId::generate().into_inner()),
            wallet_id: Set(wallet_id.into_inner()),
            operation_type: Set(operation_type.as_str().to_string()),
            amount: Set(amount),
            timestamp: Set(Utc::now().into()),
        };

        match record.insert(&uow.txn).await {
            Ok(model) => to_audit(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    Err(StoreError::Missing(wallet_id))
                }
                _ => Err(backend(err)),
            },
        }
    }

    async fn unlocked_balance(&self, wallet_id: WalletId) -> Result<Option<i64>, StoreError> {
        let model = wallets::Entity::find_by_id(wallet_id.into_inner())
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(model.map(|wallet| wallet.balance))
    }

    async fn audit_trail(&self, wallet_id: WalletId) -> Result<Vec<AuditRecord>, StoreError> {
        wallet_transactions::Entity::find()
            .filter(wallet_transactions::Column::WalletId.eq(wallet_id.into_inner()))
            .order_by_asc(wallet_transactions::Column::Timestamp)
            .order_by_asc(wallet_transactions::Column::Id)
            .all(&self.db)
            .await
            .map_err(backend)?
            .into_iter()
            .map(to_audit)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await.map_err(backend)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn backend(err: DbErr) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn to_wallet(model: wallets::Model) -> Wallet {
    Wallet {
        id: WalletId::from_uuid(model.id),
        balance: model.balance,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn to_audit(model: wallet_transactions::Model) -> Result<AuditRecord, StoreError> {
    let operation_type = model
        .operation_type
        .parse::<OperationType>()
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(AuditRecord {
        id: AuditRecordId::from_uuid(model.id),
        wallet_id: WalletId::from_uuid(model.wallet_id),
        operation_type,
        amount: model.amount,
        timestamp: model.timestamp.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use uuid::Uuid;

    #[test]
    fn test_to_audit_rejects_unknown_type() {
        let model = wallet_transactions::Model {
            id: Uuid::now_v7(),
            wallet_id: Uuid::new_v4(),
            operation_type: "REFUND".to_string(),
            amount: 10,
            timestamp: Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap()),
        };
        assert!(matches!(to_audit(model), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_to_wallet_normalizes_timezone() {
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let at = Utc::now();
        let model = wallets::Model {
            id: Uuid::new_v4(),
            balance: 700,
            created_at: at.with_timezone(&offset),
            updated_at: at.with_timezone(&offset),
        };
        let wallet = to_wallet(model);
        assert_eq!(wallet.balance, 700);
        assert_eq!(wallet.created_at, at);
    }
}
