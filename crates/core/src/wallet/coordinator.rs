//! Transaction coordinator.
//!
//! Runs one validated operation inside one unit of work:
//!
//! ```text
//! Begin -> LockAcquired -> Resolved -> PolicyApplied -> Persisted -> AuditAppended -> Committed
//! ```
//!
//! Any failure after `Begin` rolls the unit of work back, so either the new
//! balance and its audit record both commit or neither does.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use wallet_shared::types::WalletId;

use super::error::{StoreError, WalletError};
use super::policy::BalancePolicy;
use super::store::{LedgerStore, UnitOfWork};
use super::types::{OperationRequest, OperationType, WalletOperation, WalletSnapshot};
use super::validation::validate_request;

/// Progress of a single operation through its unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Unit of work opened.
    Begin,
    /// Locked lookup returned.
    LockAcquired,
    /// Wallet found or created.
    Resolved,
    /// New balance computed.
    PolicyApplied,
    /// New balance written.
    Persisted,
    /// Audit record written.
    AuditAppended,
    /// Unit of work committed.
    Committed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Begin => "begin",
            Self::LockAcquired => "lock_acquired",
            Self::Resolved => "resolved",
            Self::PolicyApplied => "policy_applied",
            Self::Persisted => "persisted",
            Self::AuditAppended => "audit_appended",
            Self::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Executes wallet operations against a [`LedgerStore`].
pub struct TransactionCoordinator<S> {
    store: Arc<S>,
    timeout: Option<Duration>,
}

impl<S> Clone for TransactionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            timeout: self.timeout,
        }
    }
}

impl<S: LedgerStore> TransactionCoordinator<S> {
    /// Creates a coordinator without a deadline.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Bounds every operation by `timeout`; `None` disables the deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validates and applies an operation request.
    ///
    /// Deposits to an unknown wallet create it; withdrawals from an unknown
    /// wallet fail. On success the returned balance is the committed one.
    ///
    /// # Errors
    ///
    /// - `Validation` before any storage access
    /// - `NotFound` for a withdrawal from an unknown wallet
    /// - `InsufficientFunds` / `BalanceOverflow` from the balance policy
    /// - `Conflict` when another request created the wallet first
    /// - `Timeout` when the deadline expired
    /// - `Store` for any backend failure
    pub async fn execute(&self, request: &OperationRequest) -> Result<WalletSnapshot, WalletError> {
        let operation = validate_request(request)?;

        let Some(limit) = self.timeout else {
            return self.run(operation).await;
        };

        // Dropping the in-flight future drops its unit of work, which rolls back.
        if let Ok(result) = tokio::time::timeout(limit, self.run(operation)).await {
            result
        } else {
            warn!(
                wallet_id = %operation.wallet_id,
                operation = %operation.operation_type,
                timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "Wallet operation timed out"
            );
            Err(WalletError::Timeout(limit))
        }
    }

    /// Returns the last committed balance without taking any lock.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown wallet and `Store` for backend failures.
    pub async fn balance(&self, wallet_id: WalletId) -> Result<WalletSnapshot, WalletError> {
        let balance = self
            .store
            .unlocked_balance(wallet_id)
            .await?
            .ok_or(WalletError::NotFound(wallet_id))?;
        Ok(WalletSnapshot { wallet_id, balance })
    }

    async fn run(&self, operation: WalletOperation) -> Result<WalletSnapshot, WalletError> {
        let mut uow = self.store.begin().await?;
        let mut stage = Stage::Begin;

        match self.apply(&mut uow, operation, &mut stage).await {
            Ok(snapshot) => {
                if let Err(err) = uow.commit().await {
                    error!(
                        wallet_id = %operation.wallet_id,
                        stage = %stage,
                        error = %err,
                        "Commit failed"
                    );
                    return Err(err.into());
                }
                stage = Stage::Committed;
                info!(
                    wallet_id = %snapshot.wallet_id,
                    operation = %operation.operation_type,
                    amount = operation.amount,
                    balance = snapshot.balance,
                    stage = %stage,
                    "Wallet operation committed"
                );
                Ok(snapshot)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(
                        wallet_id = %operation.wallet_id,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                log_abort(&operation, stage, &err);
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        uow: &mut S::Uow,
        operation: WalletOperation,
        stage: &mut Stage,
    ) -> Result<WalletSnapshot, WalletError> {
        let wallet_id = operation.wallet_id;

        let existing = self.store.locked_get(uow, wallet_id).await?;
        *stage = Stage::LockAcquired;

        let current = match existing {
            Some(wallet) => wallet.balance,
            None if operation.operation_type == OperationType::Withdraw => {
                return Err(WalletError::NotFound(wallet_id));
            }
            None => {
                let wallet = self
                    .store
                    .create(uow, wallet_id, 0)
                    .await
                    .map_err(|err| match err {
                        StoreError::Duplicate(id) => WalletError::Conflict(id),
                        other => WalletError::Store(other),
                    })?;
                debug!(wallet_id = %wallet_id, "Wallet created");
                wallet.balance
            }
        };
        *stage = Stage::Resolved;

        let new_balance = BalancePolicy::apply(current, operation.operation_type, operation.amount)
            .map_err(|err| WalletError::from_policy(wallet_id, err))?;
        *stage = Stage::PolicyApplied;

        self.store.persist_balance(uow, wallet_id, new_balance).await?;
        *stage = Stage::Persisted;

        self.store
            .append_audit(uow, wallet_id, operation.operation_type, operation.amount)
            .await?;
        *stage = Stage::AuditAppended;

        Ok(WalletSnapshot {
            wallet_id,
            balance: new_balance,
        })
    }
}

fn log_abort(operation: &WalletOperation, stage: Stage, err: &WalletError) {
    match err {
        WalletError::Store(_) | WalletError::Timeout(_) => error!(
            wallet_id = %operation.wallet_id,
            operation = %operation.operation_type,
            stage = %stage,
            error = %err,
            "Wallet operation aborted"
        ),
        _ => info!(
            wallet_id = %operation.wallet_id,
            operation = %operation.operation_type,
            stage = %stage,
            code = err.error_code(),
            "Wallet operation rejected"
        ),
    }
}
