//! Wallet error types.
//!
//! Errors are layered the way the protocol is: the validator, the balance
//! policy and the ledger store each have their own enum, and
//! [`WalletError`] is what the coordinator reports to its caller.

use std::time::Duration;

use thiserror::Error;
use wallet_shared::{AppError, types::WalletId};

/// Reasons a request is rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Wallet id absent or nil.
    #[error("walletId cannot be empty")]
    MissingWalletId,

    /// Amount absent.
    #[error("amount is required")]
    MissingAmount,

    /// Amount zero or negative.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Operation type absent.
    #[error("operationType is required")]
    MissingOperationType,

    /// Operation type not one of the two literals.
    #[error("invalid operation type: {0}, must be DEPOSIT or WITHDRAW")]
    UnknownOperationType(String),

    /// Request body could not be decoded.
    #[error("malformed request: {0}")]
    Malformed(String),
}

/// Balance policy rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Withdrawal larger than the current balance.
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: i64,
        /// Requested withdrawal.
        requested: i64,
    },

    /// Deposit would exceed the balance range.
    #[error("balance overflow: balance {balance}, deposit {amount}")]
    Overflow {
        /// Balance at the time of the check.
        balance: i64,
        /// Requested deposit.
        amount: i64,
    },
}

/// Ledger store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Insert collided with an existing (or concurrently created) wallet.
    #[error("wallet already exists: {0}")]
    Duplicate(WalletId),

    /// Row expected to exist is missing.
    #[error("wallet row missing: {0}")]
    Missing(WalletId),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors returned by the transaction coordinator.
///
/// Every variant produced after storage was touched means the unit of work
/// was rolled back: no balance or audit row changed.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Wallet does not exist.
    #[error("Wallet not found: {0}")]
    NotFound(WalletId),

    /// Withdrawal exceeds the locked balance.
    #[error("Insufficient funds in wallet {wallet_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The wallet.
        wallet_id: WalletId,
        /// Balance under lock.
        balance: i64,
        /// Requested withdrawal.
        requested: i64,
    },

    /// Deposit would overflow the balance.
    #[error("Deposit would overflow the balance of wallet {0}")]
    BalanceOverflow(WalletId),

    /// Another request created the same wallet concurrently.
    #[error("Wallet {0} was created concurrently, please retry")]
    Conflict(WalletId),

    /// Deadline expired while the unit of work was open.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl WalletError {
    /// Maps a policy rejection for `wallet_id`.
    #[must_use]
    pub fn from_policy(wallet_id: WalletId, err: PolicyError) -> Self {
        match err {
            PolicyError::InsufficientFunds { balance, requested } => Self::InsufficientFunds {
                wallet_id,
                balance,
                requested,
            },
            PolicyError::Overflow { .. } => Self::BalanceOverflow(wallet_id),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "WALLET_NOT_FOUND",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::Conflict(_) => "CONCURRENT_CREATION",
            Self::Timeout(_) => "TIMEOUT",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        AppError::from(self).status_code()
    }

    /// Returns true if retrying the whole request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<&WalletError> for AppError {
    fn from(err: &WalletError) -> Self {
        match err {
            WalletError::Validation(e) => Self::Validation(e.to_string()),
            WalletError::NotFound(_) => Self::NotFound(err.to_string()),
            WalletError::InsufficientFunds { .. } | WalletError::BalanceOverflow(_) => {
                Self::BusinessRule(err.to_string())
            }
            WalletError::Conflict(_) => Self::Retryable(err.to_string()),
            WalletError::Timeout(_) => Self::Internal("Operation timed out".to_string()),
            WalletError::Store(_) => Self::Database("An error occurred".to_string()),
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        Self::from(&err)
    }
}
