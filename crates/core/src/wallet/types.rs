//! Wallet domain types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wallet_shared::types::{AuditRecordId, WalletId};

use super::error::ValidationError;

/// Kind of balance mutation.
///
/// The wire and storage encoding is the upper-case literal (`"DEPOSIT"`,
/// `"WITHDRAW"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    /// Adds funds to a wallet, creating it if needed.
    Deposit,
    /// Removes funds from an existing wallet.
    Withdraw,
}

impl OperationType {
    /// Returns the wire/storage literal.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAW" => Ok(Self::Withdraw),
            other => Err(ValidationError::UnknownOperationType(other.to_string())),
        }
    }
}

/// Operation request as received from a caller, before validation.
///
/// Every field is optional so that the validator, not the decoder, decides
/// which rule a malformed request breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    /// Target wallet. `valletId` is accepted for older clients.
    #[serde(default, alias = "valletId")]
    pub wallet_id: Option<WalletId>,
    /// `"DEPOSIT"` or `"WITHDRAW"`.
    #[serde(default)]
    pub operation_type: Option<String>,
    /// Amount in minor units.
    #[serde(default)]
    pub amount: Option<i64>,
}

impl OperationRequest {
    /// Builds a fully populated request.
    #[must_use]
    pub fn new(wallet_id: WalletId, operation_type: OperationType, amount: i64) -> Self {
        Self {
            wallet_id: Some(wallet_id),
            operation_type: Some(operation_type.as_str().to_string()),
            amount: Some(amount),
        }
    }

    /// Shorthand for a deposit request.
    #[must_use]
    pub fn deposit(wallet_id: WalletId, amount: i64) -> Self {
        Self::new(wallet_id, OperationType::Deposit, amount)
    }

    /// Shorthand for a withdrawal request.
    #[must_use]
    pub fn withdraw(wallet_id: WalletId, amount: i64) -> Self {
        Self::new(wallet_id, OperationType::Withdraw, amount)
    }
}

/// A request that passed validation.
///
/// Only [`super::validate_request`] constructs this, so holding one means
/// the wallet id is non-nil and the amount is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletOperation {
    pub(crate) wallet_id: WalletId,
    pub(crate) operation_type: OperationType,
    pub(crate) amount: i64,
}

impl WalletOperation {
    /// Target wallet.
    #[must_use]
    pub const fn wallet_id(&self) -> WalletId {
        self.wallet_id
    }

    /// Operation kind.
    #[must_use]
    pub const fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// Positive amount in minor units.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.amount
    }
}

/// A wallet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Caller-supplied identifier.
    pub id: WalletId,
    /// Balance in minor units, never negative once committed.
    pub balance: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last committed mutation.
    pub updated_at: DateTime<Utc>,
}

/// Immutable record of one committed balance mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record id.
    pub id: AuditRecordId,
    /// Owning wallet.
    pub wallet_id: WalletId,
    /// Operation kind.
    pub operation_type: OperationType,
    /// Positive magnitude; the sign follows from `operation_type`.
    pub amount: i64,
    /// Time the mutation was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Balance as returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    /// Wallet id.
    pub wallet_id: WalletId,
    /// Committed balance in minor units.
    pub balance: i64,
}
