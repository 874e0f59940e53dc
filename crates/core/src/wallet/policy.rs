//! Balance policy.
//!
//! Pure arithmetic over minor units. No storage, no clocks, no locks, so it
//! can be exercised exhaustively without a database.

use super::error::PolicyError;
use super::types::{AuditRecord, OperationType};

/// Computes new balances from a current balance and an operation.
pub struct BalancePolicy;

impl BalancePolicy {
    /// Applies `operation` of `amount` to `current`.
    ///
    /// - Deposit: `current + amount`
    /// - Withdraw: `current - amount`, rejected when `amount > current`
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` for an overdraft and `Overflow` when a
    /// deposit would leave the `i64` range.
    pub fn apply(current: i64, operation: OperationType, amount: i64) -> Result<i64, PolicyError> {
        match operation {
            OperationType::Deposit => {
                current
                    .checked_add(amount)
                    .ok_or(PolicyError::Overflow {
                        balance: current,
                        amount,
                    })
            }
            OperationType::Withdraw => {
                if amount > current {
                    return Err(PolicyError::InsufficientFunds {
                        balance: current,
                        requested: amount,
                    });
                }
                Ok(current - amount)
            }
        }
    }

    /// Replays an audit trail from a zero balance.
    ///
    /// A committed trail always replays cleanly and yields the wallet's
    /// current balance.
    ///
    /// # Errors
    ///
    /// Returns the first policy violation found in the trail.
    pub fn replay<'a, I>(records: I) -> Result<i64, PolicyError>
    where
        I: IntoIterator<Item = &'a AuditRecord>,
    {
        records.into_iter().try_fold(0, |balance, record| {
            Self::apply(balance, record.operation_type, record.amount)
        })
    }
}
