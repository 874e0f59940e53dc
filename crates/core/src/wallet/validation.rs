//! Request validation.

use super::error::ValidationError;
use super::types::{OperationRequest, OperationType, WalletOperation};

/// Validates an operation request.
///
/// Rules are checked in order and the first failure wins:
/// 1. the wallet id is present and non-nil,
/// 2. the amount is present and strictly positive,
/// 3. the operation type is `DEPOSIT` or `WITHDRAW`.
///
/// # Errors
///
/// Returns the first rule the request breaks.
pub fn validate_request(request: &OperationRequest) -> Result<WalletOperation, ValidationError> {
    let wallet_id = match request.wallet_id {
        Some(id) if !id.is_nil() => id,
        _ => return Err(ValidationError::MissingWalletId),
    };

    let amount = match request.amount {
        Some(amount) if amount > 0 => amount,
        Some(amount) => return Err(ValidationError::NonPositiveAmount(amount)),
        None => return Err(ValidationError::MissingAmount),
    };

    let operation_type: OperationType = request
        .operation_type
        .as_deref()
        .ok_or(ValidationError::MissingOperationType)?
        .parse()?;

    Ok(WalletOperation {
        wallet_id,
        operation_type,
        amount,
    })
}
