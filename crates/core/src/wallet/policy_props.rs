//! Property-based tests for the balance policy and request validation.

use proptest::prelude::*;
use uuid::Uuid;
use wallet_shared::types::WalletId;

use super::error::{PolicyError, ValidationError};
use super::policy::BalancePolicy;
use super::types::{OperationRequest, OperationType};
use super::validation::validate_request;

/// Balances well inside the `i64` range so deposits never overflow.
fn balance() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000_000i64
}

fn amount() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

fn operation() -> impl Strategy<Value = OperationType> {
    prop_oneof![Just(OperationType::Deposit), Just(OperationType::Withdraw)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A successful application never produces a negative balance.
    #[test]
    fn prop_balance_never_negative(
        current in balance(),
        op in operation(),
        amt in amount(),
    ) {
        if let Ok(next) = BalancePolicy::apply(current, op, amt) {
            prop_assert!(next >= 0);
        }
    }

    /// Withdrawals larger than the balance are always rejected.
    #[test]
    fn prop_overdraft_rejected(current in balance(), extra in amount()) {
        let result = BalancePolicy::apply(current, OperationType::Withdraw, current + extra);
        prop_assert_eq!(
            result,
            Err(PolicyError::InsufficientFunds { balance: current, requested: current + extra })
        );
    }

    /// Depositing then withdrawing the same amount restores the balance.
    #[test]
    fn prop_deposit_withdraw_inverse(current in balance(), amt in amount()) {
        let up = BalancePolicy::apply(current, OperationType::Deposit, amt).unwrap();
        let down = BalancePolicy::apply(up, OperationType::Withdraw, amt).unwrap();
        prop_assert_eq!(down, current);
    }

    /// Applying a sequence step by step, skipping rejected steps, ends on a
    /// balance equal to accepted deposits minus accepted withdrawals.
    #[test]
    fn prop_accepted_sequence_sums(ops in prop::collection::vec((operation(), amount()), 0..50)) {
        let mut balance = 0i64;
        let mut deposited = 0i64;
        let mut withdrawn = 0i64;
        for (op, amt) in ops {
            if let Ok(next) = BalancePolicy::apply(balance, op, amt) {
                balance = next;
                match op {
                    OperationType::Deposit => deposited += amt,
                    OperationType::Withdraw => withdrawn += amt,
                }
            }
        }
        prop_assert!(balance >= 0);
        prop_assert_eq!(balance, deposited - withdrawn);
    }

    /// Non-positive amounts are rejected whatever the operation type.
    #[test]
    fn prop_non_positive_amount_rejected(amt in i64::MIN..=0i64, op in operation()) {
        let request = OperationRequest::new(WalletId::from_uuid(Uuid::new_v4()), op, amt);
        prop_assert_eq!(
            validate_request(&request),
            Err(ValidationError::NonPositiveAmount(amt))
        );
    }

    /// Any string other than the two literals is rejected.
    #[test]
    fn prop_unknown_operation_rejected(op in "[A-Za-z_]{1,12}") {
        prop_assume!(op != "DEPOSIT" && op != "WITHDRAW");
        let request = OperationRequest {
            wallet_id: Some(WalletId::from_uuid(Uuid::new_v4())),
            operation_type: Some(op.clone()),
            amount: Some(1),
        };
        prop_assert_eq!(
            validate_request(&request),
            Err(ValidationError::UnknownOperationType(op))
        );
    }
}
