use thiserror::Error;

pub type Result<T> = std::result::Result<T, AccountError>;

/// All failure modes a caller can observe.
///
/// Every variant except `Storage` is a recoverable, user-facing condition:
/// the caller can retry with corrected input or report the failure. Lock
/// and validation errors abort before any mutation or ledger write.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("user {0} not found")]
    UserNotFound(u64),

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("user {user_id} does not own account {account_number}")]
    UserAccountUnMatch {
        user_id: u64,
        account_number: String,
    },

    #[error("account {0} is already unregistered")]
    AccountAlreadyUnregistered(String),

    #[error("amount {amount} exceeds balance {balance}")]
    AmountExceedBalance { amount: u64, balance: u64 },

    #[error("transaction {0} not found")]
    TransactionNotFound(String),

    #[error("transaction {transaction_id} does not belong to account {account_number}")]
    TransactionAccountUnMatch {
        transaction_id: String,
        account_number: String,
    },

    #[error("cancel amount {requested} must fully match the original amount {original}")]
    CancelMustFully { requested: u64, original: u64 },

    #[error("transaction {0} is older than one year and can no longer be canceled")]
    TooOldOrderToCancel(String),

    #[error("transaction {0} is already canceled")]
    TransactionAlreadyCanceled(String),

    #[error("could not acquire lock on account {0}")]
    LockAcquisitionFailed(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid account number: {0}")]
    InvalidAccountNumber(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<csv::Error> for AccountError {
    fn from(error: csv::Error) -> Self {
        AccountError::Parse(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = AccountError::AmountExceedBalance {
            amount: 10_000,
            balance: 100,
        };
        assert_eq!(err.to_string(), "amount 10000 exceeds balance 100");

        let err = AccountError::LockAcquisitionFailed("1000000000".into());
        assert_eq!(
            err.to_string(),
            "could not acquire lock on account 1000000000"
        );
    }
}
