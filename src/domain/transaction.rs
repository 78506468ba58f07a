use crate::domain::account::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Use,
    UseCanceled,
    Cancel,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionResult {
    Success,
    Fail,
}

/// An immutable ledger entry.
///
/// Entries are never edited after being written; canceling a use appends a
/// `UseCanceled` marker for the original id followed by a new `Cancel` row.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: AccountId,
    pub account_number: String,
    pub transaction_type: TransactionType,
    pub result: TransactionResult,
    pub amount: u64,
    /// Account balance after this entry was applied, or the unchanged
    /// balance when the entry records a failure.
    pub balance_snapshot: u64,
    pub transacted_at: DateTime<Utc>,
}

impl Transaction {
    /// Read-model projection returned to callers.
    pub fn to_dto(&self) -> TransactionDto {
        TransactionDto {
            transaction_id: self.transaction_id.clone(),
            transaction_type: self.transaction_type,
            result: self.result,
            amount: self.amount,
            balance_snapshot: self.balance_snapshot,
            transacted_at: self.transacted_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionDto {
    pub transaction_id: String,
    pub transaction_type: TransactionType,
    pub result: TransactionResult,
    pub amount: u64,
    pub balance_snapshot: u64,
    pub transacted_at: DateTime<Utc>,
}
