use super::account::{Account, AccountUser, UserId};
use super::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type TransactionLedgerRef = Arc<dyn TransactionLedger>;
pub type KeyValueStoreRef = Arc<dyn KeyValueStore>;

/// Durable mapping from user id / account number to account state.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AccountUser>>;
    async fn find_account_by_number(&self, number: &str) -> Result<Option<Account>>;
    async fn save_account(&self, account: Account) -> Result<()>;
}

/// Append-style durable record of every transaction attempt.
///
/// The engine decides all fields before calling `save`; the store adds
/// nothing but durability.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    async fn save(&self, tx: Transaction) -> Result<Transaction>;
    async fn find_by_transaction_id(&self, id: &str) -> Result<Option<Transaction>>;
}

/// Shared key-value store backing the distributed lock.
///
/// Expired entries count as absent, and `remove_if_match` only deletes when
/// the fencing token matches, so a stale holder can never release a lock
/// that expired and was reacquired by someone else.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Sets `key` to `token` with the given time-to-live, only if the key
    /// is currently absent. Returns whether the set happened.
    async fn set_if_absent(&self, key: &str, token: &str, ttl: Duration) -> Result<bool>;

    /// Removes `key` if it still holds `token`. Returns whether a removal
    /// happened.
    async fn remove_if_match(&self, key: &str, token: &str) -> Result<bool>;
}
