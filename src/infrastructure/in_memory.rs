use crate::domain::account::{Account, AccountUser, UserId};
use crate::domain::ports::{AccountStore, KeyValueStore, TransactionLedger};
use crate::domain::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

/// In-memory account store.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access. Accounts and
/// users are seeded through the inherent insert methods; the engine only
/// goes through the `AccountStore` port.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    users: Arc<RwLock<HashMap<UserId, AccountUser>>>,
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: AccountUser) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn insert_account(&self, account: Account) {
        self.accounts
            .write()
            .await
            .insert(account.account_number.clone(), account);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AccountUser>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_account_by_number(&self, number: &str) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(number).cloned())
    }

    async fn save_account(&self, account: Account) -> Result<()> {
        self.accounts
            .write()
            .await
            .insert(account.account_number.clone(), account);
        Ok(())
    }
}

/// In-memory transaction ledger.
///
/// Keeps an append-only audit log next to a latest-row-per-id index: saving
/// an entry under an existing id re-points the index (how a cancellation
/// marker supersedes the original use) while the log keeps every row in
/// write order.
#[derive(Default, Clone)]
pub struct InMemoryTransactionLedger {
    inner: Arc<RwLock<LedgerInner>>,
}

#[derive(Default)]
struct LedgerInner {
    log: Vec<Transaction>,
    by_id: HashMap<String, Transaction>,
}

impl InMemoryTransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full audit log in write order. Test/inspection helper, not a port
    /// method.
    pub async fn entries(&self) -> Vec<Transaction> {
        self.inner.read().await.log.clone()
    }
}

#[async_trait]
impl TransactionLedger for InMemoryTransactionLedger {
    async fn save(&self, tx: Transaction) -> Result<Transaction> {
        let mut inner = self.inner.write().await;
        inner.log.push(tx.clone());
        inner.by_id.insert(tx.transaction_id.clone(), tx.clone());
        Ok(tx)
    }

    async fn find_by_transaction_id(&self, id: &str) -> Result<Option<Transaction>> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }
}

/// In-memory key-value store with per-entry expiry, standing in for the
/// shared cache the lock manager runs against in production.
#[derive(Default, Clone)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, KvEntry>>>,
}

struct KvEntry {
    token: String,
    expires_at: Instant,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn set_if_absent(&self, key: &str, token: &str, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(false),
            _ => {
                entries.insert(
                    key.to_string(),
                    KvEntry {
                        token: token.to_string(),
                        expires_at: now + ttl,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn remove_if_match(&self, key: &str, token: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.token == token && entry.expires_at > now => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn account_store_roundtrip() {
        let store = InMemoryAccountStore::new();
        store.insert_user(AccountUser::new(1, "Pobi")).await;
        store
            .insert_account(Account::new(1, 1, "1000000000", 10_000).unwrap())
            .await;

        let user = store.find_user_by_id(1).await.unwrap().unwrap();
        assert_eq!(user.name, "Pobi");

        let account = store
            .find_account_by_number("1000000000")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.balance, 10_000);

        assert!(store.find_user_by_id(2).await.unwrap().is_none());
        assert!(
            store
                .find_account_by_number("9999999999")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn save_account_overwrites_by_number() {
        let store = InMemoryAccountStore::new();
        let mut account = Account::new(1, 1, "1000000000", 10_000).unwrap();
        store.insert_account(account.clone()).await;

        account.use_balance(1_000).unwrap();
        store.save_account(account).await.unwrap();

        let reloaded = store
            .find_account_by_number("1000000000")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.balance, 9_000);
    }

    #[tokio::test]
    async fn ledger_log_keeps_write_order_while_index_takes_latest() {
        use crate::domain::transaction::{TransactionResult, TransactionType};
        use chrono::Utc;

        let ledger = InMemoryTransactionLedger::new();
        let base = Transaction {
            transaction_id: "txid".into(),
            account_id: 1,
            account_number: "1000000000".into(),
            transaction_type: TransactionType::Use,
            result: TransactionResult::Success,
            amount: 1_000,
            balance_snapshot: 9_000,
            transacted_at: Utc::now(),
        };
        ledger.save(base.clone()).await.unwrap();

        let marker = Transaction {
            transaction_type: TransactionType::UseCanceled,
            ..base
        };
        ledger.save(marker).await.unwrap();

        let log = ledger.entries().await;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].transaction_type, TransactionType::Use);
        assert_eq!(log[1].transaction_type, TransactionType::UseCanceled);

        let latest = ledger.find_by_transaction_id("txid").await.unwrap().unwrap();
        assert_eq!(latest.transaction_type, TransactionType::UseCanceled);
    }

    #[tokio::test]
    async fn kv_set_if_absent_respects_live_entries() {
        let store = InMemoryKeyValueStore::new();
        let ttl = Duration::from_secs(5);

        assert!(store.set_if_absent("k", "a", ttl).await.unwrap());
        assert!(!store.set_if_absent("k", "b", ttl).await.unwrap());

        assert!(!store.remove_if_match("k", "b").await.unwrap());
        assert!(store.remove_if_match("k", "a").await.unwrap());
        assert!(store.set_if_absent("k", "b", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn kv_expired_entry_counts_as_absent() {
        let store = InMemoryKeyValueStore::new();

        assert!(
            store
                .set_if_absent("k", "a", Duration::from_millis(10))
                .await
                .unwrap()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(
            store
                .set_if_absent("k", "b", Duration::from_secs(5))
                .await
                .unwrap()
        );
        // The stale token no longer matches anything live.
        assert!(!store.remove_if_match("k", "a").await.unwrap());
    }
}
