#![allow(dead_code)]

use account_engine::application::engine::TransactionEngine;
use account_engine::application::lock::LockManager;
use account_engine::config::LockConfig;
use account_engine::domain::account::{Account, AccountUser};
use account_engine::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryKeyValueStore, InMemoryTransactionLedger,
};
use std::sync::Arc;

pub struct TestContext {
    pub engine: Arc<TransactionEngine>,
    pub store: InMemoryAccountStore,
    pub ledger: InMemoryTransactionLedger,
    pub kv: Arc<InMemoryKeyValueStore>,
}

pub fn fast_lock_config() -> LockConfig {
    LockConfig {
        wait_timeout_ms: 2_000,
        poll_interval_ms: 10,
        lease_ttl_ms: 5_000,
    }
}

pub fn build_engine(config: LockConfig) -> TestContext {
    let store = InMemoryAccountStore::new();
    let ledger = InMemoryTransactionLedger::new();
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let lock_manager = LockManager::new(kv.clone(), config);
    let engine = Arc::new(TransactionEngine::new(
        Arc::new(store.clone()),
        Arc::new(ledger.clone()),
        lock_manager,
    ));
    TestContext {
        engine,
        store,
        ledger,
        kv,
    }
}

/// Engine with user 1 "Pobi" owning account "1000000000" (id 1) at the
/// given balance.
pub async fn seeded_engine(balance: u64) -> TestContext {
    let ctx = build_engine(fast_lock_config());
    ctx.store.insert_user(AccountUser::new(1, "Pobi")).await;
    ctx.store
        .insert_account(Account::new(1, 1, "1000000000", balance).unwrap())
        .await;
    ctx
}
