use crate::config::LockConfig;
use crate::domain::ports::KeyValueStoreRef;
use crate::error::{AccountError, Result};
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};
use uuid::Uuid;

const LOCK_KEY_PREFIX: &str = "account-lock";

/// A held per-account lock.
///
/// Carries the fencing token so release only deletes the record this holder
/// wrote, never a lease that expired and was reacquired by another caller.
#[derive(Debug)]
pub struct AccountLock {
    key: String,
    token: String,
}

impl AccountLock {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Mutual exclusion keyed by account number, backed by a shared key-value
/// store with a short lease.
///
/// Acquisition blocks the caller for up to the configured wait, retrying at
/// the poll interval. Explicit release is the primary path; lease expiry is
/// the fallback for crashed holders only.
#[derive(Clone)]
pub struct LockManager {
    store: KeyValueStoreRef,
    config: LockConfig,
}

impl LockManager {
    pub fn new(store: KeyValueStoreRef, config: LockConfig) -> Self {
        Self { store, config }
    }

    /// Acquires the lock for `account_number`, blocking up to the wait
    /// timeout. Fails with `LockAcquisitionFailed` without side effects.
    pub async fn acquire(&self, account_number: &str) -> Result<AccountLock> {
        let key = format!("{LOCK_KEY_PREFIX}:{account_number}");
        let token = Uuid::new_v4().simple().to_string();
        let deadline = Instant::now() + self.config.wait_timeout();

        loop {
            if self
                .store
                .set_if_absent(&key, &token, self.config.lease_ttl())
                .await?
            {
                debug!(key, "lock acquired");
                return Ok(AccountLock { key, token });
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(key, "lock wait timed out");
                return Err(AccountError::LockAcquisitionFailed(
                    account_number.to_string(),
                ));
            }
            let remaining = deadline - now;
            sleep(self.config.poll_interval().min(remaining)).await;
        }
    }

    /// Releases a held lock. Best-effort: a release failure is logged and
    /// swallowed, since the lease will expire on its own and the caller on
    /// the release path has nothing further to act on.
    pub async fn release(&self, lock: AccountLock) {
        match self.store.remove_if_match(&lock.key, &lock.token).await {
            Ok(true) => debug!(key = lock.key, "lock released"),
            Ok(false) => warn!(key = lock.key, "lock already expired at release"),
            Err(e) => warn!(key = lock.key, error = %e, "lock release failed"),
        }
    }
}
