use crate::application::lock::LockManager;
use crate::domain::account::Account;
use crate::domain::ports::{AccountStoreRef, TransactionLedgerRef};
use crate::domain::transaction::{
    Transaction, TransactionDto, TransactionResult, TransactionType,
};
use crate::error::{AccountError, Result};
use chrono::{Months, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

/// Orchestrates validation, locking, balance mutation and ledger recording
/// for balance operations.
///
/// The per-account-number lock is the sole serialization mechanism: it is
/// held across the entire critical section (all lookups, the mutation and
/// the ledger write) and released on every exit path. Operations against
/// different account numbers run fully in parallel.
pub struct TransactionEngine {
    account_store: AccountStoreRef,
    ledger: TransactionLedgerRef,
    lock_manager: LockManager,
}

impl TransactionEngine {
    pub fn new(
        account_store: AccountStoreRef,
        ledger: TransactionLedgerRef,
        lock_manager: LockManager,
    ) -> Self {
        Self {
            account_store,
            ledger,
            lock_manager,
        }
    }

    /// Debits `amount` from the account, recording a `Use` ledger entry.
    ///
    /// Validation runs in strict order under the account lock; the first
    /// failing check wins and nothing is mutated or recorded before it.
    /// If persistence fails after validation passed, any committed debit
    /// is reverted, the attempt degrades to a best-effort `Fail` ledger
    /// entry with the unchanged balance, and the projection of that entry
    /// is returned instead of an error.
    pub async fn use_balance(
        &self,
        user_id: u64,
        account_number: &str,
        amount: u64,
    ) -> Result<TransactionDto> {
        require_positive(amount)?;

        let lock = self.lock_manager.acquire(account_number).await?;
        let result = self.use_balance_locked(user_id, account_number, amount).await;
        self.lock_manager.release(lock).await;
        result
    }

    async fn use_balance_locked(
        &self,
        user_id: u64,
        account_number: &str,
        amount: u64,
    ) -> Result<TransactionDto> {
        let user = self
            .account_store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AccountError::UserNotFound(user_id))?;
        let mut account = self
            .account_store
            .find_account_by_number(account_number)
            .await?
            .ok_or_else(|| AccountError::AccountNotFound(account_number.to_string()))?;

        if account.user_id != user.id {
            return Err(AccountError::UserAccountUnMatch {
                user_id,
                account_number: account_number.to_string(),
            });
        }
        if !account.is_in_use() {
            return Err(AccountError::AccountAlreadyUnregistered(
                account_number.to_string(),
            ));
        }

        let balance_before = account.balance;
        account.use_balance(amount)?;

        let success = Transaction {
            transaction_id: new_transaction_id(),
            account_id: account.id,
            account_number: account.account_number.clone(),
            transaction_type: TransactionType::Use,
            result: TransactionResult::Success,
            amount,
            balance_snapshot: account.balance,
            transacted_at: Utc::now(),
        };

        // Validation already passed; from here a storage failure degrades
        // to an audit-trail Fail entry with the pre-debit balance instead
        // of surfacing the error.
        if let Err(e) = self.account_store.save_account(account.clone()).await {
            warn!(account_number, error = %e, "saving debited account failed, recording fail entry");
            let fail = self
                .append_failed_use(&account, amount, balance_before)
                .await;
            return Ok(fail.to_dto());
        }

        match self.ledger.save(success).await {
            Ok(saved) => {
                debug!(
                    account_number,
                    amount,
                    balance = saved.balance_snapshot,
                    "balance used"
                );
                Ok(saved.to_dto())
            }
            Err(e) => {
                // The debit already committed; revert it so the account
                // store agrees with the Fail entry about to be written.
                warn!(account_number, error = %e, "recording use failed, reverting debit");
                let mut reverted = account;
                reverted.balance = balance_before;
                if let Err(e) = self.account_store.save_account(reverted.clone()).await {
                    warn!(account_number, error = %e, "reverting debit failed");
                }
                let fail = self
                    .append_failed_use(&reverted, amount, balance_before)
                    .await;
                Ok(fail.to_dto())
            }
        }
    }

    /// Fully reverses a prior successful use, recording a `UseCanceled`
    /// marker for the original entry followed by a new `Cancel` credit.
    ///
    /// The marker is written before the credit so audit replay sees the
    /// reversal first.
    pub async fn cancel_balance(
        &self,
        transaction_id: &str,
        account_number: &str,
        amount: u64,
    ) -> Result<TransactionDto> {
        require_positive(amount)?;

        let lock = self.lock_manager.acquire(account_number).await?;
        let result = self
            .cancel_balance_locked(transaction_id, account_number, amount)
            .await;
        self.lock_manager.release(lock).await;
        result
    }

    async fn cancel_balance_locked(
        &self,
        transaction_id: &str,
        account_number: &str,
        amount: u64,
    ) -> Result<TransactionDto> {
        let original = self
            .ledger
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| AccountError::TransactionNotFound(transaction_id.to_string()))?;
        let mut account = self
            .account_store
            .find_account_by_number(account_number)
            .await?
            .ok_or_else(|| AccountError::AccountNotFound(account_number.to_string()))?;

        if original.account_id != account.id {
            return Err(AccountError::TransactionAccountUnMatch {
                transaction_id: transaction_id.to_string(),
                account_number: account_number.to_string(),
            });
        }
        if original.amount != amount {
            return Err(AccountError::CancelMustFully {
                requested: amount,
                original: original.amount,
            });
        }
        let one_year_ago = Utc::now()
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| AccountError::Storage("cancellation window underflows the clock".into()))?;
        if original.transacted_at < one_year_ago {
            return Err(AccountError::TooOldOrderToCancel(
                transaction_id.to_string(),
            ));
        }
        if original.transaction_type == TransactionType::UseCanceled {
            return Err(AccountError::TransactionAlreadyCanceled(
                transaction_id.to_string(),
            ));
        }

        account.restore_balance(amount)?;
        self.account_store.save_account(account.clone()).await?;

        // Reversal marker first: the original id now reads as canceled.
        let marker = Transaction {
            transaction_type: TransactionType::UseCanceled,
            ..original
        };
        self.ledger.save(marker).await?;

        let cancel = Transaction {
            transaction_id: new_transaction_id(),
            account_id: account.id,
            account_number: account.account_number.clone(),
            transaction_type: TransactionType::Cancel,
            result: TransactionResult::Success,
            amount,
            balance_snapshot: account.balance,
            transacted_at: Utc::now(),
        };
        let saved = self.ledger.save(cancel).await?;
        debug!(
            account_number,
            amount,
            balance = saved.balance_snapshot,
            "use canceled"
        );
        Ok(saved.to_dto())
    }

    /// Looks up a transaction by id. Pure read; takes no lock.
    pub async fn query_transaction(&self, transaction_id: &str) -> Result<TransactionDto> {
        self.ledger
            .find_by_transaction_id(transaction_id)
            .await?
            .map(|tx| tx.to_dto())
            .ok_or_else(|| AccountError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Appends a `Fail` use entry without touching the balance.
    ///
    /// Best-effort audit trail on an already-failing path: a missing
    /// account or a failing write is logged and swallowed, never surfaced.
    pub async fn save_failed_use_transaction(&self, account_number: &str, amount: u64) {
        let account = match self.account_store.find_account_by_number(account_number).await {
            Ok(Some(account)) => account,
            Ok(None) => {
                warn!(account_number, "failed-use entry skipped: account not found");
                return;
            }
            Err(e) => {
                warn!(account_number, error = %e, "failed-use entry skipped");
                return;
            }
        };
        self.append_failed_use(&account, amount, account.balance)
            .await;
    }

    async fn append_failed_use(
        &self,
        account: &Account,
        amount: u64,
        balance_snapshot: u64,
    ) -> Transaction {
        let fail = Transaction {
            transaction_id: new_transaction_id(),
            account_id: account.id,
            account_number: account.account_number.clone(),
            transaction_type: TransactionType::Use,
            result: TransactionResult::Fail,
            amount,
            balance_snapshot,
            transacted_at: Utc::now(),
        };
        if let Err(e) = self.ledger.save(fail.clone()).await {
            warn!(
                account_number = account.account_number,
                error = %e,
                "recording fail entry also failed"
            );
        }
        fail
    }
}

fn require_positive(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(AccountError::InvalidAmount("amount must be positive".into()));
    }
    Ok(())
}

fn new_transaction_id() -> String {
    Uuid::new_v4().simple().to_string()
}
