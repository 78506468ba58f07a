use crate::error::{AccountError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type AccountId = u64;

/// Identity that owns accounts. Immutable after creation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AccountUser {
    pub id: UserId,
    pub name: String,
}

impl AccountUser {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    InUse,
    Unregistered,
}

/// A named balance container.
///
/// The balance is held in minor currency units and can never go negative;
/// all mutation goes through the checked methods below, and the engine only
/// calls them while holding the account's lock.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub account_number: String,
    pub balance: u64,
    pub status: AccountStatus,
    pub registered_at: DateTime<Utc>,
    /// Set once when the account is unregistered, never cleared.
    pub unregistered_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Constructs an account, enforcing invariants up front: the account
    /// number must be non-empty.
    pub fn new(
        id: AccountId,
        user_id: UserId,
        account_number: impl Into<String>,
        balance: u64,
    ) -> Result<Self> {
        let account_number = account_number.into();
        if account_number.is_empty() {
            return Err(AccountError::InvalidAccountNumber(account_number));
        }
        Ok(Self {
            id,
            user_id,
            account_number,
            balance,
            status: AccountStatus::InUse,
            registered_at: Utc::now(),
            unregistered_at: None,
        })
    }

    /// Debits the balance, rejecting amounts that exceed it.
    pub fn use_balance(&mut self, amount: u64) -> Result<()> {
        if amount > self.balance {
            return Err(AccountError::AmountExceedBalance {
                amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Credits the balance back, e.g. when a prior use is canceled.
    pub fn restore_balance(&mut self, amount: u64) -> Result<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| AccountError::InvalidAmount(format!("balance overflow: +{amount}")))?;
        Ok(())
    }

    pub fn is_in_use(&self) -> bool {
        self.status == AccountStatus::InUse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_account_number() {
        assert_eq!(
            Account::new(1, 1, "", 0).unwrap_err(),
            AccountError::InvalidAccountNumber("".into())
        );
        assert!(Account::new(1, 1, "1000000000", 0).is_ok());
    }

    #[test]
    fn use_balance_debits() {
        let mut account = Account::new(1, 1, "1000000000", 10_000).unwrap();
        account.use_balance(1_000).unwrap();
        assert_eq!(account.balance, 9_000);
    }

    #[test]
    fn use_balance_rejects_exceeding_amount() {
        let mut account = Account::new(1, 1, "1000000000", 100).unwrap();
        let result = account.use_balance(10_000);
        assert_eq!(
            result,
            Err(AccountError::AmountExceedBalance {
                amount: 10_000,
                balance: 100,
            })
        );
        // Balance untouched on rejection.
        assert_eq!(account.balance, 100);
    }

    #[test]
    fn restore_balance_credits() {
        let mut account = Account::new(1, 1, "1000000000", 9_000).unwrap();
        account.restore_balance(1_000).unwrap();
        assert_eq!(account.balance, 10_000);
    }

    #[test]
    fn restore_balance_rejects_overflow() {
        let mut account = Account::new(1, 1, "1000000000", u64::MAX).unwrap();
        assert!(account.restore_balance(1).is_err());
        assert_eq!(account.balance, u64::MAX);
    }
}
