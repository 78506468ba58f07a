use crate::domain::account::{Account, AccountUser};
use crate::error::{AccountError, Result};
use crate::infrastructure::in_memory::InMemoryAccountStore;
use serde::Deserialize;
use std::io::Read;

/// One pre-existing account. Account opening itself lives outside the
/// engine; the replay driver seeds the store from rows like these.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct SeedRecord {
    pub user_id: u64,
    pub name: String,
    pub account_id: u64,
    pub account_number: String,
    pub balance: u64,
}

pub struct SeedReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SeedReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    pub fn seeds(self) -> impl Iterator<Item = Result<SeedRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AccountError::from))
    }

    /// Loads every row into the store, materializing users and accounts.
    pub async fn load_into(self, store: &InMemoryAccountStore) -> Result<usize> {
        let mut count = 0;
        for seed in self.seeds() {
            let seed = seed?;
            store
                .insert_user(AccountUser::new(seed.user_id, seed.name.clone()))
                .await;
            store
                .insert_account(Account::new(
                    seed.account_id,
                    seed.user_id,
                    seed.account_number.clone(),
                    seed.balance,
                )?)
                .await;
            count += 1;
        }
        Ok(count)
    }
}
