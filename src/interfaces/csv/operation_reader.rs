use crate::error::{AccountError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Use,
    Cancel,
    Query,
    Fail,
}

/// One row of the replay input. Which fields are required depends on the
/// operation; the engine driver validates per kind.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRecord {
    pub op: OperationKind,
    pub user_id: Option<u64>,
    pub account_number: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<u64>,
}

impl OperationRecord {
    pub fn user_id(&self) -> Result<u64> {
        self.user_id
            .ok_or_else(|| AccountError::Parse("missing user_id".into()))
    }

    pub fn account_number(&self) -> Result<&str> {
        self.account_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AccountError::Parse("missing account_number".into()))
    }

    pub fn transaction_id(&self) -> Result<&str> {
        self.transaction_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AccountError::Parse("missing transaction_id".into()))
    }

    pub fn amount(&self) -> Result<u64> {
        self.amount
            .ok_or_else(|| AccountError::Parse("missing amount".into()))
    }
}

/// Streams operations from a CSV source without loading the whole file.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<OperationRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(AccountError::from))
    }
}
