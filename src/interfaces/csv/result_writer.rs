use crate::domain::transaction::{TransactionDto, TransactionResult, TransactionType};
use crate::error::{AccountError, Result};
use std::io::Write;

/// Writes engine projections as CSV rows.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
    wrote_header: bool,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
            wrote_header: false,
        }
    }

    pub fn write(&mut self, dto: &TransactionDto) -> Result<()> {
        if !self.wrote_header {
            self.writer.write_record([
                "transaction_id",
                "type",
                "result",
                "amount",
                "balance_snapshot",
            ])?;
            self.wrote_header = true;
        }
        self.writer.write_record([
            dto.transaction_id.as_str(),
            type_label(dto.transaction_type),
            result_label(dto.result),
            &dto.amount.to_string(),
            &dto.balance_snapshot.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| AccountError::Storage(format!("flush output: {e}")))
    }
}

fn type_label(tx_type: TransactionType) -> &'static str {
    match tx_type {
        TransactionType::Use => "use",
        TransactionType::UseCanceled => "use_canceled",
        TransactionType::Cancel => "cancel",
    }
}

fn result_label(result: TransactionResult) -> &'static str {
    match result {
        TransactionResult::Success => "success",
        TransactionResult::Fail => "fail",
    }
}
