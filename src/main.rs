use account_engine::application::engine::TransactionEngine;
use account_engine::application::lock::LockManager;
use account_engine::config::EngineConfig;
use account_engine::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryKeyValueStore, InMemoryTransactionLedger,
};
use account_engine::interfaces::csv::operation_reader::{OperationKind, OperationReader};
use account_engine::interfaces::csv::result_writer::ResultWriter;
use account_engine::interfaces::csv::seed_reader::SeedReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Replays balance operations from a CSV file through the transaction
/// engine and writes the resulting projections to stdout.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Operations CSV: op,user_id,account_number,transaction_id,amount
    input: PathBuf,

    /// Seed accounts CSV: user_id,name,account_id,account_number,balance
    #[arg(long)]
    accounts: PathBuf,

    /// Optional JSON configuration (lock timeouts and lease)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => EngineConfig::from_file(path).into_diagnostic()?,
        None => EngineConfig::default(),
    };

    let account_store = InMemoryAccountStore::new();
    let accounts_file = File::open(cli.accounts).into_diagnostic()?;
    SeedReader::new(accounts_file)
        .load_into(&account_store)
        .await
        .into_diagnostic()?;

    let ledger = InMemoryTransactionLedger::new();
    let lock_manager = LockManager::new(Arc::new(InMemoryKeyValueStore::new()), config.lock);
    let engine = TransactionEngine::new(
        Arc::new(account_store),
        Arc::new(ledger),
        lock_manager,
    );

    let input = File::open(cli.input).into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());

    for record in OperationReader::new(input).operations() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Error reading operation: {e}");
                continue;
            }
        };

        let outcome = match record.op {
            OperationKind::Use => match (record.user_id(), record.account_number(), record.amount())
            {
                (Ok(user_id), Ok(number), Ok(amount)) => {
                    engine.use_balance(user_id, number, amount).await.map(Some)
                }
                (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => Err(e),
            },
            OperationKind::Cancel => {
                match (
                    record.transaction_id(),
                    record.account_number(),
                    record.amount(),
                ) {
                    (Ok(id), Ok(number), Ok(amount)) => {
                        engine.cancel_balance(id, number, amount).await.map(Some)
                    }
                    (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => Err(e),
                }
            }
            OperationKind::Query => match record.transaction_id() {
                Ok(id) => engine.query_transaction(id).await.map(Some),
                Err(e) => Err(e),
            },
            OperationKind::Fail => match (record.account_number(), record.amount()) {
                (Ok(number), Ok(amount)) => {
                    engine.save_failed_use_transaction(number, amount).await;
                    Ok(None)
                }
                (Err(e), _) | (_, Err(e)) => Err(e),
            },
        };

        match outcome {
            Ok(Some(dto)) => writer.write(&dto).into_diagnostic()?,
            Ok(None) => {}
            Err(e) => eprintln!("Error processing operation: {e}"),
        }
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
