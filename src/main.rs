use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use transfer_ledger::application::batch::run_batch;
use transfer_ledger::application::coordinator::TransferCoordinator;
use transfer_ledger::config::{LedgerConfig, LockOrder};
use transfer_ledger::infrastructure::in_memory::InMemoryAccountStore;
use transfer_ledger::infrastructure::notification::LoggingNotifier;
use transfer_ledger::interfaces::csv::account_writer::AccountWriter;
use transfer_ledger::interfaces::csv::command_reader::CommandReader;
use transfer_ledger::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file (`type, account, counterpart, amount`)
    input: PathBuf,

    /// JSON configuration file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum wait for an account lock, in milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// Order in which the two locks of a transfer are taken
    #[arg(long, value_enum)]
    lock_order: Option<LockOrder>,

    /// Number of transfers processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Print final balances as JSON instead of CSV
    #[arg(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn ledger_config(&self) -> transfer_ledger::error::Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => LedgerConfig::from_json_file(path)?,
            None => LedgerConfig::default(),
        };
        if let Some(lock_timeout_ms) = self.lock_timeout_ms {
            config.lock_timeout_ms = lock_timeout_ms;
        }
        if let Some(lock_order) = self.lock_order {
            config.lock_order = lock_order;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.ledger_config().into_diagnostic()?;
    let workers = config.workers;
    let coordinator = Arc::new(TransferCoordinator::with_config(
        InMemoryAccountStore::new(),
        Arc::new(LoggingNotifier::new()),
        config,
    ));

    {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                coordinator.interrupt();
            }
        });
    }

    // Read commands, reporting rows that cannot be parsed
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let commands = reader
        .commands()
        .enumerate()
        .filter_map(|(i, result)| match result {
            Ok(command) => Some((i + 1, command)),
            Err(e) => {
                eprintln!("Error reading command {}: {}", i + 1, e);
                None
            }
        });

    let report = run_batch(coordinator.clone(), commands, workers).await;
    for (index, err) in &report.failures {
        eprintln!("Error processing command {}: {}", index, err);
    }

    // Output final state
    let accounts = coordinator.store().all_accounts();
    let stdout = io::stdout();
    if cli.json {
        serde_json::to_writer_pretty(stdout.lock(), &accounts).into_diagnostic()?;
        println!();
    } else {
        let mut writer = AccountWriter::new(stdout.lock());
        writer.write_accounts(&accounts).into_diagnostic()?;
    }

    Ok(())
}
