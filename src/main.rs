use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paypoint::application::engine::LedgerEngine;
use paypoint::config::InventoryConfig;
use paypoint::infrastructure::inventory::InventoryStore;
use paypoint::interfaces::csv::ledger_writer::LedgerWriter;
use paypoint::interfaces::csv::request_reader::RequestReader;
use paypoint::interfaces::json::response::{Health, Response, ResponseWriter};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input payment requests CSV file
    #[arg(required_unless_present = "health")]
    input: Option<PathBuf>,

    /// JSON file overriding the default accounts and card catalog
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a statistics line after the responses
    #[arg(long)]
    stats: bool,

    /// Number of recent transactions included in the statistics
    #[arg(long, default_value_t = 5)]
    recent: usize,

    /// Export the transaction log as CSV to this path
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Print a health report and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut responses = ResponseWriter::new(stdout.lock());

    if cli.health {
        responses.write_health(&Health::now()).into_diagnostic()?;
        return Ok(());
    }
    let Some(input) = cli.input else {
        return Ok(());
    };

    let config = match &cli.config {
        Some(path) => InventoryConfig::load(path).into_diagnostic()?,
        None => InventoryConfig::default(),
    };

    let inventory = InventoryStore::default();
    inventory.initialize(&config).await.into_diagnostic()?;
    let engine = LedgerEngine::with_inventory(inventory);

    // Process requests in file order
    let file = File::open(input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request in reader.requests() {
        let result = match request {
            Ok(request) => engine.submit(request).await,
            Err(e) => {
                warn!(error = %e, "Error reading request");
                Err(e)
            }
        };
        responses
            .write_response(&Response::from(&result))
            .into_diagnostic()?;
    }

    if cli.stats {
        let statistics = engine.statistics(cli.recent).await.into_diagnostic()?;
        responses.write_statistics(&statistics).into_diagnostic()?;
    }

    if let Some(path) = cli.ledger {
        let transactions = engine.transactions().await.into_diagnostic()?;
        let file = File::create(path).into_diagnostic()?;
        LedgerWriter::new(file)
            .write_transactions(&transactions)
            .into_diagnostic()?;
    }

    Ok(())
}
