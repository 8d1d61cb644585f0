use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trade_journal_core::{
    summarize, AppConfig, ConfigLoader, JournalProvider, StorageBackend, SummaryFormatter,
    TradeInput, TradeStore, DEFAULT_CONFIG_PATH,
};
use trade_journal_data::{
    read_journal, CsvJournalProvider, CsvTradeStore, DocumentDatabase, DocumentJournalProvider,
};
use trade_journal_web_api::{ApiServer, Authenticator};

#[derive(Parser)]
#[command(name = "trade-journal")]
#[command(about = "Personal trading journal with performance summary", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the journal web server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },
    /// Print summary statistics for a CSV journal
    Summary {
        /// Journal CSV file
        #[arg(short, long, env = "JOURNAL_CSV", default_value = "trading_journal.csv")]
        file: PathBuf,
    },
    /// Print every trade in a CSV journal
    List {
        /// Journal CSV file
        #[arg(short, long, env = "JOURNAL_CSV", default_value = "trading_journal.csv")]
        file: PathBuf,
    },
    /// Append one trade to a CSV journal
    Add(AddArgs),
}

#[derive(Args)]
struct AddArgs {
    /// Journal CSV file
    #[arg(short, long, env = "JOURNAL_CSV", default_value = "trading_journal.csv")]
    file: PathBuf,
    /// Instrument traded (e.g. "NIFTY")
    #[arg(long)]
    script: String,
    /// Entry time
    #[arg(long, default_value = "")]
    time: String,
    /// Long or Short
    #[arg(long)]
    direction: String,
    #[arg(long)]
    entry: String,
    /// Stop loss
    #[arg(long, default_value = "")]
    sl: String,
    #[arg(long)]
    quantity: String,
    /// Percent of account risked, free text
    #[arg(long, default_value = "")]
    risked: String,
    #[arg(long, default_value = "")]
    target: String,
    #[arg(long)]
    exit: String,
    #[arg(long, default_value = "")]
    exit_time: String,
    /// Risk/reward, free text (e.g. "1:2")
    #[arg(long, default_value = "")]
    rr: String,
    /// Realised profit or loss
    #[arg(long, allow_hyphen_values = true)]
    pl: String,
    /// Whether the trade followed your rules (Yes/No)
    #[arg(long, default_value = "Yes")]
    rules: String,
}

impl From<AddArgs> for TradeInput {
    fn from(args: AddArgs) -> Self {
        Self {
            script_name: args.script,
            time: args.time,
            long_short: args.direction,
            entry_price: args.entry,
            sl: args.sl,
            quantity: args.quantity,
            account_risked: args.risked,
            target_price: args.target,
            exit_price: args.exit,
            exit_time: args.exit_time,
            rr: args.rr,
            pl: args.pl,
            follow_rules: args.rules,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Serve { config } => run_server(&config).await?,
        Commands::Summary { file } => run_summary(&file)?,
        Commands::List { file } => run_list(&file)?,
        Commands::Add(args) => run_add(args).await?,
    }

    Ok(())
}

async fn run_server(config_path: &str) -> anyhow::Result<()> {
    tracing::info!("Starting trading journal with config: {}", config_path);

    let config = ConfigLoader::load_from(config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;
    let journals = build_provider(&config)?;
    let auth = Authenticator::from_config(&config.auth);

    if !auth.allows_anonymous() && config.auth.tokens.is_empty() {
        tracing::warn!("Anonymous access is disabled and no sign-in tokens are configured");
    }

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    ApiServer::new(journals, auth)
        .serve_with_shutdown(listener, shutdown_signal())
        .await
}

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn JournalProvider>> {
    let storage = &config.storage;
    let provider: Arc<dyn JournalProvider> = match storage.backend {
        StorageBackend::Csv => {
            let store = CsvTradeStore::open(&storage.csv_path).with_context(|| {
                format!("failed to open journal {}", storage.csv_path.display())
            })?;
            tracing::info!(path = %storage.csv_path.display(), "Using CSV journal");
            Arc::new(CsvJournalProvider::new(Arc::new(store)))
        }
        StorageBackend::Document => {
            let db = match &storage.document_path {
                Some(path) => DocumentDatabase::open(path).with_context(|| {
                    format!("failed to open document snapshot {}", path.display())
                })?,
                None => {
                    tracing::warn!("No document_path configured; journal will not survive restart");
                    DocumentDatabase::in_memory()
                }
            };
            tracing::info!(app_id = %storage.app_id, "Using document journal");
            Arc::new(DocumentJournalProvider::new(
                Arc::new(db),
                storage.app_id.clone(),
            ))
        }
    };
    Ok(provider)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        _ => {
            tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        }
    }
}

fn run_summary(file: &Path) -> anyhow::Result<()> {
    let trades = read_journal(file)
        .with_context(|| format!("failed to read journal {}", file.display()))?;
    println!("{}", SummaryFormatter::format(&summarize(&trades)));
    Ok(())
}

fn run_list(file: &Path) -> anyhow::Result<()> {
    let trades = read_journal(file)
        .with_context(|| format!("failed to read journal {}", file.display()))?;
    if trades.is_empty() {
        println!("No trades recorded yet.");
    } else {
        println!("{}", SummaryFormatter::format_trades(&trades));
    }
    Ok(())
}

async fn run_add(args: AddArgs) -> anyhow::Result<()> {
    let file = args.file.clone();
    let trade = TradeInput::from(args).parse()?;
    let store = CsvTradeStore::open(&file)
        .with_context(|| format!("failed to open journal {}", file.display()))?;
    let record = store.append(trade).await?;

    println!(
        "Recorded trade #{} ({} {})",
        record.sl_no, record.trade.direction, record.trade.script_name
    );
    Ok(())
}
