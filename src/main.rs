use balance_relay::application::export::{
    TransactionFilter, amount_between, category, hour_between, not_foreign, weekday,
    write_json_file,
};
use balance_relay::application::intake::IntakeService;
use balance_relay::application::pipeline::TransactionPipeline;
use balance_relay::config::{
    DEFAULT_INTAKE_TOPIC, DEFAULT_REPUBLISH_TOPIC, DEFAULT_UP_BASE_URL, PersistencePolicy,
    PipelineConfig,
};
use balance_relay::domain::ports::{BalanceStoreHandle, SignatureVerifierHandle};
use balance_relay::infrastructure::http_sender::ReqwestWebhookSender;
use balance_relay::infrastructure::in_memory::InMemoryBalanceStore;
use balance_relay::infrastructure::local_bus::LocalBus;
#[cfg(feature = "storage-rocksdb")]
use balance_relay::infrastructure::rocksdb::RocksDBStore;
use balance_relay::infrastructure::signature::HmacSha256Verifier;
use balance_relay::infrastructure::up_api::UpClient;
use balance_relay::interfaces::http::{AppState, router};
use balance_relay::interfaces::push::run_push_subscription;
use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay HTTP service
    Serve(ServeArgs),
    /// Export transactions from the banking API to a JSON file
    Export(ExportArgs),
}

#[derive(Args)]
struct UpArgs {
    /// Banking API personal access token
    #[arg(long, env = "UP_TOKEN", hide_env_values = true)]
    up_token: String,

    /// Banking API root URL
    #[arg(long, env = "UP_BASE_URL", default_value = DEFAULT_UP_BASE_URL)]
    up_base_url: String,

    /// Timeout for each banking API request, in seconds
    #[arg(long, default_value_t = 10)]
    upstream_timeout_secs: u64,
}

impl UpArgs {
    fn client(&self) -> Result<UpClient> {
        UpClient::new(
            &self.up_base_url,
            self.up_token.clone(),
            Duration::from_secs(self.upstream_timeout_secs),
        )
        .into_diagnostic()
    }
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    up: UpArgs,

    /// Address to listen on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Secret used to verify webhook signatures. Without it every webhook call is rejected.
    #[arg(long, env = "UP_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Topic verified webhook calls are queued on
    #[arg(long, default_value = DEFAULT_INTAKE_TOPIC)]
    intake_topic: String,

    /// Topic enriched transactions are re-published to
    #[arg(long, default_value = DEFAULT_REPUBLISH_TOPIC)]
    republish_topic: String,

    /// Timeout for each subscriber delivery, in seconds
    #[arg(long, default_value_t = 10)]
    delivery_timeout_secs: u64,

    /// Fail a run when the cached balance cannot be written
    #[arg(long)]
    abort_on_persistence_failure: bool,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    up: UpArgs,

    /// Output file
    #[arg(long, short, default_value = "transactions-all.json")]
    output: PathBuf,

    /// Transactions requested per page
    #[arg(long, default_value_t = 100)]
    page_size: u16,

    /// Lowest amount to keep, in base units (inclusive)
    #[arg(long, allow_hyphen_values = true)]
    min_base_units: Option<i64>,

    /// Highest amount to keep, in base units (inclusive)
    #[arg(long, allow_hyphen_values = true)]
    max_base_units: Option<i64>,

    /// Earliest local hour to keep (inclusive)
    #[arg(long)]
    from_hour: Option<u32>,

    /// Latest local hour to keep (inclusive)
    #[arg(long)]
    to_hour: Option<u32>,

    /// Keep only transactions made Monday to Friday
    #[arg(long)]
    weekdays_only: bool,

    /// Keep only transactions without a foreign amount
    #[arg(long)]
    domestic_only: bool,

    /// Keep only transactions in this category
    #[arg(long)]
    category: Option<String>,
}

impl ExportArgs {
    fn filter(&self) -> TransactionFilter {
        let mut filter = TransactionFilter::new();
        if self.min_base_units.is_some() || self.max_base_units.is_some() {
            filter = filter.with(amount_between(
                self.min_base_units.unwrap_or(i64::MIN),
                self.max_base_units.unwrap_or(i64::MAX),
            ));
        }
        if self.from_hour.is_some() || self.to_hour.is_some() {
            filter = filter.with(hour_between(
                self.from_hour.unwrap_or(0),
                self.to_hour.unwrap_or(23),
            ));
        }
        if self.weekdays_only {
            filter = filter.with(weekday());
        }
        if self.domestic_only {
            filter = filter.with(not_foreign());
        }
        if let Some(id) = &self.category {
            filter = filter.with(category(id.clone()));
        }
        filter
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Export(args) => export(args).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "balance_relay=info,tower_http=info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn open_store(db_path: Option<PathBuf>) -> Result<BalanceStoreHandle> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            tracing::info!(path = %path.display(), "using RocksDB storage");
            Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryBalanceStore::new()))
        }
        None => Ok(Arc::new(InMemoryBalanceStore::new())),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let store = open_store(args.db_path)?;
    let banking = Arc::new(args.up.client()?);
    let bus = Arc::new(LocalBus::new());

    let verifier: Option<SignatureVerifierHandle> = match &args.webhook_secret {
        Some(secret) => Some(Arc::new(
            HmacSha256Verifier::new(secret).into_diagnostic()?,
        )),
        None => {
            tracing::warn!("no webhook secret configured, /webhook will reject every call");
            None
        }
    };

    let config = PipelineConfig {
        republish_topic: args.republish_topic,
        delivery_timeout: Duration::from_secs(args.delivery_timeout_secs),
        persistence_policy: if args.abort_on_persistence_failure {
            PersistencePolicy::Abort
        } else {
            PersistencePolicy::LogAndContinue
        },
    };
    let pipeline = Arc::new(TransactionPipeline::new(
        banking,
        store.clone(),
        bus.clone(),
        Arc::new(ReqwestWebhookSender::new()),
        config,
    ));
    let intake = Arc::new(IntakeService::new(verifier, bus.clone(), &args.intake_topic));

    let intake_messages = bus.subscribe(&args.intake_topic).await;
    tokio::spawn(run_push_subscription(intake_messages, pipeline.clone()));

    let app = router(AppState {
        pipeline,
        intake,
        store,
    });

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .into_diagnostic()?;
    tracing::info!(address = %args.listen, "starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn export(args: ExportArgs) -> Result<()> {
    let client = args.up.client()?;
    let transactions = client
        .list_transactions(args.page_size)
        .await
        .into_diagnostic()?;
    let total = transactions.len();

    let kept = args.filter().apply(transactions);
    write_json_file(&args.output, &kept).into_diagnostic()?;

    tracing::info!(
        total,
        kept = kept.len(),
        output = %args.output.display(),
        "exported transactions"
    );
    Ok(())
}
