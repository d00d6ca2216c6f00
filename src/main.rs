use clap::Parser;
use docsearch_api::RestApi;
use docsearch_core::SchemaRegistry;
use docsearch_search::{CouchDocumentStore, ElasticsearchBackend, SearchOrchestrator};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Document search API over a faceted search backend
#[derive(Parser, Debug)]
#[command(name = "docsearch")]
#[command(about = "Document search API", long_about = None)]
struct Args {
    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Search backend base URL
    #[arg(long, default_value = "http://localhost:9200")]
    search_url: String,

    /// Search backend index
    #[arg(long, default_value = "dpla")]
    search_index: String,

    /// Document store base URL
    #[arg(long, default_value = "http://localhost:5984")]
    store_url: String,

    /// Document store database
    #[arg(long, default_value = "dpla")]
    store_db: String,

    /// Timeout for backend and store requests, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting docsearch v{}", env!("CARGO_PKG_VERSION"));
    info!("Search backend: {}/{}", args.search_url, args.search_index);
    info!("Document store: {}/{}", args.store_url, args.store_db);
    info!("HTTP API port: {}", args.http_port);

    let schema = Arc::new(SchemaRegistry::standard());
    let timeout = Duration::from_secs(args.timeout_secs);

    // The blocking HTTP clients must not be created inside the tokio runtime
    let http_handle = std::thread::spawn(move || {
        let backend = match ElasticsearchBackend::new(&args.search_url, &args.search_index, timeout) {
            Ok(backend) => backend,
            Err(e) => {
                error!("Failed to create search backend: {}", e);
                return;
            }
        };
        let store = match CouchDocumentStore::new(&args.store_url, &args.store_db, timeout) {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to create document store: {}", e);
                return;
            }
        };
        let service = Arc::new(SearchOrchestrator::new(schema, Arc::new(backend), Arc::new(store)));

        info!("Starting HTTP server on port {}", args.http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(service, args.http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
