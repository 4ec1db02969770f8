//! Agora chat server.
//!
//! Real-time chat room with history and periodic retention sweep. Identity is
//! delegated to an external token validation service.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --host 0.0.0.0 --port 3000 --auth-url http://auth:50051
//! DATABASE_URL=postgres://localhost/forum cargo run --bin agora-server
//! ```

use std::{sync::Arc, time::Duration};

use agora_server::{
    config::ChatConfig,
    domain::{ConnectionRegistry, MessageRepository},
    infrastructure::{
        auth::HttpTokenValidator,
        connection_registry::InMemoryConnectionRegistry,
        dispatcher::FanOutDispatcher,
        repository::{InMemoryMessageRepository, PostgresMessageRepository},
        sweeper::RetentionSweeper,
    },
    ui::{Server, state::AppState},
    usecase::PurgeExpiredMessagesUseCase,
};
use agora_shared::logger::setup_logger;
use axum::http::HeaderValue;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "agora-server")]
#[command(about = "Forum chat server with real-time broadcast", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "AGORA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "AGORA_PORT", default_value = "8080")]
    port: u16,

    /// PostgreSQL connection URL (in-memory store when omitted)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL of the token validation service
    #[arg(long, env = "AUTH_SERVICE_URL", default_value = "http://127.0.0.1:50051")]
    auth_url: String,

    /// Deadline for one token validation, in seconds
    #[arg(long, env = "AGORA_AUTH_TIMEOUT_SECS", default_value = "2")]
    auth_timeout_secs: u64,

    /// Messages older than this many hours are deleted
    #[arg(long, env = "AGORA_RETENTION_HOURS", default_value = "24")]
    retention_hours: u64,

    /// Seconds between two retention sweeps
    #[arg(long, env = "AGORA_SWEEP_INTERVAL_SECS", default_value = "3600")]
    sweep_interval_secs: u64,

    /// Allowed CORS origin (repeatable; any origin when omitted)
    #[arg(long = "allowed-origin", env = "AGORA_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<HeaderValue>,
}

/// Connect to PostgreSQL when configured, otherwise fall back to memory
async fn load_repository(database_url: Option<&str>) -> Arc<dyn MessageRepository> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Chat history is kept in memory only.");
        return Arc::new(InMemoryMessageRepository::new());
    };

    tracing::info!("Connecting to database...");
    let repository = match PostgresMessageRepository::connect(database_url).await {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = repository.ensure_schema().await {
        tracing::error!("Failed to prepare chat_messages table: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Database ready");

    Arc::new(repository)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = match ChatConfig::new(
        Duration::from_secs(args.auth_timeout_secs),
        Duration::from_secs(args.retention_hours.saturating_mul(60 * 60)),
        Duration::from_secs(args.sweep_interval_secs),
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Repository / TokenValidator
    // 2. ConnectionRegistry / Dispatcher
    // 3. AppState (UseCases)
    // 4. Retention sweeper
    // 5. Server

    // 1. Create collaborators
    let repository = load_repository(args.database_url.as_deref()).await;
    let validator = Arc::new(HttpTokenValidator::new(&args.auth_url));

    // 2. Create the registry and start the dispatcher
    let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
    let (dispatcher, _dispatcher_task) = FanOutDispatcher::spawn(registry.clone());

    // 3. Create UseCases
    let app_state = Arc::new(AppState::new(
        repository.clone(),
        validator,
        registry,
        Arc::new(dispatcher),
        &config,
    ));

    // 4. Start the retention sweeper
    let purge_usecase = Arc::new(PurgeExpiredMessagesUseCase::new(
        repository,
        config.retention_window,
    ));
    let sweeper = RetentionSweeper::new(purge_usecase, config.sweep_interval).start();

    // 5. Create and run the server
    let server = Server::new(app_state).with_allowed_origins(args.allowed_origins);
    let result = server.run(args.host, args.port).await;

    sweeper.stop().await;

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
