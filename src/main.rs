use pantry_api::{
    AppState,
    config::{AppConfig, Env, StorageBackend},
    create_router,
    repository::{InMemoryRepository, PostgresRepository, RepositoryState},
    shutdown_signal,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, connects and migrates storage, then serves until
/// Ctrl-C or SIGTERM.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pantry_api=debug,tower_http=info".into());

    // 3. Log format follows APP_ENV: pretty locally, JSON for aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Storage Initialization
    let (repo, pool) = match &config.storage {
        StorageBackend::Postgres { url } => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await
                .inspect_err(|e| tracing::error!(error = %e, "failed to connect to Postgres"))?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("database migrations applied");

            let repo = Arc::new(PostgresRepository::new(pool.clone())) as RepositoryState;
            (repo, Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on exit");
            (Arc::new(InMemoryRepository::new()) as RepositoryState, None)
        }
    };

    // 5. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(repo, config));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/docs", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
    }
    tracing::info!("server stopped");
    Ok(())
}
