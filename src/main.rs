use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use blogly::config::{Cli, Config};
use blogly::db;
use blogly::db::store::BlogStore;
use blogly::routes;
use blogly::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    // Initialize database
    let db_path = config.db_path();
    tracing::info!("Database: {}", db_path.display());
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;

    let state = AppState {
        store: BlogStore::new(pool),
    };
    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
