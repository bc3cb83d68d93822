//! CMS API server.
//!
//! Run from repo root: `cargo run -p cms-server`
//! Set `CMS_STORAGE=memory` to run without a database.

use cms_api::{
    app, apply_migrations, ensure_database_exists, reset, AppState, MemoryStore, ServerConfig,
    StorageBackend,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cms_api=info,cms_server=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(storage = %config.storage, "starting");

    let state = match config.storage {
        StorageBackend::Memory => AppState::memory(MemoryStore::new()),
        StorageBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            if config.reset {
                reset(&pool).await?;
            }
            apply_migrations(&pool).await?;
            AppState::postgres(pool)
        }
    };

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state, config.body_limit)).await?;
    Ok(())
}
