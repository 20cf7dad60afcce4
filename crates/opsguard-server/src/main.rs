mod config;
mod http;
mod signature;
mod state;
mod worker;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use opsguard_adapters::SqliteDb;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::default();
    let db = SqliteDb::new(&config.db_url).await?;
    let state = state::build_state(db, config);

    let poll_interval = Duration::from_secs(state.config.poll_interval_secs);
    tokio::spawn(worker::run(state.clone(), poll_interval));

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    tracing::info!(addr = %state.config.bind_addr, "opsguard listening");
    axum::serve(listener, http::build_router(state)).await?;
    Ok(())
}
