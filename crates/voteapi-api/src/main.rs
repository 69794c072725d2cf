//! `VoteAPI` server entry point.
//!
//! Serves the reference dataset of states, offices, districts, and polling
//! stations over HTTP, backed by `PostgreSQL`.
//!
//! # Startup
//!
//! ```text
//! logging --> config (env) --> lazy pool --> Store --> serve until SIGINT/SIGTERM --> close pool
//! ```
//!
//! The pool connects on first use and the schema is created by the first
//! request that needs it, so the server starts even while the database is
//! still coming up.

use std::io::IsTerminal;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use voteapi_api::{AdminCredentials, ApiConfig, AppState, start_server};
use voteapi_db::{PostgresPool, Store};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the pool settings are
/// invalid, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("voteapi starting");

    let config = ApiConfig::from_env()?;
    info!(
        listen = %config.listen,
        max_connections = config.max_connections,
        tx_max_attempts = config.retry.max_attempts.map(std::num::NonZeroU32::get),
        tx_backoff_ms = config.retry.backoff.as_millis(),
        "configuration loaded"
    );

    let pool = PostgresPool::connect_lazy(&config.postgres())?;
    let store = Store::new(pool, config.retry);
    let admin = AdminCredentials::new(&config.admin_name, &config.admin_password);
    let state = Arc::new(AppState::new(store.clone(), admin));

    let served = start_server(config.listen, state).await;

    store.close().await;
    info!(
        conflict_retries = store.conflict_retries(),
        "voteapi stopped"
    );

    Ok(served?)
}

/// Human-readable logs on a terminal, JSON lines otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::io::stdout().is_terminal() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
