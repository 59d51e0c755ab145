//! Service entry-point: loads settings, prepares persistence and serves the
//! review HTTP API.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use reviewer_service::inbound::http::health::HealthState;
use reviewer_service::outbound::persistence::{DbPool, run_migrations};
use reviewer_service::server::{ServerConfig, create_server};
use reviewer_service::settings::ReviewerSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ReviewerSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let timeout = settings
        .transaction_timeout()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(bind_addr).with_transaction_timeout(timeout);
    if let Some(pool_config) = settings.pool_config() {
        if settings.run_migrations() {
            run_migrations(pool_config.database_url())
                .await
                .map_err(std::io::Error::other)?;
        }
        let pool = DbPool::new(pool_config)
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    } else {
        info!("no database configured; state is kept in memory");
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
