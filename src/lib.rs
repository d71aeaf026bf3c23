pub mod api;
pub mod config;
pub mod consultation;
pub mod location;
pub mod models;
pub mod reasoning;
pub mod report;
pub mod session;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::api::{start_server, ApiContext};
use crate::config::AppConfig;
use crate::consultation::ConsultationServices;
use crate::session::SessionStore;

/// Load configuration, start the HTTP server and run until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "Configuration resolved");

    // Blocking HTTP clients must be built off the async runtime.
    let services = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || ConsultationServices::from_config(&config))
            .await?
            .context("failed to set up external service clients")?
    };
    tracing::info!(
        backend = services.reasoning.backend(),
        "External service clients ready"
    );

    let ctx = ApiContext::new(services, SessionStore::new(config.session_idle_timeout));
    let mut server = start_server(ctx, config.bind_addr).await?;
    tracing::info!("Open http://{} in a browser", server.local_addr());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}
