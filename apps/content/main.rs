use alasr_content::{
    config::{self, get_config},
    gateway::ContentApi,
    server::{self, AppState},
};
use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::{error, info, warn};
use utils::{
    errors::{GATEWAY_CLIENT_BUILD_FAILED, SERVER_BIND_FAILED, SERVER_FAILED},
    tracing::run_with_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    run_with_tracing(run).await
}

async fn run() -> Result<()> {
    config::load()?;
    let config = get_config();

    info!(endpoint = %config.gateway.endpoint, "Content service starting up");
    let api = ContentApi::new(&config.gateway).context(GATEWAY_CLIENT_BUILD_FAILED)?;

    if api.health().await.into_inner_or_default() {
        info!("Content backend reachable");
    } else {
        warn!("Content backend not healthy at startup, serving degraded content");
    }

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("{SERVER_BIND_FAILED}: {}", config.server.bind_address))?;

    let state = AppState::new(api, config.site.clone());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutting down...");
    };

    server::serve(listener, state, shutdown)
        .await
        .context(SERVER_FAILED)
}
