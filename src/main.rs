use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ticket_status::{
    AppState,
    config::{Config, Overrides},
    handlers::TICKET_STATUS_PATH,
    router,
};

// ----------------------------------------------------------------------
// 1  Command line
// ----------------------------------------------------------------------
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Optional YAML config file; flags and env vars override its values
    #[arg(short, long, env = "TICKET_STATUS_CONFIG")]
    config: Option<PathBuf>,

    /// Shared secret expected in the x-api-key header (unset disables the check)
    #[arg(long, env = "INBOUND_API_KEY", hide_env_values = true)]
    inbound_api_key: Option<String>,

    /// HubSpot private app token used for the ticket search
    #[arg(long, env = "HUBSPOT_PRIVATE_APP_TOKEN", hide_env_values = true)]
    hubspot_token: Option<String>,

    /// HubSpot API base URL
    #[arg(long, env = "HUBSPOT_BASE")]
    hubspot_endpoint: Option<String>,

    /// Port (default 8000)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            inbound_api_key: self.inbound_api_key.clone(),
            hubspot_token: self.hubspot_token.clone(),
            hubspot_endpoint: self.hubspot_endpoint.clone(),
            port: self.port,
        }
    }
}

// ----------------------------------------------------------------------
// 2  Startup
// ----------------------------------------------------------------------
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a) Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // b) CLI + config
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref(), cli.overrides())?;

    info!(
        hubspot_endpoint = %config.hubspot.endpoint,
        inbound_auth = config.inbound_api_key.is_some(),
        "configuration loaded"
    );
    if config.hubspot.token.is_none() {
        warn!("HUBSPOT_PRIVATE_APP_TOKEN is not set; lookups will fail with 500");
    }

    // c) State + router
    let state = Arc::new(AppState::from_config(&config));
    let app = router(state);

    // d) Server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}{TICKET_STATUS_PATH}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
