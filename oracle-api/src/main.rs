//! Prediction Oracle API Server
//!
//! Generates prediction markets from live facts, adjudicates them, and
//! records both on the prediction market contract.

use std::net::SocketAddr;
use std::sync::Arc;

use oracle_api::{app, config::AppConfig, AppState};
use oracle_chain::{AlloyGateway, GatewayConfig, SigningWallet};
use oracle_research::{OpenAIClient, PerplexityClient};
use oracle_services::LifecycleOrchestrator;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local, then .env
    for file in [".env.local", ".env"] {
        if let Err(e) = dotenvy::from_filename(file) {
            // Not an error if the file doesn't exist
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load {}: {}", file, e);
            }
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,oracle_api=debug")),
        )
        .init();

    info!("Starting Prediction Oracle API");

    let config = AppConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let facts = PerplexityClient::new(config.perplexity_api_key.as_str())?
        .with_model(&config.perplexity_model);
    let model = OpenAIClient::new(&config.openai_api_key).with_model(&config.openai_model);

    let wallet = SigningWallet::from_private_key(&config.private_key)?;
    info!("Signing as {}", wallet.address());

    let gateway_config = GatewayConfig::new(config.rpc_url.clone(), config.contract_address)
        .with_confirmation_timeout(config.confirmation_timeout);
    let gateway = AlloyGateway::connect(&gateway_config, &wallet)?;
    info!(
        "Connected to {} (contract {})",
        config.rpc_url, config.contract_address
    );

    let orchestrator =
        LifecycleOrchestrator::new(Arc::new(facts), Arc::new(model), Arc::new(gateway));
    let app = app(AppState::new(orchestrator));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
