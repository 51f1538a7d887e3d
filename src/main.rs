use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use commhub::config::AppConfig;
use commhub::handlers;
use commhub::services::CommunicationService;
use commhub::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    if config.twilio_account_sid.is_empty() {
        tracing::warn!("TWILIO_ACCOUNT_SID not set, Twilio sends will be rejected upstream");
    }

    let comms = CommunicationService::from_config(&config)?;
    let port = config.port;

    let state = Arc::new(AppState { config, comms });

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
