use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tracing::info;

use chat_relay::config::RelayConfig;
use chat_relay::routes;
use chat_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = RelayConfig::from_env()?;
    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .with_context(|| format!("invalid allowed origin {:?}", config.allowed_origin))?;
    let bind_addr = config.bind_addr;

    let state = Arc::new(AppState::new(config));
    info!(
        backend = %state.backend.chat_url(),
        model = %state.config.model,
        stream = state.config.stream,
        "relay configured"
    );

    let app = routes::app(state, origin);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!("chat relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
