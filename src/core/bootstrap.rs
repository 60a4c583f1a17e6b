use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::{app_state::AppState, config, db, outbox, rmq};

pub fn init_tracing() {
    tracing_subscriber::fmt::init();
}

pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Builds the shared state, wires queue consumers and the outbox relay, and
/// serves the router until shutdown.
pub async fn bootstrap(
    service_name: &str,
    app: Router<AppState>,
    consumers: &[(&'static str, rmq::ConsumerHandler)],
) -> Result<()> {
    let config = config::load()?;

    let db_pool = db::create_pool(&config.database.url).await?;
    let http_client = reqwest::Client::new();
    let state = AppState {
        db_pool,
        http_client,
    };
    let shared_state = Arc::new(state.clone());

    let amqp = rmq::connect(&config.amqp.url).await?;
    for &(queue, handler) in consumers {
        let channel = amqp
            .create_channel()
            .await
            .context("Failed to create AMQP channel")?;
        rmq::spawn_consumer(channel, queue, handler, shared_state.clone()).await?;
    }

    let relay_channel = amqp
        .create_channel()
        .await
        .context("Failed to create AMQP channel for outbox relay")?;
    outbox::spawn_relay(relay_channel, shared_state);

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server.port))?;
    tracing::info!(
        "{service_name} listening on {}",
        listener.local_addr().context("No local address")?
    );

    axum::serve(listener, app).await.context("Server exited")?;
    Ok(())
}
