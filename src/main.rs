// SPDX-License-Identifier: MIT

//! Tubekeep API Server
//!
//! Lets a user log in with Google, pull their YouTube channel's uploads into
//! a per-user document, and curate a personal saved list.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubekeep::{
    config::Config,
    db::UserStore,
    services::{GoogleOAuthClient, YouTubeClient},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Tubekeep API");

    // Initialize Firestore-backed user store
    let store = UserStore::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    let oauth = GoogleOAuthClient::new(&config).expect("Failed to initialize OAuth client");
    let youtube = YouTubeClient::new();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        youtube,
        oauth,
    });

    // Build router
    let app = tubekeep::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tubekeep=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
