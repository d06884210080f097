mod client;
mod controllers;
mod data;
mod error;
mod handlers;
mod models;
mod policy;
mod state;
#[cfg(test)]
mod testing;
mod view;

use anyhow::Context as _;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tera::Tera;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{
    blacklist_page, blacklist_update, health, index, restart_status, settings_page,
    settings_restart, settings_save, settings_toggle_block, settings_update_firmware,
    setup_connect, setup_connected, setup_finish, setup_page, setup_scan,
};
use crate::state::{AppState, Config};

/// Builds the console router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/blacklist", get(blacklist_page).post(blacklist_update))
        .route("/settings", get(settings_page).post(settings_save))
        .route("/settings/toggleblock", post(settings_toggle_block))
        .route("/settings/updatefirmware", post(settings_update_firmware))
        .route("/settings/restart", post(settings_restart))
        .route("/settings/restart-status", get(restart_status))
        .route("/setup", get(setup_page))
        .route("/setup/scan", post(setup_scan))
        .route("/setup/connect", post(setup_connect))
        .route("/setup/connected", get(setup_connected))
        .route("/setup/finish", post(setup_finish))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sinkhole_console=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Managing device at {} ({} API)",
        config.device_url, config.api_variant
    );

    let tera = Tera::new(&format!("{}/**/*.html", config.templates_dir))
        .context("Failed to parse templates")?;

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(tera, config).context("Failed to set up device client")?);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
