use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod config;
mod db;
mod error;
mod identity;
mod middleware;
mod modules;
mod pagination;
mod response;
mod validation;

use app_state::AppState;
use identity::IdentityProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::init()?.clone();
    let pool = db::init_pool().await?;
    let idp = Arc::new(IdentityProvider::from_config(config.identity.as_ref()));

    let state = AppState::new(pool, config.clone(), idp);
    let app = app::create_router(state);

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
