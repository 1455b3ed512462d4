use std::net::SocketAddr;

mod app;
mod auth;
mod biodata;
mod config;
mod contact_requests;
mod error;
mod favorites;
mod payments;
mod state;
mod store;
mod users;
mod validate;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "heartsync=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    if config.strict_access_control {
        tracing::info!("strict access control enabled");
    }

    let state = AppState::init(config).await?;
    let result = app::serve(app::build_app(state.clone()), addr).await;

    state.store.close().await;
    result
}
