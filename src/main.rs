mod analysis;
mod app;
mod bot;
mod broadcast;
mod charts;
mod clock;
mod config;
mod error;
mod meals;
mod reports;
mod state;

#[cfg(test)]
mod testing;

use crate::broadcast::BroadcastScheduler;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "proteinbot=debug,axum=info,tower_http=info".to_string());
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

    let state = AppState::init().await?;
    tracing::info!(
        base_url = %state.config.base_url,
        offset_hours = state.config.schedule.utc_offset_hours,
        "state ready"
    );

    let broadcast = BroadcastScheduler::from_state(&state)?.start();

    let config = state.config.clone();
    let result = app::serve(app::build_app(state), &config).await;
    broadcast.abort();
    result
}
