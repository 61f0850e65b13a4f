mod app;
mod auth;
mod config;
mod error;
mod memory;
mod orders;
mod state;

use crate::{auth::services::bootstrap_admin, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| config.environment.default_log_filter().to_string());
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

    tracing::info!(environment = ?config.environment, "starting orderdesk");
    let app_state = AppState::init(config).await?;

    if let Some(db) = &app_state.db {
        if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }
    }

    if let Some(seed) = app_state.config.admin.clone() {
        if let Err(e) = bootstrap_admin(&app_state, &seed).await {
            tracing::error!(error = %e, "admin bootstrap failed");
        }
    }

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
