use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod logging;
mod response;
mod state;
mod users;

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::from_env()?);
    let _log_guard = logging::init_tracing(&config.log)?;
    tracing::info!(
        app = %config.app_name,
        environment = %config.environment,
        "starting"
    );

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    let state = state::AppState::init(config.clone(), pool.clone())?;
    let app = app::build_app(state);

    app::serve(app, &config).await?;

    pool.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
