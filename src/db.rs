use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use tracing::info;

use crate::config::DatabaseConfig;

/// Opens the shared pool against `cfg.name` on the server named by `cfg.url`.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let options = PgConnectOptions::from_str(&cfg.url)
        .context("parse DATABASE_URL")?
        .database(&cfg.name);
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect_with(options)
        .await
        .context("connect to database")?;
    info!(db = %cfg.name, "connected to database");
    Ok(pool)
}

/// Applies pending migrations, including the unique index on `users.email`.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;
    info!("migrations applied");
    Ok(())
}
