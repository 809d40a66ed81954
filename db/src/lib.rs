use std::{str::FromStr, sync::Arc};

use common::env_config::Config;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgSslMode},
};

pub mod account;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod usage;

pub use memory::MemoryUsageStore;
pub use postgres::PgUsageStore;
pub use store::{UsageSnapshot, UsageStore};

/// Opens the usage database named by `DATABASE_URL`, `None` when it is not set.
///
/// The database is created when it does not exist yet and pending migrations
/// are applied. Production deployments require TLS.
pub async fn connect(config: &Config) -> Result<Option<Arc<PgPool>>, Box<dyn std::error::Error>> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Ok(None);
    };

    let mut options = PgConnectOptions::from_str(database_url)?;
    if config.is_production() {
        options = options.ssl_mode(PgSslMode::Require);
    }
    let db_name = options.get_database().unwrap_or("postgres").to_string();

    ensure_database(&options, &db_name).await?;

    let pool = PgPool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Usage database {} ready", db_name);

    Ok(Some(Arc::new(pool)))
}

/// Creates `db_name` through the `postgres` maintenance database when missing.
async fn ensure_database(options: &PgConnectOptions, db_name: &str) -> Result<(), sqlx::Error> {
    let admin_pool = PgPool::connect_with(options.clone().database("postgres")).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin_pool)
            .await?;

    if !exists {
        log::info!("Creating database {}", db_name);
        let statement = format!("CREATE DATABASE \"{}\"", db_name.replace('"', "\"\""));
        sqlx::query(&statement).execute(&admin_pool).await?;
    }

    admin_pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_database_url_means_no_pool() {
        let config = Config::from_lookup(|key: &str| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "STRIPE_SECRET_KEY" => Some("sk_test_1".to_string()),
            _ => None,
        });

        assert!(connect(&config).await.unwrap().is_none());
    }
}
