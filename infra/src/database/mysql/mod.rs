//! MySQL implementations using SQLx

mod token_repository_impl;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use arena_shared::config::database::DatabaseConfig;

use crate::InfrastructureError;

pub use token_repository_impl::MySqlTokenRepository;

/// Create a MySQL connection pool from configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<MySqlPool, InfrastructureError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;
    Ok(pool)
}
