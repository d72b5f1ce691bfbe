//! ArenaOps token authority server

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use log::info;

use arena_api::app::create_app;
use arena_api::config::AppConfig;
use arena_api::middleware::auth::TokenVerifier;
use arena_api::middleware::{JwtAuth, RateLimiter};
use arena_api::routes::auth::AppState;
use arena_core::services::blacklist::TokenBlacklist;
use arena_core::services::directory::{InMemoryDirectory, UserDirectory};
use arena_core::services::token::{KeyManager, TokenService, TokenServiceConfig};
use arena_infra::cache::{RedisBlacklist, RedisClient};
use arena_infra::database::mysql::{create_pool, MySqlTokenRepository};

/// Interval between expired refresh token cleanup passes
const TOKEN_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    info!("starting ArenaOps token authority on {}", config.bind_address());

    // Signing keys are non-negotiable: a service that cannot sign must not
    // come up at all.
    let keys = Arc::new(KeyManager::load_or_generate(&config.auth.private_key_path)?);

    let pool = create_pool(&config.database).await?;
    let repository = MySqlTokenRepository::new(pool);
    let token_service = Arc::new(TokenService::new(
        repository,
        TokenServiceConfig::from(&config.auth),
        keys.clone(),
    ));

    let redis_client = Arc::new(RedisClient::new(config.cache.clone())?);
    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(RedisBlacklist::new(redis_client.clone()));
    // Integration seam for the platform's account service; populated out of
    // band in deployments that enable the refresh endpoint.
    let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::new());

    start_token_cleanup(token_service.clone());

    let state = web::Data::new(AppState {
        token_service: token_service.clone(),
        blacklist: blacklist.clone(),
        directory,
    });
    let keys_data = web::Data::from(keys);
    let rate_limit_config = config.rate_limit.clone();
    let bind_address = config.bind_address();

    HttpServer::new(move || {
        let verifier: Arc<dyn TokenVerifier> = token_service.clone();
        create_app(
            state.clone(),
            keys_data.clone(),
            RateLimiter::new(
                redis_client.clone(),
                rate_limit_config.clone(),
                verifier.clone(),
            ),
            JwtAuth::new(verifier, blacklist.clone()),
        )
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

/// Periodically deletes expired refresh tokens from storage
fn start_token_cleanup(token_service: Arc<TokenService<MySqlTokenRepository>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TOKEN_CLEANUP_INTERVAL);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match token_service.cleanup_expired_tokens().await {
                Ok(0) => {}
                Ok(deleted) => info!("cleaned up {deleted} expired refresh tokens"),
                Err(e) => log::warn!("refresh token cleanup failed: {e}"),
            }
        }
    });
}
