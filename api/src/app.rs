//! Application factory
//!
//! Assembles middleware and routes into an Actix-web application. The rate
//! limiter wraps everything and resolves the caller identity on its own;
//! auth wraps only the routes that need an enforced identity.

use actix_web::body::MessageBody;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse};

use arena_core::repositories::TokenRepository;
use arena_core::services::token::KeyManager;
use arena_shared::types::response::ApiResponse;

use crate::middleware::{JwtAuth, RateLimiter};
use crate::routes::auth::{logout, refresh_token, AppState};
use crate::routes::health::health_check;
use crate::routes::keys::jwks;

/// Create and configure the application with all dependencies
pub fn create_app<R>(
    state: web::Data<AppState<R>>,
    keys: web::Data<KeyManager>,
    rate_limiter: RateLimiter,
    jwt_auth: JwtAuth,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        // Logger wraps the body in its own type, so the concrete body is
        // left opaque here.
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: TokenRepository + 'static,
{
    App::new()
        .app_data(state)
        .app_data(keys)
        // Wraps run innermost-first in registration order, so the limiter
        // (registered last) sees the request before anything else.
        .wrap(Logger::default())
        .wrap(rate_limiter)
        // Liveness and key discovery, both unauthenticated
        .route("/health", web::get().to(health_check))
        .route("/.well-known/jwks.json", web::get().to(jwks))
        // API v1 routes
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/refresh", web::post().to(refresh_token::<R>))
                    .route("/logout", web::post().to(logout::<R>).wrap(jwt_auth)),
            ),
        )
        // Default 404 handler
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error(
        "NOT_FOUND",
        "The requested resource was not found",
    ))
}
