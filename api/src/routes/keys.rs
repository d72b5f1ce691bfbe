//! JWKS discovery endpoint
//!
//! Relying services fetch the verification key from here; the route is
//! deliberately unauthenticated and exposes public material only.

use actix_web::{web, HttpResponse};

use arena_core::services::token::KeyManager;

/// Handler for GET /.well-known/jwks.json
pub async fn jwks(keys: web::Data<KeyManager>) -> HttpResponse {
    HttpResponse::Ok().json(keys.jwks())
}
