//! Handler for POST /api/v1/auth/refresh
//!
//! Exchanges a valid refresh token for a new token pair. Refresh tokens are
//! single-use; replaying a rotated token revokes the user's whole session
//! set before the request is rejected.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use arena_core::errors::{DomainError, TokenError};
use arena_core::repositories::TokenRepository;
use arena_shared::types::response::ApiResponse;

use crate::routes::domain_error_response;

use super::AppState;

/// Request body for the refresh endpoint
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    /// The opaque refresh token issued alongside the access token
    pub refresh_token: String,
}

/// Rotates the presented refresh token into a new pair
///
/// # Responses
///
/// - 200: new access + refresh tokens
/// - 401 `TOKEN_INVALID`: unknown, expired, or malformed refresh token
/// - 401 `TOKEN_REVOKED`: token was already rotated or revoked
pub async fn refresh_token<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
{
    let owner = match state
        .token_service
        .refresh_token_owner(&request.refresh_token)
        .await
    {
        Ok(owner) => owner,
        Err(error) => return domain_error_response(error),
    };

    // Roles are re-read at rotation time so a revoked grant does not ride
    // along on the new access token.
    let profile = match state.directory.find_profile(owner).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            return domain_error_response(DomainError::Token(TokenError::InvalidToken));
        }
        Err(error) => return domain_error_response(error),
    };

    match state
        .token_service
        .refresh_tokens(&request.refresh_token, &profile.identity, profile.roles)
        .await
    {
        Ok(pair) => HttpResponse::Ok().json(ApiResponse::success(pair)),
        Err(error) => domain_error_response(error),
    }
}
