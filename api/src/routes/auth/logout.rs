//! Handler for POST /api/v1/auth/logout
//!
//! Requires authentication. Blacklists the presented access token's jti
//! until its natural expiry and, when a refresh token accompanies the
//! request, revokes it too.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use arena_core::repositories::TokenRepository;
use arena_shared::types::response::ApiResponse;

use crate::middleware::auth::AuthContext;
use crate::routes::domain_error_response;

use super::AppState;

/// Request body for the logout endpoint
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke alongside the access token
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Invalidates the caller's current session
///
/// The body is optional; a bare POST blacklists the access token only.
///
/// # Responses
///
/// - 200: access token blacklisted; refresh token revoked if supplied
/// - 401 `UNAUTHORIZED`: missing or invalid credentials
pub async fn logout<R>(
    context: AuthContext,
    state: web::Data<AppState<R>>,
    request: Option<web::Json<LogoutRequest>>,
) -> HttpResponse
where
    R: TokenRepository + 'static,
{
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    if let Err(error) = state
        .blacklist
        .blacklist(&context.jti, context.expires_at)
        .await
    {
        return domain_error_response(error);
    }

    let mut refresh_revoked = false;
    if let Some(refresh_token) = request.refresh_token.as_deref() {
        match state.token_service.revoke_refresh_token(refresh_token).await {
            Ok(revoked) => refresh_revoked = revoked,
            Err(error) => return domain_error_response(error),
        }
    }

    log::info!(
        "user {} logged out (refresh revoked: {refresh_revoked})",
        context.user_id
    );
    HttpResponse::Ok().json(ApiResponse::success(serde_json::json!({
        "message": "Logged out",
        "refresh_token_revoked": refresh_revoked,
    })))
}
