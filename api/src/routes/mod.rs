//! Route handlers

pub mod auth;
pub mod health;
pub mod keys;

use actix_web::HttpResponse;

use arena_core::errors::{DomainError, TokenError};
use arena_shared::types::response::{error_codes, ApiResponse};

/// Maps a domain error onto the wire
///
/// Token failures collapse into two 401 codes: `TOKEN_REVOKED` when the
/// credential was deliberately invalidated, `TOKEN_INVALID` for everything
/// else. Validation failures all share one generic message so a probe
/// learns nothing about why a forged token failed.
pub(crate) fn domain_error_response(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Token(TokenError::TokenRevoked) => HttpResponse::Unauthorized().json(
            ApiResponse::<()>::error(error_codes::TOKEN_REVOKED, "Token has been revoked"),
        ),
        DomainError::Token(_) | DomainError::Unauthorized => HttpResponse::Unauthorized().json(
            ApiResponse::<()>::error(error_codes::TOKEN_INVALID, "Invalid token"),
        ),
        other => {
            log::error!("request failed: {other}");
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                error_codes::INTERNAL_ERROR,
                "An internal error occurred",
            ))
        }
    }
}
