//! Domain-specific error types and error handling.

use thiserror::Error;

/// Token-related errors
///
/// Cryptographic and parsing failures inside token validation are mapped to
/// these variants; raw `jsonwebtoken` errors never reach callers. The HTTP
/// layer collapses every validation failure into a generic 401 so clients
/// cannot probe which specific check rejected a forged token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token generation failed")]
    TokenGenerationFailed,

    #[error("Signing key bootstrap failed: {message}")]
    KeyBootstrap { message: String },
}

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;
