//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - RS256 access token issuance and validation
//! - Opaque refresh token generation and single-use rotation
//! - Token revocation via the blacklist
//! - Signing key bootstrap (load-or-generate) and JWKS export

mod config;
mod key_manager;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use key_manager::{JsonWebKey, JsonWebKeySet, KeyManager};
pub use service::TokenService;
